// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The newline-delimited chat source list.

use std::path::Path;

use leadscout_core::{ChatRef, LeadscoutError};

/// Parses a chat list. Blank lines and `#` comments are skipped; duplicate
/// references keep their first position.
pub fn parse_chat_refs(contents: &str) -> Vec<ChatRef> {
    let mut refs = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        if let Some(reference) = ChatRef::parse(line)
            && !refs.contains(&reference)
        {
            refs.push(reference);
        }
    }
    refs
}

/// Reads and parses the chat list at `path`.
pub async fn load_chat_refs(path: impl AsRef<Path>) -> Result<Vec<ChatRef>, LeadscoutError> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        LeadscoutError::Config(format!("cannot read chat list {}: {e}", path.display()))
    })?;
    Ok(parse_chat_refs(&contents))
}
