// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion from card markdown to Telegram MarkdownV2.
//!
//! Cards are written in a small markdown dialect: `**bold**` spans and
//! `[label](url)` links. MarkdownV2 uses single asterisks for bold and
//! requires 18 special characters to be escaped everywhere else, so the
//! dialect is translated span by span and all remaining text is escaped.

/// Characters that must be escaped in MarkdownV2 text.
const SPECIAL_CHARS: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

fn push_escaped(out: &mut String, ch: char) {
    if ch == '\\' || SPECIAL_CHARS.contains(&ch) {
        out.push('\\');
    }
    out.push(ch);
}

/// Escapes every MarkdownV2 special character in `text`.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        push_escaped(&mut out, ch);
    }
    out
}

/// Inside a link target only `)` and `\` need escaping.
fn escape_link_target(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for ch in url.chars() {
        if ch == ')' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Splits `label](url)rest` after an opening `[`.
fn split_link(s: &str) -> Option<(&str, &str, &str)> {
    let close = s.find("](")?;
    let label = &s[..close];
    if label.is_empty() || label.contains('\n') {
        return None;
    }
    let after = &s[close + 2..];
    let end = after.find(')')?;
    let url = &after[..end];
    if url.is_empty() || url.contains(char::is_whitespace) {
        return None;
    }
    Some((label, url, &after[end + 1..]))
}

/// Translates card markdown into MarkdownV2.
///
/// Unbalanced `**` and malformed links are emitted as escaped literal text.
pub fn to_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix("**")
            && let Some(end) = after.find("**")
        {
            out.push('*');
            out.push_str(&escape_markdown_v2(&after[..end]));
            out.push('*');
            rest = &after[end + 2..];
            continue;
        }

        if ch == '['
            && let Some((label, url, tail)) = split_link(&rest[1..])
        {
            out.push('[');
            out.push_str(&escape_markdown_v2(label));
            out.push_str("](");
            out.push_str(&escape_link_target(url));
            out.push(')');
            rest = tail;
            continue;
        }

        push_escaped(&mut out, ch);
        rest = &rest[ch.len_utf8()..];
    }

    out
}
