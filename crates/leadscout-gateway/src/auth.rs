// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token authentication for `/api/*`.
//!
//! With a token configured, every API request must carry
//! `Authorization: Bearer <token>`; anything else is rejected. Without a
//! token the API is open, which is only sensible on a loopback bind.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

/// Authentication configuration for the gateway.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Expected bearer token. `None` disables authentication.
    pub bearer_token: Option<String>,
}

impl AuthConfig {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
        }
    }

    /// Whether a raw `Authorization` header value grants access.
    pub fn permits(&self, header: Option<&str>) -> bool {
        let Some(expected) = self.bearer_token.as_deref() else {
            return true;
        };
        header
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected)
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Middleware that validates the bearer token.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    if auth.permits(header) {
        Ok(next.run(request).await)
    } else {
        tracing::debug!(path = %request.uri().path(), "rejected unauthenticated request");
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_without_token() {
        let auth = AuthConfig::default();
        assert!(auth.permits(None));
        assert!(auth.permits(Some("Bearer anything")));
    }

    #[test]
    fn token_must_match_exactly() {
        let auth = AuthConfig::bearer("secret-token");
        assert!(auth.permits(Some("Bearer secret-token")));
        assert!(!auth.permits(Some("Bearer secret")));
        assert!(!auth.permits(Some("secret-token")));
        assert!(!auth.permits(Some("Basic secret-token")));
        assert!(!auth.permits(None));
    }

    #[test]
    fn debug_redacts_token() {
        let debug_output = format!("{:?}", AuthConfig::bearer("secret-token"));
        assert!(!debug_output.contains("secret-token"));
        assert!(debug_output.contains("[redacted]"));
    }
}
