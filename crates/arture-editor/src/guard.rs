//! Session gate for editor routes.
//!
//! The auth service itself is external; this module only decides what the
//! editor does with its answer. A shared link (share token) skips the check,
//! a missing session redirects to onboarding with a callback URL, and a failed
//! check is logged and lets the user through.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// An authenticated session as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session request failed: {0}")]
    Transport(String),
    #[error("session endpoint returned status {0}")]
    Status(u16),
    #[error("malformed session response: {0}")]
    Decode(String),
}

/// Answers "who is signed in right now".
pub trait SessionProvider {
    /// `Ok(None)` means no session; `Err` means the check itself failed.
    fn current_session(&self) -> Result<Option<Session>, SessionError>;
}

impl<F> SessionProvider for F
where
    F: Fn() -> Result<Option<Session>, SessionError>,
{
    fn current_session(&self) -> Result<Option<Session>, SessionError> {
        self()
    }
}

/// Configuration for [`AuthGuard`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Where signed-out users are sent. Default: `/onboarding`.
    pub redirect_to: String,
    /// Query parameter carrying the return path. Default: `callbackUrl`.
    pub callback_param: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            redirect_to: "/onboarding".into(),
            callback_param: "callbackUrl".into(),
        }
    }
}

/// What the editor should do after the session check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(String),
}

pub struct AuthGuard<P> {
    provider: P,
    config: GuardConfig,
}

impl<P: SessionProvider> AuthGuard<P> {
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, GuardConfig::default())
    }

    pub fn with_config(provider: P, config: GuardConfig) -> Self {
        Self { provider, config }
    }

    /// Decide whether the user at `current_path` may stay.
    pub fn check(&self, current_path: &str, share_token: Option<&str>) -> GuardDecision {
        if share_token.is_some_and(|t| !t.is_empty()) {
            return GuardDecision::Proceed;
        }

        match self.provider.current_session() {
            Ok(Some(_)) => GuardDecision::Proceed,
            Ok(None) => GuardDecision::Redirect(format!(
                "{}?{}={}",
                self.config.redirect_to,
                self.config.callback_param,
                encode_uri_component(current_path)
            )),
            Err(err) => {
                log::warn!("session check failed, letting user through: {err}");
                GuardDecision::Proceed
            }
        }
    }
}

/// Percent-encode everything except the characters `encodeURIComponent`
/// leaves alone: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn signed_in() -> Result<Option<Session>, SessionError> {
        Ok(Some(Session {
            user_id: "u_42".into(),
            email: None,
        }))
    }

    fn signed_out() -> Result<Option<Session>, SessionError> {
        Ok(None)
    }

    fn offline() -> Result<Option<Session>, SessionError> {
        Err(SessionError::Transport("connection reset".into()))
    }

    #[test]
    fn session_present_proceeds() {
        let guard = AuthGuard::new(signed_in);
        assert_eq!(guard.check("/editor/p1", None), GuardDecision::Proceed);
    }

    #[test]
    fn session_absent_redirects_with_callback() {
        let guard = AuthGuard::new(signed_out);
        assert_eq!(
            guard.check("/editor/p 1", None),
            GuardDecision::Redirect("/onboarding?callbackUrl=%2Feditor%2Fp%201".into())
        );
    }

    #[test]
    fn failed_check_fails_open() {
        let guard = AuthGuard::new(offline);
        assert_eq!(guard.check("/editor/p1", None), GuardDecision::Proceed);

        let guard = AuthGuard::new(|| -> Result<Option<Session>, SessionError> {
            Err(SessionError::Status(503))
        });
        assert_eq!(guard.check("/editor/p1", None), GuardDecision::Proceed);
    }

    #[test]
    fn share_token_skips_the_check() {
        let calls = Cell::new(0);
        let provider = || -> Result<Option<Session>, SessionError> {
            calls.set(calls.get() + 1);
            Ok(None)
        };
        let guard = AuthGuard::new(provider);
        assert_eq!(guard.check("/editor/p1", Some("tok_abc")), GuardDecision::Proceed);
        assert_eq!(calls.get(), 0);

        // An empty token is no token.
        assert!(matches!(guard.check("/editor/p1", Some("")), GuardDecision::Redirect(_)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn custom_redirect_target() {
        let config = GuardConfig {
            redirect_to: "/sign-in".into(),
            ..GuardConfig::default()
        };
        let guard = AuthGuard::with_config(signed_out, config);
        assert_eq!(
            guard.check("/", None),
            GuardDecision::Redirect("/sign-in?callbackUrl=%2F".into())
        );
    }

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(encode_uri_component("a-b_c.d!~*'()"), "a-b_c.d!~*'()");
        assert_eq!(encode_uri_component("/x?y=1&z"), "%2Fx%3Fy%3D1%26z");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }
}
