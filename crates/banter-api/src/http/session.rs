//! Browser session extractor.
//!
//! Reads the session token from the configured cookie, loads (or starts) the
//! stored session, and resolves its conversation id. New sessions carry
//! a `Set-Cookie` header back through [`SessionCookie`].

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::response::{IntoResponseParts, ResponseParts};

use banter_core::session;
use banter_types::turn::DEFAULT_SESSION_ID;

use crate::http::error::AppError;
use crate::state::AppState;

/// The conversation this request belongs to.
pub struct BrowserSession {
    pub session_id: String,
    pub cookie: SessionCookie,
}

impl FromRequestParts<AppState> for BrowserSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session_config = &state.config.session;

        // Shared-bucket mode: no cookies, one conversation for everyone.
        if session_config.default_bucket {
            return Ok(Self {
                session_id: DEFAULT_SESSION_ID.to_string(),
                cookie: SessionCookie(None),
            });
        }

        let token = read_cookie(parts, &session_config.cookie_name);
        let (handle, is_new) = state.sessions.load_or_create(token.as_deref()).await?;
        let session_id = session::resolve(&handle).await?;

        let cookie = if is_new {
            SessionCookie(Some(format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
                session_config.cookie_name,
                handle.token(),
                session_config.idle_timeout_secs
            )))
        } else {
            SessionCookie(None)
        };

        Ok(Self { session_id, cookie })
    }
}

/// Find `name` among all `Cookie` headers.
fn read_cookie(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Optional `Set-Cookie` for a newly started session.
pub struct SessionCookie(pub Option<String>);

impl IntoResponseParts for SessionCookie {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(cookie) = self.0 {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    res.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => tracing::warn!("Dropping invalid session cookie: {e}"),
            }
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(cookies: &[&str]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for cookie in cookies {
            builder = builder.header(COOKIE, *cookie);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn reads_named_cookie() {
        let parts = parts_with(&["theme=dark; banter_session=abc-123; other=1"]);
        assert_eq!(read_cookie(&parts, "banter_session").as_deref(), Some("abc-123"));
    }

    #[test]
    fn reads_across_multiple_headers() {
        let parts = parts_with(&["theme=dark", "banter_session=xyz"]);
        assert_eq!(read_cookie(&parts, "banter_session").as_deref(), Some("xyz"));
    }

    #[test]
    fn missing_or_empty_cookie() {
        assert!(read_cookie(&parts_with(&[]), "banter_session").is_none());
        assert!(read_cookie(&parts_with(&["banter_session="]), "banter_session").is_none());
        assert!(read_cookie(&parts_with(&["banter_sessionx=1"]), "banter_session").is_none());
    }
}
