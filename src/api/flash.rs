//! One-shot flash messages carried across a redirect in a cookie.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use crate::config::FLASH_COOKIE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// Message shown once on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    fn into_cookie(self) -> Option<Cookie<'static>> {
        let value = match serde_json::to_string(&self) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to encode flash message: {}", e);
                return None;
            }
        };
        Some(
            Cookie::build((FLASH_COOKIE, value))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .build(),
        )
    }

    /// Attach the message to `jar`
    pub fn set(self, jar: CookieJar) -> CookieJar {
        match self.into_cookie() {
            Some(cookie) => jar.add(cookie),
            None => jar,
        }
    }

    /// 303 redirect carrying this message
    pub fn redirect(self, to: &str) -> Response {
        (self.set(CookieJar::new()), Redirect::to(to)).into_response()
    }

    /// Read the pending message and clear it from the jar. Unreadable
    /// cookies are dropped silently.
    pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
        let Some(cookie) = jar.get(FLASH_COOKIE) else {
            return (jar, None);
        };
        let flash = serde_json::from_str(cookie.value()).ok();
        let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
        (jar, flash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{LOCATION, SET_COOKIE};
    use axum::http::{HeaderMap, HeaderValue, StatusCode};

    #[test]
    fn test_redirect_sets_cookie() {
        let response = Flash::success("Saved").redirect("/products/");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/products/");
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with(FLASH_COOKIE));
    }

    #[test]
    fn test_take_reads_and_clears() {
        let jar = Flash::error("No access").set(CookieJar::new());
        let cookie = jar.get(FLASH_COOKIE).unwrap().clone();

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_str(&cookie.encoded().to_string()).unwrap(),
        );
        let (jar, flash) = Flash::take(CookieJar::from_headers(&headers));

        assert_eq!(flash, Some(Flash::error("No access")));
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn test_take_without_cookie() {
        let (_, flash) = Flash::take(CookieJar::new());
        assert!(flash.is_none());
    }
}
