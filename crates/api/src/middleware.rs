//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use pulso_common::{Identity, IdGenerator, Role};
use pulso_core::{
    GeolocationService, MapService, ReportService, TranslationService, VoteService,
};

use crate::extractors::Session;

/// Name of the browser session cookie.
pub const SESSION_COOKIE: &str = "pulso_session";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub report_service: ReportService,
    pub vote_service: VoteService,
    pub map_service: MapService,
    pub geolocation_service: GeolocationService,
    pub translation_service: Option<TranslationService>,
}

/// Identity middleware.
///
/// An auth gateway in front of this service forwards the acting user
/// through `x-identity-id` / `x-identity-name` headers. Requests
/// without them act as the anonymous placeholder.
pub async fn identity_middleware(mut req: Request<Body>, next: Next) -> Response {
    let identity = identity_from_headers(req.headers());
    req.extensions_mut().insert(identity);
    next.run(req).await
}

fn identity_from_headers(headers: &HeaderMap) -> Identity {
    let id = headers
        .get("x-identity-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match id {
        Some(id) => {
            let name = headers
                .get("x-identity-name")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(id);
            Identity {
                id: id.to_string(),
                name: name.to_string(),
                avatar_url: None,
                role: Role::Citizen,
            }
        }
        None => Identity::anonymous(),
    }
}

/// Session middleware.
///
/// Reads the `pulso_session` cookie, minting one on first contact so
/// every request carries a session for the report cache and vote
/// ledger.
pub async fn session_middleware(jar: CookieJar, mut req: Request<Body>, next: Next) -> Response {
    let (session_id, minted) = match jar.get(SESSION_COOKIE) {
        Some(cookie) => (cookie.value().to_string(), false),
        None => (IdGenerator::new().generate_token(), true),
    };

    req.extensions_mut().insert(Session(session_id.clone()));
    let response = next.run(req).await;

    if minted {
        tracing::debug!(session_id = %session_id, "Minted new session");
        let cookie = Cookie::build((SESSION_COOKIE, session_id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        (jar.add(cookie), response).into_response()
    } else {
        response
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_headers_with_both_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-identity-id", "usr_123".parse().unwrap());
        headers.insert("x-identity-name", "Maria".parse().unwrap());

        let identity = identity_from_headers(&headers);
        assert_eq!(identity.id, "usr_123");
        assert_eq!(identity.name, "Maria");
        assert!(!identity.is_anonymous());
    }

    #[test]
    fn test_identity_from_headers_name_falls_back_to_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-identity-id", "usr_123".parse().unwrap());

        let identity = identity_from_headers(&headers);
        assert_eq!(identity.name, "usr_123");
    }

    #[test]
    fn test_identity_from_headers_without_headers_is_anonymous() {
        let identity = identity_from_headers(&HeaderMap::new());
        assert!(identity.is_anonymous());
    }

    #[test]
    fn test_identity_from_headers_ignores_blank_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-identity-id", "  ".parse().unwrap());

        let identity = identity_from_headers(&headers);
        assert!(identity.is_anonymous());
    }
}
