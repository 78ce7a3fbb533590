//! Signed session cookie handling and the `CurrentUser` extractor.
//!
//! The cookie carries only a random session token; the token resolves to a
//! user through the `sessions` table. Signing the cookie with the configured
//! secret keeps the value tamper-evident on the wire.

use std::future::Future;
use std::pin::Pin;

use actix_web::cookie::{Cookie, CookieJar, Key, SameSite};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::domain::ports::SessionStore;
use crate::domain::user::UserProfile;
use crate::errors::AppError;
use crate::infrastructure::DieselSessionStore;
use crate::DbPool;

pub const SESSION_COOKIE: &str = "storefront_session";

/// Cookie-signing key derived from `AppConfig::secret_key`.
#[derive(Clone)]
pub struct SessionKey(pub Key);

impl SessionKey {
    pub fn derive(secret: &str) -> Self {
        Self(Key::derive_from(secret.as_bytes()))
    }
}

/// Build the signed session cookie for a freshly created session token.
pub fn issue_session_cookie(key: &SessionKey, token: Uuid) -> Cookie<'static> {
    let mut jar = CookieJar::new();
    jar.signed_mut(&key.0).add(
        Cookie::build(SESSION_COOKIE, token.to_string())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish(),
    );
    jar.get(SESSION_COOKIE)
        .cloned()
        .expect("cookie was just added to the jar")
}

/// Verify the signature and extract the session token. Tampered or malformed
/// cookies yield `None`.
pub fn verify_session_cookie(key: &SessionKey, cookie: &Cookie<'_>) -> Option<Uuid> {
    let mut jar = CookieJar::new();
    jar.add_original(cookie.clone().into_owned());
    let verified = jar.signed(&key.0).get(SESSION_COOKIE)?;
    Uuid::parse_str(verified.value()).ok()
}

/// An expired cookie that instructs the browser to drop the session.
pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();
    cookie
}

/// The authenticated user behind the request's session cookie.
///
/// Extraction fails with `AppError::Unauthorized` when the cookie is missing,
/// tampered with, or points at an expired or deleted session.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub address: String,
}

impl From<UserProfile> for CurrentUser {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            name: profile.name,
            address: profile.address,
        }
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<DbPool>>().cloned();
        let key = req.app_data::<web::Data<SessionKey>>().cloned();
        let cookie = req.cookie(SESSION_COOKIE);

        Box::pin(async move {
            let pool =
                pool.ok_or_else(|| AppError::Internal("database pool not configured".into()))?;
            let key =
                key.ok_or_else(|| AppError::Internal("session key not configured".into()))?;
            let cookie = cookie.ok_or(AppError::Unauthorized)?;
            let token = verify_session_cookie(&key, &cookie).ok_or(AppError::Unauthorized)?;

            let store = DieselSessionStore::new(pool.get_ref().clone());
            let user = web::block(move || store.find_user(token))
                .await
                .map_err(|e| AppError::Internal(e.to_string()))??;

            user.map(CurrentUser::from).ok_or(AppError::Unauthorized)
        })
    }
}

/// Pull the raw session token out of a request, for logout.
pub fn request_token(req: &HttpRequest, key: &SessionKey) -> Option<Uuid> {
    req.cookie(SESSION_COOKIE)
        .and_then(|cookie| verify_session_cookie(key, &cookie))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SessionKey {
        SessionKey::derive("test-secret-key-that-is-long-enough!")
    }

    #[test]
    fn issued_cookie_verifies_back_to_the_token() {
        let key = test_key();
        let token = Uuid::new_v4();

        let cookie = issue_session_cookie(&key, token);
        assert_ne!(cookie.value(), token.to_string(), "value must be signed");

        assert_eq!(verify_session_cookie(&key, &cookie), Some(token));
    }

    #[test]
    fn tampered_cookie_is_rejected() {
        let key = test_key();
        let cookie = issue_session_cookie(&key, Uuid::new_v4());

        let forged = Cookie::new(SESSION_COOKIE, format!("{}x", cookie.value()));
        assert_eq!(verify_session_cookie(&key, &forged), None);

        let bare = Cookie::new(SESSION_COOKIE, Uuid::new_v4().to_string());
        assert_eq!(verify_session_cookie(&key, &bare), None);
    }

    #[test]
    fn cookie_signed_with_another_key_is_rejected() {
        let key = test_key();
        let other = SessionKey::derive("a-completely-different-32B-secret!!!");
        let cookie = issue_session_cookie(&other, Uuid::new_v4());

        assert_eq!(verify_session_cookie(&key, &cookie), None);
    }

    #[test]
    fn clear_cookie_is_a_removal_cookie() {
        let cookie = clear_session_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "");
    }
}
