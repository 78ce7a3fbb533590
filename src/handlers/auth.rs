use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::SessionStore;
use crate::domain::user::UserProfile;
use crate::errors::AppError;
use crate::infrastructure::DieselSessionStore;
use crate::session::{
    clear_session_cookie, issue_session_cookie, request_token, CurrentUser, SessionKey,
};
use crate::AccountSvc;

// ── DTOs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub address: String,
}

pub(crate) fn profile_response(profile: UserProfile) -> ProfileResponse {
    ProfileResponse {
        id: profile.id,
        email: profile.email,
        name: profile.name,
        address: profile.address,
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /register
///
/// Rendering is delegated to the presentation layer; this returns the fields
/// the registration form submits.
pub async fn register_form() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "fields": ["email", "password", "name", "address"] }))
}

/// POST /register
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterForm,
    responses(
        (status = 201, description = "Account created", body = ProfileResponse),
        (status = 409, description = "Email already registered"),
    ),
    tag = "account"
)]
pub async fn register(
    svc: web::Data<AccountSvc>,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    let svc = svc.clone();
    let profile = web::block(move || {
        svc.register(&form.email, &form.password, &form.name, &form.address)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(profile_response(profile)))
}

/// GET /login
pub async fn login_form() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "fields": ["email", "password"] }))
}

/// POST /login
///
/// On success a session row is created and its token is set as a signed
/// cookie. Unknown email and wrong password are indistinguishable.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginForm,
    responses(
        (status = 200, description = "Logged in", body = ProfileResponse),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "account"
)]
pub async fn login(
    accounts: web::Data<AccountSvc>,
    sessions: web::Data<DieselSessionStore>,
    key: web::Data<SessionKey>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    let accounts = accounts.clone();
    let sessions = sessions.clone();
    let (profile, token) = web::block(move || {
        let profile = accounts.authenticate(&form.email, &form.password)?;
        let token = sessions.create(profile.id)?;
        Ok::<_, AppError>((profile, token))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok()
        .cookie(issue_session_cookie(&key, token))
        .json(profile_response(profile)))
}

/// GET /logout
///
/// Deletes the server-side session and tells the browser to drop the cookie.
#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Not logged in"),
    ),
    tag = "account"
)]
pub async fn logout(
    _user: CurrentUser,
    req: HttpRequest,
    key: web::Data<SessionKey>,
    sessions: web::Data<DieselSessionStore>,
) -> Result<HttpResponse, AppError> {
    if let Some(token) = request_token(&req, &key) {
        let sessions = sessions.clone();
        web::block(move || sessions.delete(token))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;
    }

    Ok(HttpResponse::Ok()
        .cookie(clear_session_cookie())
        .json(json!({ "message": "logged out" })))
}
