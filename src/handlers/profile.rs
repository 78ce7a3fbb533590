use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;

use super::auth::{profile_response, ProfileResponse};
use crate::domain::user::UserProfile;
use crate::errors::AppError;
use crate::session::CurrentUser;
use crate::AccountSvc;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProfileForm {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// GET /profile
///
/// The session extractor already resolved the user, so no further query is
/// needed.
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Current profile", body = ProfileResponse),
        (status = 401, description = "Not logged in"),
    ),
    tag = "account"
)]
pub async fn view_profile(user: CurrentUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(profile_response(UserProfile {
        id: user.id,
        email: user.email,
        name: user.name,
        address: user.address,
    })))
}

/// POST /profile
///
/// Partial update; fields absent from the form keep their prior value.
#[utoipa::path(
    post,
    path = "/profile",
    request_body = ProfileForm,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 401, description = "Not logged in"),
    ),
    tag = "account"
)]
pub async fn update_profile(
    user: CurrentUser,
    svc: web::Data<AccountSvc>,
    form: web::Form<ProfileForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    let svc = svc.clone();
    let profile = web::block(move || svc.update_profile(user.id, form.name, form.address))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(profile_response(profile)))
}
