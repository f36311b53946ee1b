use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use crate::{app_state::AppState, errors::AppError};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1))]
    pub user_id: String,

    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
}

/// Called by the auth boundary on first authentication; idempotent.
#[post("/api/users")]
pub async fn register_user(
    state: web::Data<AppState>,
    request: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let user = state
        .progression_service
        .register_user(&request.user_id, &request.display_name)
        .await?;
    Ok(HttpResponse::Created().json(user))
}

#[get("/api/users/{id}/stats")]
pub async fn get_user_stats(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let stats = state.progression_service.get_user_stats(&id).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/api/users/{id}/paths/{path_id}/progress")]
pub async fn get_user_path_progress(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (user_id, path_id) = path.into_inner();
    let progress = state
        .progression_service
        .get_user_progress(&user_id, &path_id)
        .await?;
    Ok(HttpResponse::Ok().json(progress))
}
