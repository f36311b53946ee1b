use actix_web::{post, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::request::{CompleteLessonRequest, SubmitQuizAttemptRequest},
};

#[post("/api/quizzes/attempt")]
pub async fn submit_quiz_attempt(
    state: web::Data<AppState>,
    request: web::Json<SubmitQuizAttemptRequest>,
) -> Result<HttpResponse, AppError> {
    let outcome = state
        .progression_service
        .submit_quiz_attempt(request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[post("/api/lessons/complete")]
pub async fn complete_lesson(
    state: web::Data<AppState>,
    request: web::Json<CompleteLessonRequest>,
) -> Result<HttpResponse, AppError> {
    let outcome = state
        .progression_service
        .complete_lesson(request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}
