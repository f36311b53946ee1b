use actix_web::{get, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState, errors::AppError, models::dto::request::LeaderboardQuery,
    services::Timeframe,
};

#[get("/api/leaderboard")]
pub async fn get_leaderboard(
    state: web::Data<AppState>,
    query: web::Query<LeaderboardQuery>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;

    let timeframe: Timeframe = query.timeframe.as_deref().unwrap_or("all").parse()?;
    let page = state
        .leaderboard
        .rank(timeframe, query.page(), query.page_size())
        .await?;

    Ok(HttpResponse::Ok().json(page))
}
