use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use trainme_server::{app_state::AppState, config::Config, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    let state = AppState::new(config)
        .await
        .unwrap_or_else(|err| panic!("Failed to initialize application state: {}", err));

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .service(handlers::health_check)
            .service(handlers::register_user)
            .service(handlers::submit_quiz_attempt)
            .service(handlers::complete_lesson)
            .service(handlers::get_leaderboard)
            .service(handlers::get_user_stats)
            .service(handlers::get_user_path_progress)
    })
    .bind((host, port))?
    .run()
    .await
}
