use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::io;

use taskdesk::auth::AuthMiddleware;
use taskdesk::store::PgStore;
use taskdesk::{routes, AppState, Config};

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    log::error!("{}", err);
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

async fn build_state(config: &Config) -> io::Result<AppState> {
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await
                .map_err(startup_error)?;
            let store = PgStore::new(pool);
            store.migrate().await.map_err(startup_error)?;
            log::info!("Connected to Postgres");
            AppState::postgres(store, config).map_err(startup_error)
        }
        None => {
            log::warn!("DATABASE_URL is not set; using the in-memory store, data will not persist");
            AppState::in_memory(config).map_err(startup_error)
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let state = build_state(&config).await?;
    let tokens = state.tokens.clone();

    log::info!("Server is running on {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .wrap(AuthMiddleware::new(tokens.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
