use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::sync::Arc;

mod api;
mod clock;
mod config;
mod db;
mod docs;
mod error;
mod filter;
mod model;
mod routes;
mod store;
mod summary;
mod utils;
mod validation;

use config::Config;
use db::init_db;

use crate::clock::{Clock, SystemClock};
use crate::docs::ApiDoc;
use crate::store::RecordStore;
use crate::store::memory::MemoryStore;
use crate::store::mysql::MySqlStore;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HRMS Lite API"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => Arc::new(MySqlStore::new(init_db(url, config.run_migrations).await?)),
        None => {
            warn!("DATABASE_URL not set, records are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };
    let store: Data<dyn RecordStore> = Data::from(store);
    let clock: Data<dyn Clock> = Data::from(Arc::new(SystemClock) as Arc<dyn Clock>);

    let server_addr = config.server_addr.clone();
    info!(addr = %server_addr, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard {_:.*} matches the bundled JS/CSS files
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .app_data(clock.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
