#[macro_use]
extern crate diesel;

mod admin;
mod config;
mod database;
mod doctor;
mod models;
mod protocol;
mod queue;
mod schema;
mod session;
mod user;
mod utils;
mod validate;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use diesel::{r2d2::ConnectionManager, MysqlConnection};
use log::info;

use crate::config::Config;

type DbPool = r2d2::Pool<ConnectionManager<MysqlConnection>>;

/// Shared by every handler; the store itself is the only mutable state.
pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let manager = ConnectionManager::<MysqlConnection>::new(config.database_url.clone());
    let pool = r2d2::Pool::builder()
        .build(manager)
        .context("Failed to create pool")?;

    let bind = config.bind_addr.clone();
    info!(
        "serving on {} ({} min per token, {} day blocks)",
        bind, config.avg_minutes_per_token, config.penalty.block_days
    );
    let state = web::Data::new(AppState { pool, config });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            // user
            .service(
                web::scope("/user")
                    .configure(user::config),
            )
            // doctor
            .service(
                web::scope("/doctor")
                    .configure(doctor::config),
            )
            // administrator
            .service(
                web::scope("/admin")
                    .configure(admin::config),
            )
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
