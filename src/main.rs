use dotenvy::dotenv;
use storefront_service::config::AppConfig;
use storefront_service::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();
    let pool = create_pool(&config.database_url);
    run_migrations(&pool);

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(pool, &config.secret_key, &config.host, config.port)?.await
}
