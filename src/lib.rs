pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod session;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub use db::{create_pool, DbPool};

use application::{AccountService, CartService, CatalogService, CheckoutService};
use infrastructure::{
    DieselAccountRepository, DieselCartRepository, DieselCatalogRepository, DieselOrderRepository,
    DieselSessionStore,
};
use session::SessionKey;

pub type CatalogSvc = CatalogService<DieselCatalogRepository>;
pub type CartSvc = CartService<DieselCartRepository>;
pub type CheckoutSvc = CheckoutService<DieselOrderRepository>;
pub type AccountSvc = AccountService<DieselAccountRepository>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server. `secret_key` signs the session cookie and must be at
/// least 32 bytes.
pub fn build_server(
    pool: DbPool,
    secret_key: &str,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let key = SessionKey::derive(secret_key);

    Ok(HttpServer::new(move || {
        let catalog = web::Data::new(CatalogService::new(DieselCatalogRepository::new(
            pool.clone(),
        )));
        let carts = web::Data::new(CartService::new(DieselCartRepository::new(pool.clone())));
        let checkout = web::Data::new(CheckoutService::new(DieselOrderRepository::new(
            pool.clone(),
        )));
        let accounts = web::Data::new(AccountService::new(DieselAccountRepository::new(
            pool.clone(),
        )));
        let sessions = web::Data::new(DieselSessionStore::new(pool.clone()));

        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(key.clone()))
            .app_data(catalog)
            .app_data(carts)
            .app_data(checkout)
            .app_data(accounts)
            .app_data(sessions)
            .wrap(Logger::default())
            .route("/", web::get().to(handlers::catalog::list_products))
            .route("/product/{id}", web::get().to(handlers::catalog::product_detail))
            .route("/cart", web::get().to(handlers::cart::view_cart))
            .route("/cart", web::post().to(handlers::cart::update_cart))
            .route(
                "/add_to_cart/{product_id}",
                web::get().to(handlers::cart::add_to_cart),
            )
            .route("/checkout", web::get().to(handlers::checkout::preview))
            .route("/checkout", web::post().to(handlers::checkout::place_order))
            .route("/orders", web::get().to(handlers::orders::order_history))
            .route("/login", web::get().to(handlers::auth::login_form))
            .route("/login", web::post().to(handlers::auth::login))
            .route("/register", web::get().to(handlers::auth::register_form))
            .route("/register", web::post().to(handlers::auth::register))
            .route("/profile", web::get().to(handlers::profile::view_profile))
            .route("/profile", web::post().to(handlers::profile::update_profile))
            .route("/logout", web::get().to(handlers::auth::logout))
    })
    .bind((host.to_string(), port))?
    .run())
}
