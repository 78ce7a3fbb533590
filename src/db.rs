use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

/// Shared Postgres pool backing every storefront repository.
pub type DbPool = Pool<ConnectionManager<PgConnection>>;

const MAX_POOL_SIZE: u32 = 16;

/// Connect to the storefront database, capping the pool at
/// [`MAX_POOL_SIZE`] connections.
pub fn create_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(MAX_POOL_SIZE)
        .build(manager)
        .expect("Failed to create storefront connection pool")
}
