//! Run database migrations from `crates/api/migrations/`.

use tracing::info;

use emporium_api::store::postgres::create_pool;

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the environment is missing the database URL, the
/// connection fails, or a migration fails to apply.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    let pool = create_pool(&database_url).await?;
    info!("connected to database");

    sqlx::migrate!("../api/migrations").run(&pool).await?;
    info!("migrations applied");

    Ok(())
}
