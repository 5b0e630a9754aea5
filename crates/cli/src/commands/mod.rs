//! CLI subcommands.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Read the database URL from the environment.
pub(crate) fn database_url() -> Result<SecretString, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    std::env::var("EMPORIUM_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "EMPORIUM_DATABASE_URL not set".into())
}
