pub mod queries;
mod store;

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Error;

use crate::config::DatabaseSettings;

pub use queries::categories::Category;
pub use queries::questions::{NewQuestion, Question};
pub use store::{PgStore, StoreError, TriviaStore};

pub async fn establish_connection(settings: &DatabaseSettings) -> Result<PgPool, Error> {
    PgPoolOptions::new()
        .connect_with(settings.connect_options()?)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
