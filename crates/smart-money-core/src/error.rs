//! Error types shared across the smart money engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("store connection error: {0}")]
    StoreConnection(#[from] sqlx::Error),

    #[error("store migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("external API error: {0}")]
    ExternalApi(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("sink delivery error: {0}")]
    SinkDelivery(String),
}

pub type Result<T> = std::result::Result<T, Error>;
