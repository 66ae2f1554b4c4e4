#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("insert unique violation")]
    InsertUniqueViolation,

    #[error("no document updated")]
    NoDocumentUpdated,

    #[error("store did not respond in time")]
    Timeout,

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("mongo error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}
