use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
pub struct TemporaryBlock {
    #[serde(with = "time::serde::rfc3339")]
    pub until: OffsetDateTime,
}
