use anyhow::anyhow;
use std::{net::SocketAddr, str::FromStr, time::Duration};
use strum::EnumString;

pub struct ApplicationEnv {
    pub log_directory: String,
    pub log_filename: String,

    pub bind_address: SocketAddr,
    pub max_http_content_len: usize,

    pub store: StoreEnv,
    pub events: EventsEnv,

    /// Resources inserted at startup unless they already exist
    pub seed_resources: Vec<(i64, String)>,
}

pub enum StoreEnv {
    Memory,
    Mongodb {
        connection_string: String,
        name: String,
        timeout: Duration,
    },
}

pub enum EventsEnv {
    Tracing,
    Rabbitmq {
        connection_string: String,
        exchange_name: String,
        retry_interval: Duration,
    },
}

#[derive(Debug, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
enum StoreKind {
    Memory,
    Mongodb,
}

#[derive(Debug, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
enum EventsKind {
    Tracing,
    Rabbitmq,
}

impl ApplicationEnv {
    pub fn parse() -> anyhow::Result<Self> {
        let log_directory = Self::env_var("AVAILABILITY_API_LOG_DIRECTORY")?;
        let log_filename = Self::env_var("AVAILABILITY_API_LOG_FILENAME")?;
        let bind_address = Self::env_var("AVAILABILITY_API_BIND_ADDRESS")?.parse()?;
        let max_http_content_len =
            Self::env_var("AVAILABILITY_API_MAX_HTTP_CONTENT_LEN")?.parse()?;
        let store = Self::parse_store()?;
        let events = Self::parse_events()?;
        let seed_resources = match std::env::var("AVAILABILITY_API_SEED_RESOURCES") {
            Ok(seed_resources) => parse_seed_resources(&seed_resources)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            log_directory,
            log_filename,
            bind_address,
            max_http_content_len,
            store,
            events,
            seed_resources,
        })
    }

    fn parse_store() -> anyhow::Result<StoreEnv> {
        let kind = StoreKind::from_str(&Self::env_var("AVAILABILITY_API_STORE")?)
            .map_err(|_| anyhow!("AVAILABILITY_API_STORE must be one of: memory, mongodb"))?;

        let store = match kind {
            StoreKind::Memory => StoreEnv::Memory,
            StoreKind::Mongodb => {
                let connection_string = Self::env_var("AVAILABILITY_API_DB_CONNECTION_STRING")?;
                let name = Self::env_var("AVAILABILITY_API_DB_NAME")?;
                let timeout = Self::env_var("AVAILABILITY_API_DB_TIMEOUT")?.parse()?;
                let timeout = Duration::from_secs(timeout);

                StoreEnv::Mongodb {
                    connection_string,
                    name,
                    timeout,
                }
            }
        };

        Ok(store)
    }

    fn parse_events() -> anyhow::Result<EventsEnv> {
        let kind = EventsKind::from_str(&Self::env_var("AVAILABILITY_API_EVENTS")?)
            .map_err(|_| anyhow!("AVAILABILITY_API_EVENTS must be one of: tracing, rabbitmq"))?;

        let events = match kind {
            EventsKind::Tracing => EventsEnv::Tracing,
            EventsKind::Rabbitmq => {
                let connection_string =
                    Self::env_var("AVAILABILITY_API_RABBITMQ_CONNECTION_STRING")?;
                let exchange_name =
                    Self::env_var("AVAILABILITY_API_RABBITMQ_EVENTS_EXCHANGE_NAME")?;
                let retry_interval =
                    Self::env_var("AVAILABILITY_API_RABBITMQ_RETRY_INTERVAL")?.parse()?;
                let retry_interval = Duration::from_secs(retry_interval);

                EventsEnv::Rabbitmq {
                    connection_string,
                    exchange_name,
                    retry_interval,
                }
            }
        };

        Ok(events)
    }

    fn env_var(name: &'static str) -> anyhow::Result<String> {
        std::env::var(name).map_err(|_| anyhow!("environment variable {name} not set"))
    }
}

///
/// Parses `id=name` pairs separated with `;`, e.g. `1=LadyGaGa;2=T-Love`
///
fn parse_seed_resources(value: &str) -> anyhow::Result<Vec<(i64, String)>> {
    value
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> anyhow::Result<(i64, String)> {
            let (id, name) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("seed resource '{pair}' is not in id=name format"))?;
            let id = id.trim().parse::<i64>()?;
            let name = name.trim();
            if name.is_empty() {
                return Err(anyhow!("seed resource {id} has empty name"));
            }

            Ok((id, name.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_seed_resources_ok() {
        let resources = parse_seed_resources("1=LadyGaGa; 2=T-Love;3=Snoop Dog;").unwrap();

        assert_eq!(
            resources,
            vec![
                (1, "LadyGaGa".to_string()),
                (2, "T-Love".to_string()),
                (3, "Snoop Dog".to_string()),
            ]
        );
    }

    #[test]
    fn parse_seed_resources_empty() {
        let resources = parse_seed_resources("").unwrap();

        assert!(resources.is_empty());
    }

    #[test]
    fn parse_seed_resources_invalid() {
        assert!(parse_seed_resources("LadyGaGa").is_err());
        assert!(parse_seed_resources("one=LadyGaGa").is_err());
        assert!(parse_seed_resources("1=").is_err());
    }

    #[test]
    fn parse_kinds() {
        assert_eq!(StoreKind::from_str("mongodb"), Ok(StoreKind::Mongodb));
        assert_eq!(EventsKind::from_str("tracing"), Ok(EventsKind::Tracing));
        assert!(StoreKind::from_str("postgres").is_err());
    }
}
