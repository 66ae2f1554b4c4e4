use std::time::Duration;

pub struct RabbitmqEventsServiceConfig {
    pub connection_string: String,
    pub exchange: String,
    pub retry_interval: Duration,
}
