use super::{
    rabbitmq_publisher::{Message, RabbitmqPublisher},
    EventsService, RabbitmqEventsServiceConfig, ResourceEvent,
};
use crate::dto::output;
use amqprs::{
    channel::{ExchangeDeclareArguments, ExchangeType},
    connection::OpenConnectionArguments,
    BasicProperties, FieldTable, FieldValue,
};
use anyhow::anyhow;
use axum::async_trait;
use std::sync::Arc;
use tokio::{
    sync::{mpsc, Notify},
    task::JoinHandle,
};

const EVENT_TYPE_HEADER: &str = "eventType";

///
/// Publishes [ResourceEvent]s as JSON messages to a durable topic exchange.
///
/// Messages are handed over to a background task, so [EventsService::publish]
/// never waits for the broker. Routing key, AMQP `type` property
/// and `eventType` header are all set to the event type.
///
pub struct RabbitmqEventsService {
    messages_tx: mpsc::UnboundedSender<Message>,

    task_handle: JoinHandle<RabbitmqPublisher>,
    close_notify: Arc<Notify>,
}

impl RabbitmqEventsService {
    #[tracing::instrument(name = "RabbitMQ Events", skip_all)]
    pub async fn new(config: RabbitmqEventsServiceConfig) -> anyhow::Result<Self> {
        tracing::info!("starting events publisher");

        let open_connection_args =
            OpenConnectionArguments::try_from(config.connection_string.as_str())?;
        let exchange_declare_args =
            ExchangeDeclareArguments::of_type(&config.exchange, ExchangeType::Topic)
                .durable(true)
                .finish();
        let publisher = RabbitmqPublisher::new(
            open_connection_args,
            exchange_declare_args,
            config.retry_interval,
        )
        .await?;

        let (messages_tx, messages_rx) = mpsc::unbounded_channel();
        let close_notify = Arc::new(Notify::new());
        let task_handle = tokio::spawn(keep_alive(close_notify.clone(), publisher, messages_rx));

        tracing::info!("events publisher started");

        Ok(Self {
            messages_tx,
            task_handle,
            close_notify,
        })
    }

    #[tracing::instrument(name = "RabbitMQ Events", skip_all)]
    pub async fn close(self) {
        tracing::info!("closing events publisher");

        self.close_notify.notify_one();

        match self.task_handle.await {
            Ok(publisher) => publisher.close().await,
            Err(err) => tracing::error!(%err, "events publisher task failed"),
        }

        tracing::info!("events publisher closed");
    }
}

#[async_trait]
impl EventsService for RabbitmqEventsService {
    async fn publish(&self, event: ResourceEvent) -> anyhow::Result<()> {
        let event_type = event.as_ref();

        tracing::info!(event_type, id = event.id(), "producing event");

        let content = serde_json::to_vec(&output::ResourceEventPayload::from(&event))?;
        let basic_properties = event_properties(event_type)?;

        self.messages_tx
            .send(Message {
                routing_key: event_type.to_string(),
                basic_properties,
                content,
            })
            .map_err(|_| anyhow!("events publisher is closed"))?;

        Ok(())
    }
}

///
/// Persistent JSON message properties carrying event type
/// in both `type` property and `eventType` header
///
fn event_properties(event_type: &str) -> anyhow::Result<BasicProperties> {
    let mut headers = FieldTable::new();
    headers.insert(EVENT_TYPE_HEADER.try_into()?, FieldValue::from(event_type));

    let basic_properties = BasicProperties::default()
        .with_persistence(true)
        .with_content_type("application/json")
        .with_message_type(event_type)
        .with_headers(headers)
        .finish();

    Ok(basic_properties)
}

#[tracing::instrument(name = "RabbitMQ Events", skip_all)]
async fn keep_alive(
    close_notify: Arc<Notify>,
    mut publisher: RabbitmqPublisher,
    mut messages_rx: mpsc::UnboundedReceiver<Message>,
) -> RabbitmqPublisher {
    tracing::info!("keep alive started");

    tokio::select! {
        biased;

        _ = close_notify.notified() => {}
        _ = publisher.run(&mut messages_rx) => {}
    }

    let mut dropped_messages = 0;
    while messages_rx.try_recv().is_ok() {
        dropped_messages += 1;
    }
    if dropped_messages > 0 {
        tracing::warn!(dropped_messages, "events not published before close");
    }

    tracing::info!("keep alive finished");

    publisher
}
