use super::{
    rabbitmq_publisher_channel_callback::{
        ChannelEvent, ChannelEventKind, RabbitmqPublisherChannelCallback,
    },
    retry::retry_until_ok,
    unconfirmed_messages::UnconfirmedMessages,
};
use amqprs::{
    channel::{
        BasicPublishArguments, Channel, ConfirmSelectArguments, ExchangeDeclareArguments,
    },
    connection::{Connection, OpenConnectionArguments},
    BasicProperties,
};
use std::{collections::VecDeque, time::Duration};
use tokio::sync::mpsc;

pub struct Message {
    pub routing_key: String,
    pub basic_properties: BasicProperties,
    pub content: Vec<u8>,
}

///
/// Publishes messages to a single exchange with publisher confirms enabled.
///
/// A message is kept until the broker acks it. Nacked messages and messages
/// left unconfirmed when the channel breaks are published again on a new channel,
/// so every message is delivered at least once.
///
pub struct RabbitmqPublisher {
    open_connection_args: OpenConnectionArguments,
    exchange_declare_args: ExchangeDeclareArguments,
    retry_interval: Duration,

    connection: Connection,
    channel: Channel,
    generation: u64,

    events_tx: mpsc::UnboundedSender<ChannelEvent>,
    events_rx: mpsc::UnboundedReceiver<ChannelEvent>,

    outgoing: VecDeque<Message>,
    unconfirmed: UnconfirmedMessages,
}

impl RabbitmqPublisher {
    pub async fn new(
        open_connection_args: OpenConnectionArguments,
        mut exchange_declare_args: ExchangeDeclareArguments,
        retry_interval: Duration,
    ) -> Result<Self, amqprs::error::Error> {
        exchange_declare_args.no_wait = false;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let generation = 0;
        let callback = RabbitmqPublisherChannelCallback::new(generation, events_tx.clone());
        let (connection, channel) =
            Self::open(&open_connection_args, &exchange_declare_args, callback).await?;

        Ok(Self {
            open_connection_args,
            exchange_declare_args,
            retry_interval,
            connection,
            channel,
            generation,
            events_tx,
            events_rx,
            outgoing: VecDeque::new(),
            unconfirmed: UnconfirmedMessages::new(),
        })
    }

    ///
    /// Publishes messages until `messages_rx` is closed.
    /// It's designed to work with external signal to stop it.
    /// ```text
    /// tokio::select! {
    ///     _ = notify.notified() => {}
    ///     _ = publisher.run(&mut messages_rx) => {}
    /// }
    /// ```
    ///
    pub async fn run(&mut self, messages_rx: &mut mpsc::UnboundedReceiver<Message>) {
        let mut health_check = tokio::time::interval(self.retry_interval);

        loop {
            tokio::select! {
                biased;

                Some(event) = self.events_rx.recv() => {
                    if self.process_channel_event(event) {
                        self.reopen().await;
                    }
                    self.flush().await;
                }

                _ = health_check.tick() => {
                    if !self.connection.is_open() || !self.channel.is_open() {
                        tracing::warn!("channel is closed");
                        self.reopen().await;
                        self.flush().await;
                    }
                }

                message = messages_rx.recv() => {
                    let Some(message) = message else {
                        break;
                    };
                    self.outgoing.push_back(message);
                    self.flush().await;
                }
            }
        }
    }

    ///
    /// Waits up to the retry interval for outstanding confirms,
    /// then closes channel and connection.
    ///
    pub async fn close(mut self) {
        if !self.unconfirmed.is_empty() {
            tracing::info!(count = self.unconfirmed.len(), "waiting for publisher confirms");

            let retry_interval = self.retry_interval;
            let wait_for_confirms = async {
                while !self.unconfirmed.is_empty() {
                    match self.events_rx.recv().await {
                        Some(event) => {
                            self.process_channel_event(event);
                        }
                        None => break,
                    }
                }
            };
            let _ = tokio::time::timeout(retry_interval, wait_for_confirms).await;
        }

        let undelivered = self.unconfirmed.len() + self.outgoing.len();
        if undelivered > 0 {
            tracing::warn!(undelivered, "messages not confirmed before close");
        }

        tracing::info!("closing channel");
        if let Err(err) = self.channel.close().await {
            tracing::warn!(%err, "closing channel failed");
        }

        tracing::info!("closing connection");
        if let Err(err) = self.connection.close().await {
            tracing::warn!(%err, "closing connection failed");
        }
    }

    ///
    /// Publishes every outgoing message.
    /// Channel is reopened whenever publishing fails.
    ///
    async fn flush(&mut self) {
        while let Some(message) = self.outgoing.pop_front() {
            let args = BasicPublishArguments::new(
                &self.exchange_declare_args.exchange,
                &message.routing_key,
            );
            let publish_result = self
                .channel
                .basic_publish(
                    message.basic_properties.clone(),
                    message.content.clone(),
                    args,
                )
                .await;

            match publish_result {
                Ok(()) => {
                    let delivery_tag = self.unconfirmed.push(message);
                    tracing::debug!(delivery_tag, "message published");
                }
                Err(err) => {
                    tracing::warn!(
                        routing_key = %message.routing_key,
                        %err,
                        "basic publish failed"
                    );
                    self.outgoing.push_front(message);
                    self.reopen().await;
                }
            }
        }
    }

    ///
    /// Applies channel event.
    ///
    /// ### Returns
    /// true when current channel closed and has to be reopened
    ///
    fn process_channel_event(&mut self, event: ChannelEvent) -> bool {
        if event.generation != self.generation {
            tracing::trace!(?event, "event of previous channel ignored");
            return false;
        }

        match event.kind {
            ChannelEventKind::Ack {
                delivery_tag,
                multiple,
            } => {
                let confirmed = self.unconfirmed.confirm(delivery_tag, multiple);
                tracing::debug!(delivery_tag, count = confirmed.len(), "messages confirmed");
            }
            ChannelEventKind::Nack {
                delivery_tag,
                multiple,
            } => {
                let nacked = self.unconfirmed.confirm(delivery_tag, multiple);
                tracing::warn!(delivery_tag, count = nacked.len(), "messages nacked");
                self.outgoing.extend(nacked);
            }
            ChannelEventKind::Closed => return true,
        }

        false
    }

    async fn reopen(&mut self) {
        // Unconfirmed messages were published before outgoing ones
        for message in self.unconfirmed.take_all().into_iter().rev() {
            self.outgoing.push_front(message);
        }
        tracing::info!(count = self.outgoing.len(), "messages scheduled to be published again");

        // Old connection is broken in most cases, closing it only releases resources
        if let Err(err) = self.channel.clone().close().await {
            tracing::debug!(%err, "failed to close old channel");
        }
        if let Err(err) = self.connection.clone().close().await {
            tracing::debug!(%err, "failed to close old connection");
        }

        self.generation += 1;
        let callback =
            RabbitmqPublisherChannelCallback::new(self.generation, self.events_tx.clone());
        let (connection, channel) =
            retry_until_ok("reopening connection", self.retry_interval, || {
                Self::open(
                    &self.open_connection_args,
                    &self.exchange_declare_args,
                    callback.clone(),
                )
            })
            .await;
        tracing::info!("connection reopened");

        self.connection = connection;
        self.channel = channel;
    }

    async fn open(
        open_connection_args: &OpenConnectionArguments,
        exchange_declare_args: &ExchangeDeclareArguments,
        callback: RabbitmqPublisherChannelCallback,
    ) -> Result<(Connection, Channel), amqprs::error::Error> {
        tracing::info!("opening connection");
        let connection = Connection::open(open_connection_args).await?;

        tracing::info!("opening channel");
        let channel = connection.open_channel(None).await?;

        tracing::info!("registering channel callback");
        channel.register_callback(callback).await?;

        tracing::info!("declaring exchange");
        channel
            .exchange_declare(exchange_declare_args.clone())
            .await?;

        tracing::info!("enabling publisher confirms");
        channel
            .confirm_select(ConfirmSelectArguments::new(false))
            .await?;

        Ok((connection, channel))
    }
}
