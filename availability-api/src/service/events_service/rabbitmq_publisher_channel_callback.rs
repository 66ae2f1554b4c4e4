use amqprs::{channel::Channel, Ack, BasicProperties, Cancel, CloseChannel, Nack, Return};
use axum::async_trait;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEventKind {
    Ack { delivery_tag: u64, multiple: bool },
    Nack { delivery_tag: u64, multiple: bool },
    Closed,
}

///
/// Notification from the broker about a channel.
/// `generation` identifies the channel, because delivery tags restart
/// with every channel.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelEvent {
    pub generation: u64,
    pub kind: ChannelEventKind,
}

#[derive(Clone)]
pub struct RabbitmqPublisherChannelCallback {
    generation: u64,
    events_tx: mpsc::UnboundedSender<ChannelEvent>,
}

impl RabbitmqPublisherChannelCallback {
    pub fn new(generation: u64, events_tx: mpsc::UnboundedSender<ChannelEvent>) -> Self {
        Self {
            generation,
            events_tx,
        }
    }

    fn send(&self, kind: ChannelEventKind) {
        let event = ChannelEvent {
            generation: self.generation,
            kind,
        };
        if self.events_tx.send(event).is_err() {
            tracing::debug!(?event, "publisher no longer listens for channel events");
        }
    }
}

#[async_trait]
impl amqprs::callbacks::ChannelCallback for RabbitmqPublisherChannelCallback {
    #[tracing::instrument(name = "RabbitMQ Publisher Callback", skip_all)]
    async fn close(
        &mut self,
        _channel: &Channel,
        close: CloseChannel,
    ) -> Result<(), amqprs::error::Error> {
        tracing::error!(
            code = close.reply_code(),
            text = %close.reply_text(),
            "received close",
        );

        self.send(ChannelEventKind::Closed);

        Ok(())
    }

    async fn cancel(
        &mut self,
        _channel: &Channel,
        _cancel: Cancel,
    ) -> Result<(), amqprs::error::Error> {
        Ok(())
    }

    async fn flow(
        &mut self,
        _channel: &Channel,
        active: bool,
    ) -> Result<bool, amqprs::error::Error> {
        tracing::debug!(flow = active, "received flow");

        Ok(active)
    }

    #[tracing::instrument(name = "RabbitMQ Publisher Callback", skip_all)]
    async fn publish_ack(&mut self, _channel: &Channel, ack: Ack) {
        tracing::trace!(
            delivery_tag = ack.delivery_tag(),
            multiple = ack.mutiple(),
            "received ack"
        );

        self.send(ChannelEventKind::Ack {
            delivery_tag: ack.delivery_tag(),
            multiple: ack.mutiple(),
        });
    }

    #[tracing::instrument(name = "RabbitMQ Publisher Callback", skip_all)]
    async fn publish_nack(&mut self, _channel: &Channel, nack: Nack) {
        tracing::trace!(
            delivery_tag = nack.delivery_tag(),
            multiple = nack.multiple(),
            "received nack"
        );

        self.send(ChannelEventKind::Nack {
            delivery_tag: nack.delivery_tag(),
            multiple: nack.multiple(),
        });
    }

    async fn publish_return(
        &mut self,
        _channel: &Channel,
        _ret: Return,
        _basic_properties: BasicProperties,
        _content: Vec<u8>,
    ) {
    }
}
