use super::rabbitmq_publisher::Message;
use std::collections::VecDeque;

///
/// Messages published on the current channel and not yet confirmed by the broker,
/// ordered by delivery tag.
///
#[derive(Default)]
pub struct UnconfirmedMessages {
    messages: VecDeque<(u64, Message)>,
    last_delivery_tag: u64,
}

impl UnconfirmedMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    ///
    /// Stores message published on the channel.
    /// Delivery tags of a channel in confirm mode start at 1.
    ///
    pub fn push(&mut self, message: Message) -> u64 {
        self.last_delivery_tag += 1;
        self.messages.push_back((self.last_delivery_tag, message));

        self.last_delivery_tag
    }

    ///
    /// Removes messages covered by the confirm.
    /// With `multiple` every message up to and including `delivery_tag` is removed.
    ///
    pub fn confirm(&mut self, delivery_tag: u64, multiple: bool) -> Vec<Message> {
        let mut confirmed = Vec::new();

        if multiple {
            while self
                .messages
                .front()
                .is_some_and(|(tag, _)| *tag <= delivery_tag)
            {
                if let Some((_, message)) = self.messages.pop_front() {
                    confirmed.push(message);
                }
            }
        } else if let Some(idx) = self
            .messages
            .iter()
            .position(|(tag, _)| *tag == delivery_tag)
        {
            if let Some((_, message)) = self.messages.remove(idx) {
                confirmed.push(message);
            }
        }

        confirmed
    }

    ///
    /// Takes all messages in publish order and restarts delivery tags for a new channel
    ///
    pub fn take_all(&mut self) -> Vec<Message> {
        self.last_delivery_tag = 0;

        self.messages
            .drain(..)
            .map(|(_, message)| message)
            .collect()
    }
}
