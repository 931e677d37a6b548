// System bus: routes messages into agent inboxes and keeps the routing log

use super::message::{Message, Receiver};
use crate::agent_lifecycle::AgentId;
use serde::Serialize;
use tracing::{debug, warn};

/// Anything the bus can deliver a message to
pub trait Mailbox {
    fn id(&self) -> &str;

    fn enqueue(&mut self, message: Message);
}

/// Outcome of routing one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Delivery {
    Delivered { recipients: Vec<AgentId> },
    Undeliverable,
}

/// One entry of the routing log
#[derive(Debug, Clone, Serialize)]
pub struct RoutedMessage {
    pub message: Message,
    pub delivery: Delivery,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusMetrics {
    pub messages_routed: u64,
    pub undeliverable: u64,
    pub orders_processed: u64,
    pub collaboration_instances: u64,
}

#[derive(Debug, Default)]
pub struct SystemBus {
    log: Vec<RoutedMessage>,
    metrics: BusMetrics,
}

impl SystemBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best-effort, at-most-once delivery into inbox queues.
    ///
    /// Broadcasts reach every mailbox except the sender, in slice order. An
    /// unknown receiver is logged as undeliverable and dropped.
    pub fn route<M: Mailbox>(&mut self, mailboxes: &mut [M], message: Message) -> Delivery {
        let delivery = match message.receiver() {
            Receiver::Broadcast => {
                let mut recipients = Vec::new();
                for mailbox in mailboxes.iter_mut() {
                    if mailbox.id() != message.sender() {
                        recipients.push(mailbox.id().to_string());
                        mailbox.enqueue(message.clone());
                    }
                }
                Delivery::Delivered { recipients }
            }
            Receiver::Agent(receiver_id) => {
                match mailboxes.iter_mut().find(|m| m.id() == receiver_id.as_str()) {
                    Some(mailbox) => {
                        mailbox.enqueue(message.clone());
                        Delivery::Delivered {
                            recipients: vec![receiver_id.clone()],
                        }
                    }
                    None => Delivery::Undeliverable,
                }
            }
        };

        self.record(message, delivery.clone());
        delivery
    }

    /// Log a message whose receiver is handed the message synchronously by
    /// the caller instead of through its inbox. Only a named receiver can be
    /// handed a message this way.
    pub fn record_direct(&mut self, message: Message) -> Delivery {
        let delivery = match message.receiver() {
            Receiver::Agent(id) => Delivery::Delivered {
                recipients: vec![id.clone()],
            },
            Receiver::Broadcast => Delivery::Undeliverable,
        };
        self.record(message, delivery.clone());
        delivery
    }

    fn record(&mut self, message: Message, delivery: Delivery) {
        self.metrics.messages_routed += 1;
        match &delivery {
            Delivery::Delivered { recipients } => {
                debug!(
                    sender = %message.sender(),
                    receiver = %message.receiver(),
                    kind = %message.kind(),
                    recipients = recipients.len(),
                    "Message routed"
                );
            }
            Delivery::Undeliverable => {
                self.metrics.undeliverable += 1;
                warn!(
                    sender = %message.sender(),
                    receiver = %message.receiver(),
                    kind = %message.kind(),
                    "Message routing failed: receiver not found"
                );
            }
        }
        self.log.push(RoutedMessage { message, delivery });
    }

    pub fn record_order(&mut self) {
        self.metrics.orders_processed += 1;
    }

    pub fn record_collaboration(&mut self) {
        self.metrics.collaboration_instances += 1;
    }

    pub fn log(&self) -> &[RoutedMessage] {
        &self.log
    }

    pub fn metrics(&self) -> BusMetrics {
        self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::message::{MessageKind, Payload};

    struct TestMailbox {
        id: String,
        inbox: Vec<Message>,
    }

    impl TestMailbox {
        fn new(id: &str) -> Self {
            Self {
                id: id.to_string(),
                inbox: Vec::new(),
            }
        }
    }

    impl Mailbox for TestMailbox {
        fn id(&self) -> &str {
            &self.id
        }

        fn enqueue(&mut self, message: Message) {
            self.inbox.push(message);
        }
    }

    fn text(sender: &str, receiver: Receiver, text: &str) -> Message {
        Message::new(
            sender,
            receiver,
            MessageKind::Notification,
            Payload::Text {
                text: text.to_string(),
            },
        )
    }

    #[test]
    fn test_broadcast_skips_sender() {
        let mut bus = SystemBus::new();
        let mut boxes = vec![
            TestMailbox::new("A"),
            TestMailbox::new("B"),
            TestMailbox::new("C"),
        ];

        let delivery = bus.route(&mut boxes, text("B", Receiver::Broadcast, "hello"));

        assert_eq!(
            delivery,
            Delivery::Delivered {
                recipients: vec!["A".to_string(), "C".to_string()]
            }
        );
        assert_eq!(boxes[0].inbox.len(), 1);
        assert!(boxes[1].inbox.is_empty());
        assert_eq!(boxes[2].inbox.len(), 1);
        assert_eq!(bus.log().len(), 1);
    }

    #[test]
    fn test_unknown_receiver_is_logged_as_undeliverable() {
        let mut bus = SystemBus::new();
        let mut boxes = vec![TestMailbox::new("A")];

        let delivery = bus.route(&mut boxes, text("A", Receiver::agent("GHOST"), "anyone?"));

        assert_eq!(delivery, Delivery::Undeliverable);
        assert!(boxes[0].inbox.is_empty());
        assert_eq!(bus.metrics().messages_routed, 1);
        assert_eq!(bus.metrics().undeliverable, 1);
        assert_eq!(bus.log()[0].delivery, Delivery::Undeliverable);
    }

    #[test]
    fn test_log_preserves_routing_order() {
        let mut bus = SystemBus::new();
        let mut boxes = vec![TestMailbox::new("A"), TestMailbox::new("B")];

        for body in ["one", "two", "three"] {
            bus.route(&mut boxes, text("A", Receiver::agent("B"), body));
        }

        let bodies: Vec<_> = bus
            .log()
            .iter()
            .map(|entry| match entry.message.payload() {
                Payload::Text { text } => text.clone(),
                other => panic!("unexpected payload {other:?}"),
            })
            .collect();
        assert_eq!(bodies, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_direct_record_counts_as_routed() {
        let mut bus = SystemBus::new();
        let delivery = bus.record_direct(text("COORD_01", Receiver::agent("PICKER_01"), "go"));
        assert_eq!(
            delivery,
            Delivery::Delivered {
                recipients: vec!["PICKER_01".to_string()]
            }
        );
        assert_eq!(bus.metrics().messages_routed, 1);
        assert_eq!(bus.metrics().undeliverable, 0);
    }

    #[test]
    fn test_direct_record_of_broadcast_is_undeliverable() {
        let mut bus = SystemBus::new();
        let delivery = bus.record_direct(text("COORD_01", Receiver::Broadcast, "all"));
        assert_eq!(delivery, Delivery::Undeliverable);
        assert_eq!(bus.metrics().undeliverable, 1);
    }
}
