// Message passing between warehouse agents

pub mod bus;
pub mod message;

pub use bus::{BusMetrics, Delivery, Mailbox, RoutedMessage, SystemBus};
pub use message::{Message, MessageKind, Payload, Receiver, CHARGING_STATION};
