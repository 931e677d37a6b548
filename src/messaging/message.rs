// Inter-agent message envelope
//
// Kind and payload pairing is a convention between sender and handler; it is
// not checked at construction time.

use crate::agent_lifecycle::{AgentId, Position};
use crate::orders::Order;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource type name for charging stations
pub const CHARGING_STATION: &str = "charging_station";

/// Addressee of a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Receiver {
    Agent(AgentId),
    /// Every registered agent except the sender
    Broadcast,
}

impl Receiver {
    pub fn agent(id: impl Into<AgentId>) -> Self {
        Receiver::Agent(id.into())
    }
}

impl fmt::Display for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Receiver::Agent(id) => write!(f, "{id}"),
            Receiver::Broadcast => write!(f, "ALL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    TaskRequest,
    TaskResponse,
    Notification,
    StatusUpdate,
    ResourceRequest,
    /// External order handed to the coordinator
    OrderRequest,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MessageKind::TaskRequest => "TASK_REQUEST",
            MessageKind::TaskResponse => "TASK_RESPONSE",
            MessageKind::Notification => "NOTIFICATION",
            MessageKind::StatusUpdate => "STATUS_UPDATE",
            MessageKind::ResourceRequest => "RESOURCE_REQUEST",
            MessageKind::OrderRequest => "ORDER_REQUEST",
        };
        write!(f, "{label}")
    }
}

/// Structured message body; its shape depends on the message kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    Pick {
        items: Vec<String>,
        location: Position,
    },
    Transport {
        pickup_location: Position,
        delivery_location: Position,
        item_count: u32,
    },
    Collaboration {
        topic: String,
    },
    PickupReady {
        location: Position,
        item_count: u32,
    },
    Order(Order),
    Resource {
        resource_type: String,
        agent_id: AgentId,
    },
    ResourceGrant {
        resource_type: String,
        granted: bool,
    },
    Status {
        agent_id: AgentId,
        status: String,
    },
    Text {
        text: String,
    },
}

/// Immutable point-in-time communication between agents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    sender: AgentId,
    receiver: Receiver,
    kind: MessageKind,
    payload: Payload,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        sender: impl Into<AgentId>,
        receiver: Receiver,
        kind: MessageKind,
        payload: Payload,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver,
            kind,
            payload,
            created_at: Utc::now(),
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_broadcast(&self) -> bool {
        self.receiver == Receiver::Broadcast
    }

    /// Compare everything except the creation timestamp
    pub fn same_content(&self, other: &Message) -> bool {
        self.sender == other.sender
            && self.receiver == other.receiver
            && self.kind == other.kind
            && self.payload == other.payload
    }
}
