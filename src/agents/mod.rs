// Warehouse agents: a shared core plus role-specific behaviour
//
// Dispatch is by tagged variant (`AgentKind`) with a single `handle` entry
// point; the coordinator's cross-roster work lives in the simulation driver.

pub mod coordinator;
pub mod picker;
pub mod transport;

pub use coordinator::CoordinatorAgent;
pub use picker::PickerAgent;
pub use transport::TransportAgent;

use crate::agent_lifecycle::{
    AgentId, BatteryLevel, Lifecycle, LifecycleEvent, OperationalState, PerformanceMetrics,
    Position, Role,
};
use crate::config::AgentConfig;
use crate::messaging::{Mailbox, Message, Payload};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Result of handling one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Rejected { reason: String },
    Collaborated,
    Declined,
    Acknowledged,
    Charged,
    /// Payload not understood by this role
    Ignored,
}

/// State shared by every role
#[derive(Debug)]
pub struct AgentCore {
    id: AgentId,
    role: Role,
    position: Position,
    lifecycle: Lifecycle,
    battery: BatteryLevel,
    inbox: VecDeque<Message>,
    metrics: PerformanceMetrics,
    low_battery_threshold: u32,
}

impl AgentCore {
    fn new(id: AgentId, role: Role, position: Position, low_battery_threshold: u32) -> Self {
        let lifecycle = Lifecycle::new(id.clone());
        Self {
            id,
            role,
            position,
            lifecycle,
            battery: BatteryLevel::full(),
            inbox: VecDeque::new(),
            metrics: PerformanceMetrics::default(),
            low_battery_threshold,
        }
    }

    pub fn state(&self) -> OperationalState {
        self.lifecycle.state()
    }

    pub(crate) fn transition(&mut self, event: LifecycleEvent) {
        let before = self.lifecycle.state();
        self.lifecycle.handle(event);
        let after = self.lifecycle.state();
        if before != after {
            debug!(agent_id = %self.id, from = %before, to = %after, "Agent state changed");
        }
    }

    /// Relocate, paying the move cost from the battery
    pub(crate) fn move_to(&mut self, target: Position, cost: u32) {
        self.transition(LifecycleEvent::BeginMove);
        debug!(agent_id = %self.id, from = %self.position, to = %target, "Agent moving");
        self.position = target;
        self.drain_resource(cost);
        self.transition(LifecycleEvent::Arrive);
    }

    pub(crate) fn drain_resource(&mut self, amount: u32) {
        self.battery.drain(amount);
    }

    pub(crate) fn record_task_completed(&mut self) {
        self.metrics.tasks_completed += 1;
    }

    pub(crate) fn record_collaboration(&mut self) {
        self.metrics.collaboration_count += 1;
    }

    pub(crate) fn record_sent(&mut self) {
        self.metrics.messages_sent += 1;
    }

    pub(crate) fn record_received(&mut self) {
        self.metrics.messages_received += 1;
    }

    /// Granted charge: charging, then instantly back to idle at full battery
    pub(crate) fn charge(&mut self) {
        self.transition(LifecycleEvent::ChargeGranted);
        self.battery.restore();
        self.transition(LifecycleEvent::ChargeComplete);
        info!(agent_id = %self.id, battery = %self.battery, "Agent charged");
    }

    pub(crate) fn wait_for_charge(&mut self) {
        self.transition(LifecycleEvent::ChargeDenied);
    }

    /// A denied request only parks the agent when it actually needs power;
    /// otherwise it stays available for work.
    fn charge_denied(&mut self) {
        if self.battery.is_below(self.low_battery_threshold) {
            self.wait_for_charge();
        } else {
            debug!(agent_id = %self.id, battery = %self.battery, "Charge denied, battery still healthy");
        }
    }
}

#[derive(Debug)]
pub enum AgentKind {
    Picker(PickerAgent),
    Transport(TransportAgent),
    Coordinator(CoordinatorAgent),
}

/// An autonomous warehouse actor
#[derive(Debug)]
pub struct Agent {
    core: AgentCore,
    kind: AgentKind,
}

impl Agent {
    pub fn picker(id: impl Into<AgentId>, position: impl Into<Position>, config: &AgentConfig) -> Self {
        Self::with_kind(
            id.into(),
            Role::Picker,
            position.into(),
            config.low_battery_threshold,
            AgentKind::Picker(PickerAgent::new(config.picker_capacity, config.move_cost)),
        )
    }

    pub fn transport(
        id: impl Into<AgentId>,
        position: impl Into<Position>,
        config: &AgentConfig,
    ) -> Self {
        Self::with_kind(
            id.into(),
            Role::Transporter,
            position.into(),
            config.low_battery_threshold,
            AgentKind::Transport(TransportAgent::new(config.transport_capacity, config.move_cost)),
        )
    }

    pub fn coordinator(
        id: impl Into<AgentId>,
        position: impl Into<Position>,
        charging_stations: u32,
    ) -> Self {
        Self::with_kind(
            id.into(),
            Role::Coordinator,
            position.into(),
            // never competes for a station
            0,
            AgentKind::Coordinator(CoordinatorAgent::new(charging_stations)),
        )
    }

    fn with_kind(
        id: AgentId,
        role: Role,
        position: Position,
        low_battery_threshold: u32,
        kind: AgentKind,
    ) -> Self {
        info!(agent_id = %id, role = %role, position = %position, "Agent initialized");
        Self {
            core: AgentCore::new(id, role, position, low_battery_threshold),
            kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.core.id
    }

    pub fn role(&self) -> Role {
        self.core.role
    }

    pub fn position(&self) -> Position {
        self.core.position
    }

    pub fn state(&self) -> OperationalState {
        self.core.state()
    }

    pub fn is_idle(&self) -> bool {
        self.core.lifecycle.is_idle()
    }

    pub fn battery(&self) -> BatteryLevel {
        self.core.battery
    }

    pub fn metrics(&self) -> PerformanceMetrics {
        self.core.metrics
    }

    pub fn queued_messages(&self) -> usize {
        self.core.inbox.len()
    }

    pub fn kind(&self) -> &AgentKind {
        &self.kind
    }

    pub fn as_coordinator(&self) -> Option<&CoordinatorAgent> {
        match &self.kind {
            AgentKind::Coordinator(coordinator) => Some(coordinator),
            _ => None,
        }
    }

    pub fn as_coordinator_mut(&mut self) -> Option<&mut CoordinatorAgent> {
        match &mut self.kind {
            AgentKind::Coordinator(coordinator) => Some(coordinator),
            _ => None,
        }
    }

    /// Current load for roles that carry items
    pub fn current_load(&self) -> Option<u32> {
        match &self.kind {
            AgentKind::Picker(picker) => Some(picker.current_load()),
            AgentKind::Transport(transport) => Some(transport.current_load()),
            AgentKind::Coordinator(_) => None,
        }
    }

    pub fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    /// Saturating battery drain; below the low threshold the agent competes
    /// for a charging station on the next contention pass.
    pub fn drain_resource(&mut self, amount: u32) {
        self.core.drain_resource(amount);
    }

    pub(crate) fn pop_message(&mut self) -> Option<Message> {
        self.core.inbox.pop_front()
    }

    /// Role-specific handling for pickers and transporters. Coordinator
    /// traffic needs the whole roster and is handled by the driver.
    pub fn handle(&mut self, message: &Message) -> TaskOutcome {
        debug!(
            agent_id = %self.core.id,
            kind = %message.kind(),
            sender = %message.sender(),
            "Handling message"
        );

        if let Payload::ResourceGrant { granted, .. } = message.payload() {
            return match (&self.kind, granted) {
                (AgentKind::Coordinator(_), _) => TaskOutcome::Ignored,
                (_, true) => {
                    self.core.charge();
                    TaskOutcome::Charged
                }
                (_, false) => {
                    self.core.charge_denied();
                    TaskOutcome::Declined
                }
            };
        }

        match &mut self.kind {
            AgentKind::Picker(picker) => picker.handle(&mut self.core, message),
            AgentKind::Transport(transport) => transport.handle(&mut self.core, message),
            AgentKind::Coordinator(_) => TaskOutcome::Ignored,
        }
    }
}

impl Mailbox for Agent {
    fn id(&self) -> &str {
        &self.core.id
    }

    fn enqueue(&mut self, message: Message) {
        debug!(
            agent_id = %self.core.id,
            kind = %message.kind(),
            sender = %message.sender(),
            "Message received"
        );
        self.core.inbox.push_back(message);
        self.core.record_received();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{MessageKind, Receiver, CHARGING_STATION};

    #[test]
    fn test_enqueue_preserves_fifo_order() {
        let config = AgentConfig::default();
        let mut agent = Agent::picker("PICKER_01", (2, 3), &config);

        for text in ["m1", "m2", "m3"] {
            agent.enqueue(Message::new(
                "COORD_01",
                Receiver::agent("PICKER_01"),
                MessageKind::Notification,
                Payload::Text {
                    text: text.to_string(),
                },
            ));
        }
        assert_eq!(agent.metrics().messages_received, 3);

        let mut seen = Vec::new();
        while let Some(message) = agent.pop_message() {
            if let Payload::Text { text } = message.payload() {
                seen.push(text.clone());
            }
        }
        assert_eq!(seen, vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn test_resource_grant_charges_agent() {
        let config = AgentConfig::default();
        let mut agent = Agent::transport("TRANSPORT_01", (1, 1), &config);
        agent.drain_resource(90);

        let outcome = agent.handle(&Message::new(
            "COORD_01",
            Receiver::agent("TRANSPORT_01"),
            MessageKind::TaskResponse,
            Payload::ResourceGrant {
                resource_type: CHARGING_STATION.to_string(),
                granted: true,
            },
        ));

        assert_eq!(outcome, TaskOutcome::Charged);
        assert_eq!(agent.battery().value(), 100);
        assert_eq!(agent.state(), OperationalState::Idle);
    }

    fn denial(receiver: &str) -> Message {
        Message::new(
            "COORD_01",
            Receiver::agent(receiver),
            MessageKind::TaskResponse,
            Payload::ResourceGrant {
                resource_type: CHARGING_STATION.to_string(),
                granted: false,
            },
        )
    }

    #[test]
    fn test_denied_grant_keeps_healthy_agent_idle() {
        let config = AgentConfig::default();
        let mut agent = Agent::picker("PICKER_01", (2, 3), &config);

        let outcome = agent.handle(&denial("PICKER_01"));

        assert_eq!(outcome, TaskOutcome::Declined);
        assert_eq!(agent.state(), OperationalState::Idle);
        assert!(agent.is_idle());
    }

    #[test]
    fn test_denied_grant_parks_low_battery_agent() {
        let config = AgentConfig::default();
        let mut agent = Agent::picker("PICKER_01", (2, 3), &config);
        agent.drain_resource(85);

        let outcome = agent.handle(&denial("PICKER_01"));

        assert_eq!(outcome, TaskOutcome::Declined);
        assert_eq!(agent.state(), OperationalState::Waiting);
    }

    #[test]
    fn test_coordinator_has_no_load() {
        let agent = Agent::coordinator("COORD_01", (5, 5), 3);
        assert_eq!(agent.role(), Role::Coordinator);
        assert_eq!(agent.current_load(), None);
        assert!(agent.as_coordinator().is_some());
    }
}
