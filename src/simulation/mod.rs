// Simulation driver: owns the roster, the bus and the random source
//
// Everything runs synchronously on the caller's thread. Within a step agents
// are visited in roster order and each inbox is handled strictly FIFO.

pub mod demo;
pub mod random;
pub mod status;

pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use status::{AgentStatus, SystemStatus};

use crate::agent_lifecycle::{AgentId, Position, Role};
use crate::agents::{Agent, AgentKind, TaskOutcome};
use crate::config::MasConfig;
use crate::errors::SimulationError;
use crate::messaging::{
    Delivery, Message, MessageKind, Payload, Receiver, SystemBus, CHARGING_STATION,
};
use crate::orders::Order;
use crate::telemetry::{create_simulation_span, generate_correlation_id};
use tracing::{debug, info, warn};

/// Sender id used for orders entering the system from outside the roster
pub const ORDER_DESK: &str = "ORDER_DESK";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderSubmission {
    Routed,
    NoCoordinator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    Assigned {
        order_id: String,
        picker: AgentId,
        transporter: AgentId,
    },
    /// No idle picker or transporter; the order stays pending
    Pending { order_id: String },
    /// Both requests went out but at least one leg was not completed; the
    /// order stays pending
    Rejected {
        order_id: String,
        pick: TaskOutcome,
        transport: TaskOutcome,
    },
    NoCoordinator,
}

/// What happened during one `simulate_step`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub step: u64,
    pub messages_handled: usize,
    pub retried_orders: usize,
    pub charged: Vec<AgentId>,
    pub waiting: Vec<AgentId>,
}

pub struct MultiAgentSystem<R: RandomSource = SeededRandom> {
    agents: Vec<Agent>,
    coordinator: Option<usize>,
    bus: SystemBus,
    rng: R,
    seed: Option<u64>,
    config: MasConfig,
    steps: u64,
    correlation_id: String,
}

impl MultiAgentSystem<SeededRandom> {
    /// Seeded from config, or from the OS when no seed is configured
    pub fn new(config: MasConfig) -> Self {
        let rng = match config.simulation.seed {
            Some(seed) => SeededRandom::new(seed),
            None => SeededRandom::from_entropy(),
        };
        let seed = rng.seed();
        let mut system = Self::with_random(config, rng);
        system.seed = Some(seed);
        system
    }
}

impl<R: RandomSource> MultiAgentSystem<R> {
    pub fn with_random(config: MasConfig, rng: R) -> Self {
        let correlation_id = generate_correlation_id();
        info!(correlation_id = %correlation_id, "Multi-Agent System initialized");
        Self {
            agents: Vec::new(),
            coordinator: None,
            bus: SystemBus::new(),
            rng,
            seed: None,
            config,
            steps: 0,
            correlation_id,
        }
    }

    pub fn config(&self) -> &MasConfig {
        &self.config
    }

    pub fn bus(&self) -> &SystemBus {
        &self.bus
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, agent_id: &str) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id() == agent_id)
    }

    pub fn agent_mut(&mut self, agent_id: &str) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|agent| agent.id() == agent_id)
    }

    pub fn coordinator(&self) -> Option<&Agent> {
        self.coordinator.map(|index| &self.agents[index])
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    fn index_of(&self, agent_id: &str) -> Option<usize> {
        self.agents.iter().position(|agent| agent.id() == agent_id)
    }

    /// Add an agent to the roster. Re-adding an id replaces that agent in
    /// place. Agents added once a coordinator exists are registered with it.
    pub fn add_agent(&mut self, agent: Agent) -> Result<(), SimulationError> {
        let is_coordinator = agent.role() == Role::Coordinator;
        let existing = self.index_of(agent.id());

        if is_coordinator {
            if let Some(current) = self.coordinator {
                if Some(current) != existing {
                    return Err(SimulationError::DuplicateCoordinator {
                        existing: self.agents[current].id().to_string(),
                        rejected: agent.id().to_string(),
                    });
                }
            }
        }

        let agent_id = agent.id().to_string();
        let role = agent.role();
        let index = match existing {
            Some(index) => {
                self.agents[index] = agent;
                index
            }
            None => {
                self.agents.push(agent);
                self.agents.len() - 1
            }
        };

        if is_coordinator {
            self.coordinator = Some(index);
        } else {
            if self.coordinator == Some(index) {
                self.coordinator = None;
            }
            if let Some(coordinator) = self.coordinator_state_mut() {
                coordinator.register(agent_id.clone());
            }
        }

        info!(agent_id = %agent_id, role = %role, "Added agent to MAS");
        Ok(())
    }

    fn coordinator_state_mut(&mut self) -> Option<&mut crate::agents::CoordinatorAgent> {
        let index = self.coordinator?;
        self.agents[index].as_coordinator_mut()
    }

    /// Build and route a message from a roster agent
    pub fn send(
        &mut self,
        sender_id: &str,
        receiver: Receiver,
        kind: MessageKind,
        payload: Payload,
    ) -> Result<Delivery, SimulationError> {
        let sender = self
            .index_of(sender_id)
            .ok_or_else(|| SimulationError::UnknownAgent(sender_id.to_string()))?;
        Ok(self.send_from(sender, receiver, kind, payload))
    }

    fn send_from(
        &mut self,
        sender: usize,
        receiver: Receiver,
        kind: MessageKind,
        payload: Payload,
    ) -> Delivery {
        let message = Message::new(self.agents[sender].id(), receiver, kind, payload);
        let delivery = self.bus.route(&mut self.agents, message);
        self.agents[sender].core_mut().record_sent();
        delivery
    }

    /// Hand an order to the coordinator; it is handled on the next step
    pub fn submit_order(&mut self, order: Order) -> OrderSubmission {
        info!(order_id = %order.order_id, items = order.item_count(), "New order received");
        self.bus.record_order();

        let Some(coordinator) = self.coordinator else {
            warn!(order_id = %order.order_id, "No coordinator available to process order");
            return OrderSubmission::NoCoordinator;
        };

        let message = Message::new(
            ORDER_DESK,
            Receiver::agent(self.agents[coordinator].id()),
            MessageKind::OrderRequest,
            Payload::Order(order),
        );
        self.bus.route(&mut self.agents, message);
        OrderSubmission::Routed
    }

    /// One discrete step: optional pending-order retry, drain every inbox in
    /// roster order, then one charging-contention pass.
    pub fn simulate_step(&mut self) -> StepReport {
        self.steps += 1;
        let span = create_simulation_span("simulate_step", self.steps, &self.correlation_id);
        let _guard = span.enter();
        info!(step = self.steps, "MAS simulation step");

        let mut report = StepReport {
            step: self.steps,
            ..Default::default()
        };

        if self.config.simulation.retry_pending_orders {
            report.retried_orders = self.retry_pending_orders();
        }

        for index in 0..self.agents.len() {
            report.messages_handled += self.drain_index(index);
        }

        self.resolve_contention(&mut report);
        report
    }

    /// Drain one agent's inbox to empty
    pub fn drain_queue(&mut self, agent_id: &str) -> Result<usize, SimulationError> {
        let index = self
            .index_of(agent_id)
            .ok_or_else(|| SimulationError::UnknownAgent(agent_id.to_string()))?;
        Ok(self.drain_index(index))
    }

    // Messages that reach this agent while it drains are handled in the
    // same pass.
    fn drain_index(&mut self, index: usize) -> usize {
        let mut handled = 0;
        while let Some(message) = self.agents[index].pop_message() {
            self.dispatch(index, &message);
            handled += 1;
        }
        handled
    }

    fn dispatch(&mut self, index: usize, message: &Message) -> TaskOutcome {
        if matches!(self.agents[index].kind(), AgentKind::Coordinator(_)) {
            return self.handle_coordinator_message(index, message);
        }

        let outcome = self.agents[index].handle(message);
        if outcome == TaskOutcome::Collaborated {
            self.bus.record_collaboration();
        }
        outcome
    }

    fn handle_coordinator_message(&mut self, index: usize, message: &Message) -> TaskOutcome {
        match (message.kind(), message.payload()) {
            (MessageKind::OrderRequest, Payload::Order(order)) => {
                self.handle_order_request(order.clone());
                TaskOutcome::Acknowledged
            }
            (MessageKind::ResourceRequest, Payload::Resource { resource_type, agent_id }) => {
                let granted = self.agents[index]
                    .as_coordinator_mut()
                    .map(|coordinator| coordinator.handle_resource_request(resource_type, agent_id))
                    .unwrap_or(false);
                self.send_from(
                    index,
                    Receiver::agent(message.sender()),
                    MessageKind::TaskResponse,
                    Payload::ResourceGrant {
                        resource_type: resource_type.clone(),
                        granted,
                    },
                );
                if granted {
                    TaskOutcome::Completed
                } else {
                    TaskOutcome::Declined
                }
            }
            (MessageKind::StatusUpdate, Payload::Status { agent_id, status }) => {
                if let Some(coordinator) = self.agents[index].as_coordinator() {
                    coordinator.handle_status_update(agent_id, status);
                }
                TaskOutcome::Acknowledged
            }
            _ => {
                debug!(kind = %message.kind(), "Coordinator ignored message");
                TaskOutcome::Ignored
            }
        }
    }

    /// Record the order as pending, then try to allocate it right away
    pub fn handle_order_request(&mut self, order: Order) -> Allocation {
        let Some(coordinator) = self.coordinator_state_mut() else {
            return Allocation::NoCoordinator;
        };
        coordinator.push_pending(order.clone());
        self.allocate_tasks(&order)
    }

    /// Assign the order to the first idle picker and first idle transporter
    /// in registry order. Requests go out as direct dispatches: the transport
    /// leg starts from the picker's position after its pick.
    pub fn allocate_tasks(&mut self, order: &Order) -> Allocation {
        let Some(coordinator_index) = self.coordinator else {
            return Allocation::NoCoordinator;
        };
        let Some(coordinator) = self.agents[coordinator_index].as_coordinator() else {
            return Allocation::NoCoordinator;
        };
        let picker = coordinator.first_idle(&self.agents, Role::Picker);
        let transporter = coordinator.first_idle(&self.agents, Role::Transporter);

        let (Some(picker), Some(transporter)) = (picker, transporter) else {
            info!(
                order_id = %order.order_id,
                idle_picker = picker.is_some(),
                idle_transporter = transporter.is_some(),
                "Coordinator queuing order - insufficient available agents"
            );
            return Allocation::Pending {
                order_id: order.order_id.clone(),
            };
        };

        let pick_location = self.random_location();
        let pick = self.dispatch_direct(
            coordinator_index,
            picker,
            MessageKind::TaskRequest,
            Payload::Pick {
                items: order.items.clone(),
                location: pick_location,
            },
        );

        let pickup_location = self.agents[picker].position();
        let delivery_location = self.random_location();
        let transport = self.dispatch_direct(
            coordinator_index,
            transporter,
            MessageKind::TaskRequest,
            Payload::Transport {
                pickup_location,
                delivery_location,
                item_count: u32::try_from(order.item_count()).unwrap_or(u32::MAX),
            },
        );

        if pick != TaskOutcome::Completed || transport != TaskOutcome::Completed {
            warn!(
                order_id = %order.order_id,
                pick = ?pick,
                transport = ?transport,
                "Order leg rejected - order stays pending"
            );
            return Allocation::Rejected {
                order_id: order.order_id.clone(),
                pick,
                transport,
            };
        }

        if let Some(coordinator) = self.coordinator_state_mut() {
            coordinator.resolve_pending(&order.order_id);
        }

        let picker_id = self.agents[picker].id().to_string();
        let transporter_id = self.agents[transporter].id().to_string();
        info!(
            order_id = %order.order_id,
            picker = %picker_id,
            transporter = %transporter_id,
            "Coordinator assigned order"
        );
        Allocation::Assigned {
            order_id: order.order_id.clone(),
            picker: picker_id,
            transporter: transporter_id,
        }
    }

    /// Logged like a routed message but handled immediately by the receiver
    fn dispatch_direct(
        &mut self,
        sender: usize,
        receiver: usize,
        kind: MessageKind,
        payload: Payload,
    ) -> TaskOutcome {
        let message = Message::new(
            self.agents[sender].id(),
            Receiver::agent(self.agents[receiver].id()),
            kind,
            payload,
        );
        self.bus.record_direct(message.clone());
        self.agents[sender].core_mut().record_sent();
        self.agents[receiver].core_mut().record_received();
        self.dispatch(receiver, &message)
    }

    fn retry_pending_orders(&mut self) -> usize {
        let pending: Vec<Order> = match self.coordinator() {
            Some(agent) => agent
                .as_coordinator()
                .map(|coordinator| coordinator.pending_orders().to_vec())
                .unwrap_or_default(),
            None => return 0,
        };

        for order in &pending {
            debug!(order_id = %order.order_id, "Retrying pending order");
            self.allocate_tasks(order);
        }
        pending.len()
    }

    fn resolve_contention(&mut self, report: &mut StepReport) {
        let Some(coordinator_index) = self.coordinator else {
            return;
        };
        let threshold = self.config.agents.low_battery_threshold;
        let low_battery: Vec<usize> = self
            .agents
            .iter()
            .enumerate()
            .filter(|(_, agent)| {
                agent.role() != Role::Coordinator && agent.battery().is_below(threshold)
            })
            .map(|(index, _)| index)
            .collect();

        if low_battery.is_empty() {
            return;
        }
        info!(
            agents = low_battery.len(),
            "Agents need charging - resource competition"
        );

        for index in low_battery {
            let agent_id = self.agents[index].id().to_string();
            let granted = self.agents[coordinator_index]
                .as_coordinator_mut()
                .map(|coordinator| coordinator.handle_resource_request(CHARGING_STATION, &agent_id))
                .unwrap_or(false);

            if granted {
                self.agents[index].core_mut().charge();
                report.charged.push(agent_id);
            } else {
                self.agents[index].core_mut().wait_for_charge();
                info!(agent_id = %agent_id, "Agent waiting for charging station");
                report.waiting.push(agent_id);
            }
        }
    }

    /// Per-step wear: every non-coordinator agent loses a random amount
    pub fn drain_batteries(&mut self) {
        let low = i64::from(self.config.simulation.drain_min);
        let high = i64::from(self.config.simulation.drain_max);
        for index in 0..self.agents.len() {
            if self.agents[index].role() == Role::Coordinator {
                continue;
            }
            let amount = u32::try_from(self.rng.next_int(low, high)).unwrap_or(0);
            let agent = &mut self.agents[index];
            agent.drain_resource(amount);
            if agent.battery().is_below(self.config.agents.low_battery_threshold) {
                warn!(agent_id = %agent.id(), battery = %agent.battery(), "Battery low");
            }
        }
    }

    fn random_location(&mut self) -> Position {
        let low = i64::from(self.config.simulation.grid_min);
        let high = i64::from(self.config.simulation.grid_max);
        let x = self.rng.next_int(low, high);
        let y = self.rng.next_int(low, high);
        let clamp = |value: i64| {
            i32::try_from(value).unwrap_or(self.config.simulation.grid_min)
        };
        Position::new(clamp(x), clamp(y))
    }

    pub fn status(&self) -> SystemStatus {
        let coordinator = self.coordinator().and_then(Agent::as_coordinator);
        SystemStatus {
            correlation_id: self.correlation_id.clone(),
            seed: self.seed,
            steps: self.steps,
            total_agents: self.agents.len(),
            bus: self.bus.metrics(),
            stations: coordinator.map(|c| c.stations()),
            pending_orders: coordinator
                .map(|c| c.pending_orders().iter().map(|o| o.order_id.clone()).collect())
                .unwrap_or_default(),
            agents: self
                .agents
                .iter()
                .map(|agent| AgentStatus {
                    id: agent.id().to_string(),
                    role: agent.role(),
                    state: agent.state(),
                    position: agent.position(),
                    battery: agent.battery().value(),
                    load: agent.current_load(),
                    metrics: agent.metrics(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_lifecycle::OperationalState;
    use crate::priority::Priority;

    fn system_with(values: Vec<i64>) -> MultiAgentSystem<ScriptedRandom> {
        MultiAgentSystem::with_random(MasConfig::default(), ScriptedRandom::new(values))
    }

    #[test]
    fn test_second_coordinator_rejected() {
        let mut system = system_with(vec![]);
        system.add_agent(Agent::coordinator("COORD_01", (5, 5), 3)).unwrap();

        let err = system
            .add_agent(Agent::coordinator("COORD_02", (0, 0), 3))
            .unwrap_err();

        assert_eq!(
            err,
            SimulationError::DuplicateCoordinator {
                existing: "COORD_01".to_string(),
                rejected: "COORD_02".to_string()
            }
        );
    }

    #[test]
    fn test_agents_before_coordinator_are_not_registered() {
        let config = MasConfig::default();
        let mut system = system_with(vec![]);
        system.add_agent(Agent::picker("EARLY", (0, 0), &config.agents)).unwrap();
        system.add_agent(Agent::coordinator("COORD_01", (5, 5), 3)).unwrap();
        system.add_agent(Agent::picker("LATE", (1, 1), &config.agents)).unwrap();

        let coordinator = system.coordinator().and_then(Agent::as_coordinator).unwrap();
        assert_eq!(coordinator.registry(), &["LATE"]);
    }

    #[test]
    fn test_send_from_unknown_agent_fails() {
        let mut system = system_with(vec![]);
        let err = system
            .send(
                "NOBODY",
                Receiver::Broadcast,
                MessageKind::Notification,
                Payload::Text {
                    text: "hello".to_string(),
                },
            )
            .unwrap_err();
        assert_eq!(err, SimulationError::UnknownAgent("NOBODY".to_string()));
    }

    #[test]
    fn test_submit_without_coordinator() {
        let mut system = system_with(vec![]);
        let outcome = system.submit_order(Order::new("ORD_001", ["a"], Priority::High));
        assert_eq!(outcome, OrderSubmission::NoCoordinator);
        assert_eq!(system.bus().metrics().orders_processed, 1);
        assert!(system.bus().log().is_empty());
    }

    #[test]
    fn test_resource_request_message_gets_reply() {
        let config = MasConfig::default();
        let mut system = system_with(vec![]);
        system.add_agent(Agent::coordinator("COORD_01", (5, 5), 1)).unwrap();
        system.add_agent(Agent::picker("PICKER_01", (2, 3), &config.agents)).unwrap();
        system.agent_mut("PICKER_01").unwrap().drain_resource(50);

        system
            .send(
                "PICKER_01",
                Receiver::agent("COORD_01"),
                MessageKind::ResourceRequest,
                Payload::Resource {
                    resource_type: CHARGING_STATION.to_string(),
                    agent_id: "PICKER_01".to_string(),
                },
            )
            .unwrap();
        let report = system.simulate_step();

        // Request handled by the coordinator, reply handled by the picker
        assert_eq!(report.messages_handled, 2);
        let picker = system.agent("PICKER_01").unwrap();
        assert_eq!(picker.battery().value(), 100);
        assert_eq!(picker.state(), OperationalState::Idle);
        assert_eq!(system.status().stations.unwrap().available(), 0);
    }
}
