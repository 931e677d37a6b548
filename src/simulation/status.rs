// Point-in-time snapshot of the whole system

use crate::agent_lifecycle::{AgentId, OperationalState, PerformanceMetrics, Position, Role};
use crate::agents::coordinator::StationPool;
use crate::messaging::BusMetrics;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStatus {
    pub id: AgentId,
    pub role: Role,
    pub state: OperationalState,
    pub position: Position,
    pub battery: u32,
    pub load: Option<u32>,
    pub metrics: PerformanceMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStatus {
    pub correlation_id: String,
    pub seed: Option<u64>,
    pub steps: u64,
    pub total_agents: usize,
    pub bus: BusMetrics,
    pub stations: Option<StationPool>,
    pub pending_orders: Vec<String>,
    pub agents: Vec<AgentStatus>,
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== MAS SYSTEM STATUS ===")?;
        writeln!(f, "Total Agents: {}", self.total_agents)?;
        writeln!(f, "Steps Simulated: {}", self.steps)?;
        writeln!(
            f,
            "Total Messages: {} ({} undeliverable)",
            self.bus.messages_routed, self.bus.undeliverable
        )?;
        writeln!(f, "Orders Processed: {}", self.bus.orders_processed)?;
        writeln!(f, "Collaborations: {}", self.bus.collaboration_instances)?;
        if let Some(stations) = &self.stations {
            writeln!(
                f,
                "Charging Stations: {}/{} available",
                stations.available(),
                stations.total()
            )?;
        }
        if !self.pending_orders.is_empty() {
            writeln!(f, "Pending Orders: {}", self.pending_orders.join(", "))?;
        }

        writeln!(f)?;
        writeln!(f, "Agent Status:")?;
        for agent in &self.agents {
            writeln!(
                f,
                "  {} ({}): {} at {} - Battery: {}%",
                agent.id, agent.role, agent.state, agent.position, agent.battery
            )?;
            writeln!(
                f,
                "    Tasks: {}, Messages: {}/{}",
                agent.metrics.tasks_completed,
                agent.metrics.messages_sent,
                agent.metrics.messages_received
            )?;
        }
        Ok(())
    }
}
