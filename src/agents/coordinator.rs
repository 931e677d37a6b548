// Coordinator agent - order allocation and charging-station arbitration
//
// Owns the registry of agent ids, the pending order list and the station pool.
// The agents themselves live on the driver's roster; the coordinator only
// decides who gets what.

use super::Agent;
use crate::agent_lifecycle::{AgentId, Role};
use crate::messaging::CHARGING_STATION;
use crate::orders::Order;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Finite pool of charging stations; `available` never exceeds `total`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StationPool {
    total: u32,
    available: u32,
}

impl StationPool {
    pub fn new(total: u32) -> Self {
        Self {
            total,
            available: total,
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn available(&self) -> u32 {
        self.available
    }

    /// Non-blocking try-acquire of one station
    fn try_acquire(&mut self) -> bool {
        if self.available > 0 {
            self.available -= 1;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoordinatorAgent {
    registry: Vec<AgentId>,
    pending_orders: Vec<Order>,
    stations: StationPool,
}

impl CoordinatorAgent {
    pub fn new(charging_stations: u32) -> Self {
        Self {
            registry: Vec::new(),
            pending_orders: Vec::new(),
            stations: StationPool::new(charging_stations),
        }
    }

    /// Register an agent id. Re-registering keeps a single entry in its
    /// original slot.
    pub fn register(&mut self, agent_id: impl Into<AgentId>) {
        let agent_id = agent_id.into();
        if self.registry.iter().any(|id| *id == agent_id) {
            debug!(agent_id = %agent_id, "Agent re-registered with coordinator");
            return;
        }
        info!(agent_id = %agent_id, "Coordinator registered agent");
        self.registry.push(agent_id);
    }

    pub fn registry(&self) -> &[AgentId] {
        &self.registry
    }

    pub fn is_registered(&self, agent_id: &str) -> bool {
        self.registry.iter().any(|id| id == agent_id)
    }

    pub fn pending_orders(&self) -> &[Order] {
        &self.pending_orders
    }

    pub fn stations(&self) -> StationPool {
        self.stations
    }

    pub(crate) fn push_pending(&mut self, order: Order) {
        info!(
            order_id = %order.order_id,
            items = order.item_count(),
            priority = %order.priority,
            "Coordinator processing order"
        );
        self.pending_orders.push(order);
    }

    /// Remove the first pending order with this id once it has been allocated
    pub(crate) fn resolve_pending(&mut self, order_id: &str) -> Option<Order> {
        let index = self
            .pending_orders
            .iter()
            .position(|order| order.order_id == order_id)?;
        Some(self.pending_orders.remove(index))
    }

    /// First idle agent of `role` in registry order, as a roster index
    pub fn first_idle(&self, roster: &[Agent], role: Role) -> Option<usize> {
        self.registry.iter().find_map(|agent_id| {
            roster.iter().position(|agent| {
                agent.id() == agent_id.as_str() && agent.role() == role && agent.is_idle()
            })
        })
    }

    /// Grant iff a station is free; a denial never touches the pool.
    pub fn handle_resource_request(&mut self, resource_type: &str, agent_id: &str) -> bool {
        if resource_type != CHARGING_STATION {
            warn!(agent_id = %agent_id, resource_type = %resource_type, "Unknown resource type requested");
            return false;
        }

        if self.stations.try_acquire() {
            info!(
                agent_id = %agent_id,
                available = self.stations.available,
                total = self.stations.total,
                "Coordinator allocated charging station"
            );
            true
        } else {
            info!(agent_id = %agent_id, "No charging stations available");
            false
        }
    }

    pub fn handle_status_update(&self, agent_id: &str, status: &str) {
        info!(agent_id = %agent_id, status = %status, "Coordinator received status update");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;

    #[test]
    fn test_register_is_idempotent() {
        let mut coordinator = CoordinatorAgent::new(3);
        coordinator.register("PICKER_01");
        coordinator.register("TRANSPORT_01");
        coordinator.register("PICKER_01");

        assert_eq!(coordinator.registry(), &["PICKER_01", "TRANSPORT_01"]);
    }

    #[test]
    fn test_station_pool_never_over_allocates() {
        let mut coordinator = CoordinatorAgent::new(2);

        assert!(coordinator.handle_resource_request(CHARGING_STATION, "A"));
        assert_eq!(coordinator.stations().available(), 1);
        assert!(coordinator.handle_resource_request(CHARGING_STATION, "B"));
        assert_eq!(coordinator.stations().available(), 0);
        assert!(!coordinator.handle_resource_request(CHARGING_STATION, "C"));
        assert_eq!(coordinator.stations().available(), 0);
        assert_eq!(coordinator.stations().total(), 2);
    }

    #[test]
    fn test_unknown_resource_type_denied_without_side_effect() {
        let mut coordinator = CoordinatorAgent::new(1);
        assert!(!coordinator.handle_resource_request("forklift", "A"));
        assert_eq!(coordinator.stations().available(), 1);
    }

    #[test]
    fn test_first_idle_follows_registry_order() {
        let config = AgentConfig::default();
        let roster = vec![
            Agent::coordinator("COORD_01", (5, 5), 3),
            Agent::picker("PICKER_02", (7, 8), &config),
            Agent::picker("PICKER_01", (2, 3), &config),
        ];
        let mut coordinator = CoordinatorAgent::new(3);
        coordinator.register("PICKER_01");
        coordinator.register("PICKER_02");

        assert_eq!(coordinator.first_idle(&roster, Role::Picker), Some(2));
        assert_eq!(coordinator.first_idle(&roster, Role::Transporter), None);
    }

    #[test]
    fn test_resolve_pending_removes_only_matching_order() {
        let mut coordinator = CoordinatorAgent::new(1);
        coordinator.push_pending(Order::new("ORD_001", ["a"], Default::default()));
        coordinator.push_pending(Order::new("ORD_002", ["b"], Default::default()));

        let resolved = coordinator.resolve_pending("ORD_001");

        assert_eq!(resolved.map(|o| o.order_id), Some("ORD_001".to_string()));
        assert_eq!(coordinator.pending_orders().len(), 1);
        assert!(coordinator.resolve_pending("ORD_404").is_none());
    }
}
