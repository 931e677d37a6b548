// Fixed warehouse scenario: one coordinator, two pickers, two transporters
// and three orders, one step per order.

use super::{MultiAgentSystem, RandomSource, SystemStatus};
use crate::agents::Agent;
use crate::errors::SimulationError;
use crate::orders::Order;
use crate::priority::Priority;
use tracing::info;

pub fn build_roster<R: RandomSource>(
    system: &mut MultiAgentSystem<R>,
) -> Result<(), SimulationError> {
    let agents_config = system.config().agents.clone();
    let stations = system.config().resources.charging_stations;

    system.add_agent(Agent::coordinator("COORD_01", (5, 5), stations))?;
    system.add_agent(Agent::picker("PICKER_01", (2, 3), &agents_config))?;
    system.add_agent(Agent::picker("PICKER_02", (7, 8), &agents_config))?;
    system.add_agent(Agent::transport("TRANSPORT_01", (1, 1), &agents_config))?;
    system.add_agent(Agent::transport("TRANSPORT_02", (9, 9), &agents_config))?;

    info!(agents = system.agents().len(), "MAS setup complete");
    Ok(())
}

pub fn demo_orders() -> Vec<Order> {
    vec![
        Order::new("ORD_001", ["item1", "item2", "item3"], Priority::High),
        Order::new("ORD_002", ["item4", "item5"], Priority::Normal),
        Order::new("ORD_003", ["item6", "item7", "item8", "item9"], Priority::Low),
    ]
}

/// Submit each order, step once, then apply battery wear
pub fn run_orders<R: RandomSource>(system: &mut MultiAgentSystem<R>, orders: Vec<Order>) {
    for (number, order) in orders.into_iter().enumerate() {
        info!(order_number = number + 1, order_id = %order.order_id, "Processing order");
        system.submit_order(order);
        system.simulate_step();
        system.drain_batteries();
    }
}

/// Run the full demo on a fresh system and return the final status
pub fn run_demo<R: RandomSource>(
    system: &mut MultiAgentSystem<R>,
) -> Result<SystemStatus, SimulationError> {
    build_roster(system)?;
    run_orders(system, demo_orders());
    info!("Simulation complete");
    Ok(system.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MasConfig;
    use crate::simulation::ScriptedRandom;

    #[test]
    fn test_demo_allocates_every_order() {
        let mut system =
            MultiAgentSystem::with_random(MasConfig::default(), ScriptedRandom::new(vec![5]));

        let status = run_demo(&mut system).unwrap();

        assert_eq!(status.total_agents, 5);
        assert_eq!(status.steps, 3);
        assert_eq!(status.bus.orders_processed, 3);
        assert!(status.pending_orders.is_empty());
        // Three order messages plus a pick and a transport request per order
        assert_eq!(status.bus.messages_routed, 9);

        let picker = status.agents.iter().find(|a| a.id == "PICKER_01").unwrap();
        assert_eq!(picker.metrics.tasks_completed, 3);
        assert_eq!(picker.load, Some(9));
    }
}
