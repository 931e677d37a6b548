// Transport agent - carries items between pickup and delivery points

use super::{AgentCore, TaskOutcome};
use crate::agent_lifecycle::{LifecycleEvent, OperationalState, Position};
use crate::messaging::{Message, MessageKind, Payload};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct TransportAgent {
    carrying_capacity: u32,
    current_load: u32,
    move_cost: u32,
}

impl TransportAgent {
    pub fn new(carrying_capacity: u32, move_cost: u32) -> Self {
        Self {
            carrying_capacity,
            current_load: 0,
            move_cost,
        }
    }

    pub fn carrying_capacity(&self) -> u32 {
        self.carrying_capacity
    }

    pub fn current_load(&self) -> u32 {
        self.current_load
    }

    pub(crate) fn handle(&mut self, core: &mut AgentCore, message: &Message) -> TaskOutcome {
        match (message.kind(), message.payload()) {
            (
                MessageKind::TaskRequest,
                Payload::Transport {
                    pickup_location,
                    delivery_location,
                    item_count,
                },
            ) => self.handle_transport_request(
                core,
                *pickup_location,
                *delivery_location,
                *item_count,
            ),
            (MessageKind::Notification, Payload::PickupReady { location, item_count }) => {
                // Hook for picker/transport hand-off; no decision is made here yet
                debug!(
                    agent_id = %core.id,
                    location = %location,
                    items = item_count,
                    "Pickup ready notification"
                );
                TaskOutcome::Acknowledged
            }
            _ => TaskOutcome::Ignored,
        }
    }

    /// Pickup, load, delivery and unload run as one synchronous mission.
    pub(crate) fn handle_transport_request(
        &mut self,
        core: &mut AgentCore,
        pickup: Position,
        delivery: Position,
        item_count: u32,
    ) -> TaskOutcome {
        debug!(agent_id = %core.id, items = item_count, "Transport request received");

        if core.state() != OperationalState::Idle {
            info!(agent_id = %core.id, state = %core.state(), "Transport request rejected: busy");
            return TaskOutcome::Rejected {
                reason: "busy".to_string(),
            };
        }
        if item_count > self.carrying_capacity {
            info!(
                agent_id = %core.id,
                requested = item_count,
                capacity = self.carrying_capacity,
                "Transport request rejected: capacity exceeded"
            );
            return TaskOutcome::Rejected {
                reason: "capacity exceeded".to_string(),
            };
        }

        core.transition(LifecycleEvent::AcceptTask);

        core.move_to(pickup, self.move_cost);
        self.current_load += item_count;
        debug!(agent_id = %core.id, items = item_count, "Items loaded");

        core.move_to(delivery, self.move_cost);
        self.current_load -= item_count;

        core.transition(LifecycleEvent::CompleteTask);
        core.record_task_completed();

        info!(
            agent_id = %core.id,
            delivered = item_count,
            pickup = %pickup,
            delivery = %delivery,
            battery = %core.battery,
            "Transport mission completed"
        );
        TaskOutcome::Completed
    }
}
