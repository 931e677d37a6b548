// Picker agent - retrieves items from shelves

use super::{AgentCore, TaskOutcome};
use crate::agent_lifecycle::{LifecycleEvent, OperationalState, Position};
use crate::messaging::{Message, MessageKind, Payload};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct PickerAgent {
    carrying_capacity: u32,
    current_load: u32,
    move_cost: u32,
}

impl PickerAgent {
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
            (MessageKind::TaskRequest, Payload::Pick { items, location }) => {
                self.handle_pick_request(core, items, *location)
            }
            (MessageKind::TaskRequest, Payload::Collaboration { .. }) => {
                if self.handle_collaboration_request(core) {
                    TaskOutcome::Collaborated
                } else {
                    TaskOutcome::Declined
                }
            }
            _ => TaskOutcome::Ignored,
        }
    }

    /// Accept iff idle and the whole pick fits; rejected picks mutate nothing.
    pub(crate) fn handle_pick_request(
        &mut self,
        core: &mut AgentCore,
        items: &[String],
        location: Position,
    ) -> TaskOutcome {
        let count = u32::try_from(items.len()).unwrap_or(u32::MAX);
        debug!(agent_id = %core.id, items = count, location = %location, "Pick request received");

        if core.state() != OperationalState::Idle {
            info!(agent_id = %core.id, state = %core.state(), "Pick request rejected: busy");
            return TaskOutcome::Rejected {
                reason: "busy".to_string(),
            };
        }
        if self.current_load.saturating_add(count) > self.carrying_capacity {
            info!(
                agent_id = %core.id,
                load = self.current_load,
                requested = count,
                capacity = self.carrying_capacity,
                "Pick request rejected: capacity exceeded"
            );
            return TaskOutcome::Rejected {
                reason: "capacity exceeded".to_string(),
            };
        }

        core.transition(LifecycleEvent::AcceptTask);
        core.move_to(location, self.move_cost);
        self.current_load += count;
        core.drain_resource(count);
        core.transition(LifecycleEvent::CompleteTask);
        core.record_task_completed();

        info!(
            agent_id = %core.id,
            picked = count,
            load = self.current_load,
            battery = %core.battery,
            "Items picked"
        );
        TaskOutcome::Completed
    }

    pub(crate) fn handle_collaboration_request(&mut self, core: &mut AgentCore) -> bool {
        if core.state() == OperationalState::Idle {
            core.record_collaboration();
            info!(agent_id = %core.id, "Accepting collaboration request");
            true
        } else {
            false
        }
    }
}
