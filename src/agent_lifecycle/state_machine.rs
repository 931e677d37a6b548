use serde::{Deserialize, Serialize};
use statig::prelude::*;

use super::types::OperationalState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    AcceptTask,
    CompleteTask,
    BeginMove,
    Arrive,
    ChargeGranted,
    ChargeDenied,
    ChargeComplete,
}

#[derive(Default)]
pub struct OperationalLifecycle {
    agent_id: String,
    resume_after_move: Option<OperationalState>,
}

impl OperationalLifecycle {
    pub fn new(agent_id: String) -> Self {
        Self {
            agent_id,
            ..Default::default()
        }
    }
}

#[state_machine(initial = "State::idle()")]
impl OperationalLifecycle {
    #[state]
    fn idle(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        match event {
            LifecycleEvent::AcceptTask => {
                tracing::debug!(agent_id = %self.agent_id, "Agent accepted task");
                Transition(State::working())
            }
            LifecycleEvent::BeginMove => self.begin_move(OperationalState::Idle),
            _ => self.on_charge_event(event),
        }
    }

    #[state]
    fn working(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        match event {
            LifecycleEvent::CompleteTask => {
                tracing::debug!(agent_id = %self.agent_id, "Agent completed task");
                Transition(State::idle())
            }
            LifecycleEvent::BeginMove => self.begin_move(OperationalState::Working),
            _ => self.on_charge_event(event),
        }
    }

    #[state]
    fn moving(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        match event {
            LifecycleEvent::Arrive => match self.resume_after_move.take() {
                Some(OperationalState::Working) => Transition(State::working()),
                _ => Transition(State::idle()),
            },
            _ => self.on_charge_event(event),
        }
    }

    #[state]
    fn charging(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        match event {
            LifecycleEvent::ChargeComplete => {
                tracing::debug!(agent_id = %self.agent_id, "Agent finished charging");
                Transition(State::idle())
            }
            _ => Handled,
        }
    }

    #[state]
    fn waiting(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        match event {
            LifecycleEvent::ChargeGranted => self.on_charge_event(event),
            _ => Handled,
        }
    }
}

impl OperationalLifecycle {
    fn begin_move(&mut self, resume: OperationalState) -> Outcome<State> {
        self.resume_after_move = Some(resume);
        Transition(State::moving())
    }

    fn on_charge_event(&mut self, event: &LifecycleEvent) -> Outcome<State> {
        match event {
            LifecycleEvent::ChargeGranted => {
                self.resume_after_move = None;
                tracing::debug!(agent_id = %self.agent_id, "Agent started charging");
                Transition(State::charging())
            }
            LifecycleEvent::ChargeDenied => {
                tracing::debug!(agent_id = %self.agent_id, "Agent waiting for charging station");
                Transition(State::waiting())
            }
            _ => Handled,
        }
    }
}

/// Operational lifecycle of one agent, readable as an [`OperationalState`]
pub struct Lifecycle {
    machine: StateMachine<OperationalLifecycle>,
}

impl Lifecycle {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            machine: OperationalLifecycle::new(agent_id.into()).state_machine(),
        }
    }

    pub fn handle(&mut self, event: LifecycleEvent) {
        self.machine.handle(&event);
    }

    pub fn state(&self) -> OperationalState {
        match self.machine.state() {
            State::Idle { .. } => OperationalState::Idle,
            State::Working { .. } => OperationalState::Working,
            State::Moving { .. } => OperationalState::Moving,
            State::Charging { .. } => OperationalState::Charging,
            State::Waiting { .. } => OperationalState::Waiting,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state() == OperationalState::Idle
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("state", &self.state())
            .finish()
    }
}
