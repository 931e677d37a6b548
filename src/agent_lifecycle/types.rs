// Core types shared by every agent in the warehouse simulation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an agent on the roster
pub type AgentId = String;

/// Agent roles in the warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Picks items off shelves
    Picker,
    /// Carries picked items between locations
    Transporter,
    /// Allocates orders and arbitrates shared resources
    Coordinator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Picker => "Picker",
            Role::Transporter => "Transport",
            Role::Coordinator => "Coordinator",
        };
        write!(f, "{label}")
    }
}

/// Operational states an agent moves through during the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalState {
    Idle,
    Working,
    Moving,
    Charging,
    Waiting,
}

impl fmt::Display for OperationalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationalState::Idle => "idle",
            OperationalState::Working => "working",
            OperationalState::Moving => "moving",
            OperationalState::Charging => "charging",
            OperationalState::Waiting => "waiting",
        };
        write!(f, "{label}")
    }
}

/// Grid position inside the warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Battery gauge bounded to `0..=BatteryLevel::FULL`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatteryLevel(u32);

impl BatteryLevel {
    pub const FULL: u32 = 100;

    pub fn full() -> Self {
        Self(Self::FULL)
    }

    /// Clamps to the upper bound.
    pub fn new(level: u32) -> Self {
        Self(level.min(Self::FULL))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Saturating drain, floored at zero.
    pub fn drain(&mut self, amount: u32) {
        self.0 = self.0.saturating_sub(amount);
    }

    pub fn restore(&mut self) {
        self.0 = Self::FULL;
    }

    pub fn is_below(self, threshold: u32) -> bool {
        self.0 < threshold
    }
}

impl Default for BatteryLevel {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for BatteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Per-agent performance counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub tasks_completed: u32,
    pub messages_sent: u32,
    pub messages_received: u32,
    pub collaboration_count: u32,
}
