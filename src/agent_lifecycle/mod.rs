// Agent Lifecycle Module - operational state machine and shared agent types
//
// Every agent owns one `Lifecycle`. Role-specific handlers drive it with
// `LifecycleEvent`s; the driver only reads the resulting `OperationalState`.

pub mod state_machine;
pub mod types;

pub use state_machine::{Lifecycle, LifecycleEvent};
pub use types::{AgentId, BatteryLevel, OperationalState, PerformanceMetrics, Position, Role};
