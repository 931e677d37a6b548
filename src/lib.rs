// Warehouse MAS Library - multi-agent coordination simulation
// This exposes the core components for testing and integration

pub mod agent_lifecycle;
pub mod agents;
pub mod config;
pub mod errors;
pub mod messaging;
pub mod orders;
pub mod priority;
pub mod simulation;
pub mod telemetry;

// Re-export key types for easy access
pub use agent_lifecycle::{BatteryLevel, OperationalState, Position, Role};
pub use agents::{Agent, CoordinatorAgent, PickerAgent, TaskOutcome, TransportAgent};
pub use config::MasConfig;
pub use errors::{ConfigError, SimulationError};
pub use messaging::{Delivery, Message, MessageKind, Payload, Receiver, SystemBus};
pub use orders::Order;
pub use priority::Priority;
pub use simulation::{
    Allocation, MultiAgentSystem, OrderSubmission, RandomSource, ScriptedRandom, SeededRandom,
    StepReport, SystemStatus,
};
pub use telemetry::{create_simulation_span, generate_correlation_id, init_telemetry};
