use crate::errors::ConfigError;
use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name (without extension) looked up in the cwd
pub const DEFAULT_CONFIG_NAME: &str = "warehouse-mas";

/// Main configuration structure for the warehouse simulation
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MasConfig {
    /// Driver settings
    pub simulation: SimulationConfig,
    /// Per-role agent settings
    pub agents: AgentConfig,
    /// Shared resource pool settings
    pub resources: ResourceConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the random source; a fresh OS seed is drawn when unset
    pub seed: Option<u64>,
    /// Inclusive lower bound of allocation grid coordinates
    pub grid_min: i32,
    /// Inclusive upper bound of allocation grid coordinates
    pub grid_max: i32,
    /// Inclusive range of the per-step battery drain
    pub drain_min: u32,
    pub drain_max: u32,
    /// Re-attempt pending orders at the start of every step
    pub retry_pending_orders: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    pub picker_capacity: u32,
    pub transport_capacity: u32,
    /// Battery cost of one relocation
    pub move_cost: u32,
    /// Agents strictly below this battery level compete for charging
    pub low_battery_threshold: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub charging_stations: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            grid_min: 1,
            grid_max: 10,
            drain_min: 5,
            drain_max: 15,
            retry_pending_orders: false,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            picker_capacity: 10,
            transport_capacity: 50,
            move_cost: 2,
            low_battery_threshold: 20,
        }
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            charging_stations: 3,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl MasConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (`path`, or warehouse-mas.toml in the cwd)
    /// 3. Environment variables (prefixed with WAREHOUSE_MAS__, `__` between sections)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Missing keys fall back to the serde defaults above
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path));
            }
            None => {
                if Path::new(&format!("{DEFAULT_CONFIG_NAME}.toml")).exists() {
                    builder = builder.add_source(File::with_name(DEFAULT_CONFIG_NAME));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("WAREHOUSE_MAS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: MasConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.grid_min > sim.grid_max {
            return Err(ConfigError::InvalidRange {
                field: "simulation.grid",
                low: i64::from(sim.grid_min),
                high: i64::from(sim.grid_max),
            });
        }
        if sim.drain_min > sim.drain_max {
            return Err(ConfigError::InvalidRange {
                field: "simulation.drain",
                low: i64::from(sim.drain_min),
                high: i64::from(sim.drain_max),
            });
        }
        if self.agents.picker_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("agents.picker_capacity"));
        }
        if self.agents.transport_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("agents.transport_capacity"));
        }
        if self.agents.low_battery_threshold > crate::agent_lifecycle::BatteryLevel::FULL {
            return Err(ConfigError::ThresholdOutOfBounds(
                self.agents.low_battery_threshold,
            ));
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
