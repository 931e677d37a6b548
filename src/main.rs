use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use warehouse_mas::simulation::demo;
use warehouse_mas::{init_telemetry, MasConfig, MultiAgentSystem};

#[derive(Parser, Debug)]
#[command(name = "warehouse-mas")]
#[command(about = "Warehouse multi-agent coordination simulation")]
#[command(long_about = "Runs a warehouse scenario where picker and transport agents, steered by a \
                       coordinator, fulfil orders over a message bus and compete for a limited \
                       pool of charging stations.")]
struct Cli {
    /// Configuration file (defaults to ./warehouse-mas.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Random seed; overrides the configured seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Run the warehouse demo and print a status report (default)
    Run,
    /// Run the warehouse demo and print the final status as JSON
    Status,
    /// Print the effective configuration as TOML
    Config {
        /// Write the configuration to this file instead of printing it
        #[arg(long, value_name = "PATH")]
        write: Option<PathBuf>,
    },
}

fn load_config(cli: &Cli) -> Result<MasConfig> {
    MasConfig::load_env_file()?;
    let mut config = MasConfig::load(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }
    if cli.json_logs {
        config.observability.json_logs = true;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Config { write: Some(path) } => {
            config.save_to_file(&path)?;
            println!("Configuration written to {}", path.display());
        }
        Commands::Config { write: None } => {
            print!("{}", config.to_toml()?);
        }
        Commands::Run => {
            init_telemetry(&config.observability)?;
            let mut system = MultiAgentSystem::new(config);
            let status = demo::run_demo(&mut system)?;
            println!("{status}");
        }
        Commands::Status => {
            init_telemetry(&config.observability)?;
            let mut system = MultiAgentSystem::new(config);
            let status = demo::run_demo(&mut system)?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["warehouse-mas"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json_logs);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["warehouse-mas", "status", "--seed", "42", "--json-logs"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Status));
        assert_eq!(cli.seed, Some(42));
        assert!(cli.json_logs);
    }

    #[test]
    fn test_config_write_path() {
        let cli = Cli::try_parse_from(["warehouse-mas", "config", "--write", "out.toml"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                write: Some(PathBuf::from("out.toml"))
            })
        );

        let cli = Cli::try_parse_from(["warehouse-mas", "config"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Config { write: None }));
    }

    #[test]
    fn test_rejects_bad_seed() {
        assert!(Cli::try_parse_from(["warehouse-mas", "--seed", "abc"]).is_err());
    }
}
