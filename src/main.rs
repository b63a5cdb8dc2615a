use std::sync::Arc;

use shopadmin::config::{load_config, print_schema};
use shopadmin::startup::{self, Command};
use shopadmin::utils::init_logging;
use tracing::error;

const CONFIG_PATH_ENV: &str = "SHOPADMIN_CONFIG";

#[tokio::main]
async fn main() {
    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    if command == Command::Schema {
        if let Err(e) = print_schema() {
            eprintln!("Error printing schema: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "./config.yaml".to_string());
    let config = match load_config(&config_path) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Error loading configuration from '{}': {}", config_path, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let state = match startup::build(config) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    match startup::run(&state, command).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("Command failed: {}", e);
            if let Some(payload) = e.payload() {
                eprintln!("{}", payload);
            }
            std::process::exit(1);
        }
    }
}
