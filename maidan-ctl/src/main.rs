//! maidan-ctl - real-time control daemon for a small-size soccer team
//!
//! Usage:
//! - `maidan-ctl [config.toml]`
//! - `maidan-ctl --config <path> [--team blue|yellow] [--strategy <name>]`

use maidan_ctl::config::{AppConfig, CliArgs};
use maidan_ctl::coordinator::{Coordinator, build_providers, open_radio};
use maidan_ctl::error::Result;
use maidan_ctl::logging;

fn main() -> Result<()> {
    let args = CliArgs::parse(std::env::args().skip(1))?;
    let config = AppConfig::resolve(&args)?;
    logging::init(&config.logging)?;

    log::info!("maidan-ctl v{} starting...", env!("CARGO_PKG_VERSION"));
    match &args.config_path {
        Some(path) => log::info!("Using config: {}", path.display()),
        None => log::info!("No config path given, using defaults or ./maidan.toml"),
    }
    log::info!(
        "Team {}, strategy {}, deployment {}",
        config.team,
        config.strategy,
        config.deployment
    );

    let radio = open_radio(&config)?;
    let mut coordinator = Coordinator::new(&config);
    coordinator.start(build_providers(&config, radio))?;
    coordinator.run()?;

    log::info!("maidan-ctl stopped");
    Ok(())
}
