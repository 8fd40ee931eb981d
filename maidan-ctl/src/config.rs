//! Configuration for the control daemon
//!
//! Loads the daemon configuration from TOML. Every key is optional; the
//! `[constants]` table embeds the core [`Constants`] overrides.
//!
//! ## Example TOML
//!
//! ```toml
//! team = "blue"
//! strategy = "full_game"
//! deployment = "simulator"
//! initial_setup = "full_teams"
//! is_blue_defense_side_left = true
//!
//! [radio]
//! port = "/dev/ttyUSB0"
//! baud_rate = 115200
//! enabled = false
//!
//! [network]
//! vision_address = "224.5.23.2:10006"
//! referee_address = "224.5.23.1:10003"
//!
//! [logging]
//! level = "info"
//! output = "stderr"   # or a directory for per-component session logs
//!
//! [constants.robot]
//! max_speed = 600.0
//! ```

use crate::error::{Error, Result};
use maidan::Constants;
use maidan::Team;
use maidan::sim::InitialSetup;
use maidan::strategy::StrategyKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "maidan.toml";

/// Where positions come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deployment {
    /// SSL-Vision and the game controller on the network
    #[default]
    Vision,
    /// The built-in physics simulator
    Simulator,
}

impl Deployment {
    pub fn as_str(self) -> &'static str {
        match self {
            Deployment::Vision => "vision",
            Deployment::Simulator => "simulator",
        }
    }
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level daemon configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub team: Team,
    pub strategy: StrategyKind,
    pub deployment: Deployment,
    /// Only used by the simulator deployment
    pub initial_setup: InitialSetup,
    pub is_blue_defense_side_left: bool,
    pub radio: RadioConfig,
    pub network: NetworkConfig,
    pub logging: LoggingConfig,
    pub constants: Constants,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            team: Team::Blue,
            strategy: StrategyKind::FullGame,
            deployment: Deployment::default(),
            initial_setup: InitialSetup::default(),
            is_blue_defense_side_left: true,
            radio: RadioConfig::default(),
            network: NetworkConfig::default(),
            logging: LoggingConfig::default(),
            constants: Constants::default(),
        }
    }
}

/// Radio serial link
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RadioConfig {
    /// Serial device of the radio dongle
    pub port: String,
    pub baud_rate: u32,
    /// Open the serial port; a disabled radio records frames in memory
    pub enabled: bool,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            enabled: true,
        }
    }
}

/// Multicast groups of the vision system and the game controller
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub vision_address: String,
    pub referee_address: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            vision_address: "224.5.23.2:10006".to_string(),
            referee_address: "224.5.23.1:10003".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// "stderr", or a directory that receives one file per component
    pub output: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: "stderr".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Session log directory, if logging goes to files.
    pub fn directory(&self) -> Option<&Path> {
        match self.output.as_str() {
            "stderr" | "stdout" | "" => None,
            dir => Some(Path::new(dir)),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Resolve the configuration for a command line.
    ///
    /// The file named on the command line must exist; otherwise
    /// [`DEFAULT_CONFIG_FILE`] is read when present and the built-in
    /// defaults are used when not. Flag overrides are applied last.
    pub fn resolve(args: &CliArgs) -> Result<Self> {
        let mut config = match &args.config_path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        args.apply_overrides(&mut config);
        Ok(config)
    }
}

// ============================================================================
// Command line
// ============================================================================

/// Parsed command line.
///
/// Supports:
/// - `maidan-ctl <path>` (positional)
/// - `maidan-ctl --config <path>` / `-c <path>`
/// - `--team <blue|yellow>` and `--strategy <name>` overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub team: Option<Team>,
    pub strategy: Option<StrategyKind>,
}

impl CliArgs {
    /// Parse arguments, excluding the program name.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = CliArgs::default();
        let mut iter = args.into_iter().map(Into::into);

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    parsed.config_path = Some(PathBuf::from(Self::value(&arg, iter.next())?));
                }
                "--team" => {
                    let value = Self::value(&arg, iter.next())?;
                    parsed.team = Some(Team::from_str(&value).map_err(Error::Config)?);
                }
                "--strategy" => {
                    let value = Self::value(&arg, iter.next())?;
                    parsed.strategy = Some(StrategyKind::from_str(&value).map_err(Error::Config)?);
                }
                flag if flag.starts_with('-') => {
                    return Err(Error::Config(format!("unknown argument '{}'", flag)));
                }
                _ => {
                    if parsed.config_path.is_none() {
                        parsed.config_path = Some(PathBuf::from(&arg));
                    }
                }
            }
        }
        Ok(parsed)
    }

    fn value(flag: &str, value: Option<String>) -> Result<String> {
        value.ok_or_else(|| Error::Config(format!("{} needs a value", flag)))
    }

    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(team) = self.team {
            config.team = team;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
    }
}
