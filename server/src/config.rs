//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//


use crate::ecs::systems::Wall;
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_env_field::EnvField;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to configuration file",
        default_value = "server/config.yaml"
    )]
    pub config_file: String,

    #[arg(
        short = 'e',
        long = "env",
        help = "Path to environment file",
        default_value = "server/.env"
    )]
    pub env_file: Option<String>,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            config_file: "config.yaml".to_string(),
            env_file: Some(".env".to_string()),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub region: RegionConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

impl Configuration {
    pub fn load(path: &str) -> Result<Configuration, String> {
        let conf = serde_yaml::from_reader(
            std::fs::File::open(path).map_err(|e| format!("Failed to open config file: {}", e))?,
        )
        .map_err(|e| format!("Failed to parse config file: {}", e))?;

        Ok(conf)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Tracing filter directives, `RUST_LOG` takes precedence
    pub filter: EnvField<LogFilter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter(String);

impl LogFilter {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for LogFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl Default for LogFilter {
    fn default() -> Self {
        Self(String::from("info"))
    }
}

impl std::fmt::Display for LogFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tuning shared by every AI instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Lower bound for any heartbeat interval
    pub min_heartbeat_ms: u64,
    /// Heartbeat of archetypes that do not set their own
    pub idle_heartbeat_ms: u64,
    /// How long an activated instance keeps running without observers
    pub min_run_time_ms: u64,
    /// Consecutive skipped heartbeats before an instance is reported stuck
    pub stuck_warning_threshold: u32,
    /// Announce skill transitions to observers
    pub sharp_mind: bool,
    /// Seed for reproducible runs; random when absent
    pub seed: Option<u64>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            min_heartbeat_ms: 50,
            idle_heartbeat_ms: 250,
            min_run_time_ms: 2000,
            stuck_warning_threshold: 10,
            sharp_mind: true,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Distance within which players observe a creature
    pub player_range: i32,
    /// Distance around a player within which AIs are woken up
    pub activation_range: i32,
    pub walls: Vec<Wall>,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            player_range: 3000,
            activation_range: 3000,
            walls: Vec::new(),
        }
    }
}

/// World populated by the demo binary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub ratmen: u32,
    pub magicians: u32,
    /// Seconds to run before shutting down, forever when zero
    pub duration_secs: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            ratmen: 3,
            magicians: 1,
            duration_secs: 0,
        }
    }
}
