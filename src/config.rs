use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::Parser;
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "cses-ide", version = "1.0", about, long_about = None)]
pub struct CliArgs {
    /// Path to the configuration file
    #[arg(long = "config", short = 'c')]
    pub config_path: Option<String>,
}

impl CliArgs {
    /// Load the configuration from the specified file, or fall back to defaults
    pub fn to_config(&self) -> anyhow::Result<Config> {
        let Some(path) = &self.config_path else {
            return Ok(Config::default());
        };

        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open configuration file {path}"))?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("failed to parse configuration file {path}"))
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub judge: JudgeConfig,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: Option<String>,
    pub bind_port: Option<u16>,
}

/// Knobs of the judging engine. Every field is optional so a partial (or
/// absent) configuration file still yields a runnable service.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct JudgeConfig {
    /// Directory holding one subdirectory per problem
    pub problems_dir: Option<PathBuf>,
    /// Scratch root for per-request source/artifact files
    pub scratch_dir: Option<PathBuf>,
    /// Compiler invocation template; %INPUT% and %OUTPUT% are substituted
    pub compile_command: Option<Vec<String>>,
    /// Wall-clock limit for the run endpoint, in seconds
    pub run_timeout_secs: Option<u64>,
    /// Per-case limit for problems that do not declare their own, in seconds
    pub default_time_limit_secs: Option<u64>,
}

impl JudgeConfig {
    pub fn problems_dir(&self) -> PathBuf {
        self.problems_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("problems"))
    }

    pub fn scratch_dir(&self) -> anyhow::Result<PathBuf> {
        if let Some(dir) = &self.scratch_dir {
            return Ok(dir.clone());
        }

        use directories::ProjectDirs;
        let proj_dirs = ProjectDirs::from("", "", "cses-ide")
            .ok_or_else(|| anyhow!("Unable to find user directory"))?;
        Ok(proj_dirs.cache_dir().join("scratch"))
    }

    pub fn compile_command(&self) -> Vec<String> {
        self.compile_command.clone().unwrap_or_else(|| {
            ["g++", "-std=c++17", "-O2", "-o", "%OUTPUT%", "%INPUT%"]
                .map(String::from)
                .to_vec()
        })
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs.unwrap_or(5))
    }

    pub fn default_time_limit(&self) -> Duration {
        Duration::from_secs(self.default_time_limit_secs.unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let raw = r#"
        {
            "server": { "bind_address": "127.0.0.1", "bind_port": 3001 },
            "judge": {
                "problems_dir": "data/problems",
                "run_timeout_secs": 10,
                "compile_command": ["g++", "-std=c++20", "-o", "%OUTPUT%", "%INPUT%"]
            }
        }"#;
        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.server.bind_address, Some("127.0.0.1".to_string()));
        assert_eq!(config.server.bind_port, Some(3001));
        assert_eq!(config.judge.problems_dir(), PathBuf::from("data/problems"));
        assert_eq!(config.judge.run_timeout(), Duration::from_secs(10));
        assert_eq!(config.judge.compile_command()[1], "-std=c++20");
        // Unspecified fields fall back to defaults
        assert_eq!(config.judge.default_time_limit(), Duration::from_secs(1));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server.bind_address, None);
        assert_eq!(config.judge.problems_dir(), PathBuf::from("problems"));
        assert_eq!(config.judge.run_timeout(), Duration::from_secs(5));
        assert_eq!(config.judge.compile_command()[0], "g++");
    }
}
