use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::books::WritePolicy;
use crate::model::BookId;

#[derive(Parser, Debug)]
#[command(name = "harpoonium")]
#[command(about = "Browse and manage classic book subscriptions", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the catalog of books not yet subscribed
    Catalog,
    /// Fetch the books a user follows
    Subscribed {
        #[arg(short = 'u', long = "user")]
        user: Option<String>,
    },
    /// Fetch the tweet feed for a user's subscriptions
    Tweets {
        #[arg(short = 'u', long = "user")]
        user: Option<String>,
    },
    /// Follow a book by id
    Subscribe {
        book_id: BookId,
        #[arg(short = 'u', long = "user")]
        user: Option<String>,
    },
    /// Stop following a book by id
    Unsubscribe {
        book_id: BookId,
        #[arg(short = 'u', long = "user")]
        user: Option<String>,
    },
    /// Fetch catalog, subscriptions and tweets together
    Load {
        #[arg(short = 'u', long = "user")]
        user: Option<String>,
    },
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".harpoonium")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

impl ApiSettings {
    pub fn new(base_url: &str) -> Self {
        ApiSettings {
            base_url: base_url.to_string(),
            timeout_seconds: default_timeout(),
        }
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Session {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct SyncSettings {
    #[serde(default)]
    pub write_policy: WritePolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiSettings,
    #[serde(default)]
    pub session: Session,
    #[serde(default)]
    pub sync: SyncSettings,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str);
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    /// Replaces `${VAR}` and `${VAR:-default}` with values from the environment.
    fn substitute_env_vars(yaml_str: &str) -> String {
        let mut result = String::with_capacity(yaml_str.len());
        let mut rest = yaml_str;

        while let Some(start) = rest.find("${") {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            result.push_str(&rest[..start]);

            let expr = &rest[start + 2..start + len];
            let value = match expr.split_once(":-") {
                Some((name, default)) => env::var(name).unwrap_or_else(|_| default.to_string()),
                None => env::var(expr).unwrap_or_else(|_| {
                    tracing::warn!(variable = expr, "environment variable not found");
                    String::new()
                }),
            };
            result.push_str(&value);
            rest = &rest[start + len + 1..];
        }

        result.push_str(rest);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = Config::from_yaml("api:\n  base_url: http://localhost:3000\n").unwrap();
        assert_eq!(cfg.api.get_base_url(), "http://localhost:3000");
        assert_eq!(cfg.api.timeout_seconds, 30);
        assert_eq!(cfg.session.user_id, None);
        assert_eq!(cfg.sync.write_policy, WritePolicy::LastWriteWins);
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
api:
  base_url: https://www.harpoonium.com
  timeout_seconds: 5
session:
  user_id: u1
sync:
  write_policy: serialized
"#;
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.api.timeout_seconds, 5);
        assert_eq!(cfg.session.user_id.as_deref(), Some("u1"));
        assert_eq!(cfg.sync.write_policy, WritePolicy::Serialized);
    }

    #[test]
    fn test_substitute_defaults_and_missing() {
        let out = Config::substitute_env_vars(
            "a: ${HARPOONIUM_TEST_SURELY_UNSET:-fallback}\nb: ${HARPOONIUM_TEST_SURELY_UNSET}\nc: plain",
        );
        assert_eq!(out, "a: fallback\nb: \nc: plain");
    }

    #[test]
    fn test_substitute_reads_environment() {
        let expected = env::var("PATH").unwrap_or_else(|_| "nope".to_string());
        let out = Config::substitute_env_vars("p: ${PATH:-nope}");
        assert_eq!(out, format!("p: {}", expected));
    }

    #[test]
    fn test_unterminated_placeholder_left_alone() {
        assert_eq!(Config::substitute_env_vars("x: ${OPEN"), "x: ${OPEN");
    }

    #[test]
    fn test_every_subcommand_has_help() {
        use clap::CommandFactory;

        let cli = Cli::command();
        for sub in cli.get_subcommands() {
            assert!(sub.get_about().is_some(), "{} has no help text", sub.get_name());
        }
    }

    #[test]
    fn test_cli_parses_subscribe() {
        let cli = Cli::parse_from(["harpoonium", "-c", "cfg.yaml", "subscribe", "12", "-u", "u1"]);
        assert_eq!(cli.config_path.as_deref(), Some("cfg.yaml"));
        match cli.command {
            Command::Subscribe { book_id, user } => {
                assert_eq!(book_id, 12);
                assert_eq!(user.as_deref(), Some("u1"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
