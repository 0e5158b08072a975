use clap::Parser;
use std::time::Duration;
use url::Url;

use crate::catalog::find_league;
use crate::fixtures::RefreshTarget;

/// What-if league table service
#[derive(Parser, Debug, Clone)]
#[command(name = "whatif-table", version, about)]
pub struct Config {
    /// SQLite database path for cached fixtures and predictions
    #[arg(long, env = "DATABASE_PATH", default_value = "whatif.db")]
    pub database_path: String,

    /// HTTP listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// Fixtures/standings backend base URL
    #[arg(
        long,
        env = "API_BASE_URL",
        default_value = "https://web-production-4f50f.up.railway.app"
    )]
    pub api_base_url: String,

    /// Background fixture refresh interval in seconds
    #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value = "900")]
    pub refresh_interval_secs: u64,

    /// Backend request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Leagues kept warm by the refresher (comma separated, latest season each)
    #[arg(long, env = "REFRESH_LEAGUES", value_delimiter = ',', default_value = "PL")]
    pub refresh_leagues: Vec<String>,

    /// Start the background refresher at startup
    #[arg(
        long,
        env = "REFRESH_ON_START",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub refresh_on_start: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.refresh_interval_secs == 0 {
            anyhow::bail!("refresh_interval_secs must be positive");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        if let Err(e) = Url::parse(&self.api_base_url) {
            anyhow::bail!("api_base_url {} is not a valid URL: {}", self.api_base_url, e);
        }
        for id in &self.refresh_leagues {
            if find_league(id.trim()).is_none() {
                anyhow::bail!("REFRESH_LEAGUES contains unknown league {}", id);
            }
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Latest season of every configured refresh league.
    pub fn refresh_targets(&self) -> Vec<RefreshTarget> {
        self.refresh_leagues
            .iter()
            .filter_map(|id| find_league(id.trim()))
            .filter_map(|league| {
                league.latest_season().map(|season| RefreshTarget {
                    league: league.id.to_string(),
                    season,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["whatif-table"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_refresh_targets_use_latest_season() {
        let config = parse(&["--refresh-leagues", "PL,sa"]);
        assert_eq!(
            config.refresh_targets(),
            vec![
                RefreshTarget {
                    league: "PL".into(),
                    season: 2025
                },
                RefreshTarget {
                    league: "SA".into(),
                    season: 2025
                },
            ]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_league() {
        let config = parse(&["--refresh-leagues", "PL,XX"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = parse(&["--refresh-interval-secs", "0"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = parse(&["--api-base-url", "not a url"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_refresh_on_start_can_be_disabled() {
        let config = parse(&["--refresh-on-start", "false"]);
        assert!(!config.refresh_on_start);
    }
}
