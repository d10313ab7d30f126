use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Observability configuration
    pub observability: ObservabilityConfig,

    /// Escalation engine configuration
    pub escalation: EscalationConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: ESCALATOR_)
            .add_source(
                config::Environment::with_prefix("ESCALATOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            observability: ObservabilityConfig::default(),
            escalation: EscalationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            prometheus_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Default state of the escalation-policies feature gate
    #[serde(default = "default_true")]
    pub policies_enabled: bool,

    /// Cron expression for the periodic recheck of open escalations
    #[serde(default = "default_recheck_schedule")]
    pub recheck_schedule: String,

    /// Number of escalations fetched per batch during a recheck
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Timeout bound for a single escalation's evaluation pass (seconds)
    #[serde(default = "default_pass_timeout")]
    pub pass_timeout_secs: u64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            policies_enabled: true,
            recheck_schedule: default_recheck_schedule(),
            batch_size: default_batch_size(),
            pass_timeout_secs: default_pass_timeout(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "oncall-escalator".to_string()
}

fn default_true() -> bool {
    true
}

fn default_recheck_schedule() -> String {
    // Every 30 seconds (six-field cron, seconds first)
    "*/30 * * * * *".to_string()
}

fn default_batch_size() -> usize {
    1000
}

fn default_pass_timeout() -> u64 {
    30
}
