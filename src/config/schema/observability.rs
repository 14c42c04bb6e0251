use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable, for local runs
    Pretty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment label reported by `/health`
    #[serde(default = "default_env")]
    pub env: String,
    /// IANA zone name reported by `/health`
    #[serde(default = "default_tz")]
    pub tz: String,
    /// `trace` | `debug` | `info` | `warn` | `error`
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_env() -> String {
    "local".into()
}

fn default_tz() -> String {
    "Europe/Warsaw".into()
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: default_env(),
            tz: default_tz(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}
