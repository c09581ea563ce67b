use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use core_llm::providers::ProviderConfig;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct CliOpts {
    #[arg(
        long,
        env = "SHOPQL_HOST",
        default_value = "0.0.0.0",
        help = "Host to bind to"
    )]
    pub host: String,

    #[arg(
        long,
        env = "SHOPQL_PORT",
        default_value = "8000",
        help = "Port to bind to"
    )]
    pub port: u16,

    #[arg(
        long,
        env = "CSV_DIR",
        default_value = "csv",
        help = "Directory of CSV files loaded at startup, one table per file"
    )]
    pub csv_dir: PathBuf,

    #[arg(
        long,
        env = "DEFAULT_PROVIDER",
        default_value = "ollama",
        help = "Provider used when a request does not select one (ollama, groq, gemini)"
    )]
    pub default_provider: String,

    #[arg(
        long,
        env = "GROQ_API_KEY",
        hide_env_values = true,
        help = "API key for the Groq backend",
        help_heading = "Provider Options"
    )]
    pub groq_api_key: Option<String>,

    #[arg(
        long,
        env = "GEMINI_API_KEY",
        hide_env_values = true,
        help = "API key for the Gemini backend",
        help_heading = "Provider Options"
    )]
    pub gemini_api_key: Option<String>,

    #[arg(
        long,
        env = "OLLAMA_BASE_URL",
        default_value = "http://localhost:11434",
        help = "Base URL of the local Ollama endpoint",
        help_heading = "Provider Options"
    )]
    pub ollama_base_url: String,

    #[arg(
        long,
        env = "OLLAMA_MODEL",
        default_value = "gemma:2b",
        help_heading = "Provider Options"
    )]
    pub ollama_model: String,

    #[arg(
        long,
        env = "GROQ_MODEL",
        default_value = "llama3-8b-8192",
        help_heading = "Provider Options"
    )]
    pub groq_model: String,

    #[arg(
        long,
        env = "GEMINI_MODEL",
        default_value = "gemini-1.5-flash-latest",
        help_heading = "Provider Options"
    )]
    pub gemini_model: String,

    #[arg(
        long,
        env = "MODEL_TIMEOUT",
        default_value = "30",
        help = "Timeout for a single model call, in seconds",
        help_heading = "Provider Options"
    )]
    pub model_timeout_secs: u64,

    #[arg(
        long,
        env = "RATE_LIMIT_CALLS",
        default_value = "5",
        help = "Requests admitted per rate-limit period"
    )]
    pub rate_limit_calls: u64,

    #[arg(
        long,
        env = "RATE_LIMIT_PERIOD",
        default_value = "60",
        help = "Rate-limit period, in seconds"
    )]
    pub rate_limit_period_secs: u64,

    #[arg(
        long,
        env = "REQUEST_TIMEOUT",
        default_value = "120",
        help = "End-to-end request timeout, in seconds"
    )]
    pub request_timeout_secs: u64,

    #[arg(
        long,
        env = "ENABLE_VISUALIZATION",
        default_value_t = true,
        action = clap::ArgAction::Set,
        help = "Render charts for chartable results (true/false)"
    )]
    pub enable_visualization: bool,

    #[arg(
        long,
        value_enum,
        env = "TRACING_LEVEL",
        default_value = "info",
        help = "Tracing level, can be overridden by the *RUST_LOG* env var"
    )]
    pub tracing_level: TracingLevel,
}

impl CliOpts {
    #[must_use]
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            ollama_base_url: self.ollama_base_url.clone(),
            ollama_model: self.ollama_model.clone(),
            groq_api_key: self.groq_api_key.clone(),
            groq_model: self.groq_model.clone(),
            gemini_api_key: self.gemini_api_key.clone(),
            gemini_model: self.gemini_model.clone(),
            timeout: Duration::from_secs(self.model_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TracingLevel {
    Off,
    Info,
    Debug,
    Trace,
}

impl From<TracingLevel> for LevelFilter {
    fn from(level: TracingLevel) -> Self {
        match level {
            TracingLevel::Off => Self::OFF,
            TracingLevel::Info => Self::INFO,
            TracingLevel::Debug => Self::DEBUG,
            TracingLevel::Trace => Self::TRACE,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn visualization_toggle_takes_a_value_on_the_command_line() {
        let opts = CliOpts::try_parse_from(["shopqld", "--enable-visualization", "false"]).unwrap();
        assert!(!opts.enable_visualization);

        let opts = CliOpts::try_parse_from(["shopqld", "--enable-visualization", "true"]).unwrap();
        assert!(opts.enable_visualization);
    }

    #[test]
    fn visualization_defaults_to_on() {
        let opts = CliOpts::try_parse_from(["shopqld"]).unwrap();
        assert!(opts.enable_visualization);
    }
}
