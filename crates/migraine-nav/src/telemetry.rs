use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Crates whose request-level chatter is capped below the service's own level.
const NOISY_TARGETS: [&str; 3] = ["hyper=warn", "reqwest=warn", "h2=warn"];

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(f, "invalid log filter '{value}'")
            }
            TelemetryError::Subscriber(err) => write!(f, "subscriber already installed: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Builds the filter directive for the configured level, quieting HTTP client internals.
pub fn filter_directive(config: &TelemetryConfig) -> String {
    let mut directive = config.log_level.trim().to_string();
    if directive.is_empty() {
        directive.push_str("info");
    }
    for target in NOISY_TARGETS {
        directive.push(',');
        directive.push_str(target);
    }
    directive
}

pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let directive = filter_directive(config);
    EnvFilter::try_new(&directive).map_err(|source| TelemetryError::EnvFilter {
        value: config.log_level.clone(),
        source,
    })
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(config)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_appends_client_caps() {
        let config = TelemetryConfig {
            log_level: "debug".to_string(),
        };
        assert_eq!(
            filter_directive(&config),
            "debug,hyper=warn,reqwest=warn,h2=warn"
        );
    }

    #[test]
    fn blank_level_defaults_to_info() {
        let config = TelemetryConfig {
            log_level: "  ".to_string(),
        };
        assert!(filter_directive(&config).starts_with("info,"));
    }
}
