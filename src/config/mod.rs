mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{
    BrokerSettings, LoggingSettings, ServerSettings, Settings, SubscribePolicy,
};

/// Prefix for environment overrides, e.g. `PULLSUB_SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "PULLSUB";

/// Loads the configuration from `config/default.*` and `PULLSUB_*` environment
/// variables, filling anything unspecified from `Settings::default()`.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config/default")
}

/// Same as [`load_config`] with an explicit config file path (extension optional).
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("broker.address_schemes")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    let settings = Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
        },
        broker: BrokerSettings {
            subscribe_policy: partial
                .broker
                .as_ref()
                .and_then(|b| b.subscribe_policy)
                .unwrap_or(default.broker.subscribe_policy),
            address_schemes: partial
                .broker
                .as_ref()
                .and_then(|b| b.address_schemes.clone())
                .unwrap_or(default.broker.address_schemes),
        },
        logging: LoggingSettings {
            level: partial
                .logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.logging.level),
        },
    };

    validate(&settings)?;
    Ok(settings)
}

// An empty list refuses every address and an empty entry accepts any, so
// both are configuration mistakes.
fn validate(settings: &Settings) -> Result<(), ConfigError> {
    let schemes = &settings.broker.address_schemes;
    if schemes.is_empty() {
        return Err(ConfigError::Message(
            "broker.address_schemes must list at least one scheme".to_string(),
        ));
    }
    if let Some(idx) = schemes.iter().position(|scheme| scheme.trim().is_empty()) {
        return Err(ConfigError::Message(format!(
            "broker.address_schemes[{idx}] must not be empty"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
