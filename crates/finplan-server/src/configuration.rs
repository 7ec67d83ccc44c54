use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use finplan::engine::replay::ReplayEngine;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Where conversation events come from
#[derive(Debug, Deserialize)]
pub struct EngineSettings {
    /// Recorded transcript to replay for every request
    pub transcript: PathBuf,
    /// Pause between replayed events
    #[serde(default)]
    pub delay_ms: u64,
}

impl EngineSettings {
    pub fn into_engine(self) -> ReplayEngine {
        ReplayEngine::new(self.transcript).with_delay(Duration::from_millis(self.delay_ms))
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub engine: EngineSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("engine.delay_ms", 0)?
            .add_source(
                Environment::with_prefix("FINPLAN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                if let Some(field) = missing_field_path(&err.to_string()) {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(&field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

/// Dotted path of the field named in a "missing field `x` [for key `y`]" message.
///
/// Serde does not always say which table the field belongs to, so bare names of our own nested
/// fields are qualified here.
fn missing_field_path(message: &str) -> Option<String> {
    let rest = message.strip_prefix("missing field `")?;
    let (field, rest) = rest.split_once('`')?;
    match rest.split_once("for key `") {
        Some((_, key)) => Some(format!("{}.{}", key.trim_end_matches('`'), field)),
        None => Some(match field {
            "transcript" | "delay_ms" => format!("engine.{}", field),
            "host" | "port" => format!("server.{}", field),
            other => other.to_string(),
        }),
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}
