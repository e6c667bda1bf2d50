use std::env;
use std::path::Path;

use anyhow::Context;
use config::Config;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "config/gatehouse.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Whole-request budget in seconds when the caller sends no
    /// `X-Timeout` deadline.
    #[serde(default = "default_gateway_timeout_secs")]
    pub gateway_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            gateway_timeout_secs: default_gateway_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_address")]
    pub address: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: Self::default_address(),
            port: Self::default_port(),
        }
    }
}

impl ServerConfig {
    pub fn default_address() -> String {
        "127.0.0.1".to_string()
    }

    pub fn default_port() -> u16 {
        8080
    }
}

pub fn default_gateway_timeout_secs() -> u64 {
    10
}

impl GatewayConfig {
    /// Optional TOML file overlaid with `GATEHOUSE__`-prefixed environment
    /// variables, e.g. `GATEHOUSE__GATEWAY_TIMEOUT_SECS=30`.
    pub fn load() -> anyhow::Result<Self> {
        let config_file = env::var("GATEHOUSE_CONFIG_FILE")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut builder = Config::builder()
            .set_default("server.address", ServerConfig::default_address())?
            .set_default("server.port", ServerConfig::default_port() as i64)?
            .set_default("gateway_timeout_secs", default_gateway_timeout_secs() as i64)?;

        if Path::new(&config_file).exists() {
            builder = builder.add_source(config::File::from(Path::new(&config_file)));
        }

        builder = builder.add_source(config::Environment::with_prefix("GATEHOUSE").separator("__"));

        let config: GatewayConfig = builder
            .build()
            .context("failed to build configuration")?
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        Ok(config)
    }
}

/// A documented configuration variable, surfaced through `/doc/env`.
#[derive(Debug, Clone, Serialize)]
pub struct EnvVarDoc {
    pub name: &'static str,
    pub default: &'static str,
    pub doc: &'static str,
}

pub fn documented_vars() -> Vec<EnvVarDoc> {
    vec![
        EnvVarDoc {
            name: "GATEHOUSE_CONFIG_FILE",
            default: DEFAULT_CONFIG_FILE,
            doc: "Path of the optional TOML configuration file.",
        },
        EnvVarDoc {
            name: "GATEHOUSE__GATEWAY_TIMEOUT_SECS",
            default: "10",
            doc: "Seconds a request may run before 504 Gateway Timeout is returned. \
                  Ignored when the request carries an X-Timeout header.",
        },
        EnvVarDoc {
            name: "GATEHOUSE__SERVER__ADDRESS",
            default: "127.0.0.1",
            doc: "Bind address of the server.",
        },
        EnvVarDoc {
            name: "GATEHOUSE__SERVER__PORT",
            default: "8080",
            doc: "Bind port of the server.",
        },
    ]
}
