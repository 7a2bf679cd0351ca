//! Job Controller Configuration
//!
//! Loaded from a mounted YAML file. Every field has a default so a missing
//! or partial file still yields a runnable controller.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Default location of the mounted configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/config/config.yaml";

/// Main controller configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ControllerConfig {
    /// Namespace to watch; all namespaces when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Field manager recorded on objects the controller creates
    #[serde(default = "default_field_manager", rename = "fieldManager")]
    pub field_manager: String,

    /// Delay before a failed reconciliation is retried
    #[serde(
        default = "default_error_requeue_seconds",
        rename = "errorRequeueSeconds"
    )]
    pub error_requeue_seconds: u64,

    /// Log output format
    #[serde(default, rename = "logFormat")]
    pub log_format: LogFormat,

    /// Address the health probe server binds to
    #[serde(
        default = "default_probe_bind_address",
        rename = "probeBindAddress"
    )]
    pub probe_bind_address: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_field_manager() -> String {
    "kaam-controller".to_string()
}

fn default_error_requeue_seconds() -> u64 {
    30
}

fn default_probe_bind_address() -> String {
    "0.0.0.0:8081".to_string()
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            field_manager: default_field_manager(),
            error_requeue_seconds: default_error_requeue_seconds(),
            log_format: LogFormat::default(),
            probe_bind_address: default_probe_bind_address(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from a mounted YAML file
    pub fn from_mounted_file(config_path: &str) -> Result<Self, anyhow::Error> {
        let config_str = std::fs::read_to_string(config_path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {config_path}: {e}"))?;

        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(config_str: &str) -> Result<Self, anyhow::Error> {
        serde_yaml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config YAML: {e}"))
    }

    /// Reject settings the controller cannot run with
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.error_requeue_seconds == 0 {
            return Err(anyhow::anyhow!(
                "errorRequeueSeconds must be greater than zero"
            ));
        }

        if self.field_manager.trim().is_empty() {
            return Err(anyhow::anyhow!("fieldManager must not be empty"));
        }

        if let Some(namespace) = &self.namespace {
            if namespace.trim().is_empty() {
                return Err(anyhow::anyhow!(
                    "namespace must be omitted or non-empty"
                ));
            }
        }

        self.probe_addr()?;
        Ok(())
    }

    pub fn error_requeue_interval(&self) -> Duration {
        Duration::from_secs(self.error_requeue_seconds)
    }

    pub fn probe_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        self.probe_bind_address.parse().map_err(|e| {
            anyhow::anyhow!(
                "Invalid probeBindAddress '{}': {e}",
                self.probe_bind_address
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
namespace: jobs
fieldManager: "custom-manager"
errorRequeueSeconds: 10
logFormat: json
probeBindAddress: "127.0.0.1:9000"
"#;

        let config = ControllerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.namespace.as_deref(), Some("jobs"));
        assert_eq!(config.field_manager, "custom-manager");
        assert_eq!(config.error_requeue_interval(), Duration::from_secs(10));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.probe_addr().unwrap().port(), 9000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_falls_back_to_defaults() {
        let config = ControllerConfig::from_yaml("{}").unwrap();
        assert_eq!(config, ControllerConfig::default());
        assert!(config.namespace.is_none());
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(ControllerConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_requeue() {
        let config = ControllerConfig {
            error_requeue_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_field_manager_and_namespace() {
        let config = ControllerConfig {
            field_manager: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ControllerConfig {
            namespace: Some(String::new()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_probe_address() {
        let config = ControllerConfig {
            probe_bind_address: "not-an-address".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ControllerConfig::from_mounted_file("/nonexistent/config.yaml").is_err());
    }
}
