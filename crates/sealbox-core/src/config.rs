use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level daemon configuration (loaded from sealbox.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SealboxConfig {
    pub daemon: DaemonConfig,
    pub secret: SecretConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Unix socket path for gRPC (default: /run/sealboxd/sealboxd.sock)
    pub socket: PathBuf,
    /// Prometheus metrics endpoint (default: 127.0.0.1:9100)
    pub metrics_addr: Option<String>,
    /// Log level (default: info)
    pub log_level: String,
    /// Log format: "json" or "text"
    pub log_format: String,
}

/// Where the master secret comes from. The value is read exactly once at
/// startup and is immutable for the process lifetime; it is never echoed in
/// logs, responses, or this config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretConfig {
    /// Environment variable holding the master secret (default: SEALBOX_MASTER_SECRET)
    pub env_var: String,
    /// File to read the master secret from when the env var is unset
    pub secret_file: Option<PathBuf>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket: PathBuf::from("/run/sealboxd/sealboxd.sock"),
            metrics_addr: Some("127.0.0.1:9100".into()),
            log_level: "info".into(),
            log_format: "json".into(),
        }
    }
}

impl Default for SecretConfig {
    fn default() -> Self {
        Self {
            env_var: "SEALBOX_MASTER_SECRET".into(),
            secret_file: None,
        }
    }
}
