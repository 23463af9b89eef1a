//! Daemon lifecycle: master secret load, metrics endpoint, systemd notify, gRPC server

use anyhow::Result;
use sealbox_core::config::SealboxConfig;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::grpc::SealboxImpl;
use crate::metrics::{HealthState, Metrics};

pub async fn run(config: SealboxConfig) -> Result<()> {
    info!("daemon starting");

    // The master secret is read exactly once; there is no hot reload. A
    // missing secret is a valid state: status still answers, crypto
    // operations are rejected until a restart provides one.
    let master = load_master_secret(&config).await;
    if master.is_none() {
        warn!("no master secret — serving unconfigured (crypto operations will be rejected)");
    }

    let service = Arc::new(sealbox_crypto::EncryptionService::new(master));
    let metrics = Arc::new(Metrics::new());

    // Prometheus metrics + health endpoints
    if let Some(addr) = config.daemon.metrics_addr.clone() {
        let state = HealthState {
            metrics: metrics.clone(),
            service: service.clone(),
        };
        tokio::spawn(async move {
            if let Err(e) = crate::metrics::serve(addr, state).await {
                error!("metrics server failed: {e}");
            }
        });
    }

    // Send systemd ready notification
    notify_ready();

    let socket_path = config.daemon.socket.clone();
    let impl_ = SealboxImpl::new(service, metrics);

    info!(socket = %socket_path.display(), "gRPC: listening");

    crate::grpc::serve(&socket_path, impl_).await
}

/// Read the master secret: env var first, then the configured secret file.
///
/// Returns `None` when neither source yields a non-empty value. Only the
/// source of the secret is ever logged, never the value.
async fn load_master_secret(config: &SealboxConfig) -> Option<SecretString> {
    if let Ok(value) = std::env::var(&config.secret.env_var) {
        if !value.is_empty() {
            info!(source = %config.secret.env_var, "master secret loaded from environment");
            return Some(SecretString::from(value));
        }
    }

    if let Some(path) = &config.secret.secret_file {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => {
                let trimmed = contents.trim_end_matches(['\r', '\n']);
                if trimmed.is_empty() {
                    warn!(path = %path.display(), "secret file is empty");
                } else {
                    info!(source = %path.display(), "master secret loaded from file");
                    return Some(SecretString::from(trimmed.to_string()));
                }
            }
            Err(e) => warn!(path = %path.display(), "secret file unreadable: {e}"),
        }
    }

    None
}

fn notify_ready() {
    // Send sd_notify(READY=1) to systemd if running as a service
    // Uses $NOTIFY_SOCKET env var; no-op if not set
    if let Ok(socket) = std::env::var("NOTIFY_SOCKET") {
        use std::os::unix::net::UnixDatagram;
        if let Ok(sock) = UnixDatagram::unbound() {
            let _ = sock.send_to(b"READY=1\n", &socket);
            tracing::debug!(notify_socket = %socket, "sent systemd READY=1");
        }
    }
}
