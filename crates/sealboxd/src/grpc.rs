//! tonic gRPC server over Unix domain socket

use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::Path;
use std::sync::Arc;
use tokio::net::UnixListener;
use tokio_stream::wrappers::UnixListenerStream;
use tonic::transport::Server;
use tracing::info;

use sealbox_core::proto::{
    sealbox_server::{Sealbox, SealboxServer},
    DecryptFileResponse, DecryptRequest, DecryptResponse, EncryptFileRequest, EncryptRequest,
    EncryptResponse, StatusRequest, StatusResponse,
};
use sealbox_crypto::{CryptoError, EncryptionService, FilePayload};

use crate::metrics::Metrics;

/// Implementation of the Sealbox gRPC service
pub struct SealboxImpl {
    service: Arc<EncryptionService>,
    metrics: Arc<Metrics>,
    start_time: std::time::Instant,
}

impl SealboxImpl {
    pub fn new(service: Arc<EncryptionService>, metrics: Arc<Metrics>) -> Self {
        Self {
            service,
            metrics,
            start_time: std::time::Instant::now(),
        }
    }

    /// Record the outcome of one operation and convert its failure, if any,
    /// into a gRPC status. Payloads are never logged — only action and kind.
    fn finish<T>(
        &self,
        action: &'static str,
        result: Result<T, CryptoError>,
    ) -> Result<tonic::Response<T>, tonic::Status> {
        match result {
            Ok(value) => {
                self.metrics.record(action, None);
                tracing::debug!(action, "request ok");
                Ok(tonic::Response::new(value))
            }
            Err(e) => {
                self.metrics.record(action, Some(&e));
                tracing::warn!(action, error = %e, "request failed");
                Err(status_from(e))
            }
        }
    }
}

/// Map crypto failures to gRPC status codes.
///
/// Validation and malformed-envelope problems are the caller's fault
/// (InvalidArgument); a missing master secret is a deployment precondition
/// (FailedPrecondition); a failed authentication tag means the data cannot
/// be recovered as-is (DataLoss).
fn status_from(err: CryptoError) -> tonic::Status {
    use tonic::Status;
    match &err {
        CryptoError::NotConfigured => Status::failed_precondition(err.to_string()),
        CryptoError::InvalidRequest(_) => Status::invalid_argument(err.to_string()),
        CryptoError::MalformedEnvelope(_) => Status::invalid_argument(err.to_string()),
        CryptoError::AuthenticationFailed => Status::data_loss(err.to_string()),
        CryptoError::PayloadFormat(_) => Status::invalid_argument(err.to_string()),
        CryptoError::KeyDerivation(_) => Status::internal(err.to_string()),
    }
}

#[tonic::async_trait]
impl Sealbox for SealboxImpl {
    async fn status(
        &self,
        _request: tonic::Request<StatusRequest>,
    ) -> Result<tonic::Response<StatusResponse>, tonic::Status> {
        let status = self.service.status();
        self.metrics.record("status", None);
        Ok(tonic::Response::new(StatusResponse {
            version: env!("CARGO_PKG_VERSION").into(),
            available: status.available,
            configured: status.configured,
            uptime_secs: self.start_time.elapsed().as_secs() as i64,
        }))
    }

    async fn encrypt(
        &self,
        request: tonic::Request<EncryptRequest>,
    ) -> Result<tonic::Response<EncryptResponse>, tonic::Status> {
        let req = request.into_inner();
        let result = self
            .service
            .encrypt(&req.plaintext)
            .map(|envelope| EncryptResponse { envelope });
        self.finish("encrypt", result)
    }

    async fn decrypt(
        &self,
        request: tonic::Request<DecryptRequest>,
    ) -> Result<tonic::Response<DecryptResponse>, tonic::Status> {
        let req = request.into_inner();
        let result = self
            .service
            .decrypt(&req.envelope)
            .map(|plaintext| DecryptResponse { plaintext });
        self.finish("decrypt", result)
    }

    async fn encrypt_file(
        &self,
        request: tonic::Request<EncryptFileRequest>,
    ) -> Result<tonic::Response<EncryptResponse>, tonic::Status> {
        let req = request.into_inner();
        let result = STANDARD
            .decode(&req.content)
            .map_err(|e| CryptoError::InvalidRequest(format!("invalid content base64: {e}")))
            .and_then(|content| {
                self.service.encrypt_file(&FilePayload {
                    content,
                    filename: req.filename,
                    mime_type: req.mime_type,
                })
            })
            .map(|envelope| EncryptResponse { envelope });
        self.finish("encrypt_file", result)
    }

    async fn decrypt_file(
        &self,
        request: tonic::Request<DecryptRequest>,
    ) -> Result<tonic::Response<DecryptFileResponse>, tonic::Status> {
        let req = request.into_inner();
        let result = self
            .service
            .decrypt_file(&req.envelope)
            .map(|payload| DecryptFileResponse {
                content: STANDARD.encode(&payload.content),
                filename: payload.filename,
                mime_type: payload.mime_type,
            });
        self.finish("decrypt_file", result)
    }
}

/// Start the gRPC server on a Unix domain socket
pub async fn serve(socket_path: &Path, impl_: SealboxImpl) -> Result<()> {
    // Remove stale socket if it exists
    if socket_path.exists() {
        tokio::fs::remove_file(socket_path).await?;
    }

    // Create parent directory if needed
    if let Some(parent) = socket_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let listener = UnixListener::bind(socket_path)?;
    let stream = UnixListenerStream::new(listener);

    info!(socket = %socket_path.display(), "gRPC server ready");

    Server::builder()
        .add_service(SealboxServer::new(impl_))
        .serve_with_incoming(stream)
        .await
        .map_err(|e| anyhow::anyhow!("gRPC server error: {e}"))
}
