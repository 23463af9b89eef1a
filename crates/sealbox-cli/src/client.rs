//! Daemon connection and failure classification

use anyhow::{Context, Result};
use std::path::Path;
use tonic::transport::{Channel, Endpoint, Uri};
use tower::service_fn;

use sealbox_core::proto::sealbox_client::SealboxClient;

/// Connect to sealboxd over its Unix domain socket.
pub async fn connect(socket_path: &Path) -> Result<SealboxClient<Channel>> {
    let path = socket_path.to_path_buf();

    // tonic over Unix domain socket: use a tower service_fn connector
    let channel = Endpoint::from_static("http://[::]:0")
        .connect_with_connector(service_fn(move |_: Uri| {
            let path = path.clone();
            async move {
                let stream = tokio::net::UnixStream::connect(&path).await?;
                Ok::<_, std::io::Error>(hyper_util::rt::TokioIo::new(stream))
            }
        }))
        .await
        .with_context(|| format!("connecting to sealboxd at {}", socket_path.display()))?;

    Ok(SealboxClient::new(channel))
}

/// How a failed call should be understood by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The service never reached a determination: connection lost mid-call,
    /// timeout, or the channel went away.
    Transport,
    /// The service answered with a structured error (validation,
    /// configuration, or a cryptographic failure).
    Service,
}

/// Classify a failed RPC: "service didn't answer" versus "service answered
/// with a failure". Only transport failures are worth retrying; retrying is
/// always safe because every encryption call draws a fresh salt and nonce.
pub fn classify(status: &tonic::Status) -> FailureKind {
    match status.code() {
        tonic::Code::Unavailable | tonic::Code::DeadlineExceeded | tonic::Code::Cancelled => {
            FailureKind::Transport
        }
        _ => FailureKind::Service,
    }
}
