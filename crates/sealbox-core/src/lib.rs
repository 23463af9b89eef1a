pub mod config;
pub mod error;

pub use error::{SealboxError, SealboxResult};

/// Generated gRPC types and service traits (from sealbox.proto)
pub mod proto {
    tonic::include_proto!("sealbox");
}
