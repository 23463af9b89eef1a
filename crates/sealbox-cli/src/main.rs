//! sealbox: encryption service CLI
//!
//! Commands:
//!   status                   - show daemon availability and configuration
//!   encrypt <text>           - encrypt a string, print the base64 envelope
//!   decrypt <envelope>       - decrypt a base64 envelope, print the plaintext
//!   encrypt-file <path>      - encrypt a file (content + name + MIME type)
//!   decrypt-file <envelope>  - decrypt a file envelope, write the file back out

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod client;
mod transport;

use client::FailureKind;
use sealbox_core::config::SealboxConfig;
use sealbox_core::proto::{DecryptRequest, EncryptFileRequest, EncryptRequest, StatusRequest};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "sealbox",
    version,
    about = "sealbox encryption service client",
    long_about = "sealbox: encrypt and decrypt texts and files via the sealboxd daemon"
)]
struct Cli {
    /// Path to sealbox.toml configuration file
    #[arg(
        long,
        short = 'c',
        env = "SEALBOX_CONFIG",
        default_value = "/etc/sealbox/config.toml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show service availability and whether a master secret is configured
    Status,

    /// Encrypt a UTF-8 string; prints the base64 envelope
    Encrypt {
        text: String,
    },

    /// Decrypt a base64 envelope; prints the plaintext
    Decrypt {
        envelope: String,
    },

    /// Encrypt a file with its name and MIME type
    #[command(name = "encrypt-file")]
    EncryptFile {
        path: PathBuf,
        /// MIME type recorded alongside the content
        #[arg(long, default_value = "application/octet-stream")]
        mime: String,
    },

    /// Decrypt a file envelope and write the recovered file
    #[command(name = "decrypt-file")]
    DecryptFile {
        /// Base64 envelope, or @path to read it from a file
        envelope: String,
        /// Output path (default: the recovered filename, in the current directory)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config).await?;

    match cli.command {
        Commands::Status => cmd_status(&config).await,
        Commands::Encrypt { text } => cmd_encrypt(&config, &text).await,
        Commands::Decrypt { envelope } => cmd_decrypt(&config, &envelope).await,
        Commands::EncryptFile { path, mime } => cmd_encrypt_file(&config, &path, &mime).await,
        Commands::DecryptFile { envelope, out } => {
            cmd_decrypt_file(&config, &envelope, out.as_deref()).await
        }
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

async fn load_config(path: &Path) -> Result<SealboxConfig> {
    if path.exists() {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config: {}", path.display()))
    } else {
        Ok(SealboxConfig::default())
    }
}

// ── Error rendering ───────────────────────────────────────────────────────────

/// Render a failed RPC with its classification, so "could not reach the
/// service" reads differently from "the service rejected the request".
fn rpc_error(action: &str, status: tonic::Status) -> anyhow::Error {
    match client::classify(&status) {
        FailureKind::Transport => anyhow::anyhow!(
            "could not reach sealboxd for {action}: {} (is the daemon running?)",
            status.message()
        ),
        FailureKind::Service => anyhow::anyhow!("{action} failed: {}", status.message()),
    }
}

// ── `sealbox status` ──────────────────────────────────────────────────────────

async fn cmd_status(config: &SealboxConfig) -> Result<()> {
    let socket = &config.daemon.socket;

    if !socket.exists() {
        eprintln!("sealboxd: socket not found at {}", socket.display());
        eprintln!("          Is sealboxd running?  Try: sealboxd --config /etc/sealbox/config.toml");
        std::process::exit(1);
    }

    let mut client = client::connect(socket).await?;

    let status = client
        .status(tonic::Request::new(StatusRequest {}))
        .await
        .map_err(|s| rpc_error("status", s))?
        .into_inner();

    println!("sealboxd v{}", status.version);
    println!("  uptime:     {}", format_uptime(status.uptime_secs));
    println!("  socket:     {}", socket.display());
    println!(
        "  available:  {}",
        if status.available { "yes" } else { "no" }
    );
    println!(
        "  configured: {}",
        if status.configured {
            "yes (master secret loaded)"
        } else {
            "NO (encrypt/decrypt will be rejected)"
        }
    );

    Ok(())
}

// ── `sealbox encrypt` / `sealbox decrypt` ─────────────────────────────────────

async fn cmd_encrypt(config: &SealboxConfig, text: &str) -> Result<()> {
    let mut client = client::connect(&config.daemon.socket).await?;

    let resp = client
        .encrypt(tonic::Request::new(EncryptRequest {
            plaintext: text.to_string(),
        }))
        .await
        .map_err(|s| rpc_error("encrypt", s))?;

    println!("{}", resp.into_inner().envelope);
    Ok(())
}

async fn cmd_decrypt(config: &SealboxConfig, envelope: &str) -> Result<()> {
    let mut client = client::connect(&config.daemon.socket).await?;

    let resp = client
        .decrypt(tonic::Request::new(DecryptRequest {
            envelope: envelope.to_string(),
        }))
        .await
        .map_err(|s| rpc_error("decrypt", s))?;

    println!("{}", resp.into_inner().plaintext);
    Ok(())
}

// ── `sealbox encrypt-file` / `sealbox decrypt-file` ───────────────────────────

async fn cmd_encrypt_file(config: &SealboxConfig, path: &Path, mime: &str) -> Result<()> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .with_context(|| format!("{}: path has no file name", path.display()))?;
    let content = transport::file_to_transportable(path)?;

    let mut client = client::connect(&config.daemon.socket).await?;

    let resp = client
        .encrypt_file(tonic::Request::new(EncryptFileRequest {
            content,
            filename,
            mime_type: mime.to_string(),
        }))
        .await
        .map_err(|s| rpc_error("encrypt-file", s))?;

    println!("{}", resp.into_inner().envelope);
    Ok(())
}

async fn cmd_decrypt_file(
    config: &SealboxConfig,
    envelope: &str,
    out: Option<&Path>,
) -> Result<()> {
    let envelope = if let Some(path) = envelope.strip_prefix('@') {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading envelope from {path}"))?
            .trim()
            .to_string()
    } else {
        envelope.to_string()
    };

    let mut client = client::connect(&config.daemon.socket).await?;

    let file = client
        .decrypt_file(tonic::Request::new(DecryptRequest { envelope }))
        .await
        .map_err(|s| rpc_error("decrypt-file", s))?
        .into_inner();

    let content = transport::blob_from_transportable(&file.content)?;
    let dest = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&file.filename));

    std::fs::write(&dest, &content).with_context(|| format!("writing {}", dest.display()))?;

    println!(
        "Recovered {} ({} bytes, {})",
        dest.display(),
        content.len(),
        file.mime_type
    );
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn format_uptime(secs: i64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}
