//! Shroud CLI library.
//!
//! Each subcommand reads JSON or hex inputs, calls into `shroud-crypto` and
//! produces a JSON value. Printing is left to the binary so that commands can
//! be tested without capturing stdout.

pub mod commitment_cmd;
pub mod disclosure_cmd;
pub mod envelope_cmd;
pub mod input;
pub mod key_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use shroud_core::Config;

/// Result of a subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: Value,
    /// `false` when a verification subcommand rejected its input.
    pub success: bool,
}

impl Outcome {
    pub const fn ok(output: Value) -> Self {
        Self {
            output,
            success: true,
        }
    }

    pub const fn verdict(valid: bool) -> Self {
        Self {
            output: Value::Bool(valid),
            success: valid,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "shroud")]
#[command(version, about = "Confidential transaction payload tooling", long_about = None)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Log level for Shroud crates (overrides configuration)
    #[arg(long, global = true, env = "SHROUD_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a secp256k1 key pair.
    Keygen {
        /// Save the private key here (0600) instead of printing it.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the fingerprint of a public key.
    Fingerprint {
        /// Hex-encoded SEC1 public key.
        public_key: String,
    },
    /// Encrypt a JSON payload for one or more recipients.
    Seal {
        /// Payload file, or `-` for stdin.
        #[arg(long)]
        payload: PathBuf,
        /// Recipient public key (repeatable).
        #[arg(long = "recipient", required = true)]
        recipients: Vec<String>,
    },
    /// Decrypt an envelope with a private key file.
    Open {
        #[arg(long)]
        envelope: PathBuf,
        #[arg(long)]
        key: PathBuf,
    },
    /// Commit to a JSON payload.
    Commit {
        #[arg(long)]
        payload: PathBuf,
        /// Hex nonce; 32 random bytes when omitted.
        #[arg(long)]
        nonce: Option<String>,
    },
    /// Check that a payload and nonce open a commitment hash.
    VerifyCommitment {
        #[arg(long)]
        payload: PathBuf,
        #[arg(long)]
        nonce: String,
        #[arg(long)]
        hash: String,
    },
    /// Reveal selected fields of a JSON object payload.
    Disclose {
        #[arg(long)]
        payload: PathBuf,
        /// Field to reveal (repeatable).
        #[arg(long = "field")]
        fields: Vec<String>,
    },
    /// Check a disclosure against a root.
    VerifyDisclosure {
        #[arg(long)]
        disclosure: PathBuf,
        #[arg(long)]
        root: String,
    },
    /// Sign a commitment hash.
    Sign {
        #[arg(long)]
        key: PathBuf,
        #[arg(long)]
        hash: String,
    },
    /// Verify a signature over a commitment hash.
    VerifySignature {
        #[arg(long)]
        public_key: String,
        #[arg(long)]
        hash: String,
        #[arg(long)]
        signature: String,
    },
}

/// Execute a subcommand under the resolved configuration.
pub fn run(command: Command, config: &Config) -> anyhow::Result<Outcome> {
    match command {
        Command::Keygen { out } => key_cmd::keygen(out.as_deref()),
        Command::Fingerprint { public_key } => key_cmd::fingerprint(&public_key),
        Command::Seal {
            payload,
            recipients,
        } => envelope_cmd::seal(&payload, &recipients, &config.limits),
        Command::Open { envelope, key } => envelope_cmd::open(&envelope, &key),
        Command::Commit { payload, nonce } => commitment_cmd::commit(&payload, nonce.as_deref()),
        Command::VerifyCommitment {
            payload,
            nonce,
            hash,
        } => commitment_cmd::verify(&payload, &nonce, &hash),
        Command::Disclose { payload, fields } => disclosure_cmd::disclose(&payload, fields),
        Command::VerifyDisclosure { disclosure, root } => {
            disclosure_cmd::verify(&disclosure, &root)
        }
        Command::Sign { key, hash } => key_cmd::sign(&key, &hash),
        Command::VerifySignature {
            public_key,
            hash,
            signature,
        } => Ok(key_cmd::verify_signature(&public_key, &hash, &signature)),
    }
}
