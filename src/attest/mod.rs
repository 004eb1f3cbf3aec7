//! Attestation service (feature-gated).
//!
//! The trusted-signer side of the commitment scheme:
//! - Wire types and service configuration with validation.
//! - A pluggable [`AttestationSigner`] with a secp256k1 personal-sign
//!   default; the key is injected at construction and never exposed.
//! - Server-side handler that decodes the raw fingerprint vector,
//!   recomputes the aggregate itself, and signs it.
//! - Client-side helpers to encode payloads and verify returned
//!   signatures independently.

pub mod client;
pub mod server;
pub mod signer;
pub mod types;

pub use client::{build_request, decode_payload, encode_payload};
pub use server::{AttestError, AttestationService};
pub use signer::{
    personal_sign_digest, verify_attestation, Attestation, AttestationSigner, Secp256k1Signer,
    SignerError, SIGNATURE_LEN,
};
pub use types::{AttestRequest, AttestResponse, ServiceConfig};
