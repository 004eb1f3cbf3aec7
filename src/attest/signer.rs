use crate::fingerprint::AggregateFingerprint;
use crate::FingerprintAlgorithm;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use std::fmt;

/// Length of an attestation signature: r (32) || s (32) || v (1).
pub const SIGNATURE_LEN: usize = 65;

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
    #[error("signing failed: {0}")]
    Signing(String),
}

/// A trusted party's signature over an aggregate fingerprint, in the
/// r || s || v layout the on-chain verifier expects (v is 27 or 28).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Attestation([u8; SIGNATURE_LEN]);

impl Attestation {
    pub fn from_bytes(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, SignerError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| SignerError::Signing(e.to_string()))?;
        let bytes: [u8; SIGNATURE_LEN] = bytes
            .try_into()
            .map_err(|_| SignerError::Signing("signature must be 65 bytes".into()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Attestation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attestation({})", self.to_hex())
    }
}

impl fmt::Display for Attestation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Digest a wallet actually signs: the EIP-191 personal-sign envelope over
/// the 32-byte aggregate. Always Keccak-256, whatever algorithm produced
/// the aggregate itself, because that is the wallet standard.
pub fn personal_sign_digest(aggregate: &AggregateFingerprint) -> [u8; 32] {
    let mut data = Vec::with_capacity(28 + 32);
    data.extend_from_slice(b"\x19Ethereum Signed Message:\n32");
    data.extend_from_slice(aggregate.as_bytes());
    FingerprintAlgorithm::calculate_keccak256(&data)
}

/// Verify an attestation against a known uncompressed SEC1 public key.
///
/// Recovers the key from the prehash the way the on-chain verifier does and
/// compares it with the expected one.
pub fn verify_attestation(
    public_key_sec1: &[u8],
    aggregate: &AggregateFingerprint,
    attestation: &Attestation,
) -> bool {
    let digest = personal_sign_digest(aggregate);
    let bytes = attestation.as_bytes();
    let Some(parity) = bytes[SIGNATURE_LEN - 1].checked_sub(27) else {
        return false;
    };
    let Some(recovery_id) = RecoveryId::from_byte(parity) else {
        return false;
    };
    let Ok(signature) = EcdsaSignature::from_slice(&bytes[..SIGNATURE_LEN - 1]) else {
        return false;
    };
    let Ok(recovered) = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)
    else {
        return false;
    };
    recovered.to_encoded_point(false).as_bytes() == public_key_sec1
}

/// The signing side of the attestation service.
///
/// Implementations hold the key exclusively; callers only ever see
/// signatures and the public half.
pub trait AttestationSigner: Send + Sync {
    fn sign(&self, aggregate: &AggregateFingerprint) -> Result<Attestation, SignerError>;
    fn verify(&self, aggregate: &AggregateFingerprint, attestation: &Attestation) -> bool;
}

/// Default secp256k1 signer, compatible with Ethereum personal-sign.
///
/// The key is injected once at construction and never leaves this struct;
/// `Debug` deliberately prints only the derived address.
pub struct Secp256k1Signer {
    key: SigningKey,
}

impl Secp256k1Signer {
    /// Load the signing key from a hex string (`0x`-prefix optional).
    ///
    /// Fails fast on malformed or out-of-range keys so a misconfigured
    /// service refuses to start instead of signing with a bad key.
    pub fn from_hex(key_hex: &str) -> Result<Self, SignerError> {
        let trimmed = key_hex.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if stripped.is_empty() {
            return Err(SignerError::InvalidKey("signing key is empty".into()));
        }
        let bytes = hex::decode(stripped).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        let key =
            SigningKey::from_slice(&bytes).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Uncompressed SEC1 public key (0x04-prefixed, 65 bytes).
    pub fn public_key_sec1(&self) -> Vec<u8> {
        self.key
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }

    /// Ethereum address: last 20 bytes of keccak256 of the public key body.
    pub fn address(&self) -> [u8; 20] {
        let encoded = self.key.verifying_key().to_encoded_point(false);
        let hash = FingerprintAlgorithm::calculate_keccak256(&encoded.as_bytes()[1..]);
        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..32]);
        address
    }

    pub fn address_hex(&self) -> String {
        format!("0x{}", hex::encode(self.address()))
    }
}

impl fmt::Debug for Secp256k1Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secp256k1Signer")
            .field("address", &self.address_hex())
            .finish_non_exhaustive()
    }
}

impl AttestationSigner for Secp256k1Signer {
    fn sign(&self, aggregate: &AggregateFingerprint) -> Result<Attestation, SignerError> {
        let digest = personal_sign_digest(aggregate);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| SignerError::Signing(e.to_string()))?;
        let mut out = [0u8; SIGNATURE_LEN];
        out[..SIGNATURE_LEN - 1].copy_from_slice(&signature.to_bytes());
        out[SIGNATURE_LEN - 1] = 27 + recovery_id.to_byte();
        Ok(Attestation(out))
    }

    fn verify(&self, aggregate: &AggregateFingerprint, attestation: &Attestation) -> bool {
        verify_attestation(&self.public_key_sec1(), aggregate, attestation)
    }
}
