use data_encoding::HEXLOWER;
use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha3::{Digest, Keccak256};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// A voter's secp256k1 wallet key pair.
pub struct WalletKey {
    signing_key: SigningKey,
}

impl WalletKey {
    /// Generate a fresh key pair from the OS entropy source.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Reconstruct a key pair from its 32-byte secret scalar.
    pub fn from_secret(secret: &[u8]) -> Result<Self> {
        let signing_key = SigningKey::from_slice(secret)
            .map_err(|_| Error::CryptoFailure("invalid wallet secret".to_string()))?;
        Ok(Self { signing_key })
    }

    /// The EIP-55 checksummed wallet address.
    pub fn address(&self) -> String {
        address_of(self.signing_key.verifying_key())
    }

    /// The raw secret scalar, wiped on drop.
    pub fn secret(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.signing_key.to_bytes().to_vec())
    }
}

/// Format a raw secret as the `0x`-prefixed lowercase hex the ledger service expects.
pub fn secret_hex(secret: &[u8]) -> Zeroizing<String> {
    let mut hex = Zeroizing::new(String::with_capacity(2 + secret.len() * 2));
    hex.push_str("0x");
    HEXLOWER.encode_append(secret, &mut hex);
    hex
}

/// Ethereum-style address: the last 20 bytes of the Keccak-256 hash of the
/// uncompressed public key (without its SEC1 tag byte).
fn address_of(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    checksum_address(&hash[12..])
}

/// EIP-55 mixed-case checksum encoding.
fn checksum_address(address: &[u8]) -> String {
    let hex = HEXLOWER.encode(address);
    let hash = Keccak256::digest(hex.as_bytes());

    let mut checksummed = String::with_capacity(2 + hex.len());
    checksummed.push_str("0x");
    for (i, c) in hex.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }
    checksummed
}
