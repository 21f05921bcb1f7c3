use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use data_encoding::{BASE64, HEXLOWER_PERMISSIVE};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Length of an AES-256 master key, in bytes.
pub const MASTER_KEY_LENGTH: usize = 32;
/// Length of an AES-GCM nonce, in bytes.
pub const NONCE_LENGTH: usize = 12;
/// Length of an AES-GCM authentication tag, in bytes.
pub const TAG_LENGTH: usize = 16;

/// Envelope encryption of wallet secrets under the server-held master key.
///
/// Sealed blobs are `base64(nonce || ciphertext || tag)`.
#[derive(Clone)]
pub struct KeyCustody {
    cipher: Aes256Gcm,
}

impl KeyCustody {
    /// Load the master key from its hex encoding.
    ///
    /// Keys that are the wrong length, or consist of one repeated byte, are
    /// rejected: this is only called during ignition, where failure is fatal.
    pub fn from_hex(master_key: &str) -> Result<Self> {
        let key = Zeroizing::new(
            HEXLOWER_PERMISSIVE
                .decode(master_key.trim().as_bytes())
                .map_err(|_| Error::CryptoFailure("master key is not valid hex".to_string()))?,
        );
        Self::from_bytes(&key)
    }

    pub fn from_bytes(key: &[u8]) -> Result<Self> {
        if key.len() != MASTER_KEY_LENGTH {
            return Err(Error::CryptoFailure(format!(
                "master key must be {MASTER_KEY_LENGTH} bytes, got {}",
                key.len()
            )));
        }
        if key.iter().all(|byte| *byte == key[0]) {
            return Err(Error::CryptoFailure(
                "master key is a single repeated byte".to_string(),
            ));
        }
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| Error::CryptoFailure("invalid master key".to_string()))?;
        Ok(Self { cipher })
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String> {
        let mut nonce = [0_u8; NONCE_LENGTH];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|e| Error::CryptoFailure(format!("entropy source failed: {e}")))?;

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| Error::CryptoFailure("encryption failed".to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(&blob))
    }

    /// Authenticate and decrypt a blob produced by [`KeyCustody::seal`].
    ///
    /// Nothing is returned unless the tag verifies.
    pub fn open(&self, blob: &str) -> Result<Zeroizing<Vec<u8>>> {
        let data = BASE64
            .decode(blob.as_bytes())
            .map_err(|_| Error::CryptoFailure("sealed blob is not valid base64".to_string()))?;
        if data.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(Error::CryptoFailure("sealed blob is too short".to_string()));
        }

        let (nonce, ciphertext) = data.split_at(NONCE_LENGTH);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| Error::CryptoFailure("sealed blob failed authentication".to_string()))
    }
}


#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn rejects_weak_master_keys() {
        assert!(KeyCustody::from_hex("").is_err());
        assert!(KeyCustody::from_hex("not hex at all").is_err());
        assert!(KeyCustody::from_hex(&"00".repeat(16)).is_err());
        assert!(KeyCustody::from_hex(&"00".repeat(MASTER_KEY_LENGTH)).is_err());
        assert!(KeyCustody::from_hex(&"ab".repeat(MASTER_KEY_LENGTH)).is_err());
        assert!(KeyCustody::from_hex(KeyCustody::EXAMPLE_KEY).is_ok());
    }

    #[test]
    fn nonces_are_fresh() {
        let custody = KeyCustody::example();
        let first = custody.seal(b"same secret").unwrap();
        let second = custody.seal(b"same secret").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn rejects_short_and_malformed_blobs() {
        let custody = KeyCustody::example();
        let short = BASE64.encode(&[0_u8; NONCE_LENGTH + TAG_LENGTH - 1]);
        for blob in ["", "!!!", short.as_str()] {
            assert!(matches!(custody.open(blob), Err(Error::CryptoFailure(_))));
        }
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = KeyCustody::example().seal(b"wallet key").unwrap();
        let other = KeyCustody::from_hex(&format!("{}a5", "5a".repeat(31))).unwrap();
        assert!(matches!(other.open(&sealed), Err(Error::CryptoFailure(_))));
    }

    proptest! {
        #[test]
        fn seal_then_open_round_trips(plaintext in proptest::collection::vec(any::<u8>(), 0..128)) {
            let custody = KeyCustody::example();
            let sealed = custody.seal(&plaintext).unwrap();
            let opened = custody.open(&sealed).unwrap();
            prop_assert_eq!(opened.as_slice(), plaintext.as_slice());
        }

        #[test]
        fn any_flipped_bit_is_detected(
            plaintext in proptest::collection::vec(any::<u8>(), 1..64),
            position in any::<prop::sample::Index>(),
            bit in 0_u8..8,
        ) {
            let custody = KeyCustody::example();
            let sealed = custody.seal(&plaintext).unwrap();
            let mut raw = BASE64.decode(sealed.as_bytes()).unwrap();
            let index = position.index(raw.len());
            raw[index] ^= 1 << bit;
            let tampered = BASE64.encode(&raw);
            prop_assert!(matches!(custody.open(&tampered), Err(Error::CryptoFailure(_))));
        }
    }
}
