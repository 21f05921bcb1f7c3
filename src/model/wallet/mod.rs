//! Voter wallet keys and their custody at rest.

mod custody;
mod keypair;

pub use custody::{KeyCustody, MASTER_KEY_LENGTH, NONCE_LENGTH, TAG_LENGTH};
pub use keypair::{secret_hex, WalletKey};
