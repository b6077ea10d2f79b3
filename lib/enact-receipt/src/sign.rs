use hmac::{Hmac, Mac};
use sha2::Sha256;

use enact_model::Receipt;

use crate::secret::Secret;

type HmacSha256 = Hmac<Sha256>;

/// Signs `receipt` in place: computes HMAC-SHA256 over its canonical JSON form and stores the
/// hex-encoded digest in `receipt.signature`. Any prior signature is overwritten.
pub fn sign(receipt: &mut Receipt, secret: &Secret) {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts a key of any length");
    mac.update(receipt.canonical_json().as_bytes());
    receipt.signature = hex::encode(mac.finalize().into_bytes());
}

/// Recomputes the HMAC over `receipt`'s canonical JSON and compares it against
/// `receipt.signature` in constant time. Returns `false` both when the signature was never set
/// and when it was tampered with — callers don't need to distinguish the two.
pub fn verify(receipt: &Receipt, secret: &Secret) -> bool {
    let Ok(expected) = hex::decode(&receipt.signature) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts a key of any length");
    mac.update(receipt.canonical_json().as_bytes());
    mac.verify_slice(&expected).is_ok()
}
