use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// The SHA-256 digest of the empty string.
///
/// Used as the comparison target when a login names an unknown user, so
/// the digest comparison runs whether or not the lookup hit.
const DUMMY_DIGEST: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Hashes a password into a hex-encoded one-way digest.
///
/// # Arguments
///
/// * `password` - The password to hash.
///
/// # Returns
///
/// The hex-encoded digest.
pub fn hash_password(password: &str) -> String {
    let mut password_bytes = password.as_bytes().to_vec();

    let digest = Sha256::digest(&password_bytes);
    let encoded = hex::encode(digest);

    password_bytes.zeroize();
    tracing::debug!("Password digested successfully");
    encoded
}

/// Verifies a password against a stored digest, or against a fixed dummy
/// digest when the user is unknown.
///
/// The comparison is constant-time over the hex-encoded digests so the
/// outcome does not shape the timing.
///
/// # Arguments
///
/// * `password` - The password to verify.
/// * `stored_digest` - The stored digest, if the user exists.
///
/// # Returns
///
/// `true` iff the user exists and the password matches.
pub fn verify_password(password: &str, stored_digest: Option<&str>) -> bool {
    let candidate = hash_password(password);
    let target = stored_digest.unwrap_or(DUMMY_DIGEST);

    let matches: bool = candidate.as_bytes().ct_eq(target.as_bytes()).into();
    matches && stored_digest.is_some()
}
