//! Shared-secret credential check for the sensor endpoints.
//!
//! A single trusted feed posts with one secret; we compare its SHA-1 hex
//! digest against a configured constant. This is not a user-auth mechanism
//! and is documented as such.

use sha1::{Digest, Sha1};

/// Digest of the default shared secret. Override via config/env in any real
/// deployment.
pub const DEFAULT_CREDENTIAL_DIGEST: &str = "12e460a105e1c536ebcd8679d288b6f6aee5792c";

/// Hex-encoded SHA-1 digest of a credential string.
pub fn credential_hash(credential: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(credential.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a supplied credential against the expected hex digest.
pub fn verify_credential(supplied: &str, expected_digest: &str) -> bool {
    credential_hash(supplied) == expected_digest.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trip() {
        let digest = credential_hash("piwx-station");
        assert_eq!(digest, DEFAULT_CREDENTIAL_DIGEST);
        assert!(verify_credential("piwx-station", &digest));
    }

    #[test]
    fn rejects_wrong_secret() {
        assert!(!verify_credential("not-the-secret", DEFAULT_CREDENTIAL_DIGEST));
        assert!(!verify_credential("", DEFAULT_CREDENTIAL_DIGEST));
    }

    #[test]
    fn digest_comparison_is_case_insensitive() {
        let digest = credential_hash("piwx-station").to_uppercase();
        assert!(verify_credential("piwx-station", &digest));
    }
}
