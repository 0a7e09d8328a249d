//! Content hashing for run configurations.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::ResultsResult;

/// Hex SHA-256 of the JSON form of `value`.
///
/// Runs are deterministic, so equal fingerprints mean equal results.
pub fn fingerprint<T: Serialize>(value: &T) -> ResultsResult<String> {
    let json = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eaf_sim::EngineConfig;

    #[test]
    fn fingerprint_is_stable() {
        let config = EngineConfig::default();
        assert_eq!(fingerprint(&config).unwrap(), fingerprint(&config).unwrap());
        assert_eq!(fingerprint(&config).unwrap().len(), 64);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = EngineConfig::default();
        let b = EngineConfig {
            duration_s: 60.0,
            ..a
        };
        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }
}
