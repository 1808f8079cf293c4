//! Document fingerprints for log correlation.

use sha2::{Digest, Sha256};

/// SHA-256 of a serialized document, hex encoded.
///
/// Logged next to each submission so an operator can match a log line with
/// the debug sink output or a node agent trace without logging the document.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_consistency() {
        let content = r#"<RTML uid="TOM-1"/>"#;
        assert_eq!(calculate_checksum(content), calculate_checksum(content));
    }

    #[test]
    fn test_different_content_different_checksum() {
        assert_ne!(
            calculate_checksum(r#"<RTML uid="TOM-1"/>"#),
            calculate_checksum(r#"<RTML uid="TOM-2"/>"#)
        );
    }

    #[test]
    fn test_checksum_is_hex_sha256() {
        let sum = calculate_checksum("");
        assert_eq!(
            sum,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
