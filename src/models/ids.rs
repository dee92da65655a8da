//! Deterministic document ids.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Id for a stored document that carries none of its own, derived from its content.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    /// SHA-256 over the `|`-joined parts, first 16 hex characters.
    pub fn generate(parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(part.as_bytes());
        }
        let hash = hex::encode(hasher.finalize());
        Self(hash[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_deterministic() {
        let first = EntityId::generate(&["raw_data", r#"{"agentId":"a1","leads":1}"#]);
        let second = EntityId::generate(&["raw_data", r#"{"agentId":"a1","leads":1}"#]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_separates_parts() {
        assert_ne!(
            EntityId::generate(&["agents", "x"]),
            EntityId::generate(&["depots", "x"])
        );
        assert_ne!(
            EntityId::generate(&["ab", "c"]),
            EntityId::generate(&["a", "bc"])
        );
    }

    #[test]
    fn test_generate_format() {
        let id = EntityId::generate(&["platoons", "{}"]);
        assert_eq!(id.as_str().len(), 16);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id.to_string(), id.as_str());
        assert!(format!("{:?}", id).starts_with("EntityId("));
    }
}
