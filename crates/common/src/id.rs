//! ID generation utilities.

use ulid::Ulid;

/// Prefix carried by every client-generated voter identity.
pub const VOTER_ID_PREFIX: &str = "v_";

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs sort lexicographically by creation time, which keeps them
    /// usable as a tie-breaker when ordering reports by recency.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate an anonymous voter identity.
    ///
    /// The value identifies a ballot slot on one device, not a person.
    #[must_use]
    pub fn generate_voter_id(&self) -> String {
        format!("{VOTER_ID_PREFIX}{}", self.generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
        assert_eq!(id1, id1.to_lowercase());
    }

    #[test]
    fn test_generate_voter_id() {
        let id_gen = IdGenerator::new();
        let voter = id_gen.generate_voter_id();

        assert!(voter.starts_with(VOTER_ID_PREFIX));
        assert_eq!(voter.len(), VOTER_ID_PREFIX.len() + 26);
        assert_ne!(voter, id_gen.generate_voter_id());
    }
}
