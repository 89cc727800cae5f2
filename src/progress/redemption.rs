//! Redemption codes handed out to winners for prize pickup.

use rand::{Rng, rng};

/// Prefix used when the configuration does not provide one.
pub const DEFAULT_PREFIX: &str = "HUNT-";
/// Number of random characters appended after the prefix.
pub const SUFFIX_LENGTH: usize = 6;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Issues human-presentable one-time codes: a fixed prefix followed by an
/// upper-cased base-36 suffix.
///
/// No uniqueness check is performed against earlier codes.
#[derive(Debug, Clone)]
pub struct RedemptionCodeGenerator {
    prefix: String,
}

impl RedemptionCodeGenerator {
    /// Build a generator emitting codes that start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Prefix every generated code starts with.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate a fresh code using the thread-local RNG.
    pub fn generate(&self) -> String {
        self.generate_with(&mut rng())
    }

    /// Generate a fresh code drawing the suffix from `rng`.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut code = String::with_capacity(self.prefix.len() + SUFFIX_LENGTH);
        code.push_str(&self.prefix);
        for _ in 0..SUFFIX_LENGTH {
            let index = rng.random_range(0..ALPHABET.len());
            code.push(char::from(ALPHABET[index]));
        }
        code
    }

    /// Whether `code` has the shape produced by this generator.
    pub fn matches_shape(&self, code: &str) -> bool {
        code.strip_prefix(self.prefix.as_str())
            .is_some_and(|suffix| {
                suffix.len() == SUFFIX_LENGTH
                    && suffix
                        .chars()
                        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
            })
    }
}

impl Default for RedemptionCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generated_codes_have_prefix_and_uppercase_suffix() {
        let generator = RedemptionCodeGenerator::new("DEVFEST-");
        for _ in 0..100 {
            let code = generator.generate();
            assert!(code.starts_with("DEVFEST-"), "unexpected code {code}");
            assert_eq!(code.len(), "DEVFEST-".len() + SUFFIX_LENGTH);
            assert!(generator.matches_shape(&code), "unexpected code {code}");
        }
    }

    #[test]
    fn thousand_codes_do_not_collide() {
        let generator = RedemptionCodeGenerator::default();
        let codes = (0..1000)
            .map(|_| generator.generate())
            .collect::<HashSet<_>>();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn shape_check_rejects_foreign_codes() {
        let generator = RedemptionCodeGenerator::default();
        assert!(generator.matches_shape("HUNT-A1B2C3"));
        assert!(!generator.matches_shape("HUNT-a1b2c3"));
        assert!(!generator.matches_shape("HUNT-A1B2C"));
        assert!(!generator.matches_shape("PRIZE-A1B2C3"));
        assert!(!generator.matches_shape("HUNT-A1B2C3D"));
    }
}
