//! Promo codes handed out on a player win.

use super::random::RandomSource;
use serde::{Deserialize, Serialize};

/// A 5-digit numeric promo code.
///
/// Generated fresh for every player win. Codes are not persisted and not
/// checked for reuse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{}", _0)]
pub struct PromoCode(String);

impl PromoCode {
    /// Smallest code.
    pub const MIN: u32 = 10_000;
    /// Largest code.
    pub const MAX: u32 = 99_999;

    /// Draws a new code.
    pub fn generate<R: RandomSource + ?Sized>(rng: &mut R) -> Self {
        Self(rng.between(Self::MIN, Self::MAX).to_string())
    }

    /// The code as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedRandom;

    #[test]
    fn test_generate_is_five_digits() {
        let mut rng = ScriptedRandom::new().with_numbers([42]);
        let code = PromoCode::generate(&mut rng);
        // Clamped up into range.
        assert_eq!(code.as_str(), "10000");
        assert_eq!(code.as_str().len(), 5);
        assert!(code.as_str().chars().all(|c| c.is_ascii_digit()));
    }
}
