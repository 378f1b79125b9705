//! Plain-text substitution strategy

use crate::substitute::{Substitutor, Swap, SwapError};

/// Substring substitution for opaque text descriptors.
///
/// Models the original one-shot edit (`sed -i 's/main.rs/dummy.rs/'`) but
/// with explicit failure when the pattern is absent.
pub struct TextSubstitutor;

impl Substitutor for TextSubstitutor {
    fn swap(&self, content: &str, from: &str, to: &str) -> Result<Swap, SwapError> {
        if content.contains(from) {
            Ok(Swap::Applied(content.replace(from, to)))
        } else if content.contains(to) {
            Ok(Swap::AlreadyApplied)
        } else {
            Err(SwapError::TargetNotFound)
        }
    }
}
