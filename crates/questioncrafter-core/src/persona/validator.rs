//! Guard against persona names the model invents.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

use super::catalog::PersonaCatalog;
use crate::error::{CrafterError, Result};

/// Map every candidate to a catalog key.
///
/// Exact matches are kept. Anything else is replaced by a persona drawn
/// uniformly from the whole catalog, so the output may contain repeats.
pub fn validate_selection<R: Rng + ?Sized>(
    catalog: &PersonaCatalog,
    candidates: &[String],
    rng: &mut R,
) -> Result<Vec<String>> {
    candidates
        .iter()
        .map(|candidate| {
            if catalog.contains(candidate) {
                return Ok(candidate.clone());
            }
            let replacement = catalog.names().choose(rng).cloned().ok_or_else(|| {
                CrafterError::EmptyCatalog {
                    candidate: candidate.clone(),
                }
            })?;
            warn!(
                invalid = %candidate,
                replacement = %replacement,
                "invalid persona selected; substituting a random valid persona"
            );
            Ok(replacement)
        })
        .collect()
}
