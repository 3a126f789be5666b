//! Binary indicator vectors for bins.
//!
//! The downstream featurization stage selects items with a length-N vector
//! holding 1 at every member of the bin and 0 elsewhere.

use crate::error::{Error, Result};

/// Encodes `bin` as an indicator vector of length `len`.
///
/// # Errors
///
/// Returns [`Error::IndexOutOfRange`] if an index is `>= len`.
pub fn encode(bin: &[usize], len: usize) -> Result<Vec<u8>> {
    let mut mask = vec![0u8; len];
    for &index in bin {
        let slot = mask
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        *slot = 1;
    }
    Ok(mask)
}

/// Recovers the ascending indices whose value is 1.
pub fn decode(mask: &[u8]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter(|(_, &v)| v == 1)
        .map(|(i, _)| i)
        .collect()
}
