//! Body checksum: XXH64 (seed 0) truncated to its low 32 bits.
//!
//! Detects accidental corruption only; it is not a MAC.

use xxhash_rust::xxh64::xxh64;

use crate::error::{FrameError, Result};
use crate::header::Header;

const SEED: u64 = 0;

/// Digest of `body` as carried in [`Header::checksum`].
pub fn checksum(body: &[u8]) -> u32 {
    xxh64(body, SEED) as u32
}

/// Check `body` against the checksum in `header`.
///
/// Returns [`FrameError::CorruptedPayload`] on mismatch.
pub fn verify_checksum(header: &Header, body: &[u8]) -> Result<()> {
    let actual = checksum(body);
    if actual != header.checksum() {
        return Err(FrameError::CorruptedPayload {
            expected: header.checksum(),
            actual,
        });
    }
    Ok(())
}
