use crate::core_api::{CoreError, Result};
use crate::reader::read_u32_le;

const WORD_LEN: usize = 4;

/// Wrapping 32-bit sum of the payload read as little-endian words.
pub fn word_sum(payload: &[u8]) -> Result<u32> {
    if payload.len() % WORD_LEN != 0 {
        return Err(CoreError::MisalignedPayload {
            len: payload.len(),
        });
    }

    let mut sum = 0u32;
    for offset in (0..payload.len()).step_by(WORD_LEN) {
        sum = sum.wrapping_add(read_u32_le(payload, offset)?);
    }
    Ok(sum)
}

/// Adds the high half of `sum` to its low half once. A carry out of bit 15
/// is dropped, not folded back in.
pub fn fold(sum: u32) -> u16 {
    let high = (sum >> 16) as u16;
    let low = (sum & 0xffff) as u16;
    high.wrapping_add(low)
}

pub fn compute_checksum(payload: &[u8]) -> Result<u16> {
    word_sum(payload).map(fold)
}
