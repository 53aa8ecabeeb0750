use crate::core_api::{CoreError, Result};

/// Read `width` little-endian bytes at `offset`, zero-extended to `u32`.
///
/// Every fixed-width field in the image goes through here.
pub fn read_uint_le(buffer: &[u8], offset: usize, width: usize) -> Result<u32> {
    if width == 0 || width > 4 {
        return Err(CoreError::UnsupportedWidth { width });
    }
    let bytes = offset
        .checked_add(width)
        .and_then(|end| buffer.get(offset..end))
        .ok_or(CoreError::OutOfBounds {
            offset,
            width,
            len: buffer.len(),
        })?;

    let mut buf = [0u8; 4];
    buf[..width].copy_from_slice(bytes);
    Ok(u32::from_le_bytes(buf))
}

pub fn read_u16_le(buffer: &[u8], offset: usize) -> Result<u16> {
    read_uint_le(buffer, offset, 2).map(|v| v as u16)
}

pub fn read_u32_le(buffer: &[u8], offset: usize) -> Result<u32> {
    read_uint_le(buffer, offset, 4)
}
