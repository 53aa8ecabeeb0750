use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreErrorCode {
    Layout,
    Truncated,
    Read,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("illegal section id {id} (expected 0..=13)")]
    InvalidSectionId { id: u32 },
    #[error("save image is {len} bytes, need at least {required}")]
    TruncatedFile { len: usize, required: usize },
    #[error("checksum payload length {len} is not a multiple of 4")]
    MisalignedPayload { len: usize },
    #[error("read of {width} bytes at offset {offset:#x} runs past buffer of {len} bytes")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },
    #[error("unsupported integer width {width} (expected 1..=4)")]
    UnsupportedWidth { width: usize },
    #[error("invalid file layout: {0}")]
    InvalidLayout(String),
}

impl CoreError {
    pub fn code(&self) -> CoreErrorCode {
        match self {
            Self::InvalidSectionId { .. }
            | Self::MisalignedPayload { .. }
            | Self::InvalidLayout(_) => CoreErrorCode::Layout,
            Self::TruncatedFile { .. } => CoreErrorCode::Truncated,
            Self::OutOfBounds { .. } | Self::UnsupportedWidth { .. } => CoreErrorCode::Read,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
