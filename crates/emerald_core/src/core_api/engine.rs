use crate::audit::audit_image;
use crate::image::SaveImage;
use crate::layout::FileLayout;

use super::error::Result;
use super::types::Report;

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

/// An opened save image. Owns the bytes; everything else borrows them.
#[derive(Debug)]
pub struct Session {
    bytes: Vec<u8>,
    layout: FileLayout,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    pub fn open_bytes<B: Into<Vec<u8>>>(&self, bytes: B) -> Result<Session> {
        let bytes = bytes.into();
        SaveImage::new(&bytes)?;

        let layout = FileLayout::gen3();
        layout.validate()?;

        Ok(Session { bytes, layout })
    }
}

impl Session {
    pub fn layout(&self) -> &FileLayout {
        &self.layout
    }

    pub fn file_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn image(&self) -> Result<SaveImage<'_>> {
        SaveImage::new(&self.bytes)
    }

    pub fn analyze(&self) -> Result<Report> {
        audit_image(&self.image()?)
    }
}
