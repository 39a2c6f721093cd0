use crate::memory::MemoryBus;
use std::fs::File;
use std::io::Read;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Program image is empty")]
    Empty,
    #[error("Program image is {0} bytes; the address space holds 65536")]
    TooLarge(usize),
    #[error("Program image does not fit: {len} bytes at {start:#06X}")]
    DoesNotFit { start: u16, len: usize },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A flat program image. Loading is a plain byte-copy into the address
/// space; there is no container format.
pub struct ProgramImage {
    pub data: Vec<u8>,
}

impl ProgramImage {
    pub fn load(path: &str) -> Result<Self, ImageError> {
        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ImageError> {
        if data.is_empty() {
            return Err(ImageError::Empty);
        }
        if data.len() > 0x10000 {
            return Err(ImageError::TooLarge(data.len()));
        }
        Ok(Self { data })
    }

    /// Copy the image into the address space at `start`.
    pub fn apply(&self, bus: &mut MemoryBus, start: u16) -> Result<(), ImageError> {
        if start as usize + self.data.len() > 0x10000 {
            return Err(ImageError::DoesNotFit {
                start,
                len: self.data.len(),
            });
        }
        bus.load_bytes(start, &self.data);
        Ok(())
    }
}
