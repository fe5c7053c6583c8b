use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;

use crate::ReplayError;

/// Fixed-size container header preceding the data segment. Its internal
/// structure is not modeled; it is only ever skipped.
const CONTAINER_HEADER_LEN: usize = 8;

/// A raw `.wotreplay` container, as read from disk or received in an upload.
#[derive(Debug, Clone)]
pub struct ReplayFile {
    raw: Vec<u8>,
}

impl ReplayFile {
    pub fn from_file(path: &Path) -> Result<Self, ReplayError> {
        Ok(Self {
            raw: fs::read(path)?,
        })
    }

    pub fn from_bytes(raw: Vec<u8>) -> Self {
        Self { raw }
    }

    /// Recovers the data segment: skips the container header and inflates
    /// the remainder. Some container variants store the segment
    /// uncompressed, so a failed inflate is not an error; the original
    /// bytes are returned unchanged and the JSON scanner gets to try its
    /// luck on those instead.
    pub fn into_data_segment(self) -> Vec<u8> {
        if self.raw.len() <= CONTAINER_HEADER_LEN {
            return self.raw;
        }

        let mut decoder = ZlibDecoder::new(&self.raw[CONTAINER_HEADER_LEN..]);
        let mut inflated = Vec::new();
        match decoder.read_to_end(&mut inflated) {
            Ok(_) => inflated,
            Err(_) => self.raw,
        }
    }
}
