use std::io::{Read, Seek, SeekFrom};

use crate::encoding::{EncodingInfo, detect_encoding};
use crate::error::Result;

/// Bytes inspected when guessing the code page.
pub const CODE_PAGE_PREFIX: usize = 256 * 1024;

/// Guess the code page from the first bytes of the stream.
///
/// The stream is left positioned at its start.
pub fn guess_code_page<R: Read + Seek>(reader: &mut R) -> Result<EncodingInfo> {
    reader.seek(SeekFrom::Start(0))?;
    let mut prefix = Vec::with_capacity(8 * 1024);
    reader
        .by_ref()
        .take(CODE_PAGE_PREFIX as u64)
        .read_to_end(&mut prefix)?;
    reader.seek(SeekFrom::Start(0))?;

    let info = detect_encoding(&prefix);
    log::debug!(
        "code page {} (bom: {}) from {} bytes",
        info.encoding.name(),
        info.has_bom,
        prefix.len()
    );
    Ok(info)
}
