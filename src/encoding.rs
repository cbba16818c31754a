//! Code page detection using byte-order marks, chardetng and `encoding_rs`.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use simdutf8::basic::from_utf8;

/// Number of leading bytes inspected by the UTF-16 zero-byte heuristic.
const UTF16_SAMPLE_LEN: usize = 512;

/// Check if the given bytes are valid UTF-8.
///
/// Uses SIMD-accelerated validation for performance.
pub fn is_utf8(data: &[u8]) -> bool {
    from_utf8(data).is_ok()
}

/// Like [`is_utf8`] but tolerates a multi-byte sequence cut off at the end
/// of the buffer, which happens whenever a bounded prefix is inspected.
fn is_utf8_prefix(data: &[u8]) -> bool {
    if is_utf8(data) {
        return true;
    }
    match simdutf8::compat::from_utf8(data) {
        Ok(_) => true,
        Err(err) => err.error_len().is_none(),
    }
}

/// Information about the detected encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingInfo {
    /// The resolved encoding.
    pub encoding: &'static Encoding,
    /// Whether a byte-order mark was present.
    pub has_bom: bool,
}

impl EncodingInfo {
    /// Create a new `EncodingInfo`.
    pub const fn new(encoding: &'static Encoding, has_bom: bool) -> Self {
        Self { encoding, has_bom }
    }

    /// Whether the resolved encoding is UTF-8.
    pub fn is_utf8(&self) -> bool {
        self.encoding == UTF_8
    }
}

impl Default for EncodingInfo {
    fn default() -> Self {
        Self::new(UTF_8, false)
    }
}

/// Detect the encoding of the data.
///
/// Resolution order:
/// 1. a byte-order mark (UTF-8, UTF-16 LE/BE)
/// 2. UTF-16 without BOM, recognised by zero bytes in every other position
/// 3. pure ASCII and valid UTF-8, both reported as UTF-8
/// 4. chardetng's byte-distribution guess for legacy code pages
pub fn detect_encoding(data: &[u8]) -> EncodingInfo {
    if let Some((encoding, _)) = Encoding::for_bom(data) {
        return EncodingInfo::new(encoding, true);
    }

    if let Some(encoding) = guess_utf16_without_bom(data) {
        return EncodingInfo::new(encoding, false);
    }

    if data.is_ascii() || is_utf8_prefix(data) {
        return EncodingInfo::new(UTF_8, false);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(data, true);
    EncodingInfo::new(detector.guess(None, true), false)
}

fn guess_utf16_without_bom(data: &[u8]) -> Option<&'static Encoding> {
    let head = &data[..data.len().min(UTF16_SAMPLE_LEN)];
    let pairs = head.len() / 2;
    if pairs < 4 {
        return None;
    }
    let even_zeros = head.iter().step_by(2).filter(|&&b| b == 0).count();
    let odd_zeros = head.iter().skip(1).step_by(2).filter(|&&b| b == 0).count();

    // ASCII text encoded as UTF-16 has a zero in nearly every high byte
    if odd_zeros * 10 >= pairs * 4 && even_zeros * 10 < pairs {
        Some(UTF_16LE)
    } else if even_zeros * 10 >= pairs * 4 && odd_zeros * 10 < pairs {
        Some(UTF_16BE)
    } else {
        None
    }
}
