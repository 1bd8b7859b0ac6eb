//! Incremental UTF-8 decoding
//!
//! Network reads split the byte stream at arbitrary points, including in the
//! middle of a multi-byte character. The decoder hands back only complete
//! characters and carries the incomplete tail (at most 3 bytes) into the
//! next call, so a split character is never turned into U+FFFD.

use crate::error::TextDecodeError;

/// Streaming UTF-8 decoder with carry-over of incomplete sequences
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    /// Leading bytes of a character whose remainder has not arrived yet
    carry: Vec<u8>,
    /// Bytes emitted as text so far (for error offsets)
    decoded: usize,
}

impl Utf8Decoder {
    /// Create a decoder with no carried bytes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, returning every complete character
    ///
    /// # Errors
    ///
    /// Returns [`TextDecodeError::Invalid`] if the chunk (together with any
    /// carried bytes) contains a sequence that no continuation could fix.
    /// Text preceding the invalid sequence is discarded; use
    /// [`Utf8Decoder::decode_prefix`] to keep it.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<String, TextDecodeError> {
        match self.decode_prefix(chunk) {
            (text, None) => Ok(text),
            (_, Some(err)) => Err(err),
        }
    }

    /// Decode the next chunk, keeping the text before any invalid sequence
    ///
    /// Returns the complete characters up to the first invalid sequence,
    /// plus the error for that sequence if there is one. Bytes after an
    /// invalid sequence are dropped.
    pub fn decode_prefix(&mut self, chunk: &[u8]) -> (String, Option<TextDecodeError>) {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(chunk);

        let (valid, error) = match std::str::from_utf8(&bytes) {
            Ok(_) => (bytes.len(), None),
            Err(e) => {
                let valid = e.valid_up_to();
                let error = e.error_len().map(|_| TextDecodeError::Invalid {
                    offset: self.decoded + valid,
                });
                if error.is_none() {
                    self.carry = bytes[valid..].to_vec();
                }
                (valid, error)
            }
        };

        bytes.truncate(valid);
        self.decoded += valid;
        // from_utf8 accepted everything up to `valid`
        let text = String::from_utf8(bytes).unwrap_or_default();
        (text, error)
    }

    /// Number of bytes waiting for the rest of their character
    #[must_use]
    pub fn pending(&self) -> usize {
        self.carry.len()
    }

    /// Signal end of input
    ///
    /// # Errors
    ///
    /// Returns [`TextDecodeError::Truncated`] if a multi-byte character was
    /// left incomplete.
    pub fn finish(&mut self) -> Result<(), TextDecodeError> {
        if self.carry.is_empty() {
            return Ok(());
        }
        let pending = self.carry.len();
        self.carry.clear();
        Err(TextDecodeError::Truncated { pending })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ascii_passthrough() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"data: hi\n").unwrap(), "data: hi\n");
        assert_eq!(decoder.pending(), 0);
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn test_split_multibyte_character() {
        // "é" is 0xC3 0xA9, "🌍" is four bytes
        let bytes = "é🌍".as_bytes();
        let mut decoder = Utf8Decoder::new();

        assert_eq!(decoder.decode(&bytes[..1]).unwrap(), "");
        assert_eq!(decoder.pending(), 1);
        assert_eq!(decoder.decode(&bytes[1..3]).unwrap(), "é");
        assert_eq!(decoder.pending(), 1);
        assert_eq!(decoder.decode(&bytes[3..5]).unwrap(), "");
        assert_eq!(decoder.pending(), 3);
        assert_eq!(decoder.decode(&bytes[5..]).unwrap(), "🌍");
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_byte_at_a_time() {
        let text = "naïve ✈️ café";
        let mut decoder = Utf8Decoder::new();
        let mut out = String::new();
        for byte in text.as_bytes() {
            out.push_str(&decoder.decode(std::slice::from_ref(byte)).unwrap());
        }
        assert_eq!(out, text);
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn test_invalid_byte_reports_offset() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"abc").unwrap(), "abc");
        let err = decoder.decode(b"de\xFFf").unwrap_err();
        assert_eq!(err, TextDecodeError::Invalid { offset: 5 });
    }

    #[test]
    fn test_invalid_byte_keeps_preceding_text() {
        let mut decoder = Utf8Decoder::new();
        let (text, err) = decoder.decode_prefix(b"caf\xC3\xA9\n\xFFrest");
        assert_eq!(text, "café\n");
        assert_eq!(err, Some(TextDecodeError::Invalid { offset: 6 }));
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_invalid_continuation_after_carry() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&[0xE2, 0x9C]).unwrap(), "");
        // 'A' cannot continue a three-byte sequence
        let err = decoder.decode(b"A").unwrap_err();
        assert_eq!(err, TextDecodeError::Invalid { offset: 0 });
    }

    #[test]
    fn test_finish_with_truncated_character() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&[b'o', b'k', 0xF0, 0x9F]).unwrap(), "ok");
        assert_eq!(
            decoder.finish(),
            Err(TextDecodeError::Truncated { pending: 2 })
        );
        assert_eq!(decoder.pending(), 0);
    }
}
