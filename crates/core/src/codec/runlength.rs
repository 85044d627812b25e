//! RunLength stream decoder.

use crate::error::Result;

/// Decode RunLength-encoded data.
///
/// - Length byte 0-127: copy next (length + 1) bytes literally
/// - Length byte 128: end of data
/// - Length byte 129-255: repeat next byte (257 - length) times
///
/// A stream that ends mid-run stops quietly with what was decoded so far.
pub fn rldecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let length = data[i];
        i += 1;

        match length {
            128 => break,
            0..=127 => {
                let count = length as usize + 1;
                let end = (i + count).min(data.len());
                result.extend_from_slice(&data[i..end]);
                i = end;
            }
            129..=255 => {
                if let Some(&byte) = data.get(i) {
                    i += 1;
                    result.extend(std::iter::repeat_n(byte, 257 - length as usize));
                }
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_then_repeat_then_eod() {
        let data = [2, 0, 0, 0, 255, 1, 128, 9, 9];
        assert_eq!(rldecode(&data).unwrap(), [0, 0, 0, 1, 1]);
    }

    #[test]
    fn truncated_literal_keeps_prefix() {
        assert_eq!(rldecode(&[4, b'a', b'b']).unwrap(), b"ab");
    }
}
