//! ASCII85 and ASCIIHex stream decoders.

use crate::error::{PdfError, Result};

/// Decode ASCII85-encoded data (PDF variant).
/// Handles: z-encoding, <~ ~> markers, whitespace, missing EOD.
pub fn ascii85decode(data: &[u8]) -> Result<Vec<u8>> {
    let data = data.strip_prefix(b"<~").unwrap_or(data);

    // Everything from the ~> end marker on is ignored
    let data = match data.iter().position(|&b| b == b'~') {
        Some(pos) => &data[..pos],
        None => data,
    };

    let mut result = Vec::with_capacity(data.len() * 4 / 5 + 4);
    let mut group = [0u8; 5];
    let mut filled = 0;
    for &byte in data {
        match byte {
            b'z' if filled == 0 => result.extend_from_slice(&[0; 4]),
            b'!'..=b'u' => {
                group[filled] = byte;
                filled += 1;
                if filled == 5 {
                    result.extend_from_slice(&decode_group(&group)?);
                    filled = 0;
                }
            }
            b if super::is_pdf_whitespace(b) => {}
            other => {
                return Err(PdfError::DecodeError {
                    filter: "ASCII85Decode",
                    msg: format!("illegal character {:#04x}", other),
                });
            }
        }
    }

    if filled == 1 {
        return Err(PdfError::DecodeError {
            filter: "ASCII85Decode",
            msg: "final group has a single character".into(),
        });
    }
    if filled > 1 {
        let mut padded = [b'u'; 5];
        padded[..filled].copy_from_slice(&group[..filled]);
        let bytes = decode_group(&padded)?;
        result.extend_from_slice(&bytes[..filled - 1]);
    }

    Ok(result)
}

fn decode_group(group: &[u8; 5]) -> Result<[u8; 4]> {
    let value = group
        .iter()
        .fold(0u64, |acc, &b| acc * 85 + u64::from(b - b'!'));
    let value = u32::try_from(value).map_err(|_| PdfError::DecodeError {
        filter: "ASCII85Decode",
        msg: format!("group {:?} overflows 32 bits", String::from_utf8_lossy(group)),
    })?;
    Ok(value.to_be_bytes())
}

/// Decode ASCIIHex-encoded data. An odd final digit is padded with zero.
pub fn asciihexdecode(data: &[u8]) -> Result<Vec<u8>> {
    let data = data.strip_prefix(b"<").unwrap_or(data);
    let mut result = Vec::with_capacity(data.len() / 2);
    let mut pending: Option<u8> = None;

    for &byte in data {
        let nibble = match crate::parser::lexer::hex_value(byte) {
            Some(n) => n,
            None if byte == b'>' => break,
            None => continue,
        };
        match pending.take() {
            Some(high) => result.push((high << 4) | nibble),
            None => pending = Some(nibble),
        }
    }

    if let Some(high) = pending {
        result.push(high << 4);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii85_with_markers_and_z() {
        assert_eq!(ascii85decode(b"<~87cURD]i,\"Ebo80~>").unwrap(), b"Hello World!");
        assert_eq!(ascii85decode(b"z").unwrap(), vec![0; 4]);
    }

    #[test]
    fn ascii85_overflow_is_malformed() {
        assert!(ascii85decode(b"uuuuu").unwrap_err().is_malformed());
    }

    #[test]
    fn ascii_hex_variants() {
        assert_eq!(asciihexdecode(b"<52756279>").unwrap(), b"Ruby");
        assert_eq!(asciihexdecode(b"52756279").unwrap(), b"Ruby");
        assert_eq!(asciihexdecode(b"52 75\n62 79>junk").unwrap(), b"Ruby");
        assert_eq!(asciihexdecode(b"5275627").unwrap(), b"Rubp");
    }
}
