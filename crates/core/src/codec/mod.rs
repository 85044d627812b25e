//! Stream filters and the ciphers used by the security handlers.
//!
//! - `aes`, `arcfour`: block and stream ciphers
//! - `ascii85`: ASCII85 and ASCIIHex
//! - `flate`, `lzw`: compression, followed by `predictor`
//! - `runlength`: run-length decoding

pub mod aes;
pub mod arcfour;
pub mod ascii85;
pub mod flate;
pub mod lzw;
pub mod predictor;
pub mod runlength;

pub use aes::{aes_cbc_decrypt, aes_cbc_encrypt, unpad_aes};
pub use arcfour::Arcfour;
pub use ascii85::{ascii85decode, asciihexdecode};
pub use flate::flatedecode;
pub use lzw::{lzwdecode, lzwdecode_with_earlychange};
pub use predictor::{PredictorParams, depredict};
pub use runlength::rldecode;

use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObject};

/// A named decode transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Ascii85,
    AsciiHex,
    Flate,
    Lzw,
    RunLength,
    /// Image-only codecs whose output text extraction never needs.
    Passthrough(&'static str),
    /// Decryption is handled by the security handler.
    Crypt,
}

impl Filter {
    /// Map a filter name, including the inline-image abbreviations.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name {
            "ASCII85Decode" | "A85" => Self::Ascii85,
            "ASCIIHexDecode" | "AHx" => Self::AsciiHex,
            "FlateDecode" | "Fl" => Self::Flate,
            "LZWDecode" | "LZW" => Self::Lzw,
            "RunLengthDecode" | "RL" => Self::RunLength,
            "CCITTFaxDecode" | "CCF" => Self::Passthrough("CCITTFaxDecode"),
            "DCTDecode" | "DCT" => Self::Passthrough("DCTDecode"),
            "JBIG2Decode" => Self::Passthrough("JBIG2Decode"),
            "JPXDecode" => Self::Passthrough("JPXDecode"),
            "Crypt" => Self::Crypt,
            other => return Err(PdfError::unsupported(format!("unknown filter {other}"))),
        })
    }
}

/// Decode `data` through one filter.
pub fn decode(name: &str, data: &[u8], params: Option<&PDFDict>) -> Result<Vec<u8>> {
    match Filter::from_name(name)? {
        Filter::Ascii85 => ascii85decode(data),
        Filter::AsciiHex => asciihexdecode(data),
        Filter::Flate => {
            let out = flatedecode(data)?;
            depredict(out, &PredictorParams::from_dict(params))
        }
        Filter::Lzw => {
            let early_change = params
                .and_then(|p| p.get("EarlyChange"))
                .and_then(|v| v.as_int().ok())
                .unwrap_or(1);
            let out = lzwdecode_with_earlychange(data, early_change)?;
            depredict(out, &PredictorParams::from_dict(params))
        }
        Filter::RunLength => rldecode(data),
        Filter::Passthrough(_) | Filter::Crypt => Ok(data.to_vec()),
    }
}

/// Run the `/Filter` chain declared by a stream dictionary.
pub fn decode_stream(attrs: &PDFDict, raw: &[u8]) -> Result<Vec<u8>> {
    let filter = attrs.get("Filter");
    let params = attrs.get("DecodeParms");
    let names: Vec<&str> = match filter {
        None | Some(PDFObject::Null) => return Ok(raw.to_vec()),
        Some(PDFObject::Name(name)) => vec![name.as_str()],
        Some(PDFObject::Array(items)) => items
            .iter()
            .map(|item| item.as_name())
            .collect::<Result<_>>()
            .map_err(|_| PdfError::malformed("/Filter array holds a non-name"))?,
        Some(other) => {
            return Err(PdfError::malformed(format!(
                "/Filter must be a name or array, got {}",
                other.type_name()
            )));
        }
    };
    let param_at = |i: usize| -> Option<&PDFDict> {
        match params {
            Some(PDFObject::Dict(d)) if i == 0 => Some(d),
            Some(PDFObject::Array(items)) => match items.get(i) {
                Some(PDFObject::Dict(d)) => Some(d),
                _ => None,
            },
            _ => None,
        }
    };

    let mut data = raw.to_vec();
    for (i, name) in names.into_iter().enumerate() {
        data = decode(name, &data, param_at(i))?;
    }
    Ok(data)
}

pub(crate) const fn is_pdf_whitespace(b: u8) -> bool {
    crate::parser::lexer::is_whitespace(b)
}
