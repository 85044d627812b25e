//! Security handlers: per-object decryption of strings and streams.
//!
//! A handler only decrypts. Choosing the variant and deriving the base key is
//! the job of a [`KeyBuilder`](super::key::KeyBuilder).

use crate::codec::aes::{aes_cbc_decrypt, unpad_aes};
use crate::codec::arcfour::Arcfour;
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObjRef};

/// Decryption capability shared by every variant.
pub trait SecurityHandler: Send + Sync {
    /// Decrypt bytes belonging to object `r`.
    fn decrypt(&self, data: &[u8], r: PDFObjRef) -> Result<Vec<u8>>;

    /// Decrypt a string (may differ from stream decryption with crypt filters).
    fn decrypt_string(&self, data: &[u8], r: PDFObjRef) -> Result<Vec<u8>> {
        self.decrypt(data, r)
    }

    /// Decrypt a stream payload; `attrs` is the stream dictionary.
    fn decrypt_stream(&self, data: &[u8], r: PDFObjRef, _attrs: &PDFDict) -> Result<Vec<u8>> {
        self.decrypt(data, r)
    }

    /// True when nothing is ever transformed.
    fn is_null(&self) -> bool {
        false
    }
}

/// Unencrypted documents.
pub struct NullSecurityHandler;

impl SecurityHandler for NullSecurityHandler {
    fn decrypt(&self, data: &[u8], _r: PDFObjRef) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn is_null(&self) -> bool {
        true
    }
}

/// Base key + low 3 bytes of the id + low 2 bytes of the generation.
fn object_key_material(key: &[u8], r: PDFObjRef) -> Vec<u8> {
    let mut material = Vec::with_capacity(key.len() + 9);
    material.extend_from_slice(key);
    material.extend_from_slice(&r.objid.to_le_bytes()[..3]);
    material.extend_from_slice(&r.genno.to_le_bytes()[..2]);
    material
}

/// RC4 with a per-object key (revisions 2 to 4 with the V2 crypt method).
pub struct Rc4SecurityHandler {
    key: Vec<u8>,
}

impl Rc4SecurityHandler {
    pub const fn new(key: Vec<u8>) -> Self {
        Self { key }
    }
}

impl SecurityHandler for Rc4SecurityHandler {
    fn decrypt(&self, data: &[u8], r: PDFObjRef) -> Result<Vec<u8>> {
        let material = object_key_material(&self.key, r);
        let hash = md5::compute(&material);
        let key_len = material.len().min(16);
        Ok(Arcfour::apply(&hash.0[..key_len], data))
    }
}

/// Leading 16 bytes are the IV; the rest is PKCS#7 padded CBC ciphertext.
fn aes_decrypt_with_iv(key: &[u8], data: &[u8], r: PDFObjRef) -> Result<Vec<u8>> {
    if data.len() < 16 {
        return Err(PdfError::malformed(format!(
            "encrypted data for {r} is shorter than the AES IV"
        )));
    }
    let (iv, ciphertext) = data.split_at(16);
    if ciphertext.is_empty() {
        return Ok(Vec::new());
    }
    let plaintext = aes_cbc_decrypt(key, iv, ciphertext)
        .map_err(|e| PdfError::malformed(format!("cannot decrypt {r}: {e}")))?;
    Ok(unpad_aes(&plaintext).to_vec())
}

/// AES-128-CBC with the per-object key derivation salted by `sAlT`.
pub struct AesV2SecurityHandler {
    key: Vec<u8>,
}

impl AesV2SecurityHandler {
    pub const fn new(key: Vec<u8>) -> Self {
        Self { key }
    }
}

impl SecurityHandler for AesV2SecurityHandler {
    fn decrypt(&self, data: &[u8], r: PDFObjRef) -> Result<Vec<u8>> {
        let mut material = object_key_material(&self.key, r);
        material.extend_from_slice(b"sAlT");
        let hash = md5::compute(&material);
        aes_decrypt_with_iv(&hash.0, data, r)
    }
}

/// AES-256-CBC using the document key directly.
pub struct AesV3SecurityHandler {
    key: Vec<u8>,
}

impl AesV3SecurityHandler {
    pub const fn new(key: Vec<u8>) -> Self {
        Self { key }
    }
}

impl SecurityHandler for AesV3SecurityHandler {
    fn decrypt(&self, data: &[u8], r: PDFObjRef) -> Result<Vec<u8>> {
        aes_decrypt_with_iv(&self.key, data, r)
    }
}

/// Encryption this reader cannot undo. Opening works, decrypting fails.
pub struct UnimplementedSecurityHandler {
    reason: String,
}

impl UnimplementedSecurityHandler {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SecurityHandler for UnimplementedSecurityHandler {
    fn decrypt(&self, _data: &[u8], r: PDFObjRef) -> Result<Vec<u8>> {
        Err(PdfError::encrypted(format!(
            "cannot decrypt {r}: unsupported encryption style ({})",
            self.reason
        )))
    }
}

/// Separate string and stream handlers from `/StrF` and `/StmF`.
pub struct CryptFilterHandler {
    pub strings: Box<dyn SecurityHandler>,
    pub streams: Box<dyn SecurityHandler>,
    /// When false, `/Type /Metadata` streams are stored in the clear.
    pub encrypt_metadata: bool,
}

impl SecurityHandler for CryptFilterHandler {
    fn decrypt(&self, data: &[u8], r: PDFObjRef) -> Result<Vec<u8>> {
        self.streams.decrypt(data, r)
    }

    fn decrypt_string(&self, data: &[u8], r: PDFObjRef) -> Result<Vec<u8>> {
        self.strings.decrypt(data, r)
    }

    fn decrypt_stream(&self, data: &[u8], r: PDFObjRef, attrs: &PDFDict) -> Result<Vec<u8>> {
        let is_metadata = attrs.get("Type").and_then(|t| t.as_name().ok()) == Some("Metadata");
        if is_metadata && !self.encrypt_metadata {
            return Ok(data.to_vec());
        }
        self.streams.decrypt(data, r)
    }
}
