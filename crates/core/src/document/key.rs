//! Key builders: pick a security handler and derive its key from the
//! `/Encrypt` dictionary and a password.

use super::security::{
    AesV2SecurityHandler, AesV3SecurityHandler, CryptFilterHandler, NullSecurityHandler,
    Rc4SecurityHandler, SecurityHandler, UnimplementedSecurityHandler,
};
use crate::codec::aes::{aes_cbc_decrypt, aes_cbc_encrypt};
use crate::codec::arcfour::Arcfour;
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObject};
use sha2::{Digest, Sha256, Sha384, Sha512};
use tracing::debug;

/// Password padding constant from the standard security handler.
pub const PASSWORD_PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

/// Chooses the handler for an encrypted document.
///
/// `encrypt` has its references already resolved; `doc_id` is the first
/// element of the trailer `/ID` array (empty if absent).
pub trait KeyBuilder: Send + Sync {
    fn build(
        &self,
        encrypt: &PDFDict,
        doc_id: &[u8],
        password: &[u8],
    ) -> Result<Box<dyn SecurityHandler>>;
}

/// The standard password-based handler (revisions 2 through 6).
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardKeyBuilder;

impl KeyBuilder for StandardKeyBuilder {
    fn build(
        &self,
        encrypt: &PDFDict,
        doc_id: &[u8],
        password: &[u8],
    ) -> Result<Box<dyn SecurityHandler>> {
        let filter = encrypt.get("Filter").and_then(|f| f.as_name().ok());
        if filter != Some("Standard") {
            return Ok(Box::new(UnimplementedSecurityHandler::new(format!(
                "security handler {}",
                filter.unwrap_or("(none)")
            ))));
        }
        let params = StandardParams::from_dict(encrypt, doc_id)?;
        debug!(v = params.v, r = params.r, key_bits = params.key_len * 8, "standard security handler");

        match params.v {
            1 | 2 => {
                let key = params.authenticate(password)?;
                Ok(Box::new(Rc4SecurityHandler::new(key)))
            }
            4 => {
                let strings = params.crypt_method(encrypt, "StrF")?;
                let streams = params.crypt_method(encrypt, "StmF")?;
                let key = params.authenticate(password)?;
                Ok(Box::new(CryptFilterHandler {
                    strings: strings.handler(&key),
                    streams: streams.handler(&key),
                    encrypt_metadata: params.encrypt_metadata,
                }))
            }
            5 => {
                let strings = params.crypt_method(encrypt, "StrF")?;
                let streams = params.crypt_method(encrypt, "StmF")?;
                let key = params.authenticate_v5(encrypt, password)?;
                Ok(Box::new(CryptFilterHandler {
                    strings: strings.handler(&key),
                    streams: streams.handler(&key),
                    encrypt_metadata: params.encrypt_metadata,
                }))
            }
            v => Ok(Box::new(UnimplementedSecurityHandler::new(format!(
                "standard handler V={v} R={}",
                params.r
            )))),
        }
    }
}

/// Crypt filter method named by `/CFM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptMethod {
    Identity,
    V2,
    AesV2,
    AesV3,
}

impl CryptMethod {
    fn handler(self, key: &[u8]) -> Box<dyn SecurityHandler> {
        match self {
            Self::Identity => Box::new(NullSecurityHandler),
            Self::V2 => Box::new(Rc4SecurityHandler::new(key.to_vec())),
            Self::AesV2 => Box::new(AesV2SecurityHandler::new(key.to_vec())),
            Self::AesV3 => Box::new(AesV3SecurityHandler::new(key.to_vec())),
        }
    }
}

/// Parsed `/Encrypt` entries of the standard handler.
#[derive(Debug, Clone)]
pub struct StandardParams {
    pub v: i64,
    pub r: i64,
    /// Key length in bytes
    pub key_len: usize,
    pub o: Vec<u8>,
    pub u: Vec<u8>,
    pub p: u32,
    pub doc_id: Vec<u8>,
    pub encrypt_metadata: bool,
}

impl StandardParams {
    pub fn from_dict(encrypt: &PDFDict, doc_id: &[u8]) -> Result<Self> {
        let v = int_default(encrypt, "V", 0);
        let r = int(encrypt, "R")?;
        let key_bits = match v {
            1 => 40,
            4 => 128,
            5 => 256,
            _ => int_default(encrypt, "Length", 40),
        };
        if v == 2 && (key_bits % 8 != 0 || !(40..=128).contains(&key_bits)) {
            return Err(PdfError::unsupported(format!(
                "invalid encryption key length {key_bits}"
            )));
        }
        Ok(Self {
            v,
            r,
            key_len: (key_bits / 8) as usize,
            o: bytes(encrypt, "O")?,
            u: bytes(encrypt, "U")?,
            // P is signed in the file but hashed as its unsigned bit pattern
            p: int(encrypt, "P")? as u32,
            doc_id: doc_id.to_vec(),
            encrypt_metadata: encrypt
                .get("EncryptMetadata")
                .and_then(|v| v.as_bool().ok())
                .unwrap_or(true),
        })
    }

    fn crypt_method(&self, encrypt: &PDFDict, which: &str) -> Result<CryptMethod> {
        let name = encrypt
            .get(which)
            .and_then(|v| v.as_name().ok())
            .unwrap_or("Identity");
        if name == "Identity" {
            return Ok(CryptMethod::Identity);
        }
        let filter = encrypt
            .get("CF")
            .and_then(|cf| cf.get(name))
            .ok_or_else(|| PdfError::malformed(format!("crypt filter /{name} not found in /CF")))?;
        match filter.get("CFM").and_then(|v| v.as_name().ok()).unwrap_or("None") {
            "None" => Ok(CryptMethod::Identity),
            "V2" => Ok(CryptMethod::V2),
            "AESV2" => Ok(CryptMethod::AesV2),
            "AESV3" => Ok(CryptMethod::AesV3),
            other => Err(PdfError::unsupported(format!("crypt filter method {other}"))),
        }
    }

    /// Try `password` as the user password, then as the owner password.
    pub fn authenticate(&self, password: &[u8]) -> Result<Vec<u8>> {
        self.authenticate_user(password)
            .or_else(|| self.authenticate_owner(password))
            .ok_or_else(|| PdfError::encrypted("incorrect password"))
    }

    fn authenticate_user(&self, password: &[u8]) -> Option<Vec<u8>> {
        let key = self.file_key(password);
        let computed = self.u_value(&key);
        let matches = if self.r == 2 {
            computed == self.u
        } else {
            self.u.len() >= 16 && computed[..16] == self.u[..16]
        };
        matches.then_some(key)
    }

    fn authenticate_owner(&self, password: &[u8]) -> Option<Vec<u8>> {
        let mut hash = md5::compute(pad_password(password)).0.to_vec();
        if self.r >= 3 {
            for _ in 0..50 {
                hash = md5::compute(&hash).0.to_vec();
            }
        }
        let key = &hash[..self.rc4_key_len()];
        let user_password = if self.r == 2 {
            Arcfour::apply(key, &self.o)
        } else {
            (0..20u8).rev().fold(self.o.clone(), |acc, i| {
                let xor_key: Vec<u8> = key.iter().map(|b| b ^ i).collect();
                Arcfour::apply(&xor_key, &acc)
            })
        };
        self.authenticate_user(&user_password)
    }

    fn rc4_key_len(&self) -> usize {
        if self.r == 2 { 5 } else { self.key_len.clamp(5, 16) }
    }

    /// File encryption key for revisions 2 to 4.
    pub fn file_key(&self, password: &[u8]) -> Vec<u8> {
        let mut context = md5::Context::new();
        context.consume(pad_password(password));
        context.consume(&self.o);
        context.consume(self.p.to_le_bytes());
        context.consume(&self.doc_id);
        if self.r >= 4 && !self.encrypt_metadata {
            context.consume([0xFF, 0xFF, 0xFF, 0xFF]);
        }
        let n = self.rc4_key_len();
        let mut result = context.finalize().0.to_vec();
        if self.r >= 3 {
            for _ in 0..50 {
                result = md5::compute(&result[..n]).0.to_vec();
            }
        }
        result.truncate(n);
        result
    }

    /// Expected `/U` entry for a file key, revisions 2 to 4.
    pub fn u_value(&self, key: &[u8]) -> Vec<u8> {
        if self.r == 2 {
            return Arcfour::apply(key, &PASSWORD_PADDING);
        }
        let mut context = md5::Context::new();
        context.consume(PASSWORD_PADDING);
        context.consume(&self.doc_id);
        let hash = context.finalize();
        let mut result = Arcfour::apply(key, &hash.0);
        for i in 1..20u8 {
            let xor_key: Vec<u8> = key.iter().map(|b| b ^ i).collect();
            result = Arcfour::apply(&xor_key, &result);
        }
        result.resize(32, 0);
        result
    }

    /// Revisions 5 and 6: validate against `/O` or `/U`, then unwrap `/OE` or `/UE`.
    fn authenticate_v5(&self, encrypt: &PDFDict, password: &[u8]) -> Result<Vec<u8>> {
        if self.o.len() < 48 || self.u.len() < 48 {
            return Err(PdfError::malformed("/O and /U must be at least 48 bytes"));
        }
        let password = &password[..password.len().min(127)];
        let (o, u) = (&self.o[..48], &self.u[..48]);

        let owner = password_hash(self.r, password, &o[32..40], Some(u))?;
        if owner[..] == o[..32] {
            let wrap = password_hash(self.r, password, &o[40..48], Some(u))?;
            return unwrap_key(&wrap, &bytes(encrypt, "OE")?);
        }
        let user = password_hash(self.r, password, &u[32..40], None)?;
        if user[..] == u[..32] {
            let wrap = password_hash(self.r, password, &u[40..48], None)?;
            return unwrap_key(&wrap, &bytes(encrypt, "UE")?);
        }
        Err(PdfError::encrypted("incorrect password"))
    }
}

/// `/OE` and `/UE` hold the file key encrypted with a zero IV.
fn unwrap_key(wrap: &[u8], wrapped: &[u8]) -> Result<Vec<u8>> {
    if wrapped.len() < 32 {
        return Err(PdfError::malformed("/OE or /UE shorter than 32 bytes"));
    }
    aes_cbc_decrypt(wrap, &[0u8; 16], &wrapped[..32])
}

/// Password hash for revision 5 (one SHA-256) or 6 (iterated SHA-2 and AES).
pub fn password_hash(r: i64, password: &[u8], salt: &[u8], vector: Option<&[u8]>) -> Result<Vec<u8>> {
    let vector = vector.unwrap_or(&[]);
    let mut hasher = Sha256::new();
    hasher.update(password);
    hasher.update(salt);
    hasher.update(vector);
    let mut k = hasher.finalize().to_vec();
    if r < 6 {
        return Ok(k);
    }

    let mut round = 0u32;
    loop {
        let base: Vec<u8> = [password, &k[..], vector].concat();
        let k1 = base.repeat(64);
        let e = aes_cbc_encrypt(&k[..16], &k[16..32], &k1)?;
        k = match bytes_mod_3(&e[..16]) {
            0 => Sha256::digest(&e).to_vec(),
            1 => Sha384::digest(&e).to_vec(),
            _ => Sha512::digest(&e).to_vec(),
        };
        round += 1;
        let last = u32::from(e[e.len() - 1]);
        if round >= 64 && last + 32 <= round {
            break;
        }
    }
    k.truncate(32);
    Ok(k)
}

/// The 16 bytes read as a big-endian integer, modulo 3.
fn bytes_mod_3(input: &[u8]) -> usize {
    // 256 is 1 mod 3, so the digit sum has the same remainder
    input.iter().map(|&b| usize::from(b % 3)).sum::<usize>() % 3
}

pub fn pad_password(password: &[u8]) -> [u8; 32] {
    let mut padded = [0u8; 32];
    let len = password.len().min(32);
    padded[..len].copy_from_slice(&password[..len]);
    padded[len..].copy_from_slice(&PASSWORD_PADDING[..32 - len]);
    padded
}

fn int(encrypt: &PDFDict, key: &str) -> Result<i64> {
    encrypt
        .get(key)
        .ok_or_else(|| PdfError::malformed(format!("missing /{key} in /Encrypt")))?
        .as_int()
}

fn int_default(encrypt: &PDFDict, key: &str, default: i64) -> i64 {
    encrypt
        .get(key)
        .and_then(|v| v.as_int().ok())
        .unwrap_or(default)
}

fn bytes(encrypt: &PDFDict, key: &str) -> Result<Vec<u8>> {
    match encrypt.get(key) {
        Some(PDFObject::String(s)) => Ok(s.clone()),
        Some(other) => Err(PdfError::malformed(format!(
            "/{key} in /Encrypt must be a string, got {}",
            other.type_name()
        ))),
        None => Err(PdfError::malformed(format!("missing /{key} in /Encrypt"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::objects::PDFObjRef;

    fn rc4_dict(v: i64, r: i64, length: i64, u: Vec<u8>) -> PDFDict {
        let mut d = PDFDict::new();
        d.insert("Filter".into(), PDFObject::name("Standard"));
        d.insert("V".into(), PDFObject::Int(v));
        d.insert("R".into(), PDFObject::Int(r));
        d.insert("Length".into(), PDFObject::Int(length));
        d.insert("O".into(), PDFObject::String(vec![0x11; 32]));
        d.insert("U".into(), PDFObject::String(u));
        d.insert("P".into(), PDFObject::Int(-4));
        d
    }

    fn with_valid_u(v: i64, r: i64, length: i64, password: &[u8]) -> PDFDict {
        let dict = rc4_dict(v, r, length, vec![0; 32]);
        let params = StandardParams::from_dict(&dict, b"docid").unwrap();
        let u = params.u_value(&params.file_key(password));
        rc4_dict(v, r, length, u)
    }

    #[test]
    fn rc4_40_user_password() {
        let dict = with_valid_u(1, 2, 40, b"");
        let handler = StandardKeyBuilder.build(&dict, b"docid", b"").unwrap();
        let params = StandardParams::from_dict(&dict, b"docid").unwrap();
        let key = params.file_key(b"");
        assert_eq!(key.len(), 5);
        let r = PDFObjRef::new(4, 0);
        let cipher = Rc4SecurityHandler::new(key).decrypt(b"secret", r).unwrap();
        assert_eq!(handler.decrypt(&cipher, r).unwrap(), b"secret");
    }

    #[test]
    fn rc4_128_wrong_password_is_encrypted_error() {
        let dict = with_valid_u(2, 3, 128, b"user");
        assert!(StandardKeyBuilder.build(&dict, b"docid", b"user").is_ok());
        let err = StandardKeyBuilder.build(&dict, b"docid", b"nope").err().unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::EncryptedDocument);
    }

    #[test]
    fn invalid_key_length_is_unsupported() {
        let dict = rc4_dict(2, 3, 41, vec![0; 32]);
        let err = StandardKeyBuilder.build(&dict, b"", b"").err().unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::UnsupportedFeature);
    }

    #[test]
    fn foreign_handler_is_unimplemented() {
        let mut dict = PDFDict::new();
        dict.insert("Filter".into(), PDFObject::name("Adobe.PubSec"));
        let handler = StandardKeyBuilder.build(&dict, b"", b"").unwrap();
        assert!(handler.decrypt(b"x", PDFObjRef::new(1, 0)).unwrap_err().is_unsupported());
    }

    #[test]
    fn r5_hash_is_single_sha256() {
        let hash = password_hash(5, b"pw", b"saltsalt", None).unwrap();
        assert_eq!(hash, Sha256::digest(b"pwsaltsalt").to_vec());
        assert_eq!(password_hash(6, b"pw", b"saltsalt", None).unwrap().len(), 32);
    }

    #[test]
    fn mod_3_matches_big_integer() {
        assert_eq!(bytes_mod_3(&[1, 0]), 1); // 256
        assert_eq!(bytes_mod_3(&[0, 2]), 2);
        assert_eq!(bytes_mod_3(&[1, 2]), 0); // 258
    }
}
