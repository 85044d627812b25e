//! AES-CBC helpers for the security handlers.

use crate::error::{PdfError, Result};
use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use cbc::{Decryptor, Encryptor};

type Aes128CbcDec = Decryptor<aes::Aes128>;
type Aes256CbcDec = Decryptor<aes::Aes256>;
type Aes128CbcEnc = Encryptor<aes::Aes128>;
type Aes256CbcEnc = Encryptor<aes::Aes256>;

fn check_lengths(key: &[u8], iv: &[u8], data: &[u8]) -> Result<()> {
    if iv.len() != 16 {
        return Err(PdfError::malformed(format!("AES IV must be 16 bytes, got {}", iv.len())));
    }
    if data.len() % 16 != 0 {
        return Err(PdfError::malformed(format!(
            "AES payload of {} bytes is not a whole number of blocks",
            data.len()
        )));
    }
    if key.len() != 16 && key.len() != 32 {
        return Err(PdfError::unsupported(format!("AES key of {} bytes", key.len())));
    }
    Ok(())
}

/// Decrypt data using AES-CBC with a 128 or 256 bit key. No padding is removed.
pub fn aes_cbc_decrypt(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    check_lengths(key, iv, data)?;
    let mut buf = data.to_vec();
    let result = if key.len() == 16 {
        Aes128CbcDec::new(key.into(), iv.into())
            .decrypt_padded_mut::<NoPadding>(&mut buf)
            .map(|_| ())
    } else {
        Aes256CbcDec::new(key.into(), iv.into())
            .decrypt_padded_mut::<NoPadding>(&mut buf)
            .map(|_| ())
    };
    result.map_err(|e| PdfError::malformed(format!("AES decrypt failed: {e}")))?;
    Ok(buf)
}

/// Encrypt data using AES-CBC with a 128 or 256 bit key. No padding is applied.
pub fn aes_cbc_encrypt(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    check_lengths(key, iv, data)?;
    let mut buf = data.to_vec();
    let len = data.len();
    let result = if key.len() == 16 {
        Aes128CbcEnc::new(key.into(), iv.into())
            .encrypt_padded_mut::<NoPadding>(&mut buf, len)
            .map(|_| ())
    } else {
        Aes256CbcEnc::new(key.into(), iv.into())
            .encrypt_padded_mut::<NoPadding>(&mut buf, len)
            .map(|_| ())
    };
    result.map_err(|e| PdfError::malformed(format!("AES encrypt failed: {e}")))?;
    Ok(buf)
}

/// Remove PKCS#7 padding from AES-decrypted data.
///
/// Returns data unchanged if padding is invalid.
pub fn unpad_aes(data: &[u8]) -> &[u8] {
    let Some(&last) = data.last() else {
        return data;
    };
    let pad_len = last as usize;
    if pad_len == 0 || pad_len > 16 || pad_len > data.len() {
        return data;
    }
    let start = data.len() - pad_len;
    if data[start..].iter().all(|&b| b as usize == pad_len) {
        &data[..start]
    } else {
        data
    }
}
