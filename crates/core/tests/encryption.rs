//! Encrypted documents built with the standard security handler.

mod common;

use common::{HELVETICA, Pdf, hex, stream};
use quire_core::codec::{Arcfour, aes_cbc_encrypt};
use quire_core::document::key::{StandardParams, password_hash};
use quire_core::{Document, ErrorKind, OpenOptions};

const DOC_ID: &[u8] = b"0123456789abcdef";
const CONTENT: &[u8] = b"BT /F1 12 Tf 72 700 Td (Secret) Tj ET";
const TITLE: &[u8] = b"Quarterly figures";

/// How objects 5 (content) and 6 (info) get encrypted.
enum Cipher {
    Rc4(Vec<u8>),
    AesV2(Vec<u8>),
    AesV3(Vec<u8>),
}

fn object_material(key: &[u8], objid: u32) -> Vec<u8> {
    let mut material = key.to_vec();
    material.extend_from_slice(&objid.to_le_bytes()[..3]);
    material.extend_from_slice(&[0, 0]);
    material
}

fn pkcs7(data: &[u8]) -> Vec<u8> {
    let pad = 16 - data.len() % 16;
    let mut out = data.to_vec();
    out.extend(std::iter::repeat_n(pad as u8, pad));
    out
}

fn aes_with_iv(key: &[u8], data: &[u8]) -> Vec<u8> {
    let iv = [7u8; 16];
    let mut out = iv.to_vec();
    out.extend(aes_cbc_encrypt(key, &iv, &pkcs7(data)).unwrap());
    out
}

impl Cipher {
    fn encrypt(&self, objid: u32, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Rc4(key) => {
                let material = object_material(key, objid);
                let hash = md5::compute(&material);
                Arcfour::apply(&hash.0[..material.len().min(16)], data)
            }
            Self::AesV2(key) => {
                let mut material = object_material(key, objid);
                material.extend_from_slice(b"sAlT");
                aes_with_iv(&md5::compute(&material).0, data)
            }
            Self::AesV3(key) => aes_with_iv(key, data),
        }
    }
}

/// One page showing "Secret", an info dictionary, and `encrypt` as object 7.
fn encrypted_document(cipher: &Cipher, encrypt: &str) -> Vec<u8> {
    let mut pdf = Pdf::new();
    pdf.add("<< /Type /Catalog /Pages 2 0 R >>");
    pdf.add("<< /Type /Pages /Kids [4 0 R] /Count 1 /MediaBox [0 0 612 792] >>");
    pdf.add(HELVETICA);
    pdf.add("<< /Type /Page /Parent 2 0 R /Resources << /Font << /F1 3 0 R >> >> /Contents 5 0 R >>");
    pdf.add(stream("", &cipher.encrypt(5, CONTENT)));
    pdf.add(format!("<< /Title {} /Pages 1 >>", hex(&cipher.encrypt(6, TITLE))));
    pdf.add(encrypt);
    let id = hex(DOC_ID);
    pdf.classic(&format!("/Root 1 0 R /Info 6 0 R /Encrypt 7 0 R /ID [{id} {id}]"))
}

fn params(v: i64, r: i64, key_len: usize) -> StandardParams {
    StandardParams {
        v,
        r,
        key_len,
        o: vec![0x4F; 32],
        u: Vec::new(),
        p: -4i32 as u32,
        doc_id: DOC_ID.to_vec(),
        encrypt_metadata: true,
    }
}

/// File key, `/O` and `/U` for `password` under revisions 2 to 4.
fn legacy_keys(params: &StandardParams, password: &[u8]) -> (Vec<u8>, String, String) {
    let key = params.file_key(password);
    let u = params.u_value(&key);
    (key, hex(&params.o), hex(&u))
}

fn assert_readable(bytes: Vec<u8>, password: &str) {
    let doc = Document::open(bytes, password).unwrap();
    assert!(doc.objects().is_encrypted());
    assert_eq!(doc.page(1).unwrap().text(None).unwrap(), "Secret");
    let info = doc.info().unwrap();
    assert_eq!(info["Title"], "Quarterly figures");
    assert_eq!(info["Pages"], "1");
}

fn rc4_40() -> Vec<u8> {
    let params = params(1, 2, 5);
    let (key, o, u) = legacy_keys(&params, b"open sesame");
    let encrypt = format!("<< /Filter /Standard /V 1 /R 2 /O {o} /U {u} /P -4 >>");
    encrypted_document(&Cipher::Rc4(key), &encrypt)
}

#[test]
fn rc4_40_bit() {
    assert_readable(rc4_40(), "open sesame");
}

#[test]
fn rc4_128_bit() {
    let params = params(2, 3, 16);
    let (key, o, u) = legacy_keys(&params, b"");
    let encrypt = format!("<< /Filter /Standard /V 2 /R 3 /Length 128 /O {o} /U {u} /P -4 >>");
    assert_readable(encrypted_document(&Cipher::Rc4(key), &encrypt), "");
}

#[test]
fn aes_128_crypt_filters() {
    let params = params(4, 4, 16);
    let (key, o, u) = legacy_keys(&params, b"pw");
    let encrypt = format!(
        "<< /Filter /Standard /V 4 /R 4 /Length 128 /O {o} /U {u} /P -4 \
         /CF << /StdCF << /CFM /AESV2 /AuthEvent /DocOpen /Length 16 >> >> \
         /StrF /StdCF /StmF /StdCF >>"
    );
    assert_readable(encrypted_document(&Cipher::AesV2(key), &encrypt), "pw");
}

#[test]
fn aes_256_revision_6() {
    let password = "ünïcode".as_bytes();
    let file_key = [0x42u8; 32];
    let (validation_salt, key_salt) = ([1u8; 8], [2u8; 8]);

    let mut u = password_hash(6, password, &validation_salt, None).unwrap();
    u.extend(validation_salt);
    u.extend(key_salt);
    let wrap = password_hash(6, password, &key_salt, None).unwrap();
    let ue = aes_cbc_encrypt(&wrap, &[0u8; 16], &file_key).unwrap();

    let encrypt = format!(
        "<< /Filter /Standard /V 5 /R 6 /Length 256 /O {} /U {} /OE {} /UE {} /P -4 \
         /Perms {} /CF << /StdCF << /CFM /AESV3 /AuthEvent /DocOpen /Length 32 >> >> \
         /StrF /StdCF /StmF /StdCF >>",
        hex(&[0x55; 48]),
        hex(&u),
        hex(&[0; 32]),
        hex(&ue),
        hex(&[0; 16]),
    );
    let bytes = encrypted_document(&Cipher::AesV3(file_key.to_vec()), &encrypt);
    assert_readable(bytes.clone(), "ünïcode");
    let err = Document::open(bytes, "unicode").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EncryptedDocument);
}

#[test]
fn wrong_password_is_refused() {
    let err = Document::open(rc4_40(), "guess").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EncryptedDocument);
    assert!(err.is_unsupported());

    let options = OpenOptions::new().password(b"open sesame".to_vec());
    assert!(Document::open_with(rc4_40(), options).is_ok());
}

#[test]
fn unknown_security_handler_opens_but_cannot_decrypt() {
    let bytes = encrypted_document(
        &Cipher::Rc4(vec![1, 2, 3, 4, 5]),
        "<< /Filter /Vendor.Lock /V 2 /Length 128 >>",
    );
    let doc = Document::open(bytes, "").unwrap();
    assert_eq!(doc.page_count().unwrap(), 1);
    let err = doc.page(1).unwrap().text(None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EncryptedDocument);
    assert_eq!(doc.info().unwrap_err().kind(), ErrorKind::EncryptedDocument);
}
