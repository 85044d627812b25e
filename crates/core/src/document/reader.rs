//! Opening a document and the document-level API.

use super::key::{KeyBuilder, StandardKeyBuilder};
use super::page::Page;
use super::text_string::decode_text;
use super::xref::ObjectTable;
use crate::error::{PdfError, Result};
use crate::font::FontCache;
use crate::interp::ContentCache;
use crate::model::objects::{PDFObjRef, PDFObject};
use bytes::Bytes;
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use smol_str::SmolStr;
use tracing::debug;

/// How to open a document.
#[derive(Default)]
pub struct OpenOptions {
    /// User or owner password. Empty when not given.
    pub password: Option<Vec<u8>>,
    /// Picks the security handler for encrypted files. The standard
    /// password handler when not given.
    pub key_builder: Option<Box<dyn KeyBuilder>>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn password(mut self, password: impl Into<Vec<u8>>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn key_builder(mut self, builder: impl KeyBuilder + 'static) -> Self {
        self.key_builder = Some(Box::new(builder));
        self
    }
}

/// An open document.
///
/// Objects, fonts and parsed content streams are cached for as long as the
/// document lives, so pages sharing resources only pay for them once.
pub struct Document {
    objects: ObjectTable,
    fonts: FontCache,
    contents: ContentCache,
    pages: OnceCell<Vec<PDFObjRef>>,
}

impl Document {
    /// Opens `data` with the standard security handler. `password` may be
    /// empty.
    pub fn open(data: impl Into<Bytes>, password: &str) -> Result<Self> {
        Self::open_with(data, OpenOptions::new().password(password.as_bytes()))
    }

    pub fn open_with(data: impl Into<Bytes>, options: OpenOptions) -> Result<Self> {
        let password = options.password.unwrap_or_default();
        let standard = StandardKeyBuilder;
        let key_builder: &dyn KeyBuilder = match &options.key_builder {
            Some(builder) => builder.as_ref(),
            None => &standard,
        };
        let objects = ObjectTable::new(data, &password, key_builder)?;
        debug!(
            version = objects.pdf_version(),
            encrypted = objects.is_encrypted(),
            recovered = objects.is_recovered(),
            "document opened"
        );
        Ok(Self {
            objects,
            fonts: FontCache::default(),
            contents: ContentCache::default(),
            pages: OnceCell::new(),
        })
    }

    /// The object table, for callers that need raw objects.
    pub const fn objects(&self) -> &ObjectTable {
        &self.objects
    }

    pub(crate) const fn fonts(&self) -> &FontCache {
        &self.fonts
    }

    pub(crate) const fn contents(&self) -> &ContentCache {
        &self.contents
    }

    pub const fn pdf_version(&self) -> f64 {
        self.objects.pdf_version()
    }

    fn page_references(&self) -> Result<&[PDFObjRef]> {
        self.pages
            .get_or_try_init(|| self.objects.page_references())
            .map(Vec::as_slice)
    }

    /// `/Count` of the page tree root, or the number of leaf pages when the
    /// root does not say.
    pub fn page_count(&self) -> Result<usize> {
        let catalog = self.objects.catalog()?;
        let count = match catalog.get("Pages") {
            Some(pages) => self
                .objects
                .resolve_dict(pages)?
                .get("Count")
                .map(|c| self.objects.resolve(c))
                .transpose()?
                .and_then(|c| c.as_int().ok())
                .and_then(|c| usize::try_from(c).ok()),
            None => None,
        };
        match count {
            Some(count) => Ok(count),
            None => Ok(self.page_references()?.len()),
        }
    }

    /// Every page, in order.
    pub fn pages(&self) -> Result<Vec<Page<'_>>> {
        self.page_references()?
            .iter()
            .enumerate()
            .map(|(i, r)| Page::new(self, i + 1, *r))
            .collect()
    }

    /// Page `number`, counting from 1.
    pub fn page(&self, number: usize) -> Result<Page<'_>> {
        let count = self.page_count()?;
        if number == 0 || number > count {
            return Err(PdfError::InvalidPage { page: number, count });
        }
        let reference = self.page_references()?.get(number - 1).copied().ok_or_else(|| {
            PdfError::malformed(format!("page tree claims {count} pages but page {number} is missing"))
        })?;
        Page::new(self, number, reference)
    }

    /// The `/Info` dictionary with text strings decoded. Values that are
    /// not strings, names, numbers or booleans are left out.
    pub fn info(&self) -> Result<IndexMap<SmolStr, String>> {
        let Some(info) = self.objects.trailer().get("Info") else {
            return Ok(IndexMap::new());
        };
        let info = self.objects.resolve_dict(info)?;
        let mut out = IndexMap::new();
        for (key, value) in &info {
            let text = match self.objects.resolve(value)? {
                PDFObject::String(bytes) => decode_text(&bytes),
                PDFObject::Name(name) => name.to_string(),
                PDFObject::Int(n) => n.to_string(),
                PDFObject::Real(n) => n.to_string(),
                PDFObject::Bool(b) => b.to_string(),
                other => {
                    debug!(%key, kind = other.type_name(), "skipping info entry");
                    continue;
                }
            };
            out.insert(key.clone(), text);
        }
        Ok(out)
    }

    /// The XMP metadata stream of the catalog as text.
    pub fn metadata(&self) -> Result<Option<String>> {
        let catalog = self.objects.catalog()?;
        let Some(entry) = catalog.get("Metadata") else {
            return Ok(None);
        };
        match self.objects.resolve(entry)? {
            PDFObject::Stream(stream) => Ok(Some(String::from_utf8_lossy(stream.data()?).into_owned())),
            PDFObject::Null => Ok(None),
            other => Err(PdfError::malformed(format!(
                "/Metadata is a {}, not a stream",
                other.type_name()
            ))),
        }
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("version", &self.objects.pdf_version())
            .field("objects", &self.objects.size())
            .field("encrypted", &self.objects.is_encrypted())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::testutil::{build, stream};
    use crate::error::ErrorKind;

    fn three_pages() -> Vec<u8> {
        let xmp = stream("/Type /Metadata /Subtype /XML", "<x:xmpmeta/>");
        build(
            &[
                "<< /Type /Catalog /Pages 2 0 R /Metadata 7 0 R >>",
                "<< /Type /Pages /Kids [3 0 R 4 0 R 5 0 R] /Count 3 /MediaBox [0 0 100 100] >>",
                "<< /Type /Page /Parent 2 0 R >>",
                "<< /Type /Page /Parent 2 0 R >>",
                "<< /Type /Page /Parent 2 0 R >>",
                "<< /Title <FEFF00480069> /Author (Ann) /Trapped /False /Pages 3 >>",
                &xmp,
            ],
            "<< /Root 1 0 R /Info 6 0 R >>",
        )
    }

    #[test]
    fn pages_are_numbered_from_one() {
        let doc = Document::open(three_pages(), "").unwrap();
        assert_eq!(doc.page_count().unwrap(), 3);
        assert_eq!(doc.pages().unwrap().len(), 3);
        assert_eq!(doc.page(3).unwrap().reference(), PDFObjRef::new(5, 0));
        for bad in [0, 4] {
            let err = doc.page(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidPage);
            assert!(matches!(err, PdfError::InvalidPage { page, count: 3 } if page == bad));
        }
    }

    #[test]
    fn info_and_metadata_are_text() {
        let doc = Document::open(three_pages(), "").unwrap();
        let info = doc.info().unwrap();
        assert_eq!(info["Title"], "Hi");
        assert_eq!(info["Author"], "Ann");
        assert_eq!(info["Trapped"], "False");
        assert_eq!(info["Pages"], "3");
        assert_eq!(doc.metadata().unwrap().as_deref(), Some("<x:xmpmeta/>"));
        assert_eq!(doc.pdf_version(), 1.4);
    }

    #[test]
    fn empty_documents_have_no_pages() {
        let bytes = build(&["<< /Type /Catalog >>"], "<< /Root 1 0 R >>");
        let doc = Document::open(bytes, "").unwrap();
        assert_eq!(doc.page_count().unwrap(), 0);
        assert!(doc.info().unwrap().is_empty());
        assert_eq!(doc.metadata().unwrap(), None);
        assert!(matches!(doc.page(1), Err(PdfError::InvalidPage { page: 1, count: 0 })));
    }

    #[test]
    fn count_larger_than_the_tree_is_malformed() {
        let bytes = build(
            &[
                "<< /Type /Catalog /Pages 2 0 R >>",
                "<< /Type /Pages /Kids [3 0 R] /Count 2 /MediaBox [0 0 1 1] >>",
                "<< /Type /Page /Parent 2 0 R >>",
            ],
            "<< /Root 1 0 R >>",
        );
        let doc = Document::open(bytes, "").unwrap();
        assert!(doc.page(1).is_ok());
        assert!(doc.page(2).unwrap_err().is_malformed());
    }
}
