//! The object table: cross-reference loading and object resolution.
//!
//! Offsets come from classic `xref` tables, cross-reference streams or, when
//! both are unusable, a linear scan for `N G obj` headers. Sections linked by
//! `/Prev` are merged so the most recent definition of an object wins.

use super::key::KeyBuilder;
use super::object_stream::ObjectStream;
use super::security::{NullSecurityHandler, SecurityHandler};
use super::tolerance::{HEADER_WINDOW, STARTXREF_WINDOW};
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObjRef, PDFObject, PDFStream};
use crate::parser::lexer::find_subslice;
use crate::parser::{Keyword, PDFParser, Resolve, Token};
use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;
use lazy_static::lazy_static;
use regex::bytes::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

lazy_static! {
    static ref OBJECT_HEADER: Regex =
        Regex::new(r"(\d+)\s+(\d+)\s+obj\b").expect("object header pattern is valid");
}

thread_local! {
    /// Objects being parsed on this thread, to catch `/Length 5 0 R` inside object 5.
    static LOADING: RefCell<FxHashSet<PDFObjRef>> = RefCell::new(FxHashSet::default());
}

struct LoadingGuard(PDFObjRef);

impl LoadingGuard {
    fn enter(r: PDFObjRef) -> Result<Self> {
        let fresh = LOADING.with(|set| set.borrow_mut().insert(r));
        if !fresh {
            return Err(PdfError::malformed(format!("object {r} refers to itself while loading")));
        }
        Ok(Self(r))
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        LOADING.with(|set| {
            set.borrow_mut().remove(&self.0);
        });
    }
}

/// Where an object lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XRefEntry {
    /// Byte offset of `id gen obj`, relative to the `%PDF-` header
    Offset { offset: usize, genno: u32 },
    /// Inside object stream `stream`, at header position `index`
    Compressed { stream: u32, index: usize },
}

impl XRefEntry {
    pub const fn genno(&self) -> u32 {
        match self {
            Self::Offset { genno, .. } => *genno,
            Self::Compressed { .. } => 0,
        }
    }
}

/// One cross-reference section and its trailer.
#[derive(Default)]
struct Section {
    entries: Vec<(u32, XRefEntry)>,
    trailer: PDFDict,
}

/// Maps references to objects for one open document.
pub struct ObjectTable {
    data: Bytes,
    version: f64,
    entries: FxHashMap<u32, XRefEntry>,
    trailer: PDFDict,
    security: Box<dyn SecurityHandler>,
    encrypt_ref: Option<PDFObjRef>,
    recovered: bool,
    cache: Mutex<FxHashMap<PDFObjRef, PDFObject>>,
    object_streams: Mutex<FxHashMap<u32, Arc<ObjectStream>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ObjectTable {
    /// Index `data` and set up decryption if the trailer has `/Encrypt`.
    pub fn new(data: impl Into<Bytes>, password: &[u8], key_builder: &dyn KeyBuilder) -> Result<Self> {
        let data: Bytes = data.into();
        if data.is_empty() {
            return Err(PdfError::malformed("document is empty"));
        }

        let window = &data[..data.len().min(HEADER_WINDOW)];
        let (data, version) = match find_subslice(window, b"%PDF-") {
            Some(shift) => {
                if shift > 0 {
                    debug!(shift, "skipping junk before the header");
                }
                let version = parse_version(&data[shift + 5..]);
                (data.slice(shift..), version)
            }
            None => {
                warn!("no %PDF- header in the first {HEADER_WINDOW} bytes");
                (data, 1.0)
            }
        };

        let mut table = Self {
            data,
            version,
            entries: FxHashMap::default(),
            trailer: PDFDict::new(),
            security: Box::new(NullSecurityHandler),
            encrypt_ref: None,
            recovered: false,
            cache: Mutex::new(FxHashMap::default()),
            object_streams: Mutex::new(FxHashMap::default()),
        };

        let loaded = table
            .find_startxref()
            .ok_or_else(|| PdfError::malformed("startxref not found"))
            .and_then(|pos| table.load_sections(pos));
        if let Err(err) = loaded {
            warn!(error = %err, "cross-reference data is unusable, scanning for objects");
            table.entries.clear();
            table.trailer.clear();
            table.rebuild()?;
        }

        table.setup_security(password, key_builder)?;
        Ok(table)
    }

    /// `%PDF-x.y` from the header.
    pub const fn pdf_version(&self) -> f64 {
        self.version
    }

    pub const fn trailer(&self) -> &PDFDict {
        &self.trailer
    }

    pub fn is_encrypted(&self) -> bool {
        !self.security.is_null()
    }

    /// True when the table was rebuilt by scanning rather than read from xref data.
    pub const fn is_recovered(&self) -> bool {
        self.recovered
    }

    /// `/Size` from the trailer, or the number of known objects.
    pub fn size(&self) -> usize {
        self.trailer
            .get("Size")
            .and_then(|s| s.as_int().ok())
            .and_then(|s| usize::try_from(s).ok())
            .unwrap_or(self.entries.len())
    }

    pub fn entry(&self, objid: u32) -> Option<XRefEntry> {
        self.entries.get(&objid).copied()
    }

    /// Every known reference, in id order.
    pub fn references(&self) -> Vec<PDFObjRef> {
        let mut refs: Vec<_> = self
            .entries
            .iter()
            .map(|(id, entry)| PDFObjRef::new(*id, entry.genno()))
            .collect();
        refs.sort_unstable();
        refs
    }

    fn find_startxref(&self) -> Option<usize> {
        let tail_start = self.data.len().saturating_sub(STARTXREF_WINDOW);
        let tail = &self.data[tail_start..];
        let found = tail.windows(9).rposition(|w| w == b"startxref")?;
        let mut parser = PDFParser::new(&tail[found + 9..]);
        match parser.next_raw() {
            Ok(Some(Token::Int(n))) => usize::try_from(n).ok(),
            _ => None,
        }
    }

    /// Follow the chain of sections starting at `start`.
    fn load_sections(&mut self, start: usize) -> Result<()> {
        let mut visited = FxHashSet::default();
        let mut next = Some(start);
        while let Some(pos) = next.take() {
            if !visited.insert(pos) {
                debug!(pos, "cross-reference chain loops back, stopping");
                break;
            }
            let section = self.read_section(pos)?;
            next = offset_key(&section.trailer, "Prev");
            let hybrid = offset_key(&section.trailer, "XRefStm");
            self.merge(section);

            if let Some(stm) = hybrid
                && visited.insert(stm)
            {
                match self.read_xref_stream(stm) {
                    Ok(section) => self.merge(section),
                    Err(err) => warn!(offset = stm, error = %err, "ignoring unreadable XRefStm"),
                }
            }
        }
        if !self.trailer.contains_key("Root") {
            return Err(PdfError::malformed("trailer has no /Root"));
        }
        Ok(())
    }

    /// Older sections never override what a newer one declared.
    fn merge(&mut self, section: Section) {
        for (id, entry) in section.entries {
            self.entries.entry(id).or_insert(entry);
        }
        for (key, value) in section.trailer {
            self.trailer.entry(key).or_insert(value);
        }
    }

    fn read_section(&self, pos: usize) -> Result<Section> {
        if pos >= self.data.len() {
            return Err(PdfError::malformed(format!(
                "cross-reference offset {pos} is past the end of the file"
            )));
        }
        let mut parser = PDFParser::new(&self.data);
        parser.seek(pos);
        match parser.next_raw()? {
            Some(Token::Keyword(Keyword::Xref)) => self.read_table(&mut parser),
            Some(Token::Int(_)) => self.read_xref_stream(pos),
            other => Err(PdfError::malformed(format!(
                "expected cross-reference data at offset {pos}, found {other:?}"
            ))),
        }
    }

    /// Classic table, cursor just past `xref`.
    fn read_table(&self, parser: &mut PDFParser<'_, '_>) -> Result<Section> {
        let mut section = Section::default();
        loop {
            let start = match parser.next_raw()? {
                Some(Token::Keyword(Keyword::Trailer)) => break,
                Some(Token::Int(n)) => n,
                other => {
                    return Err(PdfError::malformed(format!(
                        "bad cross-reference subsection header: {other:?}"
                    )));
                }
            };
            let count = match parser.next_raw()? {
                Some(Token::Int(n)) => n,
                other => {
                    return Err(PdfError::malformed(format!(
                        "bad cross-reference subsection count: {other:?}"
                    )));
                }
            };
            let mut base = start;
            for i in 0..count {
                let (offset, genno, marker) = read_table_row(parser)?;
                // Subsections that claim to start at 1 but still list the
                // free head entry of object 0.
                if i == 0 && base > 0 && marker == "f" && offset == 0 && genno == 65535 {
                    base -= 1;
                }
                let (Ok(id), Ok(offset), Ok(genno)) = (
                    u32::try_from(base + i),
                    usize::try_from(offset),
                    u32::try_from(genno),
                ) else {
                    continue;
                };
                if marker == "n" && offset > 0 {
                    section.entries.push((id, XRefEntry::Offset { offset, genno }));
                }
            }
        }

        section.trailer = match parser.parse_token()? {
            PDFObject::Dict(dict) => dict,
            other => {
                return Err(PdfError::malformed(format!(
                    "trailer is not a dictionary: {}",
                    other.type_name()
                )));
            }
        };
        Ok(section)
    }

    /// Cross-reference stream at `pos`. Never decrypted.
    fn read_xref_stream(&self, pos: usize) -> Result<Section> {
        let mut parser = PDFParser::with_resolver(&self.data, self);
        parser.seek(pos);
        let (Some(Token::Int(id)), Some(Token::Int(genno))) = (parser.next_raw()?, parser.next_raw()?)
        else {
            return Err(PdfError::malformed(format!("no cross-reference stream at offset {pos}")));
        };
        let (Ok(id), Ok(genno)) = (u32::try_from(id), u32::try_from(genno)) else {
            return Err(PdfError::malformed(format!("bad object header at offset {pos}")));
        };
        parser.seek(pos);
        let obj = parser.parse_indirect_object(id, genno)?;
        let stream = obj.as_stream()?;
        let data = stream.data()?;

        let widths = stream
            .get("W")
            .ok_or_else(|| PdfError::malformed("cross-reference stream is missing /W"))?
            .as_array()?
            .iter()
            .map(|w| w.as_int().map(|w| w.clamp(0, 8) as usize))
            .collect::<Result<Vec<_>>>()?;
        let [w0, w1, w2] = widths[..] else {
            return Err(PdfError::malformed("cross-reference /W must have three entries"));
        };
        let row_len = w0 + w1 + w2;
        if row_len == 0 {
            return Err(PdfError::malformed("cross-reference /W describes empty rows"));
        }

        let size = stream.get("Size").map(PDFObject::as_int).transpose()?.unwrap_or(0);
        let index = match stream.get("Index") {
            Some(index) => index
                .as_array()?
                .chunks_exact(2)
                .map(|pair| Ok((pair[0].as_int()?, pair[1].as_int()?)))
                .collect::<Result<Vec<_>>>()?,
            None => vec![(0, size)],
        };

        let mut section = Section::default();
        let mut rows = data.chunks_exact(row_len);
        'subsections: for (start, count) in index {
            for id in start..start.saturating_add(count) {
                let Some(row) = rows.next() else {
                    break 'subsections;
                };
                let kind = if w0 == 0 { 1 } else { column(&row[..w0]) };
                let f1 = column(&row[w0..w0 + w1]);
                let f2 = column(&row[w0 + w1..]);
                let Ok(id) = u32::try_from(id) else {
                    continue;
                };
                if let Some(entry) = stream_entry(kind, f1, f2) {
                    section.entries.push((id, entry));
                }
            }
        }

        for (key, value) in &stream.attrs {
            if !matches!(
                key.as_str(),
                "Length" | "Filter" | "DecodeParms" | "W" | "Index" | "Type"
            ) {
                section.trailer.insert(key.clone(), value.clone());
            }
        }
        Ok(section)
    }

    /// Rebuild the table by scanning for object headers. Later copies of an
    /// object replace earlier ones, matching incremental updates.
    fn rebuild(&mut self) -> Result<()> {
        self.recovered = true;
        for caps in OBJECT_HEADER.captures_iter(&self.data) {
            let (Some(whole), Some(id), Some(genno)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                continue;
            };
            let (Some(id), Some(genno)) = (ascii_number(id.as_bytes()), ascii_number(genno.as_bytes()))
            else {
                continue;
            };
            self.entries.insert(
                id,
                XRefEntry::Offset {
                    offset: whole.start(),
                    genno,
                },
            );
        }
        if self.entries.is_empty() {
            return Err(PdfError::malformed("no objects found in document"));
        }

        let mut search_end = self.data.len();
        while let Some(pos) = self.data[..search_end]
            .windows(7)
            .rposition(|w| w == b"trailer")
        {
            let mut parser = PDFParser::new(&self.data);
            parser.seek(pos + 7);
            if let Ok(PDFObject::Dict(dict)) = parser.parse_token() {
                self.trailer = dict;
                break;
            }
            search_end = pos;
        }

        if !self.trailer.contains_key("Root") {
            let root = self.references().into_iter().find(|r| {
                self.fetch(*r)
                    .ok()
                    .and_then(|obj| obj.get("Type").and_then(|t| t.as_name().ok()).map(str::to_owned))
                    .is_some_and(|t| t == "Catalog")
            });
            match root {
                Some(r) => {
                    debug!(root = %r, "using scanned catalog as /Root");
                    self.trailer.insert("Root".into(), PDFObject::Ref(r));
                }
                None => return Err(PdfError::malformed("no document catalog found")),
            }
        }
        lock(&self.cache).clear();
        Ok(())
    }

    fn setup_security(&mut self, password: &[u8], key_builder: &dyn KeyBuilder) -> Result<()> {
        let Some(encrypt) = self.trailer.get("Encrypt").cloned() else {
            return Ok(());
        };
        self.encrypt_ref = encrypt.as_ref().ok().copied();
        let encrypt = self.dereference_recursive(&encrypt)?;
        let encrypt = encrypt
            .as_dict()
            .map_err(|_| PdfError::malformed("/Encrypt is not a dictionary"))?;
        let doc_id = self
            .trailer
            .get("ID")
            .and_then(|id| id.as_array().ok())
            .and_then(|ids| ids.first())
            .and_then(|first| first.as_string().ok())
            .unwrap_or_default()
            .to_vec();
        self.security = key_builder.build(encrypt, &doc_id, password)?;
        // Anything read so far was read without decryption.
        lock(&self.cache).clear();
        lock(&self.object_streams).clear();
        Ok(())
    }

    /// The object `r` points at. Unknown ids resolve to `Null`.
    pub fn fetch(&self, r: PDFObjRef) -> Result<PDFObject> {
        if let Some(obj) = lock(&self.cache).get(&r) {
            return Ok(obj.clone());
        }
        let Some(entry) = self.entries.get(&r.objid).copied() else {
            return Ok(PDFObject::Null);
        };

        let obj = {
            let _guard = LoadingGuard::enter(r)?;
            self.load(r, entry).map_err(|err| {
                if err.is_malformed() {
                    PdfError::malformed(format!("cannot read object {r}: {err}"))
                } else {
                    err
                }
            })?
        };
        lock(&self.cache).insert(r, obj.clone());
        Ok(obj)
    }

    fn load(&self, r: PDFObjRef, entry: XRefEntry) -> Result<PDFObject> {
        match entry {
            XRefEntry::Offset { offset, genno } => {
                if offset >= self.data.len() {
                    return Err(PdfError::malformed(format!(
                        "offset {offset} is past the end of the file"
                    )));
                }
                let mut parser = PDFParser::with_resolver(&self.data, self);
                parser.seek(offset);
                let obj = parser.parse_indirect_object(r.objid, genno)?;
                let stored = PDFObjRef::new(r.objid, genno);
                if self.security.is_null() || self.encrypt_ref == Some(stored) {
                    Ok(obj)
                } else {
                    self.decrypt(obj, stored)
                }
            }
            XRefEntry::Compressed { stream, index } => {
                let container = self.object_stream(stream)?;
                Ok(container.get(r.objid, index)?.unwrap_or(PDFObject::Null))
            }
        }
    }

    fn object_stream(&self, id: u32) -> Result<Arc<ObjectStream>> {
        if let Some(found) = lock(&self.object_streams).get(&id) {
            return Ok(Arc::clone(found));
        }
        let genno = self.entries.get(&id).map_or(0, XRefEntry::genno);
        let obj = self.fetch(PDFObjRef::new(id, genno))?;
        let stream = obj
            .as_stream()
            .map_err(|_| PdfError::malformed(format!("object {id} is not an object stream")))?;
        let parsed = Arc::new(ObjectStream::new(stream)?);
        lock(&self.object_streams).insert(id, Arc::clone(&parsed));
        Ok(parsed)
    }

    fn decrypt(&self, obj: PDFObject, r: PDFObjRef) -> Result<PDFObject> {
        Ok(match obj {
            PDFObject::String(s) => PDFObject::String(self.security.decrypt_string(&s, r)?),
            PDFObject::Array(items) => PDFObject::Array(
                items
                    .into_iter()
                    .map(|item| self.decrypt(item, r))
                    .collect::<Result<_>>()?,
            ),
            PDFObject::Dict(dict) => PDFObject::Dict(self.decrypt_dict(dict, r)?),
            PDFObject::Stream(stream) => {
                let is_xref = stream.get("Type").and_then(|t| t.as_name().ok()) == Some("XRef");
                let attrs = self.decrypt_dict(stream.attrs.clone(), r)?;
                let raw = if is_xref {
                    stream.rawdata().to_vec()
                } else {
                    self.security.decrypt_stream(stream.rawdata(), r, &attrs)?
                };
                PDFObject::Stream(Box::new(PDFStream::new(attrs, raw)))
            }
            other => other,
        })
    }

    fn decrypt_dict(&self, dict: PDFDict, r: PDFObjRef) -> Result<PDFDict> {
        dict.into_iter()
            .map(|(k, v)| Ok((k, self.decrypt(v, r)?)))
            .collect()
    }

    /// Follow references until a direct value is reached.
    pub fn resolve(&self, obj: &PDFObject) -> Result<PDFObject> {
        let PDFObject::Ref(first) = obj else {
            return Ok(obj.clone());
        };
        let mut seen = FxHashSet::default();
        let mut current = *first;
        loop {
            if !seen.insert(current) {
                return Err(PdfError::malformed(format!("reference {current} points at itself")));
            }
            match self.fetch(current)? {
                PDFObject::Ref(next) => current = next,
                direct => return Ok(direct),
            }
        }
    }

    /// Resolve `obj` and expect a dictionary (stream dictionaries count).
    /// `Null` gives an empty dictionary.
    pub fn resolve_dict(&self, obj: &PDFObject) -> Result<PDFDict> {
        match self.resolve(obj)? {
            PDFObject::Null => Ok(PDFDict::new()),
            PDFObject::Dict(dict) => Ok(dict),
            PDFObject::Stream(stream) => Ok(stream.attrs),
            other => Err(PdfError::TypeError {
                expected: "dict",
                got: other.type_name(),
            }),
        }
    }

    /// Copy of `obj` with every nested reference replaced by its target.
    ///
    /// A reference that leads back to one of its own ancestors is left in
    /// place, so self-referential structures terminate.
    pub fn dereference_recursive(&self, obj: &PDFObject) -> Result<PDFObject> {
        let mut in_progress = FxHashSet::default();
        self.deref_inner(obj, &mut in_progress)
    }

    fn deref_inner(&self, obj: &PDFObject, in_progress: &mut FxHashSet<PDFObjRef>) -> Result<PDFObject> {
        match obj {
            PDFObject::Ref(r) => {
                if !in_progress.insert(*r) {
                    return Ok(obj.clone());
                }
                let target = self.fetch(*r)?;
                let out = self.deref_inner(&target, in_progress);
                in_progress.remove(r);
                out
            }
            PDFObject::Array(items) => items
                .iter()
                .map(|item| self.deref_inner(item, in_progress))
                .collect::<Result<_>>()
                .map(PDFObject::Array),
            PDFObject::Dict(dict) => self.deref_dict(dict, in_progress).map(PDFObject::Dict),
            PDFObject::Stream(stream) => {
                let mut copy = (**stream).clone();
                copy.attrs = self.deref_dict(&stream.attrs, in_progress)?;
                Ok(PDFObject::Stream(Box::new(copy)))
            }
            other => Ok(other.clone()),
        }
    }

    fn deref_dict(&self, dict: &PDFDict, in_progress: &mut FxHashSet<PDFObjRef>) -> Result<PDFDict> {
        dict.iter()
            .map(|(k, v)| Ok((k.clone(), self.deref_inner(v, in_progress)?)))
            .collect()
    }

    /// The document catalog.
    pub fn catalog(&self) -> Result<PDFDict> {
        let root = self
            .trailer
            .get("Root")
            .ok_or_else(|| PdfError::malformed("trailer has no /Root"))?;
        match self.resolve(root)? {
            PDFObject::Dict(dict) => Ok(dict),
            other => Err(PdfError::malformed(format!(
                "document catalog is a {}, not a dictionary",
                other.type_name()
            ))),
        }
    }

    /// Leaf page references in document order.
    pub fn page_references(&self) -> Result<Vec<PDFObjRef>> {
        let catalog = self.catalog()?;
        let mut stack = match catalog.get("Pages") {
            None | Some(PDFObject::Null) => return Ok(Vec::new()),
            Some(PDFObject::Ref(r)) => {
                if self.fetch(*r)?.is_null() {
                    return Ok(Vec::new());
                }
                vec![*r]
            }
            Some(other) => {
                return Err(PdfError::malformed(format!(
                    "/Pages must be an indirect reference, found {}",
                    other.type_name()
                )));
            }
        };

        let mut visited = FxHashSet::default();
        let mut pages = Vec::new();
        while let Some(r) = stack.pop() {
            if !visited.insert(r) {
                return Err(PdfError::malformed(format!("page tree visits {r} twice")));
            }
            let node = match self.fetch(r)? {
                PDFObject::Dict(dict) => dict,
                PDFObject::Null => {
                    return Err(PdfError::malformed(format!(
                        "page tree references missing object {r}"
                    )));
                }
                other => {
                    return Err(PdfError::malformed(format!(
                        "page tree node {r} is a {}",
                        other.type_name()
                    )));
                }
            };
            let kind = node.get("Type").and_then(|t| t.as_name().ok());
            match kind {
                Some("Pages") | None if node.contains_key("Kids") => {
                    let kids = self.resolve(node.get("Kids").unwrap_or(&PDFObject::Null))?;
                    let kids = kids.as_array().map_err(|_| {
                        PdfError::malformed(format!("/Kids of page tree node {r} is not an array"))
                    })?;
                    for kid in kids.iter().rev() {
                        match kid {
                            PDFObject::Ref(kid) => stack.push(*kid),
                            other => {
                                return Err(PdfError::malformed(format!(
                                    "page tree node {r} has a direct kid ({})",
                                    other.type_name()
                                )));
                            }
                        }
                    }
                }
                Some("Pages") => {}
                Some("Page") | None => pages.push(r),
                Some(other) => {
                    return Err(PdfError::malformed(format!(
                        "page tree node {r} has unexpected /Type /{other}"
                    )));
                }
            }
        }
        Ok(pages)
    }
}

impl Resolve for ObjectTable {
    fn resolve(&self, obj: &PDFObject) -> Result<PDFObject> {
        Self::resolve(self, obj)
    }
}

impl std::fmt::Debug for ObjectTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectTable")
            .field("version", &self.version)
            .field("objects", &self.entries.len())
            .field("encrypted", &self.is_encrypted())
            .field("recovered", &self.recovered)
            .finish_non_exhaustive()
    }
}

fn read_table_row(parser: &mut PDFParser<'_, '_>) -> Result<(i64, i64, String)> {
    let row = (parser.next_raw()?, parser.next_raw()?, parser.next_raw()?);
    match row {
        (Some(Token::Int(offset)), Some(Token::Int(genno)), Some(Token::Keyword(Keyword::Other(m))))
            if m == "n" || m == "f" =>
        {
            Ok((offset, genno, m.to_string()))
        }
        other => Err(PdfError::malformed(format!("bad cross-reference entry: {other:?}"))),
    }
}

fn offset_key(trailer: &PDFDict, key: &str) -> Option<usize> {
    trailer
        .get(key)
        .and_then(|v| v.as_int().ok())
        .filter(|&n| n > 0)
        .and_then(|n| usize::try_from(n).ok())
}

/// One cross-reference stream row. Free rows, unknown types and fields too
/// wide for an offset or object number yield `None`.
fn stream_entry(kind: u64, f1: u64, f2: u64) -> Option<XRefEntry> {
    match kind {
        1 => Some(XRefEntry::Offset {
            offset: usize::try_from(f1).ok()?,
            genno: u32::try_from(f2).ok()?,
        }),
        2 => Some(XRefEntry::Compressed {
            stream: u32::try_from(f1).ok()?,
            index: usize::try_from(f2).ok()?,
        }),
        _ => None,
    }
}

/// Big-endian unsigned column of up to eight bytes.
fn column(bytes: &[u8]) -> u64 {
    if bytes.is_empty() {
        0
    } else {
        BigEndian::read_uint(bytes, bytes.len())
    }
}

fn ascii_number(digits: &[u8]) -> Option<u32> {
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// `1.7` from the bytes following `%PDF-`.
fn parse_version(after_marker: &[u8]) -> f64 {
    let end = after_marker
        .iter()
        .position(|b| !(b.is_ascii_digit() || *b == b'.'))
        .unwrap_or(after_marker.len());
    std::str::from_utf8(&after_marker[..end])
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::key::StandardKeyBuilder;
    use crate::document::testutil::build;

    fn open(bytes: Vec<u8>) -> Result<ObjectTable> {
        ObjectTable::new(bytes, b"", &StandardKeyBuilder)
    }

    #[test]
    fn objects_round_trip_through_the_table() {
        let pdf = build(
            &["<< /Type /Catalog /Pages 2 0 R >>", "<< /Type /Pages /Kids [] /Count 0 >>", "(text)"],
            "<< /Size 4 /Root 1 0 R >>",
        );
        let table = open(pdf).unwrap();
        assert_eq!(table.pdf_version(), 1.4);
        assert_eq!(table.fetch(PDFObjRef::new(3, 0)).unwrap(), PDFObject::String(b"text".to_vec()));
        assert_eq!(table.fetch(PDFObjRef::new(3, 0)).unwrap(), PDFObject::String(b"text".to_vec()));
        assert_eq!(table.fetch(PDFObjRef::new(40, 0)).unwrap(), PDFObject::Null);
        assert_eq!(table.size(), 4);
        assert!(table.page_references().unwrap().is_empty());
    }

    #[test]
    fn junk_before_header_shifts_offsets() {
        let mut pdf = b"garbage from a mail gateway\r\n".to_vec();
        pdf.extend(build(&["<< /Type /Catalog >>"], "<< /Root 1 0 R >>"));
        let table = open(pdf).unwrap();
        assert!(!table.is_recovered());
        assert!(table.catalog().unwrap().contains_key("Type"));
    }

    #[test]
    fn broken_startxref_falls_back_to_scan() {
        let mut pdf = build(&["<< /Type /Catalog /Pages 2 0 R >>", "<< /Type /Pages /Kids [] >>"], "<< /Root 1 0 R >>");
        let at = find_subslice(&pdf, b"startxref\n").unwrap() + 10;
        pdf[at..at + 2].copy_from_slice(b"99");
        let table = open(pdf).unwrap();
        assert!(table.is_recovered());
        assert_eq!(table.catalog().unwrap().get("Pages"), Some(&PDFObject::Ref(PDFObjRef::new(2, 0))));
    }

    #[test]
    fn scan_finds_catalog_without_trailer() {
        let pdf = b"%PDF-1.1\n1 0 obj << /Type /Catalog >> endobj\n".to_vec();
        let table = open(pdf).unwrap();
        assert_eq!(table.trailer().get("Root"), Some(&PDFObject::Ref(PDFObjRef::new(1, 0))));
    }

    #[test]
    fn empty_input_is_malformed() {
        assert!(open(Vec::new()).unwrap_err().is_malformed());
    }

    #[test]
    fn recursive_dereference_stops_at_cycles() {
        let pdf = build(
            &["<< /Type /Catalog /Self 1 0 R /Next 2 0 R >>", "[ 1 0 R 3 0 R ]", "42"],
            "<< /Root 1 0 R >>",
        );
        let table = open(pdf).unwrap();
        let out = table.dereference_recursive(&PDFObject::Ref(PDFObjRef::new(1, 0))).unwrap();
        assert_eq!(out.get("Self"), Some(&PDFObject::Ref(PDFObjRef::new(1, 0))));
        let next = out.get("Next").unwrap().as_array().unwrap();
        assert_eq!(next[0], PDFObject::Ref(PDFObjRef::new(1, 0)));
        assert_eq!(next[1], PDFObject::Int(42));
    }

    #[test]
    fn page_tree_cycle_is_malformed() {
        let pdf = build(
            &["<< /Type /Catalog /Pages 2 0 R >>", "<< /Type /Pages /Kids [ 2 0 R ] >>"],
            "<< /Root 1 0 R >>",
        );
        assert!(open(pdf).unwrap().page_references().unwrap_err().is_malformed());
    }

    #[test]
    fn page_tree_kid_missing_is_malformed() {
        let pdf = build(
            &["<< /Type /Catalog /Pages 2 0 R >>", "<< /Type /Pages /Kids [ 9 0 R ] /Count 1 >>"],
            "<< /Root 1 0 R >>",
        );
        assert!(open(pdf).unwrap().page_references().unwrap_err().is_malformed());
    }

    #[test]
    fn stream_length_can_be_indirect() {
        let pdf = build(
            &["<< /Type /Catalog >>", "<< /Length 3 0 R >>\nstream\nabcde\nendstream", "5"],
            "<< /Root 1 0 R >>",
        );
        let table = open(pdf).unwrap();
        let obj = table.fetch(PDFObjRef::new(2, 0)).unwrap();
        assert_eq!(obj.as_stream().unwrap().data().unwrap(), b"abcde");
    }

    #[test]
    fn self_referencing_length_is_malformed() {
        let pdf = build(
            &["<< /Type /Catalog >>", "<< /Length 2 0 R >>\nstream\nabcde\nendstream"],
            "<< /Root 1 0 R >>",
        );
        let table = open(pdf).unwrap();
        assert!(table.fetch(PDFObjRef::new(2, 0)).unwrap_err().is_malformed());
    }

    #[test]
    fn xref_stream_columns() {
        assert_eq!(column(&[]), 0);
        assert_eq!(column(&[0x01, 0x00]), 256);
        assert_eq!(column(&[0, 0, 0x12, 0x34]), 0x1234);
    }

    #[test]
    fn xref_stream_rows_reject_wide_fields() {
        assert!(matches!(
            stream_entry(1, 0x1234, 0),
            Some(XRefEntry::Offset { offset: 0x1234, genno: 0 })
        ));
        assert!(matches!(
            stream_entry(2, 7, 3),
            Some(XRefEntry::Compressed { stream: 7, index: 3 })
        ));
        assert!(stream_entry(0, 0, 65535).is_none());
        assert!(stream_entry(1, 10, 1 << 32).is_none());
        assert!(stream_entry(2, 1 << 32, 0).is_none());
        assert!(stream_entry(9, 1, 1).is_none());
    }

    #[test]
    fn version_from_header() {
        assert_eq!(parse_version(b"1.7\r\n%\xe2\xe3"), 1.7);
        assert_eq!(parse_version(b"garbage"), 1.0);
    }
}
