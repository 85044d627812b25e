//! Compressed object streams (`/Type /ObjStm`).

use crate::error::{PdfError, Result};
use crate::model::objects::{PDFObject, PDFStream};
use crate::parser::PDFParser;
use rustc_hash::FxHashMap;

/// Decoded container of compressed objects.
///
/// The header is `N` pairs of `objid offset`, where offsets are relative to
/// `/First`.
#[derive(Debug)]
pub struct ObjectStream {
    data: Vec<u8>,
    /// objid -> absolute offset in `data`, in header order
    offsets: Vec<(u32, usize)>,
    by_id: FxHashMap<u32, usize>,
}

impl ObjectStream {
    pub fn new(stream: &PDFStream) -> Result<Self> {
        let n = header_int(stream, "N")?;
        let first = header_int(stream, "First")?;
        let data = stream.data()?.to_vec();
        if first > data.len() {
            return Err(PdfError::malformed(format!(
                "object stream /First {first} is past its {} decoded bytes",
                data.len()
            )));
        }

        let mut parser = PDFParser::new(&data[..first]);
        let mut offsets = Vec::with_capacity(n);
        for _ in 0..n {
            let objid = parser.parse_token().and_then(|o| o.as_int())?;
            let offset = parser.parse_token().and_then(|o| o.as_int())?;
            let (Ok(objid), Ok(offset)) = (u32::try_from(objid), usize::try_from(offset)) else {
                return Err(PdfError::malformed(format!(
                    "object stream header entry {objid} {offset} is out of range"
                )));
            };
            offsets.push((objid, first + offset));
        }

        let mut by_id = FxHashMap::default();
        for (i, (objid, _)) in offsets.iter().enumerate() {
            by_id.entry(*objid).or_insert(i);
        }
        Ok(Self {
            data,
            offsets,
            by_id,
        })
    }

    /// Number of objects declared in the header.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Object `objid`, looked up by id first and by header position second.
    pub fn get(&self, objid: u32, index: usize) -> Result<Option<PDFObject>> {
        let slot = self
            .by_id
            .get(&objid)
            .copied()
            .or_else(|| (index < self.offsets.len()).then_some(index));
        let Some(slot) = slot else {
            return Ok(None);
        };
        let offset = self.offsets[slot].1;
        if offset > self.data.len() {
            return Err(PdfError::malformed(format!(
                "compressed object {objid} starts past the end of its stream"
            )));
        }
        let mut parser = PDFParser::new(&self.data[offset..]);
        parser.parse_token().map(Some)
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.offsets.iter().map(|(id, _)| *id)
    }
}

fn header_int(stream: &PDFStream, key: &str) -> Result<usize> {
    let value = stream
        .get(key)
        .ok_or_else(|| PdfError::malformed(format!("object stream is missing /{key}")))?
        .as_int()?;
    usize::try_from(value)
        .map_err(|_| PdfError::malformed(format!("object stream /{key} is negative")))
}
