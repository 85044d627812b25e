//! PDF object parser - builds typed values from lexer tokens.

use super::lexer::{Keyword, Lexer, Token};
use crate::document::tolerance::{ENDSTREAM_SCAN, OBJECT_ID_RECHECKS};
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObjRef, PDFObject, PDFStream};
use tracing::{debug, warn};

/// Something that can follow indirect references while parsing.
///
/// Stream dictionaries may hold `/Length` or `/Filter` as references, which
/// must be resolved before the payload can be read.
pub trait Resolve {
    fn resolve(&self, obj: &PDFObject) -> Result<PDFObject>;
}

/// PDF Parser - parses PDF object syntax
///
/// Handles indirect references (num num R) with a two-token lookahead.
pub struct PDFParser<'a, 'r> {
    lexer: Lexer<'a>,
    /// Lookahead buffer for tokens, most recent last
    lookahead: Vec<(usize, Token)>,
    resolver: Option<&'r dyn Resolve>,
}

impl<'a, 'r> PDFParser<'a, 'r> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            lexer: Lexer::new(data),
            lookahead: Vec::new(),
            resolver: None,
        }
    }

    pub fn with_resolver(data: &'a [u8], resolver: &'r dyn Resolve) -> Self {
        Self {
            resolver: Some(resolver),
            ..Self::new(data)
        }
    }

    pub fn seek(&mut self, pos: usize) {
        self.lookahead.clear();
        self.lexer.seek(pos);
    }

    /// Offset of the next unread token.
    pub fn tell(&self) -> usize {
        self.lookahead
            .last()
            .map_or_else(|| self.lexer.tell(), |(pos, _)| *pos)
    }

    /// Get next token (from lookahead or lexer)
    fn next_token(&mut self) -> Result<Option<(usize, Token)>> {
        if let Some(tok) = self.lookahead.pop() {
            return Ok(Some(tok));
        }
        self.lexer.next_token().transpose()
    }

    fn push_back(&mut self, tok: (usize, Token)) {
        self.lookahead.push(tok);
    }

    /// Next raw token, for callers scanning structure (xref tables).
    pub fn next_raw(&mut self) -> Result<Option<Token>> {
        Ok(self.next_token()?.map(|(_, t)| t))
    }

    /// Parse next PDF object
    pub fn parse_token(&mut self) -> Result<PDFObject> {
        let (pos, token) = self.next_token()?.ok_or(PdfError::UnexpectedEof)?;
        self.token_to_object(pos, token)
    }

    /// Read the indirect object `id gen obj ... endobj` at the cursor.
    ///
    /// If the first integer is not `id`, the next token is tried once, since
    /// cross-reference offsets are sometimes a few bytes early.
    pub fn parse_indirect_object(&mut self, id: u32, gen_no: u32) -> Result<PDFObject> {
        let mut id_check = self.parse_token()?;
        let mut rechecks = 0;
        while !is_int(&id_check, id) {
            if rechecks == OBJECT_ID_RECHECKS {
                return Err(PdfError::malformed(format!(
                    "expected object {id} but found {id_check:?}"
                )));
            }
            debug!(id, found = ?id_check, "object id mismatch, checking next token");
            id_check = self.parse_token()?;
            rechecks += 1;
        }
        let gen_check = self.parse_token()?;
        if !is_int(&gen_check, gen_no) {
            return Err(PdfError::malformed(format!(
                "expected generation {gen_no} for object {id} but found {gen_check:?}"
            )));
        }
        match self.next_token()? {
            Some((_, Token::Keyword(Keyword::Obj))) => {}
            other => {
                return Err(PdfError::malformed(format!(
                    "expected obj keyword for object {id}, found {:?}",
                    other.map(|(_, t)| t)
                )));
            }
        }

        let obj = self.parse_token()?;
        if let PDFObject::Dict(dict) = obj {
            match self.next_token()? {
                Some((_, Token::Keyword(Keyword::Stream))) => {
                    return self.parse_stream(dict, id).map(|s| PDFObject::Stream(Box::new(s)));
                }
                Some(tok) => self.push_back(tok),
                None => {}
            }
            return Ok(PDFObject::Dict(dict));
        }
        Ok(obj)
    }

    /// Convert a token to a PDF object
    fn token_to_object(&mut self, pos: usize, token: Token) -> Result<PDFObject> {
        match token {
            Token::Int(n) => Ok(self.maybe_reference(n)?.unwrap_or(PDFObject::Int(n))),
            Token::Real(n) => Ok(PDFObject::Real(n)),
            Token::Name(s) => Ok(PDFObject::Name(s)),
            Token::String(s) => Ok(PDFObject::String(s)),
            Token::Keyword(kw) => match kw {
                Keyword::Null => Ok(PDFObject::Null),
                Keyword::True => Ok(PDFObject::Bool(true)),
                Keyword::False => Ok(PDFObject::Bool(false)),
                Keyword::ArrayStart => self.parse_array(pos),
                Keyword::DictStart => self.parse_dict(pos).map(PDFObject::Dict),
                other => Err(PdfError::TokenError {
                    pos,
                    msg: format!("unexpected keyword: {}", other.as_str()),
                }),
            },
        }
    }

    /// `n m R` lookahead after an integer.
    fn maybe_reference(&mut self, n: i64) -> Result<Option<PDFObject>> {
        let Some(tok2) = self.next_token()? else {
            return Ok(None);
        };
        if let (_, Token::Int(m)) = tok2 {
            match self.next_token()? {
                Some((_, Token::Keyword(Keyword::R))) => {
                    let (Ok(objid), Ok(genno)) = (u32::try_from(n), u32::try_from(m)) else {
                        return Err(PdfError::malformed(format!("invalid reference {n} {m} R")));
                    };
                    return Ok(Some(PDFObject::Ref(PDFObjRef::new(objid, genno))));
                }
                Some(tok3) => self.push_back(tok3),
                None => {}
            }
        }
        self.push_back(tok2);
        Ok(None)
    }

    /// Parse array contents until ]
    fn parse_array(&mut self, start: usize) -> Result<PDFObject> {
        let mut arr = Vec::new();
        loop {
            let Some((pos, token)) = self.next_token()? else {
                return Err(PdfError::malformed(format!("unterminated array at offset {start}")));
            };
            if token.is_keyword(&Keyword::ArrayEnd) {
                break;
            }
            arr.push(self.token_to_object(pos, token)?);
        }
        Ok(PDFObject::Array(arr))
    }

    /// Parse dict contents until >>
    fn parse_dict(&mut self, start: usize) -> Result<PDFDict> {
        let mut dict = PDFDict::new();
        loop {
            let Some((pos, token)) = self.next_token()? else {
                return Err(PdfError::malformed(format!("unterminated dict at offset {start}")));
            };
            let key = match token {
                Token::Keyword(Keyword::DictEnd) => break,
                Token::Name(name) => name,
                other => {
                    return Err(PdfError::malformed(format!(
                        "dictionary key at offset {pos} is not a name: {other:?}"
                    )));
                }
            };
            let Some((vpos, vtok)) = self.next_token()? else {
                return Err(PdfError::malformed(format!("unterminated dict at offset {start}")));
            };
            if vtok.is_keyword(&Keyword::DictEnd) {
                return Err(PdfError::malformed(format!("dictionary key /{key} has no value")));
            }
            let value = self.token_to_object(vpos, vtok)?;
            dict.insert(key, value);
        }
        Ok(dict)
    }

    fn deref(&self, obj: &PDFObject) -> Result<PDFObject> {
        match (obj, self.resolver) {
            (PDFObject::Ref(r), Some(resolver)) => resolver.resolve(obj).map_err(|e| {
                PdfError::malformed(format!("cannot resolve stream attribute {r}: {e}"))
            }),
            (PDFObject::Ref(r), None) => Err(PdfError::malformed(format!(
                "stream attribute {r} is indirect but no object table is available"
            ))),
            _ => Ok(obj.clone()),
        }
    }

    /// Read the payload after the `stream` keyword.
    fn parse_stream(&mut self, mut dict: PDFDict, id: u32) -> Result<PDFStream> {
        let length = dict
            .get("Length")
            .ok_or_else(|| PdfError::malformed(format!("stream {id} is missing /Length")))?;
        let length = self.deref(length)?;
        let length = match length {
            PDFObject::Int(n) if n >= 0 => n as usize,
            other => {
                return Err(PdfError::malformed(format!(
                    "stream {id} has invalid /Length {other:?}"
                )));
            }
        };
        dict.insert("Length".into(), PDFObject::Int(length as i64));
        for key in ["Filter", "DecodeParms"] {
            if let Some(value) = dict.get(key) {
                let resolved = self.resolve_shallow(value)?;
                dict.insert(key.into(), resolved);
            }
        }

        debug_assert!(self.lookahead.is_empty());
        let start = self.lexer.tell();
        let data = match self.lexer.read(length, true) {
            Ok(data) => data,
            Err(err) => self.recover_stream_data(start).ok_or(err)?,
        };
        match self.next_token()? {
            Some((_, Token::Keyword(Keyword::EndStream))) => {}
            Some(tok) => {
                warn!(id, "stream is not followed by endstream");
                self.push_back(tok);
            }
            None => warn!(id, "stream is not followed by endstream"),
        }
        Ok(PDFStream::new(dict, data.to_vec()))
    }

    /// `/Filter` and `/DecodeParms` can hold references at two levels.
    fn resolve_shallow(&self, value: &PDFObject) -> Result<PDFObject> {
        match self.deref(value)? {
            PDFObject::Array(items) => items
                .iter()
                .map(|item| self.deref(item))
                .collect::<Result<Vec<_>>>()
                .map(PDFObject::Array),
            other => Ok(other),
        }
    }

    /// `/Length` overruns the buffer: fall back to the nearest `endstream`.
    fn recover_stream_data(&mut self, start: usize) -> Option<&'a [u8]> {
        self.lexer.seek(start);
        self.lexer.skip_eol();
        let data_start = self.lexer.tell();
        let end = self.lexer.find_forward(b"endstream")?;
        if end - data_start > ENDSTREAM_SCAN {
            return None;
        }
        warn!(offset = data_start, "stream /Length overruns the file, using endstream marker");
        let mut data = &self.lexer.data()[data_start..end];
        if let Some(stripped) = data.strip_suffix(b"\r\n") {
            data = stripped;
        } else if let Some(stripped) = data.strip_suffix(b"\n").or_else(|| data.strip_suffix(b"\r")) {
            data = stripped;
        }
        self.lexer.seek(end);
        Some(data)
    }
}

fn is_int(obj: &PDFObject, expected: u32) -> bool {
    matches!(obj, PDFObject::Int(n) if *n == i64::from(expected))
}
