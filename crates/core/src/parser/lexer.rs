//! Tokenizer for PDF bodies and content streams.
//!
//! The lexer only knows lexical structure. Whether a bare keyword is an
//! object-level keyword (`obj`, `R`, `stream`) or a content-stream operator is
//! decided by the caller.

use crate::error::{PdfError, Result};
use smol_str::SmolStr;

/// Bare keywords. Structural ones get their own variant, everything else
/// (including content-stream operators) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Keyword {
    ArrayStart, // [
    ArrayEnd,   // ]
    DictStart,  // <<
    DictEnd,    // >>
    BraceOpen,  // {
    BraceClose, // }
    True,
    False,
    Null,
    Obj,
    EndObj,
    R,
    Stream,
    EndStream,
    Xref,
    Trailer,
    StartXref,
    Other(SmolStr),
}

impl Keyword {
    pub fn from_bytes(b: &[u8]) -> Self {
        match b {
            b"[" => Self::ArrayStart,
            b"]" => Self::ArrayEnd,
            b"<<" => Self::DictStart,
            b">>" => Self::DictEnd,
            b"{" => Self::BraceOpen,
            b"}" => Self::BraceClose,
            b"true" => Self::True,
            b"false" => Self::False,
            b"null" => Self::Null,
            b"obj" => Self::Obj,
            b"endobj" => Self::EndObj,
            b"R" => Self::R,
            b"stream" => Self::Stream,
            b"endstream" => Self::EndStream,
            b"xref" => Self::Xref,
            b"trailer" => Self::Trailer,
            b"startxref" => Self::StartXref,
            _ => Self::Other(latin1(b)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ArrayStart => "[",
            Self::ArrayEnd => "]",
            Self::DictStart => "<<",
            Self::DictEnd => ">>",
            Self::BraceOpen => "{",
            Self::BraceClose => "}",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::Obj => "obj",
            Self::EndObj => "endobj",
            Self::R => "R",
            Self::Stream => "stream",
            Self::EndStream => "endstream",
            Self::Xref => "xref",
            Self::Trailer => "trailer",
            Self::StartXref => "startxref",
            Self::Other(s) => s,
        }
    }
}

/// Lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Real(f64),
    /// `/Name` with `#XX` escapes decoded
    Name(SmolStr),
    /// Literal `(...)` or hex `<...>` string
    String(Vec<u8>),
    Keyword(Keyword),
}

impl Token {
    pub fn is_keyword(&self, kw: &Keyword) -> bool {
        matches!(self, Self::Keyword(k) if k == kw)
    }
}

/// Byte-level tokenizer with random access.
pub struct Lexer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current position in the buffer.
    pub const fn tell(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.data.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Skip whitespace and `%` comments.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'%' {
                while let Some(c) = self.advance() {
                    if c == b'\r' || c == b'\n' {
                        break;
                    }
                }
                continue;
            }
            if !is_whitespace(b) {
                return;
            }
            self.pos += 1;
        }
    }

    /// Read `n` raw bytes, optionally skipping one leading EOL marker first.
    pub fn read(&mut self, n: usize, skip_leading_eol: bool) -> Result<&'a [u8]> {
        if skip_leading_eol {
            self.skip_eol();
        }
        let end = self.pos.checked_add(n).filter(|end| *end <= self.data.len());
        let Some(end) = end else {
            return Err(PdfError::malformed(format!(
                "wanted {n} bytes at offset {} but only {} remain",
                self.pos,
                self.data.len() - self.pos
            )));
        };
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Consume a single `\r\n`, `\n` or `\r`.
    pub fn skip_eol(&mut self) {
        match self.peek() {
            Some(b'\r') => {
                self.pos += 1;
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            Some(b'\n') => self.pos += 1,
            _ => {}
        }
    }

    /// Offset of the next occurrence of `needle` at or after the cursor.
    pub fn find_forward(&self, needle: &[u8]) -> Option<usize> {
        find_subslice(self.remaining(), needle).map(|i| self.pos + i)
    }

    /// Raw inline image bytes following `ID`.
    ///
    /// Leaves the cursor on the terminating `EI` so the caller sees it as an
    /// ordinary operator. Without a terminator the rest of the buffer is data.
    pub fn read_inline_image_data(&mut self) -> &'a [u8] {
        if matches!(self.peek(), Some(b) if is_whitespace(b)) {
            self.pos += 1;
        }
        let start = self.pos;
        let rest = &self.data[start..];
        let mut i = 0;
        while i + 2 <= rest.len() {
            let preceded = i == 0 || is_whitespace(rest[i - 1]);
            let followed = rest.get(i + 2).is_none_or(|b| is_whitespace(*b) || is_delimiter(*b));
            if preceded && followed && &rest[i..i + 2] == b"EI" {
                self.pos = start + i;
                let mut end = i;
                if end > 0 && is_whitespace(rest[end - 1]) {
                    end -= 1;
                }
                return &rest[..end];
            }
            i += 1;
        }
        self.pos = self.data.len();
        rest
    }

    /// Parse a literal name (/Name)
    fn parse_name(&mut self) -> Token {
        self.advance(); // Skip '/'
        let mut name = Vec::new();

        while let Some(b) = self.peek() {
            if is_whitespace(b) || is_delimiter(b) {
                break;
            }
            self.pos += 1;
            if b == b'#' {
                let hi = self.peek().and_then(hex_value);
                let lo = self.peek_at(1).and_then(hex_value);
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    self.pos += 2;
                    name.push((hi << 4) | lo);
                    continue;
                }
            }
            name.push(b);
        }

        Token::Name(latin1(&name))
    }

    /// Parse a number (integer or real)
    fn parse_number(&mut self) -> Result<Token> {
        let start = self.pos;
        let mut has_dot = false;

        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.advance();
        }

        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.advance();
            } else if b == b'.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        let text = std::str::from_utf8(&self.data[start..self.pos]).map_err(|_| {
            PdfError::TokenError {
                pos: start,
                msg: "invalid number".into(),
            }
        })?;
        // Producers emit "-" and "-." for zero, and "1.-5" style junk.
        let text = text.trim_start_matches('+');
        if text.is_empty() || text == "-" || text == "." || text == "-." {
            return Ok(Token::Int(0));
        }

        if has_dot {
            text.parse::<f64>()
                .map(Token::Real)
                .map_err(|_| PdfError::TokenError {
                    pos: start,
                    msg: format!("invalid real: {text}"),
                })
        } else {
            match text.parse::<i64>() {
                Ok(v) => Ok(Token::Int(v)),
                // Out of range integers degrade to reals.
                Err(_) => text
                    .parse::<f64>()
                    .map(Token::Real)
                    .map_err(|_| PdfError::TokenError {
                        pos: start,
                        msg: format!("invalid int: {text}"),
                    }),
            }
        }
    }

    /// Parse a literal string (...)
    fn parse_string(&mut self) -> Result<Token> {
        let start = self.pos;
        self.advance(); // Skip '('
        let mut result = Vec::new();
        let mut depth = 1;
        let unterminated = || PdfError::malformed(format!("unterminated string at offset {start}"));

        while depth > 0 {
            match self.advance() {
                Some(b'(') => {
                    depth += 1;
                    result.push(b'(');
                }
                Some(b')') => {
                    depth -= 1;
                    if depth > 0 {
                        result.push(b')');
                    }
                }
                Some(b'\\') => match self.advance() {
                    Some(b'n') => result.push(b'\n'),
                    Some(b'r') => result.push(b'\r'),
                    Some(b't') => result.push(b'\t'),
                    Some(b'b') => result.push(0x08),
                    Some(b'f') => result.push(0x0c),
                    Some(b'\r') => {
                        if self.peek() == Some(b'\n') {
                            self.advance();
                        }
                    }
                    Some(b'\n') => {}
                    Some(c @ b'0'..=b'7') => {
                        let mut octal = u32::from(c - b'0');
                        for _ in 0..2 {
                            match self.peek() {
                                Some(d @ b'0'..=b'7') => {
                                    self.advance();
                                    octal = octal * 8 + u32::from(d - b'0');
                                }
                                _ => break,
                            }
                        }
                        result.push((octal & 0xFF) as u8);
                    }
                    Some(c) => result.push(c),
                    None => return Err(unterminated()),
                },
                Some(b'\r') => {
                    if self.peek() == Some(b'\n') {
                        self.advance();
                    }
                    result.push(b'\n');
                }
                Some(c) => result.push(c),
                None => return Err(unterminated()),
            }
        }

        Ok(Token::String(result))
    }

    /// Parse a hex string <...>. An odd trailing digit is padded with zero.
    fn parse_hex_string(&mut self) -> Result<Token> {
        let start = self.pos;
        self.advance(); // Skip '<'
        let mut result = Vec::new();
        let mut pending: Option<u8> = None;

        loop {
            match self.advance() {
                Some(b'>') => break,
                Some(c) if is_whitespace(c) => {}
                Some(c) => {
                    let Some(nibble) = hex_value(c) else {
                        return Err(PdfError::TokenError {
                            pos: self.pos - 1,
                            msg: format!("invalid hex digit {:?}", c as char),
                        });
                    };
                    match pending.take() {
                        Some(high) => result.push((high << 4) | nibble),
                        None => pending = Some(nibble),
                    }
                }
                None => {
                    return Err(PdfError::malformed(format!(
                        "unterminated hex string at offset {start}"
                    )));
                }
            }
        }

        if let Some(high) = pending {
            result.push(high << 4);
        }

        Ok(Token::String(result))
    }

    fn parse_keyword(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if !is_whitespace(b) && !is_delimiter(b)) {
            self.pos += 1;
        }
        Token::Keyword(Keyword::from_bytes(&self.data[start..self.pos]))
    }

    /// Get next token with its starting offset.
    pub fn next_token(&mut self) -> Option<Result<(usize, Token)>> {
        self.skip_whitespace();
        let start = self.pos;
        let b = self.peek()?;

        let result = match b {
            b'/' => Ok(self.parse_name()),
            b'(' => self.parse_string(),
            b'<' if self.peek_at(1) == Some(b'<') => {
                self.pos += 2;
                Ok(Token::Keyword(Keyword::DictStart))
            }
            b'<' => self.parse_hex_string(),
            b'>' if self.peek_at(1) == Some(b'>') => {
                self.pos += 2;
                Ok(Token::Keyword(Keyword::DictEnd))
            }
            b'[' | b']' | b'{' | b'}' | b'>' | b')' => {
                self.pos += 1;
                Ok(Token::Keyword(Keyword::from_bytes(&[b])))
            }
            b'+' | b'-' | b'.' => {
                if matches!(self.peek_at(1), Some(c) if c.is_ascii_digit() || c == b'.' || c == b'-')
                {
                    self.parse_number()
                } else {
                    Ok(self.parse_keyword())
                }
            }
            c if c.is_ascii_digit() => self.parse_number(),
            _ => Ok(self.parse_keyword()),
        };

        Some(result.map(|token| (start, token)))
    }
}

/// Check if byte is PDF whitespace.
pub const fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x00' | b'\x0c')
}

pub const fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

pub(crate) const fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

pub(crate) fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Names are byte strings; map each byte to the matching Latin-1 char.
fn latin1(bytes: &[u8]) -> SmolStr {
    if let Ok(s) = std::str::from_utf8(bytes)
        && s.is_ascii()
    {
        return SmolStr::new(s);
    }
    bytes.iter().map(|&b| char::from(b)).collect::<String>().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &[u8]) -> Vec<Token> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        while let Some(tok) = lexer.next_token() {
            out.push(tok.unwrap().1);
        }
        out
    }

    #[test]
    fn names_decode_hex_escapes() {
        assert_eq!(tokens(b"/A#42C /Foo#2"), vec![
            Token::Name("ABC".into()),
            Token::Name("Foo#2".into()),
        ]);
    }

    #[test]
    fn numbers_and_keywords() {
        assert_eq!(tokens(b"12 -3.5 .5 +7 BT 0 0 Td"), vec![
            Token::Int(12),
            Token::Real(-3.5),
            Token::Real(0.5),
            Token::Int(7),
            Token::Keyword(Keyword::Other("BT".into())),
            Token::Int(0),
            Token::Int(0),
            Token::Keyword(Keyword::Other("Td".into())),
        ]);
    }

    #[test]
    fn literal_strings_with_escapes_and_nesting() {
        assert_eq!(tokens(br"(a(b)c\)\101\n\
x)"), vec![Token::String(b"a(b)c)A\nx".to_vec())]);
    }

    #[test]
    fn odd_hex_string_pads_low_nibble() {
        assert_eq!(tokens(b"<5275627>"), vec![Token::String(b"Rubp".to_vec())]);
        assert_eq!(tokens(b"<52 75 62 79>"), vec![Token::String(b"Ruby".to_vec())]);
    }

    #[test]
    fn unterminated_strings_are_malformed() {
        let mut lexer = Lexer::new(b"(abc");
        assert!(lexer.next_token().unwrap().unwrap_err().is_malformed());
        let mut lexer = Lexer::new(b"<4142");
        assert!(lexer.next_token().unwrap().unwrap_err().is_malformed());
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(tokens(b"%PDF-1.4\n1 % note\n2"), vec![Token::Int(1), Token::Int(2)]);
    }

    #[test]
    fn dictionary_delimiters() {
        assert_eq!(tokens(b"<</A[1]>>"), vec![
            Token::Keyword(Keyword::DictStart),
            Token::Name("A".into()),
            Token::Keyword(Keyword::ArrayStart),
            Token::Int(1),
            Token::Keyword(Keyword::ArrayEnd),
            Token::Keyword(Keyword::DictEnd),
        ]);
    }

    #[test]
    fn read_skips_one_leading_eol() {
        let mut lexer = Lexer::new(b"\r\nabcdef");
        assert_eq!(lexer.read(3, true).unwrap(), b"abc");
        assert_eq!(lexer.tell(), 5);
        assert!(lexer.read(10, false).unwrap_err().is_malformed());
    }

    #[test]
    fn inline_image_data_stops_before_ei() {
        let mut lexer = Lexer::new(b"ID \x00\xffEI\x01 EI Q");
        lexer.next_token().unwrap().unwrap();
        assert_eq!(lexer.read_inline_image_data(), b"\x00\xffEI\x01");
        assert_eq!(
            lexer.next_token().unwrap().unwrap().1,
            Token::Keyword(Keyword::Other("EI".into()))
        );
    }
}
