//! `/ToUnicode` CMaps: character code to Unicode text.
//!
//! Only the parts of the CMap language that carry mappings are read:
//! `codespacerange`, `bfchar`, `bfrange`, `cidchar` and `cidrange`.
//! Everything else (`usecmap`, dictionary boilerplate, PostScript procedure
//! calls) is skipped token by token.

use crate::error::Result;
use crate::parser::{Keyword, Lexer, Token};
use rustc_hash::FxHashMap;
use tracing::debug;

#[derive(Debug, Clone)]
struct Codespace {
    low: Vec<u8>,
    high: Vec<u8>,
}

impl Codespace {
    fn matches(&self, code: &[u8]) -> bool {
        code.len() == self.low.len()
            && code
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(b, (lo, hi))| lo <= b && b <= hi)
    }
}

#[derive(Debug, Clone)]
struct Range {
    first: u32,
    last: u32,
    /// UTF-16BE text for `first`; later codes bump its trailing bytes
    dest: Vec<u8>,
}

/// Parsed `/ToUnicode` stream.
#[derive(Debug, Default, Clone)]
pub struct ToUnicodeCMap {
    codespaces: Vec<Codespace>,
    chars: FxHashMap<u32, String>,
    ranges: Vec<Range>,
}

impl ToUnicodeCMap {
    /// Parses a CMap program. Unreadable entries are skipped; only a lexer
    /// failure (an unterminated string, say) is an error.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cmap = Self::default();
        let mut lexer = Lexer::new(data);
        let mut operands: Vec<Token> = Vec::new();

        while let Some(token) = lexer.next_token() {
            let (_, token) = token?;
            let Token::Keyword(Keyword::Other(op)) = &token else {
                operands.push(token);
                continue;
            };
            match op.as_str() {
                "endcodespacerange" => cmap.codespace_block(&operands),
                "endbfchar" => cmap.bfchar_block(&operands),
                "endbfrange" => cmap.bfrange_block(&operands),
                "endcidchar" => cmap.cidchar_block(&operands),
                "endcidrange" => cmap.cidrange_block(&operands),
                _ => {}
            }
            operands.clear();
        }
        debug!(
            chars = cmap.chars.len(),
            ranges = cmap.ranges.len(),
            "parsed ToUnicode cmap"
        );
        Ok(cmap)
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty() && self.ranges.is_empty()
    }

    /// Text for one character code, or `None` when the map has no entry.
    pub fn lookup(&self, code: u32) -> Option<String> {
        if let Some(s) = self.chars.get(&code) {
            return Some(s.clone());
        }
        self.ranges
            .iter()
            .find(|r| r.first <= code && code <= r.last)
            .map(|r| decode_utf16be(&bump(&r.dest, code - r.first)))
    }

    /// Splits a string into codes using the declared code space ranges.
    ///
    /// Returns `None` when the map declares no code space, leaving the choice
    /// of code width to the font's encoding.
    pub fn split_codes(&self, bytes: &[u8]) -> Option<Vec<u32>> {
        if self.codespaces.is_empty() {
            return None;
        }
        let widest = self.codespaces.iter().map(|c| c.low.len()).max().unwrap_or(1);
        let mut codes = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            let width = (1..=widest)
                .filter(|w| i + w <= bytes.len())
                .find(|w| self.codespaces.iter().any(|c| c.matches(&bytes[i..i + w])))
                .unwrap_or(1);
            codes.push(be_int(&bytes[i..i + width]));
            i += width;
        }
        Some(codes)
    }

    fn insert(&mut self, code: u32, text: String) {
        // Fonts often map one glyph to both space and no-break space.
        if text == "\u{a0}" && self.chars.get(&code).is_some_and(|t| t == " ") {
            return;
        }
        self.chars.insert(code, text);
    }

    fn codespace_block(&mut self, operands: &[Token]) {
        for pair in operands.chunks_exact(2) {
            if let [Token::String(low), Token::String(high)] = pair {
                if low.len() == high.len() && !low.is_empty() {
                    self.codespaces.push(Codespace {
                        low: low.clone(),
                        high: high.clone(),
                    });
                }
            }
        }
    }

    fn bfchar_block(&mut self, operands: &[Token]) {
        for pair in operands.chunks_exact(2) {
            match pair {
                [Token::String(src), Token::String(dst)] => {
                    self.insert(be_int(src), decode_utf16be(dst));
                }
                [Token::String(src), Token::Name(glyph)] => {
                    if let Some(text) = super::glyphs::name_to_unicode(glyph) {
                        self.insert(be_int(src), text);
                    }
                }
                _ => debug!(?pair, "skipping bfchar entry"),
            }
        }
    }

    fn bfrange_block(&mut self, operands: &[Token]) {
        let mut i = 0;
        while i + 1 < operands.len() {
            let (Token::String(lo), Token::String(hi)) = (&operands[i], &operands[i + 1]) else {
                i += 1;
                continue;
            };
            let (first, last) = (be_int(lo), be_int(hi));
            match operands.get(i + 2) {
                Some(Token::String(dest)) => {
                    if first <= last {
                        self.ranges.push(Range {
                            first,
                            last,
                            dest: dest.clone(),
                        });
                    }
                    i += 3;
                }
                Some(Token::Keyword(Keyword::ArrayStart)) => {
                    let mut j = i + 3;
                    let mut code = first;
                    while let Some(token) = operands.get(j) {
                        j += 1;
                        match token {
                            Token::Keyword(Keyword::ArrayEnd) => break,
                            Token::String(dst) if code <= last => {
                                self.insert(code, decode_utf16be(dst));
                                code = code.saturating_add(1);
                            }
                            _ => code = code.saturating_add(1),
                        }
                    }
                    i = j;
                }
                _ => i += 3,
            }
        }
    }

    fn cidchar_block(&mut self, operands: &[Token]) {
        for pair in operands.chunks_exact(2) {
            if let [Token::String(src), Token::Int(cp)] = pair {
                if let Some(c) = u32::try_from(*cp).ok().and_then(char::from_u32) {
                    self.insert(be_int(src), c.to_string());
                }
            }
        }
    }

    fn cidrange_block(&mut self, operands: &[Token]) {
        for triple in operands.chunks_exact(3) {
            if let [Token::String(lo), Token::String(hi), Token::Int(start)] = triple {
                let (first, last) = (be_int(lo), be_int(hi));
                let Ok(start) = u32::try_from(*start) else {
                    continue;
                };
                if last < first || last - first > 0xFFFF {
                    debug!(first, last, "skipping oversized cidrange");
                    continue;
                }
                for code in first..=last {
                    if let Some(c) = start.checked_add(code - first).and_then(char::from_u32) {
                        self.insert(code, c.to_string());
                    }
                }
            }
        }
    }
}

fn be_int(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

/// Adds `offset` to the trailing (up to four) bytes of `dest`, keeping its length.
fn bump(dest: &[u8], offset: u32) -> Vec<u8> {
    let split = dest.len().saturating_sub(4);
    let (prefix, tail) = dest.split_at(split);
    let bumped = be_int(tail).wrapping_add(offset).to_be_bytes();
    let mut out = prefix.to_vec();
    out.extend_from_slice(&bumped[4 - tail.len()..]);
    out
}

fn decode_utf16be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CMapName /Adobe-Identity-UCS def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
3 beginbfchar
<0003> <0020>
<0004> <00A0>
<0010> <D835DC00>
endbfchar
2 beginbfrange
<0020> <0022> <0041>
<0030> <0031> [<0066006C> <0078>]
endbfrange
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

    #[test]
    fn bfchar_and_surrogates() {
        let cmap = ToUnicodeCMap::parse(SAMPLE).unwrap();
        assert_eq!(cmap.lookup(3).as_deref(), Some(" "));
        assert_eq!(cmap.lookup(0x10).as_deref(), Some("\u{1D400}"));
        assert_eq!(cmap.lookup(0x99), None);
    }

    #[test]
    fn ranges_increment_destination() {
        let cmap = ToUnicodeCMap::parse(SAMPLE).unwrap();
        assert_eq!(cmap.lookup(0x20).as_deref(), Some("A"));
        assert_eq!(cmap.lookup(0x22).as_deref(), Some("C"));
        assert_eq!(cmap.lookup(0x30).as_deref(), Some("fl"));
        assert_eq!(cmap.lookup(0x31).as_deref(), Some("x"));
    }

    #[test]
    fn no_break_space_keeps_existing_space() {
        let cmap = ToUnicodeCMap::parse(
            b"2 beginbfchar <01> <0020> <01> <00A0> endbfchar 1 beginbfchar <02> <00A0> endbfchar",
        )
        .unwrap();
        assert_eq!(cmap.lookup(1).as_deref(), Some(" "));
        assert_eq!(cmap.lookup(2).as_deref(), Some("\u{a0}"));
    }

    #[test]
    fn codespace_splits_mixed_widths() {
        let cmap = ToUnicodeCMap::parse(
            b"2 begincodespacerange <00> <80> <8140> <9FFC> endcodespacerange",
        )
        .unwrap();
        assert_eq!(cmap.split_codes(b"A\x81\x40B"), Some(vec![0x41, 0x8140, 0x42]));
        assert_eq!(ToUnicodeCMap::default().split_codes(b"AB"), None);
    }

    #[test]
    fn cid_blocks_use_decimal_code_points() {
        let cmap = ToUnicodeCMap::parse(
            b"1 begincidchar <0048> 72 endcidchar 1 begincidrange <4e00> <4e01> 19968 endcidrange",
        )
        .unwrap();
        assert_eq!(cmap.lookup(0x48).as_deref(), Some("H"));
        assert_eq!(cmap.lookup(0x4e01).as_deref(), Some("\u{4e01}"));
    }
}
