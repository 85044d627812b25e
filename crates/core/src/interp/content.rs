//! Content stream parsing.
//!
//! A content stream is a flat sequence of operands followed by their
//! operator. Parsing turns it into [`Instruction`]s once, so the same form
//! XObject drawn on many pages is only tokenized one time.

use super::operator::Operator;
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObject};
use crate::parser::{Keyword, Lexer, Token};
use smol_str::SmolStr;
use tracing::debug;

/// One operator with the operands that preceded it.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub op: Operator,
    pub operands: Vec<PDFObject>,
}

/// Parses a whole content stream.
///
/// Unknown operators are dropped along with their operands. Inline images
/// come out as three instructions: `BI` with no operands, `ID` with the
/// image dictionary (abbreviations expanded) and `EI` with the raw data.
pub fn parse_content(data: &[u8]) -> Result<Vec<Instruction>> {
    let mut parser = ContentParser {
        lexer: Lexer::new(data),
        operands: Vec::new(),
        out: Vec::new(),
    };
    parser.run()?;
    Ok(parser.out)
}

struct ContentParser<'a> {
    lexer: Lexer<'a>,
    operands: Vec<PDFObject>,
    out: Vec<Instruction>,
}

impl ContentParser<'_> {
    fn run(&mut self) -> Result<()> {
        while let Some(next) = self.lexer.next_token() {
            let (pos, token) = next?;
            match self.operand(pos, token)? {
                Operand::Value(value) => self.operands.push(value),
                Operand::Keyword(kw) => self.operator(&kw)?,
            }
        }
        if !self.operands.is_empty() {
            debug!(count = self.operands.len(), "dropping operands after the last operator");
        }
        Ok(())
    }

    fn operator(&mut self, keyword: &Keyword) -> Result<()> {
        let Some(op) = Operator::from_keyword(keyword.as_str()) else {
            debug!(keyword = keyword.as_str(), "skipping unknown content operator");
            self.operands.clear();
            return Ok(());
        };
        if op == Operator::BeginInlineImage {
            self.operands.clear();
            self.emit(op);
            return self.inline_image();
        }
        self.emit(op);
        Ok(())
    }

    fn emit(&mut self, op: Operator) {
        let operands = std::mem::take(&mut self.operands);
        self.out.push(Instruction { op, operands });
    }

    /// Everything between `BI` and `EI`.
    fn inline_image(&mut self) -> Result<()> {
        let mut entries = Vec::new();
        loop {
            let Some(next) = self.lexer.next_token() else {
                return Err(PdfError::malformed("inline image has no ID"));
            };
            let (pos, token) = next?;
            match self.operand(pos, token)? {
                Operand::Value(value) => entries.push(value),
                Operand::Keyword(kw) if kw.as_str() == "ID" => break,
                Operand::Keyword(kw) => {
                    debug!(keyword = kw.as_str(), "ignoring keyword in inline image dictionary");
                }
            }
        }

        let mut dict = PDFDict::new();
        let mut items = entries.into_iter();
        while let Some(key) = items.next() {
            let Some(value) = items.next() else { break };
            if let PDFObject::Name(key) = key {
                let key = expand_key(&key);
                let value = match key.as_str() {
                    "ColorSpace" | "Filter" => expand_value(value),
                    _ => value,
                };
                dict.insert(key, value);
            }
        }
        self.operands.push(PDFObject::Dict(dict));
        self.emit(Operator::BeginInlineImageData);

        // The data becomes the operand of the EI that follows it.
        let data = self.lexer.read_inline_image_data();
        self.operands.push(PDFObject::String(data.to_vec()));
        Ok(())
    }

    fn operand(&mut self, pos: usize, token: Token) -> Result<Operand> {
        let value = match token {
            Token::Int(n) => PDFObject::Int(n),
            Token::Real(n) => PDFObject::Real(n),
            Token::Name(name) => PDFObject::Name(name),
            Token::String(s) => PDFObject::String(s),
            Token::Keyword(Keyword::True) => PDFObject::Bool(true),
            Token::Keyword(Keyword::False) => PDFObject::Bool(false),
            Token::Keyword(Keyword::Null) => PDFObject::Null,
            Token::Keyword(Keyword::ArrayStart) => self.array(pos)?,
            Token::Keyword(Keyword::DictStart) => self.dict(pos)?,
            Token::Keyword(kw) => return Ok(Operand::Keyword(kw)),
        };
        Ok(Operand::Value(value))
    }

    fn array(&mut self, start: usize) -> Result<PDFObject> {
        let mut items = Vec::new();
        loop {
            let (pos, token) = self.next_in(start, "array")?;
            if token.is_keyword(&Keyword::ArrayEnd) {
                return Ok(PDFObject::Array(items));
            }
            match self.operand(pos, token)? {
                Operand::Value(value) => items.push(value),
                Operand::Keyword(kw) => debug!(keyword = kw.as_str(), "skipping keyword inside array"),
            }
        }
    }

    fn dict(&mut self, start: usize) -> Result<PDFObject> {
        let mut dict = PDFDict::new();
        loop {
            let (pos, token) = self.next_in(start, "dictionary")?;
            let key = match token {
                Token::Keyword(Keyword::DictEnd) => return Ok(PDFObject::Dict(dict)),
                Token::Name(name) => name,
                other => {
                    debug!(?other, pos, "skipping non-name dictionary key");
                    continue;
                }
            };
            let (pos, token) = self.next_in(start, "dictionary")?;
            if token.is_keyword(&Keyword::DictEnd) {
                return Ok(PDFObject::Dict(dict));
            }
            if let Operand::Value(value) = self.operand(pos, token)? {
                dict.insert(key, value);
            }
        }
    }

    fn next_in(&mut self, start: usize, what: &str) -> Result<(usize, Token)> {
        match self.lexer.next_token() {
            Some(next) => next,
            None => Err(PdfError::malformed(format!(
                "unterminated {what} at offset {start} in content stream"
            ))),
        }
    }
}

enum Operand {
    Value(PDFObject),
    Keyword(Keyword),
}

fn expand_key(key: &str) -> SmolStr {
    SmolStr::new_static(match key {
        "BPC" => "BitsPerComponent",
        "CS" => "ColorSpace",
        "D" => "Decode",
        "DP" => "DecodeParms",
        "F" => "Filter",
        "H" => "Height",
        "IM" => "ImageMask",
        "I" => "Interpolate",
        "L" => "Length",
        "W" => "Width",
        _ => return SmolStr::new(key),
    })
}

/// Long names for abbreviated colour spaces and filters.
fn expand_value(value: PDFObject) -> PDFObject {
    match value {
        PDFObject::Name(name) => {
            let long = match name.as_str() {
                "G" => "DeviceGray",
                "RGB" => "DeviceRGB",
                "CMYK" => "DeviceCMYK",
                "I" => "Indexed",
                "AHx" => "ASCIIHexDecode",
                "A85" => "ASCII85Decode",
                "LZW" => "LZWDecode",
                "Fl" => "FlateDecode",
                "RL" => "RunLengthDecode",
                "CCF" => "CCITTFaxDecode",
                "DCT" => "DCTDecode",
                _ => return PDFObject::Name(name),
            };
            PDFObject::name(long)
        }
        PDFObject::Array(items) => PDFObject::Array(items.into_iter().map(expand_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(instructions: &[Instruction]) -> Vec<&'static str> {
        instructions.iter().map(|i| i.op.name()).collect()
    }

    #[test]
    fn operands_precede_their_operator() {
        let parsed = parse_content(b"BT /F1 12 Tf 72 712.5 Td (Hello) Tj ET").unwrap();
        assert_eq!(
            ops(&parsed),
            ["begin_text_object", "set_text_font_and_size", "move_text_position", "show_text", "end_text_object"]
        );
        assert_eq!(parsed[1].operands, vec![PDFObject::name("F1"), PDFObject::Int(12)]);
        assert_eq!(parsed[2].operands, vec![PDFObject::Int(72), PDFObject::Real(712.5)]);
        assert_eq!(parsed[3].operands, vec![PDFObject::String(b"Hello".to_vec())]);
    }

    #[test]
    fn arrays_and_dictionaries_are_single_operands() {
        let parsed = parse_content(b"[(A) -120 (B)] TJ /Span << /ActualText (x) >> BDC").unwrap();
        assert_eq!(
            parsed[0].operands,
            vec![PDFObject::Array(vec![
                PDFObject::String(b"A".to_vec()),
                PDFObject::Int(-120),
                PDFObject::String(b"B".to_vec()),
            ])]
        );
        assert_eq!(parsed[1].op, Operator::BeginMarkedContentWithPl);
        assert_eq!(parsed[1].operands[1].get("ActualText"), Some(&PDFObject::String(b"x".to_vec())));
    }

    #[test]
    fn unknown_operators_drop_their_operands() {
        let parsed = parse_content(b"1 2 foo 3 w").unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].op, Operator::SetLineWidth);
        assert_eq!(parsed[0].operands, vec![PDFObject::Int(3)]);
    }

    #[test]
    fn inline_image_becomes_three_instructions() {
        let parsed = parse_content(b"q BI /W 2 /H 1 /CS /G /BPC 8 /F /AHx ID 00FF> EI Q").unwrap();
        assert_eq!(
            ops(&parsed),
            [
                "save_graphics_state",
                "begin_inline_image",
                "begin_inline_image_data",
                "end_inline_image",
                "restore_graphics_state"
            ]
        );
        let dict = parsed[2].operands[0].as_dict().unwrap();
        assert_eq!(dict.get("Width"), Some(&PDFObject::Int(2)));
        assert_eq!(dict.get("ColorSpace"), Some(&PDFObject::name("DeviceGray")));
        assert_eq!(dict.get("Filter"), Some(&PDFObject::name("ASCIIHexDecode")));
        assert_eq!(parsed[3].operands, vec![PDFObject::String(b"00FF>".to_vec())]);
    }

    #[test]
    fn truncated_streams_are_malformed() {
        assert!(parse_content(b"[(A) 1 TJ").unwrap_err().is_malformed());
        assert!(parse_content(b"<< /A 1 BDC").unwrap_err().is_malformed());
        assert!(parse_content(b"(unterminated Tj").unwrap_err().is_malformed());
        assert!(parse_content(b"BI /W 1").unwrap_err().is_malformed());
    }
}
