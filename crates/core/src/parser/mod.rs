//! PDF tokenizing and object parsing.
//!
//! - `lexer`: byte-level tokenizer shared by document bodies and content streams
//! - `pdf_parser`: typed object parser with indirect object and stream framing

pub mod lexer;
pub mod pdf_parser;

pub use lexer::{Keyword, Lexer, Token};
pub use pdf_parser::{PDFParser, Resolve};
