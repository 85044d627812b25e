//! quire - reading the objects, pages and text of PDF documents.
//!
//! ```no_run
//! use quire_core::Document;
//!
//! let bytes = std::fs::read("report.pdf")?;
//! let doc = Document::open(bytes, "")?;
//! for page in doc.pages()? {
//!     println!("{}", page.text(None)?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
pub mod document;
pub mod error;
pub mod font;
pub mod interp;
pub mod layout;
pub mod model;
pub mod parser;

pub use document::{Document, KeyBuilder, OpenOptions, Orientation, Page, Rectangles};
pub use error::{ErrorKind, PdfError, Result};
pub use interp::{PageTextReceiver, PrintReceiver, Receiver, RegisterReceiver};
pub use layout::{PageLayout, RunOptions, TextRun};
pub use model::{PDFDict, PDFObjRef, PDFObject, PDFStream};
