//! Opening documents: the object table, security and pages.
//!
//! - `xref` - cross-reference loading, recovery scan and object resolution
//! - `object_stream` - objects packed in `/Type /ObjStm` streams
//! - `security` / `key` - decryption handlers and the key builders that pick them
//! - `reader` / `page` - the public document and page API
//! - `tolerance` - the knobs used when repairing damaged files

pub mod key;
pub mod object_stream;
pub mod page;
pub mod reader;
pub mod security;
pub mod text_string;
pub mod tolerance;
pub mod xref;

#[cfg(test)]
pub(crate) mod testutil;

pub use key::{KeyBuilder, StandardKeyBuilder};
pub use page::{Orientation, Page, Rectangles};
pub use reader::{Document, OpenOptions};
pub use security::SecurityHandler;
pub use text_string::decode_text;
pub use xref::{ObjectTable, XRefEntry};
