//! Content stream interpretation.
//!
//! - `operator`: the operator table and its keywords
//! - `content`: content stream to [`Instruction`]s
//! - `walker`: replays instructions to receivers, descending into forms
//! - `receiver`: the observer protocol plus recording and logging receivers
//! - `text_receiver`: glyph positions for text extraction

pub mod content;
pub mod operator;
pub mod receiver;
pub mod text_receiver;
pub mod walker;

pub use content::{Instruction, parse_content};
pub use operator::Operator;
pub use receiver::{Callback, PrintReceiver, Receiver, RegisterReceiver};
pub use text_receiver::PageTextReceiver;
pub use walker::{ContentCache, Scope, Walker};
