//! PDF data model: objects, geometry and graphics state.

pub mod geometry;
pub mod objects;
pub mod state;

pub use geometry::{MATRIX_IDENTITY, Matrix, Point, Rect};
pub use objects::{PDFDict, PDFObjRef, PDFObject, PDFStream};
pub use state::{GraphicsState, TextObject, TextState};
