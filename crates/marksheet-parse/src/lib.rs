//! marksheet-parse: PDF parsing backend and content stream interpreter.
//!
//! Layer 1 opens documents and walks the page tree through a pluggable
//! [`PdfBackend`] (lopdf by default). Layer 2 interprets page content
//! streams and reports every shown glyph to a [`ContentHandler`]; the
//! [`char_from_event`] bridge turns those events into positioned
//! [`marksheet_core::Char`]s.

pub mod backend;
pub mod char_extraction;
pub mod cmap;
pub mod encoding;
pub mod error;
pub mod font;
pub mod handler;
mod interpreter;
pub mod lopdf_backend;
pub mod text_state;
pub mod tokenizer;

pub use backend::PdfBackend;
pub use char_extraction::char_from_event;
pub use error::BackendError;
pub use handler::{CharEvent, ContentHandler};
pub use lopdf_backend::{LopdfBackend, LopdfDocument, LopdfPage};
pub use marksheet_core;
