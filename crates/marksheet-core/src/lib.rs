//! marksheet-core: Backend-independent layout and field-recovery rules.
//!
//! This crate turns positioned characters into the segmented page view
//! ([`PageText`]) and holds the deterministic rules that recover student
//! fields from it: label matching, parent-name exclusion, name resolution,
//! total-marks normalization, and record merging. It does no I/O.

pub mod error;
pub mod geometry;
pub mod label;
pub mod layout;
pub mod marks;
pub mod merge;
pub mod name;
pub mod numwords;
pub mod parents;
pub mod record;
pub mod segment;
pub mod text;
pub mod words;

pub use error::{ExtractOptions, PdfError};
pub use geometry::{BBox, Ctm, Point};
pub use label::{DEFAULT_NAME_LABELS, LabelPattern, compile_labels};
pub use layout::{TextBlock, TextLine};
pub use marks::{MarksValue, fallback_total_marks, normalize_total_marks};
pub use merge::merge_records;
pub use name::{LineMatch, resolve_name, sanitize_oracle_name};
pub use numwords::{WordsToNumberError, words_to_number};
pub use parents::ParentNames;
pub use record::{FieldSet, MergedRecord, PageRecord};
pub use segment::{PageLine, PageText, SegmentOptions};
pub use text::Char;
pub use words::{Word, WordExtractor, WordOptions};
