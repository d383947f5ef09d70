//! marksheet: Extract student result records from marksheet PDFs.
//!
//! This is the public API facade crate. It re-exports the record model and
//! rules from marksheet-core and uses marksheet-parse for PDF reading and
//! interpretation.
//!
//! # Architecture
//!
//! - **marksheet-core**: Backend-independent segmentation and field-recovery rules
//! - **marksheet-parse**: PDF parsing and content stream interpretation
//! - **marksheet** (this crate): Document access, the oracle, the pipeline,
//!   background tasks and CSV export
//!
//! ```ignore
//! use marksheet::{DisabledOracle, PipelineOptions, process_document};
//!
//! let outcome = process_document(
//!     "results.pdf",
//!     "results.csv",
//!     &DisabledOracle,
//!     &PipelineOptions::default(),
//!     |progress| eprintln!("{}", progress.message()),
//! )?;
//! println!("{} records", outcome.records_count);
//! ```

mod builder;
mod error;
mod export;
mod oracle;
mod page;
mod pdf;
mod pipeline;
mod task;

pub use builder::PageRecordBuilder;
pub use error::PipelineError;
pub use export::{HEADER, write_csv_file, write_records};
pub use oracle::{
    DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT, DisabledOracle, FieldOracle, OllamaOracle,
    OracleConfig, OracleError, PROBE_SAMPLE, page_prompt, parse_field_set, probe, probe_prompt,
};
pub use page::Page;
pub use pdf::{PagesIter, Pdf};
pub use pipeline::{PipelineOptions, ProcessOutcome, Progress, extract_records, process_document};
pub use task::{
    StatusReader, StatusSlot, TaskHandle, TaskState, TaskStatus, run_task, spawn_task,
};

pub use marksheet_core;
pub use marksheet_core::{
    ExtractOptions, FieldSet, MarksValue, MergedRecord, PageRecord, PageText, PdfError,
    SegmentOptions, merge_records,
};
pub use marksheet_parse;
