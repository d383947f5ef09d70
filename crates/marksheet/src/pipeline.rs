//! Document pipeline: pages in order, one record each, merged and exported.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use marksheet_core::{
    DEFAULT_NAME_LABELS, ExtractOptions, PageRecord, PageText, SegmentOptions, merge_records,
};

use crate::builder::PageRecordBuilder;
use crate::error::PipelineError;
use crate::export::write_csv_file;
use crate::oracle::FieldOracle;
use crate::pdf::Pdf;

/// Options for one document run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Student-name label synonyms, most specific first.
    pub name_labels: Vec<String>,
    pub segment: SegmentOptions,
    pub extract: ExtractOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            name_labels: DEFAULT_NAME_LABELS.iter().map(|s| s.to_string()).collect(),
            segment: SegmentOptions::default(),
            extract: ExtractOptions::default(),
        }
    }
}

/// Progress after a page has been processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Pages done so far (1-based number of the page just finished).
    pub page: usize,
    pub total_pages: usize,
    /// `page / total_pages` as a truncated percentage.
    pub percent: u8,
    pub elapsed: Duration,
    /// Estimate: mean time per page so far times the pages left.
    pub remaining: Duration,
}

impl Progress {
    pub fn new(page: usize, total_pages: usize, elapsed: Duration) -> Self {
        let (percent, remaining) = if page == 0 || total_pages == 0 {
            (0, Duration::ZERO)
        } else {
            let percent = (page.min(total_pages) * 100 / total_pages) as u8;
            let left = total_pages.saturating_sub(page) as u32;
            let per_page = elapsed / page as u32;
            (percent, per_page * left)
        };
        Self {
            page,
            total_pages,
            percent,
            elapsed,
            remaining,
        }
    }

    /// Human-readable status line.
    pub fn message(&self) -> String {
        format!(
            "Processing page {}/{} — approx {:.1}s remaining",
            self.page,
            self.total_pages,
            self.remaining.as_secs_f64()
        )
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub output_file: PathBuf,
    /// Number of merged records written.
    pub records_count: usize,
    pub pages: usize,
}

/// Build one record per page, in page order.
///
/// A page that cannot be loaded yields a record built from empty text; it
/// never aborts the run.
///
/// # Errors
///
/// [`PipelineError::InvalidLabel`] if a name label cannot be compiled.
pub fn extract_records(
    pdf: &Pdf,
    oracle: &dyn FieldOracle,
    options: &PipelineOptions,
    mut on_progress: impl FnMut(&Progress),
) -> Result<Vec<PageRecord>, PipelineError> {
    let builder = PageRecordBuilder::new(oracle, &options.name_labels)?;
    let total_pages = pdf.page_count();
    let started = Instant::now();
    let mut records = Vec::with_capacity(total_pages);

    for (index, page) in pdf.pages_iter().enumerate() {
        let number = index + 1;
        let text = match page {
            Ok(page) => page.segment(&options.segment),
            Err(err) => {
                tracing::warn!(page = number, error = %err, "page could not be loaded");
                PageText::default()
            }
        };
        let record = builder.build(number, &text);
        tracing::debug!(
            page = number,
            total_pages,
            registration = %record.registration,
            "page processed"
        );
        records.push(record);

        on_progress(&Progress::new(number, total_pages, started.elapsed()));
    }

    Ok(records)
}

/// Process one document end to end and write the merged table to `output`.
///
/// The table is written only after every page is done; a failed run leaves
/// no output file behind.
///
/// # Errors
///
/// Fails when the document cannot be opened, a name label is invalid, or the
/// output cannot be written.
pub fn process_document(
    path: impl AsRef<Path>,
    output: impl AsRef<Path>,
    oracle: &dyn FieldOracle,
    options: &PipelineOptions,
    on_progress: impl FnMut(&Progress),
) -> Result<ProcessOutcome, PipelineError> {
    let path = path.as_ref();
    let output = output.as_ref();

    let pdf = Pdf::open_file(path, Some(options.extract.clone()))?;
    let pages = pdf.page_count();
    tracing::info!(path = %path.display(), total_pages = pages, "processing document");

    let records = extract_records(&pdf, oracle, options, on_progress)?;
    let merged = merge_records(&records);
    if let Err(err) = write_csv_file(output, &merged) {
        let _ = std::fs::remove_file(output);
        return Err(err.into());
    }

    tracing::info!(
        output = %output.display(),
        records = merged.len(),
        pages,
        "document processed"
    );
    Ok(ProcessOutcome {
        output_file: output.to_path_buf(),
        records_count: merged.len(),
        pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_percent_and_estimate() {
        let progress = Progress::new(1, 4, Duration::from_secs(2));
        assert_eq!(progress.percent, 25);
        assert_eq!(progress.remaining, Duration::from_secs(6));
        assert_eq!(
            progress.message(),
            "Processing page 1/4 — approx 6.0s remaining"
        );
    }

    #[test]
    fn progress_truncates_percent() {
        let progress = Progress::new(2, 3, Duration::from_millis(300));
        assert_eq!(progress.percent, 66);
        assert_eq!(progress.remaining, Duration::from_millis(150));
    }

    #[test]
    fn last_page_has_nothing_remaining() {
        let progress = Progress::new(3, 3, Duration::from_secs(9));
        assert_eq!(progress.percent, 100);
        assert_eq!(progress.remaining, Duration::ZERO);
    }

    #[test]
    fn default_options_carry_name_labels() {
        let options = PipelineOptions::default();
        assert_eq!(
            options.name_labels,
            ["Student Name", "Name of Student", "Name"]
        );
    }
}
