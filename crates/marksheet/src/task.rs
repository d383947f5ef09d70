//! Background document tasks with a pollable status slot.
//!
//! Each task runs one document on its own thread. The worker is the only
//! writer of its [`StatusSlot`]; any number of [`StatusReader`]s may poll it.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::JoinHandle;

use serde::Serialize;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::oracle::FieldOracle;
use crate::pipeline::{PipelineOptions, ProcessOutcome, process_document};

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Pending,
    Processing,
    Completed,
    Error,
}

/// Snapshot of a task, as served to status pollers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStatus {
    pub status: TaskState,
    /// 0 to 100.
    pub progress: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_count: Option<usize>,
}

impl TaskStatus {
    pub fn pending() -> Self {
        Self {
            status: TaskState::Pending,
            progress: 0,
            message: "Starting PDF processing...".to_string(),
            output_file: None,
            records_count: None,
        }
    }

    fn processing(progress: u8, message: String) -> Self {
        Self {
            status: TaskState::Processing,
            progress,
            message,
            output_file: None,
            records_count: None,
        }
    }

    fn completed(outcome: &ProcessOutcome) -> Self {
        Self {
            status: TaskState::Completed,
            progress: 100,
            message: "Processing completed successfully!".to_string(),
            output_file: Some(outcome.output_file.display().to_string()),
            records_count: Some(outcome.records_count),
        }
    }

    fn failed(err: &PipelineError) -> Self {
        Self {
            status: TaskState::Error,
            progress: 0,
            message: format!("Error processing PDF: {err}"),
            output_file: None,
            records_count: None,
        }
    }

    /// Whether the task has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        matches!(self.status, TaskState::Completed | TaskState::Error)
    }
}

/// Writer half of a task's status. Not `Clone`: there is one writer.
#[derive(Debug)]
pub struct StatusSlot {
    inner: Arc<RwLock<TaskStatus>>,
}

impl StatusSlot {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(TaskStatus::pending())),
        }
    }

    pub fn set(&self, status: TaskStatus) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = status;
    }

    pub fn reader(&self) -> StatusReader {
        StatusReader {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for StatusSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of a task's status.
#[derive(Debug, Clone)]
pub struct StatusReader {
    inner: Arc<RwLock<TaskStatus>>,
}

impl StatusReader {
    /// Current status snapshot.
    pub fn get(&self) -> TaskStatus {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Run one document synchronously, reporting into `slot`.
///
/// Page progress is scaled into 0..=90; merging and export take the last
/// step to 100.
pub fn run_task(
    slot: &StatusSlot,
    pdf_path: &Path,
    output_file: &Path,
    oracle: &dyn FieldOracle,
    options: &PipelineOptions,
) -> Result<ProcessOutcome, PipelineError> {
    slot.set(TaskStatus::processing(0, "Starting PDF processing...".to_string()));

    let result = process_document(pdf_path, output_file, oracle, options, |progress| {
        let scaled = (u32::from(progress.percent) * 90 / 100) as u8;
        let status = if progress.page == progress.total_pages {
            TaskStatus::processing(90, "Merging results...".to_string())
        } else {
            TaskStatus::processing(scaled, progress.message())
        };
        slot.set(status);
    });

    match &result {
        Ok(outcome) => {
            tracing::info!(
                status = "completed",
                records = outcome.records_count,
                "task finished"
            );
            slot.set(TaskStatus::completed(outcome));
        }
        Err(err) => {
            tracing::warn!(status = "error", error = %err, "task failed");
            slot.set(TaskStatus::failed(err));
        }
    }
    result
}

/// Handle to a spawned task.
#[derive(Debug)]
pub struct TaskHandle {
    id: Uuid,
    output_file: PathBuf,
    status: StatusReader,
    worker: JoinHandle<Result<ProcessOutcome, PipelineError>>,
}

impl TaskHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Path the table will be written to on success.
    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    pub fn status(&self) -> StatusReader {
        self.status.clone()
    }

    /// Wait for the worker and return its outcome.
    ///
    /// # Errors
    ///
    /// The run's own error, or [`PipelineError::Worker`] if the worker
    /// panicked.
    pub fn join(self) -> Result<ProcessOutcome, PipelineError> {
        let id = self.id;
        self.worker
            .join()
            .map_err(|_| PipelineError::Worker(format!("task {id} panicked")))?
    }
}

/// Start processing `pdf_path` on a new thread.
///
/// The table is written to `output_dir/results_<task-id>.csv`.
///
/// # Errors
///
/// [`PipelineError::Io`] if the thread cannot be spawned.
pub fn spawn_task(
    pdf_path: impl Into<PathBuf>,
    output_dir: impl AsRef<Path>,
    oracle: Arc<dyn FieldOracle>,
    options: PipelineOptions,
) -> Result<TaskHandle, PipelineError> {
    let id = Uuid::new_v4();
    let pdf_path = pdf_path.into();
    let output_file = output_dir.as_ref().join(format!("results_{id}.csv"));
    let slot = StatusSlot::new();
    let status = slot.reader();

    let worker_output = output_file.clone();
    let worker = std::thread::Builder::new()
        .name(format!("marksheet-task-{id}"))
        .spawn(move || {
            let span = tracing::info_span!("task", %id);
            let _enter = span.enter();
            run_task(&slot, &pdf_path, &worker_output, oracle.as_ref(), &options)
        })?;

    Ok(TaskHandle {
        id,
        output_file,
        status,
        worker,
    })
}
