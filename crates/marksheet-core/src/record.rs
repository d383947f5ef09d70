//! Field sets and records.

use crate::marks::MarksValue;

/// Fields proposed by the oracle for one page. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    pub name: Option<String>,
    pub registration: Option<String>,
    pub total_marks: Option<MarksValue>,
    pub sgpa: Option<String>,
    pub grade: Option<String>,
}

impl FieldSet {
    /// Whether no field at all was proposed.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.registration.is_none()
            && self.total_marks.is_none()
            && self.sgpa.is_none()
            && self.grade.is_none()
    }

    /// Trimmed text of a string field, empty when absent.
    pub fn text(field: &Option<String>) -> String {
        field.as_deref().map(str::trim).unwrap_or_default().to_string()
    }
}

/// The extraction result of one page. An empty string means "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRecord {
    pub name: String,
    pub registration: String,
    pub total_marks: Option<i64>,
    pub sgpa: String,
    pub grade: String,
}

/// One student's consolidated record, keyed by registration number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergedRecord {
    pub name: String,
    pub registration: String,
    pub total_marks: Option<i64>,
    pub sgpa: String,
    pub grade: String,
}

impl From<&PageRecord> for MergedRecord {
    fn from(record: &PageRecord) -> Self {
        Self {
            name: record.name.clone(),
            registration: record.registration.trim().to_string(),
            total_marks: record.total_marks,
            sgpa: record.sgpa.clone(),
            grade: record.grade.clone(),
        }
    }
}

impl From<MergedRecord> for PageRecord {
    fn from(record: MergedRecord) -> Self {
        Self {
            name: record.name,
            registration: record.registration,
            total_marks: record.total_marks,
            sgpa: record.sgpa,
            grade: record.grade,
        }
    }
}
