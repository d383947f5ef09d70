//! Per-page record building: oracle fields plus the rule-based fallbacks.

use marksheet_core::{
    FieldSet, LabelPattern, PageRecord, PageText, ParentNames, fallback_total_marks,
    normalize_total_marks, resolve_name,
};

use crate::error::PipelineError;
use crate::oracle::{FieldOracle, OracleError, page_prompt};

/// Builds one [`PageRecord`] per segmented page.
pub struct PageRecordBuilder<'a> {
    oracle: &'a dyn FieldOracle,
    name_patterns: Vec<LabelPattern>,
}

impl<'a> PageRecordBuilder<'a> {
    /// # Errors
    ///
    /// [`PipelineError::InvalidLabel`] if a label cannot be compiled.
    pub fn new<S: AsRef<str>>(
        oracle: &'a dyn FieldOracle,
        name_labels: &[S],
    ) -> Result<Self, PipelineError> {
        let name_patterns = name_labels
            .iter()
            .map(|label| {
                LabelPattern::new(label.as_ref()).map_err(|e| PipelineError::InvalidLabel {
                    label: label.as_ref().to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            oracle,
            name_patterns,
        })
    }

    /// Build the record for `page` (`page_number` is 1-based).
    ///
    /// An oracle failure only empties the oracle's fields; it never fails
    /// the page.
    pub fn build(&self, page_number: usize, page: &PageText) -> PageRecord {
        let parents = ParentNames::extract(page);
        let fields = match self.oracle.extract_fields(&page_prompt(page_number, &page.text)) {
            Ok(fields) => fields,
            Err(OracleError::Disabled) => FieldSet::default(),
            Err(err) => {
                tracing::warn!(page = page_number, error = %err, "oracle extraction failed");
                FieldSet::default()
            }
        };

        let total_marks =
            normalize_total_marks(fields.total_marks.as_ref()).or_else(|| fallback_total_marks(page));
        let name = resolve_name(
            page,
            &FieldSet::text(&fields.name),
            &self.name_patterns,
            &parents,
        );

        PageRecord {
            name,
            registration: FieldSet::text(&fields.registration),
            total_marks,
            sgpa: FieldSet::text(&fields.sgpa),
            grade: FieldSet::text(&fields.grade),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::DisabledOracle;
    use marksheet_core::{DEFAULT_NAME_LABELS, MarksValue};

    struct Fixed(FieldSet);

    impl FieldOracle for Fixed {
        fn extract_fields(&self, _prompt: &str) -> Result<FieldSet, OracleError> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl FieldOracle for Failing {
        fn extract_fields(&self, _prompt: &str) -> Result<FieldSet, OracleError> {
            Err(OracleError::Status {
                code: 500,
                body: "model not loaded".to_string(),
            })
        }
    }

    fn fields(name: &str, reg: &str, marks: Option<MarksValue>) -> FieldSet {
        FieldSet {
            name: Some(name.to_string()),
            registration: Some(format!("  {reg} ")),
            total_marks: marks,
            sgpa: Some("8.5".to_string()),
            grade: Some(" A ".to_string()),
        }
    }

    #[test]
    fn oracle_fields_are_trimmed_and_normalized() {
        let oracle = Fixed(fields(
            "Asha Verma",
            "12345",
            Some(MarksValue::Text("Four Hundred Fifteen".to_string())),
        ));
        let builder = PageRecordBuilder::new(&oracle, DEFAULT_NAME_LABELS).unwrap();
        let page = PageText::from_plain_text("Semester result");
        let record = builder.build(1, &page);
        assert_eq!(record.name, "Asha Verma");
        assert_eq!(record.registration, "12345");
        assert_eq!(record.total_marks, Some(415));
        assert_eq!(record.grade, "A");
    }

    #[test]
    fn unusable_marks_fall_back_to_page_text() {
        let oracle = Fixed(fields(
            "Asha Verma",
            "12345",
            Some(MarksValue::Text("N/A".to_string())),
        ));
        let builder = PageRecordBuilder::new(&oracle, DEFAULT_NAME_LABELS).unwrap();
        let page = PageText::from_plain_text("Total Marks Obtained (in words): Eighty Five");
        assert_eq!(builder.build(1, &page).total_marks, Some(85));
    }

    #[test]
    fn labelled_name_beats_oracle_name() {
        let oracle = Fixed(fields("Ravi Verma", "7", None));
        let builder = PageRecordBuilder::new(&oracle, DEFAULT_NAME_LABELS).unwrap();
        let page = PageText::from_plain_text("Student Name: Asha Verma\nFather Name: Ravi Verma");
        assert_eq!(builder.build(1, &page).name, "Asha Verma");
    }

    #[test]
    fn oracle_name_equal_to_father_is_rejected() {
        let oracle = Fixed(fields("Ravi Verma", "7", None));
        let builder = PageRecordBuilder::new(&oracle, DEFAULT_NAME_LABELS).unwrap();
        let page = PageText::from_plain_text("Father Name: Ravi Verma\nGrade: B");
        assert_eq!(builder.build(1, &page).name, "");
    }

    #[test]
    fn failing_oracle_degrades_to_rules() {
        let builder = PageRecordBuilder::new(&Failing, DEFAULT_NAME_LABELS).unwrap();
        let page = PageText::from_plain_text("Student Name: Asha Verma\nTotal Marks: 500 412");
        let record = builder.build(2, &page);
        assert_eq!(record.name, "Asha Verma");
        assert_eq!(record.registration, "");
        assert_eq!(record.sgpa, "");
        assert_eq!(record.grade, "");
        assert_eq!(record.total_marks, Some(412));
    }

    #[test]
    fn disabled_oracle_gives_empty_oracle_fields() {
        let builder = PageRecordBuilder::new(&DisabledOracle, DEFAULT_NAME_LABELS).unwrap();
        let record = builder.build(1, &PageText::from_plain_text(""));
        assert_eq!(record, PageRecord::default());
    }

    #[test]
    fn custom_labels_match_literally() {
        let oracle = Fixed(FieldSet::default());
        let builder = PageRecordBuilder::new(&oracle, &["Candidate (Name)"]).unwrap();
        let page = PageText::from_plain_text("Candidate (Name): Meera Iyer\nName: Someone Else");
        assert_eq!(builder.build(1, &page).name, "Meera Iyer");
    }
}
