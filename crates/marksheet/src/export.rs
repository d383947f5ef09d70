//! Tabular export of merged records.

use std::io::Write;
use std::path::Path;

use marksheet_core::MergedRecord;

/// Fixed column order of the output table.
pub const HEADER: [&str; 5] = ["Name", "Registration", "TotalMarks", "SGPA", "Grade"];

/// Write `records` as CSV to `writer`.
///
/// The header row is always written, so an empty record list still yields a
/// valid table. A missing total renders as an empty cell.
pub fn write_records<W: Write>(writer: W, records: &[MergedRecord]) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(HEADER)?;
    for record in records {
        let total = record
            .total_marks
            .map(|total| total.to_string())
            .unwrap_or_default();
        out.write_record([
            record.name.as_str(),
            record.registration.as_str(),
            total.as_str(),
            record.sgpa.as_str(),
            record.grade.as_str(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write `records` to it.
pub fn write_csv_file(path: impl AsRef<Path>, records: &[MergedRecord]) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path.as_ref())?;
    write_records(std::io::BufWriter::new(file), records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(records: &[MergedRecord]) -> String {
        let mut buf = Vec::new();
        write_records(&mut buf, records).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn empty_list_writes_header_only() {
        assert_eq!(render(&[]), "Name,Registration,TotalMarks,SGPA,Grade\n");
    }

    #[test]
    fn rows_follow_header_order() {
        let records = vec![
            MergedRecord {
                name: "Asha Verma".to_string(),
                registration: "12345".to_string(),
                total_marks: Some(415),
                sgpa: "8.5".to_string(),
                grade: "A".to_string(),
            },
            MergedRecord {
                name: String::new(),
                registration: "12346".to_string(),
                total_marks: None,
                sgpa: String::new(),
                grade: "B+".to_string(),
            },
        ];
        assert_eq!(
            render(&records),
            "Name,Registration,TotalMarks,SGPA,Grade\n\
             Asha Verma,12345,415,8.5,A\n\
             ,12346,,,B+\n"
        );
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let records = vec![MergedRecord {
            name: "Verma, Asha".to_string(),
            registration: "1".to_string(),
            ..MergedRecord::default()
        }];
        assert!(render(&records).contains("\"Verma, Asha\",1,,,"));
    }
}
