use marksheet::{FieldSet, probe};

use crate::cli::OracleArgs;
use crate::shared::build_oracle;

pub fn run(oracle_args: &OracleArgs) -> Result<(), i32> {
    let oracle = build_oracle(oracle_args)?;
    tracing::info!(endpoint = %oracle_args.endpoint, model = %oracle_args.model, "probing oracle");

    let fields = probe(&oracle).map_err(|e| {
        eprintln!("Error: oracle probe failed: {e}");
        1
    })?;
    if fields.is_empty() {
        eprintln!("Error: oracle answered without any of the expected fields");
        return Err(1);
    }

    println!("Oracle at {} is reachable", oracle_args.endpoint);
    println!("{}", render_fields(&fields));
    Ok(())
}

fn render_fields(fields: &FieldSet) -> String {
    let total = fields
        .total_marks
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_default();
    [
        ("Name", FieldSet::text(&fields.name)),
        ("Registration", FieldSet::text(&fields.registration)),
        ("TotalMarks", total),
        ("SGPA", FieldSet::text(&fields.sgpa)),
        ("Grade", FieldSet::text(&fields.grade)),
    ]
    .iter()
    .map(|(key, value)| format!("{key}: {value}"))
    .collect::<Vec<_>>()
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use marksheet::MarksValue;

    #[test]
    fn renders_all_five_fields() {
        let fields = FieldSet {
            name: Some("John Doe".to_string()),
            registration: Some("12345".to_string()),
            total_marks: Some(MarksValue::Integer(85)),
            sgpa: None,
            grade: Some("A".to_string()),
        };
        assert_eq!(
            render_fields(&fields),
            "Name: John Doe\nRegistration: 12345\nTotalMarks: 85\nSGPA: \nGrade: A"
        );
    }
}
