use std::path::Path;

use marksheet::{PageText, SegmentOptions};

use crate::cli::LinesFormat;
use crate::shared::{open_pdf, resolve_pages};

pub fn run(
    file: &Path,
    pages: Option<&str>,
    format: &LinesFormat,
    show_blocks: bool,
) -> Result<(), i32> {
    let pdf = open_pdf(file)?;
    let page_indices = resolve_pages(pages, pdf.page_count())?;
    let options = SegmentOptions::default();

    for idx in page_indices {
        let page = pdf.page(idx).map_err(|e| {
            eprintln!("Error reading page {}: {e}", idx + 1);
            1
        })?;
        for warning in page.warnings() {
            tracing::warn!(page = idx + 1, "{warning}");
        }
        let text = page.segment(&options);

        match format {
            LinesFormat::Text => print_text(idx + 1, &text, show_blocks),
            LinesFormat::Json => {
                let obj = page_json(idx + 1, page.is_plain_text(), &text, show_blocks);
                println!("{obj}");
            }
        }
    }

    Ok(())
}

fn print_text(page_number: usize, text: &PageText, show_blocks: bool) {
    println!("--- Page {page_number} ---");
    for line in &text.lines {
        match line.top {
            Some(top) => println!("{top:>8.2}\t{}", line.text),
            None => println!("{:>8}\t{}", "-", line.text),
        }
    }
    if show_blocks {
        for (i, block) in text.blocks.iter().enumerate() {
            println!("[block {}]", i + 1);
            println!("{block}");
        }
    }
}

fn page_json(
    page_number: usize,
    plain_text: bool,
    text: &PageText,
    show_blocks: bool,
) -> serde_json::Value {
    let lines: Vec<serde_json::Value> = text
        .lines
        .iter()
        .map(|line| serde_json::json!({ "top": line.top, "text": line.text }))
        .collect();
    let mut obj = serde_json::json!({
        "page": page_number,
        "plain_text": plain_text,
        "lines": lines,
    });
    if show_blocks {
        obj["blocks"] = serde_json::json!(text.blocks);
    }
    obj
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lines_keep_missing_positions_null() {
        let text = PageText::from_plain_text("Grade: A\n\nSGPA: 8.5");
        let obj = page_json(2, true, &text, true);
        assert_eq!(obj["page"], 2);
        assert_eq!(obj["plain_text"], true);
        assert_eq!(obj["lines"][0]["text"], "Grade: A");
        assert!(obj["lines"][0]["top"].is_null());
        assert_eq!(obj["blocks"][1], "SGPA: 8.5");
    }

    #[test]
    fn blocks_are_omitted_unless_requested() {
        let text = PageText::from_plain_text("Grade: A");
        assert!(page_json(1, true, &text, false).get("blocks").is_none());
    }
}
