//! Parse the attendance table out of the portal's rendered HTML.
//!
//! The page is loosely structured ASP.NET markup: the attendance data
//! lives in the first `<table>`, with a header row, occasional month
//! sub-header rows, and an "Overall Percentage" label somewhere outside
//! the table. Malformed cells never abort parsing — a bad number reads
//! as 0 and a bad row is skipped.

use scraper::{ElementRef, Html, Selector};

use crate::snapshot::SubjectRecord;

/// Label preceding the portal-reported aggregate percentage.
const OVERALL_LABEL: &str = "overall percentage";

/// Value used when the overall-percentage label is absent.
const OVERALL_DEFAULT: &str = "0%";

/// Fixed column layout of the attendance table.
const COL_SERIAL: usize = 0;
const COL_SUBJECT: usize = 1;
const COL_HELD: usize = 2;
const COL_PRESENT: usize = 3;
const COL_PERCENTAGE: usize = 4;

/// Extract subject records and the overall percentage from raw HTML.
///
/// Pure function of the input document. Returns records in row order;
/// the overall percentage defaults to "0%" when the label is not found.
pub fn parse_attendance_table(html: &str) -> (Vec<SubjectRecord>, String) {
    let document = Html::parse_document(html);
    let overall = overall_percentage(&document);

    let table_sel = Selector::parse("table").unwrap();
    let row_sel = Selector::parse("tr").unwrap();
    let cell_sel = Selector::parse("td, th").unwrap();

    let Some(table) = document.select(&table_sel).next() else {
        return (Vec::new(), overall);
    };

    let mut records = Vec::new();

    // First row is the column header.
    for row in table.select(&row_sel).skip(1) {
        let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
        if cells.len() <= COL_PERCENTAGE {
            continue;
        }

        let subject = cells[COL_SUBJECT].trim();
        // Month rows group the table by month and carry no subject data.
        if subject.is_empty() || subject.eq_ignore_ascii_case("month") {
            continue;
        }

        records.push(SubjectRecord {
            serial: cells[COL_SERIAL].clone(),
            subject: subject.to_string(),
            held: digits_or_zero(&cells[COL_HELD]),
            present: digits_or_zero(&cells[COL_PRESENT]),
            percentage: cells[COL_PERCENTAGE].clone(),
        });
    }

    (records, overall)
}

/// Find the overall-percentage label and take the next non-empty text
/// node as its value.
fn overall_percentage(document: &Html) -> String {
    let texts: Vec<&str> = document.root_element().text().collect();

    for (i, text) in texts.iter().enumerate() {
        if !text.to_ascii_lowercase().contains(OVERALL_LABEL) {
            continue;
        }
        for next in &texts[i + 1..] {
            let value = next.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }

    OVERALL_DEFAULT.to_string()
}

/// Collect an element's text content with whitespace collapsed.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a cell as an integer only when it is purely digit text.
fn digits_or_zero(cell: &str) -> u32 {
    let trimmed = cell.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return 0;
    }
    trimmed.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATTENDANCE_PAGE: &str = r#"
    <html><body>
    <div>
        <span>Overall Percentage</span>
        <span>87.5%</span>
    </div>
    <table>
        <tr><th>S.No</th><th>Subject</th><th>Held</th><th>Present</th><th>%</th></tr>
        <tr><td>1</td><td>Compiler Design</td><td>20</td><td>18</td><td>90%</td></tr>
        <tr><td>2</td><td>Operating Systems</td><td>22</td><td>17</td><td>77.27%</td></tr>
        <tr><td>3</td><td>Computer Networks</td><td>18</td><td>12</td><td>66.67%</td></tr>
    </table>
    </body></html>
    "#;

    #[test]
    fn test_parse_basic_table() {
        let (records, overall) = parse_attendance_table(ATTENDANCE_PAGE);

        assert_eq!(overall, "87.5%");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].serial, "1");
        assert_eq!(records[0].subject, "Compiler Design");
        assert_eq!(records[0].held, 20);
        assert_eq!(records[0].present, 18);
        assert_eq!(records[0].percentage, "90%");
        assert_eq!(records[2].subject, "Computer Networks");
    }

    #[test]
    fn test_rows_come_out_in_table_order() {
        let (records, _) = parse_attendance_table(ATTENDANCE_PAGE);
        let subjects: Vec<&str> = records.iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(
            subjects,
            ["Compiler Design", "Operating Systems", "Computer Networks"]
        );
    }

    #[test]
    fn test_month_and_empty_subject_rows_skipped() {
        let html = r#"
        <table>
            <tr><th>S.No</th><th>Subject</th><th>Held</th><th>Present</th><th>%</th></tr>
            <tr><td></td><td>MONTH</td><td></td><td></td><td></td></tr>
            <tr><td>1</td><td>Maths</td><td>10</td><td>9</td><td>90%</td></tr>
            <tr><td></td><td>  </td><td>4</td><td>4</td><td>100%</td></tr>
            <tr><td></td><td>Month</td><td></td><td></td><td></td></tr>
            <tr><td>2</td><td>Physics</td><td>8</td><td>8</td><td>100%</td></tr>
        </table>
        "#;

        let (records, _) = parse_attendance_table(html);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].subject, "Maths");
        assert_eq!(records[1].subject, "Physics");
    }

    #[test]
    fn test_non_numeric_counts_read_as_zero() {
        let html = r#"
        <table>
            <tr><th>S.No</th><th>Subject</th><th>Held</th><th>Present</th><th>%</th></tr>
            <tr><td>1</td><td>Maths</td><td>n/a</td><td>-</td><td>0%</td></tr>
            <tr><td>2</td><td>Physics</td><td>1 2</td><td>7.5</td><td>x</td></tr>
        </table>
        "#;

        let (records, _) = parse_attendance_table(html);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].held, 0);
        assert_eq!(records[0].present, 0);
        assert_eq!(records[1].held, 0);
        assert_eq!(records[1].present, 0);
    }

    #[test]
    fn test_short_rows_skipped() {
        let html = r#"
        <table>
            <tr><th>S.No</th><th>Subject</th><th>Held</th><th>Present</th><th>%</th></tr>
            <tr><td colspan="5">Semester total</td></tr>
            <tr><td>1</td><td>Maths</td><td>10</td></tr>
            <tr><td>2</td><td>Physics</td><td>8</td><td>8</td><td>100%</td></tr>
        </table>
        "#;

        let (records, _) = parse_attendance_table(html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject, "Physics");
    }

    #[test]
    fn test_overall_percentage_defaults_when_label_missing() {
        let html = r#"
        <table>
            <tr><th>S.No</th><th>Subject</th><th>Held</th><th>Present</th><th>%</th></tr>
            <tr><td>1</td><td>Maths</td><td>10</td><td>9</td><td>90%</td></tr>
        </table>
        "#;

        let (_, overall) = parse_attendance_table(html);
        assert_eq!(overall, "0%");
    }

    #[test]
    fn test_overall_percentage_label_case_insensitive() {
        let html = r#"
        <div><b>OVERALL PERCENTAGE</b> <i>72.1%</i></div>
        <table><tr><th>h</th></tr></table>
        "#;

        let (_, overall) = parse_attendance_table(html);
        assert_eq!(overall, "72.1%");
    }

    #[test]
    fn test_no_table_yields_no_records() {
        let (records, overall) = parse_attendance_table("<html><body>maintenance</body></html>");
        assert!(records.is_empty());
        assert_eq!(overall, "0%");
    }

    #[test]
    fn test_header_only_table() {
        let html = r#"
        <table><tr><th>S.No</th><th>Subject</th><th>Held</th><th>Present</th><th>%</th></tr></table>
        "#;

        let (records, _) = parse_attendance_table(html);
        assert!(records.is_empty());
    }

    #[test]
    fn test_nested_markup_in_cells() {
        let html = r#"
        <table>
            <tr><th>S.No</th><th>Subject</th><th>Held</th><th>Present</th><th>%</th></tr>
            <tr><td>1</td><td><b>Compiler</b> <i>Design</i></td><td><span>20</span></td><td>18</td><td><b>90%</b></td></tr>
        </table>
        "#;

        let (records, _) = parse_attendance_table(html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject, "Compiler Design");
        assert_eq!(records[0].held, 20);
        assert_eq!(records[0].percentage, "90%");
    }
}
