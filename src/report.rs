//! Elastic ASCII table rendering for CLI output.

use std::fmt::Write as _;

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(3))).collect();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

/// Render a metric value: whole numbers without a fraction, everything
/// else at two decimal places.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        let width = widths.get(idx).copied().unwrap_or(0).max(3);
        let padding = width.saturating_sub(cell.chars().count());
        line.push_str(cell);
        line.push_str(&" ".repeat(padding));
    }
    line.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_widest_cell() {
        let headers = vec!["metric".to_string(), "value".to_string()];
        let rows = vec![
            vec!["Total Nett Sales".to_string(), "1234.50".to_string()],
            vec!["Total Orders".to_string(), "7".to_string()],
        ];
        let rendered = render_table(&headers, &rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("metric"));
        assert!(lines[1].starts_with("---"));
        assert!(lines[2].contains("1234.50"));
        // Value column starts at the same offset on every row.
        let offset = lines[2].find("1234.50").unwrap();
        assert_eq!(lines[3].find('7').unwrap(), offset);
    }

    #[test]
    fn trailing_whitespace_is_trimmed() {
        let headers = vec!["a".to_string(), "b".to_string()];
        let rows = vec![vec!["x".to_string(), "y".to_string()]];
        for line in render_table(&headers, &rows).lines() {
            assert_eq!(line, line.trim_end());
        }
    }
}
