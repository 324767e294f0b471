use regex::Regex;

use crate::model::ReportHeader;

/// Pulls the free-text report metadata from the first page by label
/// anchoring. Every label is optional; a missing one yields `None`.
pub(super) fn parse_header(page_text: &str) -> ReportHeader {
    let lines: Vec<&str> = page_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    ReportHeader {
        company: extract_after(&lines, "Empresa:"),
        cnpj: extract_after(&lines, "C.N.P.J.:"),
        report_type: report_type(&lines),
        period: extract_after(&lines, "Período:"),
        issue_date: extract_after(&lines, "Emissão:"),
        time: extract_after(&lines, "Hora:"),
        page: extract_after(&lines, "Folha:"),
        book_number: extract_after(&lines, "Número livro:"),
    }
}

/// Takes the text following `label` on the same line, up to a run of two or
/// more spaces or end of line. When the label closes its line, the value
/// falls back to the entirety of the next line.
fn extract_after(lines: &[&str], label: &str) -> Option<String> {
    let pattern = Regex::new(&format!(
        r"{}\s*(\S.*?)(?:\s{{2,}}|$)",
        regex::escape(label)
    ))
    .ok()?;

    for (index, line) in lines.iter().enumerate() {
        if let Some(captures) = pattern.captures(line) {
            return Some(captures[1].trim().to_string());
        }
        if line.contains(label) {
            let remainder = line.split_once(label).map(|(_, rest)| rest.trim())?;
            if !remainder.is_empty() {
                return Some(remainder.to_string());
            }
            if let Some(next_line) = lines.get(index + 1) {
                return Some(next_line.trim().to_string());
            }
        }
    }

    None
}

fn report_type(lines: &[&str]) -> Option<String> {
    let separator = Regex::new(r"\s{2,}").ok()?;

    let left_segment = |value: &str| -> String {
        separator
            .splitn(value, 2)
            .next()
            .unwrap_or(value)
            .trim()
            .to_string()
    };

    let report_line = lines
        .iter()
        .find(|line| **line == "BALANCETE")
        .map(|line| left_segment(line));
    let consolidated_line = lines
        .iter()
        .find(|line| line.contains("CONSOLIDADO"))
        .map(|line| left_segment(line));

    let parts: Vec<String> = [report_line, consolidated_line]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}
