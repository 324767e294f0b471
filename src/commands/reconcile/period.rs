use chrono::{Datelike, NaiveDate};
use regex::Regex;

#[derive(Debug, Clone, Copy, Default)]
pub(super) struct PeriodBounds {
    pub data_inicial: Option<NaiveDate>,
    pub data_final: Option<NaiveDate>,
    pub ano_base: Option<i32>,
}

/// Derives the reporting-period bounds from the header's free-text period
/// field: either `DD/MM/YYYY - DD/MM/YYYY` or a single date. `ano_base` is
/// the first date's year. No date at all yields an empty result, never an
/// error.
pub(super) fn extract_period_bounds(period: Option<&str>) -> PeriodBounds {
    let Some(period) = period else {
        return PeriodBounds::default();
    };

    let Ok(range_pattern) =
        Regex::new(r"(\b\d{2}/\d{2}/\d{4}\b)\s*-\s*(\b\d{2}/\d{2}/\d{4}\b)")
    else {
        return PeriodBounds::default();
    };
    let Ok(date_pattern) = Regex::new(r"\b\d{2}/\d{2}/\d{4}\b") else {
        return PeriodBounds::default();
    };

    if let Some(captures) = range_pattern.captures(period) {
        let data_inicial = parse_br_date(&captures[1]);
        let data_final = parse_br_date(&captures[2]);
        return PeriodBounds {
            data_inicial,
            data_final,
            ano_base: data_inicial.map(|date| date.year()),
        };
    }

    if let Some(found) = date_pattern.find(period) {
        let date = parse_br_date(found.as_str());
        return PeriodBounds {
            data_inicial: date,
            data_final: date,
            ano_base: date.map(|value| value.year()),
        };
    }

    PeriodBounds::default()
}

fn parse_br_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok()
}
