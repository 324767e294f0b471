/// Converts Brazilian-formatted monetary text (`.` thousands, `,` decimal)
/// into integer centavos. Ties round to even, matching the documented
/// rounding policy. Absent or unparseable values convert to zero; partial
/// data is preferred over aborting the run.
pub(super) fn parse_centavos(value: Option<&str>) -> i64 {
    let Some(raw) = value else {
        return 0;
    };

    let normalized = raw.trim().replace('.', "").replace(',', ".");
    if normalized.is_empty() {
        return 0;
    }

    match normalized.parse::<f64>() {
        Ok(number) => (number * 100.0).round_ties_even() as i64,
        Err(_) => 0,
    }
}
