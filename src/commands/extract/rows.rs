use std::cmp::Ordering;

use crate::model::{AccountRecord, LayoutProfile, PageContent, Word};

use super::columns::{Column, ColumnPatterns, detect_column};

/// Groups positioned words into table rows by vertical proximity. Single
/// pass: a word further than the tolerance from the current band's reference
/// top starts a new row, and becomes the new reference. Assumes the source
/// emits words in reading order.
pub(super) fn group_rows(words: Vec<Word>, tolerance: f64) -> Vec<Vec<Word>> {
    let mut rows = Vec::new();
    let mut current: Vec<Word> = Vec::new();
    let mut current_top: Option<f64> = None;

    for word in words {
        if let Some(reference) = current_top {
            if !current.is_empty() && (word.top - reference).abs() > tolerance {
                rows.push(std::mem::take(&mut current));
            }
        }

        let starts_new_band = match current_top {
            None => true,
            Some(reference) => (word.top - reference).abs() > tolerance,
        };
        if starts_new_band {
            current_top = Some(word.top);
        }

        current.push(word);
    }

    if !current.is_empty() {
        rows.push(current);
    }

    rows
}

#[derive(Default)]
struct RowBuckets {
    code: Vec<String>,
    classification: Vec<String>,
    account: Vec<String>,
    previous_balance: Vec<String>,
    debit: Vec<String>,
    credit: Vec<String>,
    current_balance: Vec<String>,
}

impl RowBuckets {
    fn push(&mut self, column: Column, text: String) {
        match column {
            Column::Code => self.code.push(text),
            Column::Classification => self.classification.push(text),
            Column::Account => self.account.push(text),
            Column::PreviousBalance => self.previous_balance.push(text),
            Column::Debit => self.debit.push(text),
            Column::Credit => self.credit.push(text),
            Column::CurrentBalance => self.current_balance.push(text),
        }
    }
}

/// Classifies the fragments of one row and assembles them into an account
/// record. Returns `None` for non-data rows: repeated column captions,
/// underscore placeholder fills and rows with no usable content.
pub(super) fn parse_row(
    row_words: &[Word],
    patterns: &ColumnPatterns,
    layout: &LayoutProfile,
) -> Option<AccountRecord> {
    let mut ordered: Vec<&Word> = row_words.iter().collect();
    ordered.sort_by(|a, b| a.left.partial_cmp(&b.left).unwrap_or(Ordering::Equal));

    let mut buckets = RowBuckets::default();
    let mut fallback: Vec<String> = Vec::new();

    for word in ordered {
        let text = word.text.trim();
        if text.is_empty() {
            continue;
        }

        match detect_column(word, text, patterns, layout) {
            Some(column) => buckets.push(column, text.to_string()),
            None => {
                // Stray codes and classifications outside their bands are
                // noise, never account-name material.
                if !patterns.code.is_match(text) && !patterns.classification.is_match(text) {
                    fallback.push(text.to_string());
                }
            }
        }
    }

    if buckets.account.is_empty() && !fallback.is_empty() {
        let alt_account: Vec<String> = fallback
            .into_iter()
            .filter(|fragment| !patterns.underscore.is_match(fragment))
            .collect();
        if !alt_account.is_empty() {
            buckets.account = alt_account;
        }
    }

    let record = AccountRecord {
        code: clean_text(&buckets.code.join(" ")),
        classification: clean_text(&buckets.classification.join(" ")),
        account: clean_text(&buckets.account.join(" ")),
        previous_balance: clean_text(&buckets.previous_balance.join(" ")),
        debit: clean_text(&buckets.debit.join(" ")),
        credit: clean_text(&buckets.credit.join(" ")),
        current_balance: clean_text(&buckets.current_balance.join(" ")),
        parent_category: None,
    };

    if let Some(account) = &record.account {
        if account == "Descrição da conta" {
            return None;
        }
        if patterns.underscore.is_match(account) {
            return None;
        }
    }

    if record.code.is_none()
        && record.classification.is_none()
        && record.account.is_none()
        && record.previous_balance.is_none()
        && record.debit.is_none()
        && record.credit.is_none()
        && record.current_balance.is_none()
    {
        return None;
    }

    Some(record)
}

pub(super) fn clean_text(value: &str) -> Option<String> {
    let collapsed = value.split_whitespace().collect::<Vec<&str>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

pub(super) fn extract_rows(
    page: &PageContent,
    patterns: &ColumnPatterns,
    layout: &LayoutProfile,
) -> Vec<AccountRecord> {
    let mut words: Vec<Word> = page
        .words
        .iter()
        .filter(|word| word.top >= layout.min_top)
        .cloned()
        .collect();
    words.sort_by(|a, b| {
        a.top
            .partial_cmp(&b.top)
            .unwrap_or(Ordering::Equal)
            .then(a.left.partial_cmp(&b.left).unwrap_or(Ordering::Equal))
    });

    group_rows(words, layout.row_tolerance)
        .iter()
        .filter_map(|row_words| parse_row(row_words, patterns, layout))
        .collect()
}
