use anyhow::Result;
use regex::Regex;

use crate::model::{LayoutProfile, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Column {
    Code,
    Classification,
    Account,
    PreviousBalance,
    Debit,
    Credit,
    CurrentBalance,
}

pub(super) struct ColumnPatterns {
    pub code: Regex,
    pub classification: Regex,
    pub numeric: Regex,
    pub underscore: Regex,
}

impl ColumnPatterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            code: Regex::new(r"^\d{1,6}$")?,
            classification: Regex::new(r"^\d+(?:\.\d+)*$")?,
            numeric: Regex::new(r"^[\d.,()\-]+[DC]?$")?,
            underscore: Regex::new(r"^_+$")?,
        })
    }
}

/// Positional column inference for one fragment. Rules apply in priority
/// order; the first match wins. Band boundaries come from the layout profile.
pub(super) fn detect_column(
    word: &Word,
    text: &str,
    patterns: &ColumnPatterns,
    layout: &LayoutProfile,
) -> Option<Column> {
    let center = word.center();

    if word.right <= layout.code_right_max && patterns.code.is_match(text) {
        return Some(Column::Code);
    }

    if center <= layout.classification_center_max && patterns.classification.is_match(text) {
        return Some(Column::Classification);
    }

    if center <= layout.account_center_max && word.left >= layout.account_left_min {
        return Some(Column::Account);
    }

    if patterns.numeric.is_match(text) {
        if center <= layout.previous_balance_center_max {
            return Some(Column::PreviousBalance);
        }
        if center <= layout.debit_center_max {
            return Some(Column::Debit);
        }
        if center <= layout.credit_center_max {
            return Some(Column::Credit);
        }
        if center > layout.account_center_max {
            return Some(Column::CurrentBalance);
        }
    }

    None
}
