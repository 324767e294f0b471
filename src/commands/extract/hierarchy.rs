use std::collections::HashMap;

use crate::model::AccountRecord;

/// Tolerated spellings of one classification code. Export variants disagree
/// on zero padding of the final segment, so `3.1.010` also answers to
/// `3.1.01`, `3.1.0` and `3.1.1`. The canonical form always comes first.
pub(super) fn classification_variants(classification: &str) -> Vec<String> {
    let parts: Vec<&str> = classification.split('.').collect();
    let mut variants = vec![classification.to_string()];

    let Some((last, prefix)) = parts.split_last() else {
        return variants;
    };

    let mut trimmed = (*last).to_string();
    while trimmed.len() > 1 && trimmed.ends_with('0') {
        trimmed.pop();
        push_unique(&mut variants, join_segments(prefix, &trimmed));
    }

    if trimmed != *last {
        let stripped = trimmed.trim_start_matches('0');
        if !stripped.is_empty() {
            push_unique(&mut variants, join_segments(prefix, stripped));
        }
    }

    let stripped_last = last.trim_start_matches('0');
    if !stripped_last.is_empty() && stripped_last != *last {
        push_unique(&mut variants, join_segments(prefix, stripped_last));
    }

    variants
}

fn push_unique(variants: &mut Vec<String>, candidate: String) {
    if !variants.contains(&candidate) {
        variants.push(candidate);
    }
}

fn join_segments(prefix: &[&str], last: &str) -> String {
    if prefix.is_empty() {
        return last.to_string();
    }
    format!("{}.{}", prefix.join("."), last)
}

/// Attaches the nearest ancestor's account name to every record. The lookup
/// is built from all pages first, so a child on page two still finds a parent
/// declared on page one. First writer wins on variant collisions.
pub(super) fn attach_parents(records: &mut [AccountRecord]) {
    let mut lookup: HashMap<String, String> = HashMap::new();

    for record in records.iter() {
        let (Some(classification), Some(account)) = (&record.classification, &record.account)
        else {
            continue;
        };
        for variant in classification_variants(classification) {
            lookup.entry(variant).or_insert_with(|| account.clone());
        }
    }

    for record in records.iter_mut() {
        record.parent_category = record
            .classification
            .as_deref()
            .and_then(|classification| find_parent(classification, &lookup));
    }
}

fn find_parent(classification: &str, lookup: &HashMap<String, String>) -> Option<String> {
    let mut parts: Vec<&str> = classification.split('.').collect();

    while parts.len() > 1 {
        parts.pop();
        let shortened = parts.join(".");
        for variant in classification_variants(&shortened) {
            if let Some(account) = lookup.get(&variant) {
                return Some(account.clone());
            }
        }
    }

    None
}
