use crate::model::ReconciledAccount;

/// Hierarchical sort key: each dot-segment as an integer, so ordering is
/// numeric per level rather than lexical. Missing or unparseable codes key
/// as `[0]` and sort first. Integer parsing discards zero padding, so
/// `3.1.01` and `3.1.1` share a key; strict mode (below) disambiguates them.
pub(super) fn classification_sort_key(classification: Option<&str>) -> Vec<i64> {
    let Some(classification) = classification else {
        return vec![0];
    };
    if classification.is_empty() {
        return vec![0];
    }

    let mut key = Vec::new();
    for segment in classification.split('.') {
        match segment.parse::<i64>() {
            Ok(value) => key.push(value),
            Err(_) => return vec![0],
        }
    }
    key
}

/// Stable sort, so within equal keys the approved-before-rejected merge
/// order survives. Strict mode adds the raw code string as a tiebreaker
/// between zero-padding variants.
pub(super) fn sort_accounts(accounts: &mut [ReconciledAccount], strict: bool) {
    accounts.sort_by_cached_key(|account| {
        let numeric = classification_sort_key(account.classification.as_deref());
        let tiebreak = if strict {
            account.classification.clone()
        } else {
            None
        };
        (numeric, tiebreak)
    });
}

/// 1-based position in final order. Re-run after persistence so `ordem`
/// reflects exactly the rows written.
pub(super) fn assign_ordem(accounts: &mut [ReconciledAccount]) {
    for (index, account) in accounts.iter_mut().enumerate() {
        account.ordem = Some((index + 1) as i64);
    }
}
