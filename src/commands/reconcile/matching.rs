use std::collections::{HashMap, HashSet};

use crate::model::{AccountRecord, ReconciledAccount, ReferenceAccount};

use super::money::parse_centavos;

/// Keeps only records rooted in the revenue/expense branches of the chart
/// (classification starting with 3 or 4). Records without a classification
/// are out of scope.
pub(super) fn filter_revenue_expense(records: &[AccountRecord]) -> Vec<&AccountRecord> {
    records
        .iter()
        .filter(|record| {
            record
                .classification
                .as_deref()
                .and_then(|classification| classification.chars().next())
                .map(|first| first == '3' || first == '4')
                .unwrap_or(false)
        })
        .collect()
}

pub(super) struct MatchedBuckets<'a> {
    pub approved: Vec<&'a AccountRecord>,
    pub rejected: Vec<&'a AccountRecord>,
}

/// Splits records into approved (account name present in the reference set)
/// and rejected. Each bucket deduplicates by name independently; the first
/// occurrence wins. Records with no account name are dropped.
pub(super) fn match_against_reference<'a>(
    records: &[&'a AccountRecord],
    reference: &[ReferenceAccount],
) -> MatchedBuckets<'a> {
    let reference_names: HashSet<&str> = reference
        .iter()
        .map(|account| account.descricao.as_str())
        .collect();

    let mut approved = Vec::new();
    let mut rejected = Vec::new();
    let mut approved_seen: HashSet<&str> = HashSet::new();
    let mut rejected_seen: HashSet<&str> = HashSet::new();

    for record in records {
        let Some(account_name) = record.account.as_deref() else {
            continue;
        };

        if reference_names.contains(account_name) {
            if approved_seen.insert(account_name) {
                approved.push(*record);
            }
        } else if rejected_seen.insert(account_name) {
            rejected.push(*record);
        }
    }

    MatchedBuckets { approved, rejected }
}

/// Builds the merged reconciled list: approved records enriched from their
/// matching reference account, then rejected records with null enrichment.
/// Monetary text converts to centavos here.
pub(super) fn build_reconciled(
    buckets: &MatchedBuckets<'_>,
    reference: &[ReferenceAccount],
) -> Vec<ReconciledAccount> {
    let by_name: HashMap<&str, &ReferenceAccount> = reference
        .iter()
        .map(|account| (account.descricao.as_str(), account))
        .collect();

    let mut merged = Vec::with_capacity(buckets.approved.len() + buckets.rejected.len());

    for record in &buckets.approved {
        let matched = record
            .account
            .as_deref()
            .and_then(|name| by_name.get(name).copied());
        merged.push(reconciled_from(record, matched, true));
    }
    for record in &buckets.rejected {
        merged.push(reconciled_from(record, None, false));
    }

    merged
}

fn reconciled_from(
    record: &AccountRecord,
    reference: Option<&ReferenceAccount>,
    is_approved: bool,
) -> ReconciledAccount {
    ReconciledAccount {
        code: record.code.clone(),
        classification: record.classification.clone(),
        account: record.account.clone(),
        parent_category: record.parent_category.clone(),
        saldo_anterior: parse_centavos(record.previous_balance.as_deref()),
        total_debito: parse_centavos(record.debit.as_deref()),
        total_credito: parse_centavos(record.credit.as_deref()),
        saldo_atual: parse_centavos(record.current_balance.as_deref()),
        aliquota_cbs: reference.and_then(|account| account.aliquota_cbs),
        aliquota_ibs: reference.and_then(|account| account.aliquota_ibs),
        classificacao_tributaria_id: reference
            .and_then(|account| account.classificacao_tributaria_id),
        id_conta_cenario_base_rumo: reference.map(|account| account.id),
        is_approved,
        ordem: None,
        data_inicial: None,
        data_final: None,
        ano_base: None,
        arquivo_id: None,
    }
}
