use tracing::info;

use crate::model::{ExtractPayload, ReconciledAccount, ReferenceAccount};

use super::matching::{build_reconciled, filter_revenue_expense, match_against_reference};
use super::ordering::{assign_ordem, sort_accounts};
use super::period::{PeriodBounds, extract_period_bounds};

pub(super) struct ReconcileOutcome {
    pub accounts: Vec<ReconciledAccount>,
    pub bounds: PeriodBounds,
    pub in_scope: usize,
    pub approved: usize,
    pub rejected: usize,
}

/// The pure reconciliation pass: period bounds from the header, top-level
/// filter, reference matching with per-bucket dedup, enrichment, merge,
/// hierarchical sort and context stamping. An empty reference set simply
/// classifies everything as rejected.
pub(super) fn reconcile_payload(
    payload: &ExtractPayload,
    reference: &[ReferenceAccount],
    arquivo_id: Option<i64>,
    strict_ordering: bool,
) -> ReconcileOutcome {
    let bounds = extract_period_bounds(payload.header.period.as_deref());

    let in_scope = filter_revenue_expense(&payload.data);
    let buckets = match_against_reference(&in_scope, reference);
    let approved = buckets.approved.len();
    let rejected = buckets.rejected.len();

    let mut accounts = build_reconciled(&buckets, reference);
    sort_accounts(&mut accounts, strict_ordering);

    for account in &mut accounts {
        account.data_inicial = bounds.data_inicial;
        account.data_final = bounds.data_final;
        account.ano_base = bounds.ano_base;
        account.arquivo_id = arquivo_id;
    }
    assign_ordem(&mut accounts);

    info!(
        in_scope = in_scope.len(),
        approved, rejected, "reconciliation pass completed"
    );

    ReconcileOutcome {
        accounts,
        bounds,
        in_scope: in_scope.len(),
        approved,
        rejected,
    }
}
