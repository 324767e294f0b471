use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::ReconcileArgs;
use crate::commands::extract::{extract_document, load_document, load_layout_profile};
use crate::model::{ExtractEnvelope, ReconcileCounts, ReconcileRunSummary};
use crate::util::{new_run_id, now_utc_string, sha256_file, write_json_pretty};

use super::db::{fetch_reference_accounts, insert_client_accounts, open_database};
use super::ordering::assign_ordem;
use super::pipeline::reconcile_payload;

pub fn run(args: ReconcileArgs) -> Result<()> {
    let started_at = now_utc_string();
    let run_id = new_run_id();
    let mut warnings: Vec<String> = Vec::new();

    info!(run_id = %run_id, db_path = %args.db_path.display(), "starting reconciliation");

    let (envelope, pages) = match &args.payload {
        Some(path) => (load_payload(path)?, 0),
        None => {
            let layout = load_layout_profile(&args.document)?;
            let document = load_document(&args.document)?;
            let pages = document.pages.len();
            (extract_document(&document, &layout)?, pages)
        }
    };

    let Some(payload) = envelope.data else {
        match envelope.error {
            Some(failure) => bail!(
                "extraction failed ({:?}): {}",
                failure.category,
                failure.message
            ),
            None => bail!("extraction produced neither data nor an error"),
        }
    };

    let mut connection = open_database(&args.db_path)?;

    let reference = match fetch_reference_accounts(&connection) {
        Ok(accounts) => accounts,
        Err(error) => {
            warn!(error = %error, "reference account fetch failed, treating reference set as empty");
            warnings.push(format!("reference account fetch failed: {error:#}"));
            Vec::new()
        }
    };
    if reference.is_empty() {
        warn!("reference set is empty, every extracted account will be rejected");
    }

    let mut outcome = reconcile_payload(
        &payload,
        &reference,
        args.arquivo_id,
        args.strict_ordering,
    );

    let rows_written = if args.arquivo_id.is_some() {
        let written = insert_client_accounts(&mut connection, &outcome.accounts)?;
        info!(rows = written, "persisted reconciled accounts");
        written
    } else {
        warnings.push("no arquivo_id provided, skipping persistence".to_string());
        0
    };

    // Re-number after the write so ordem matches the rows actually persisted.
    assign_ordem(&mut outcome.accounts);

    if let Some(path) = &args.output {
        write_json_pretty(path, &outcome.accounts)?;
        info!(path = %path.display(), "wrote reconciled accounts");
    }

    let source_path = args
        .payload
        .as_ref()
        .or(args.document.pdf.as_ref())
        .or(args.document.pages.as_ref());
    let source_sha256 = match source_path {
        Some(path) => match sha256_file(path) {
            Ok(digest) => Some(digest),
            Err(error) => {
                warnings.push(format!("failed to hash source document: {error:#}"));
                None
            }
        },
        None => None,
    };

    let summary = ReconcileRunSummary {
        run_id: run_id.clone(),
        started_at,
        updated_at: now_utc_string(),
        source: source_path
            .map(|path| path.display().to_string())
            .unwrap_or_default(),
        source_sha256,
        db_path: args.db_path.display().to_string(),
        data_inicial: outcome.bounds.data_inicial,
        data_final: outcome.bounds.data_final,
        ano_base: outcome.bounds.ano_base,
        counts: ReconcileCounts {
            pages,
            records_extracted: payload.data.len(),
            records_in_scope: outcome.in_scope,
            reference_accounts: reference.len(),
            approved: outcome.approved,
            rejected: outcome.rejected,
            rows_written,
        },
        warnings,
    };

    if let Some(path) = &args.summary_path {
        write_json_pretty(path, &summary)?;
        info!(path = %path.display(), "wrote run summary");
    }

    info!(
        run_id = %run_id,
        approved = summary.counts.approved,
        rejected = summary.counts.rejected,
        rows_written = summary.counts.rows_written,
        "reconciliation completed"
    );

    Ok(())
}

/// Reads a previously written extraction envelope, so a payload produced by
/// `extract --output` can be reconciled without re-reading the document.
fn load_payload(path: &Path) -> Result<ExtractEnvelope> {
    let raw =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let envelope: ExtractEnvelope = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    info!(path = %path.display(), success = envelope.success, "loaded extraction payload");
    Ok(envelope)
}
