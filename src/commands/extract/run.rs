use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::ExtractArgs;
use crate::model::{
    DocumentContent, ErrorCategory, ExtractEnvelope, ExtractPayload, LayoutProfile,
};
use crate::util::write_json_pretty;

use super::columns::ColumnPatterns;
use super::document::{load_document, load_layout_profile};
use super::header::parse_header;
use super::hierarchy::attach_parents;
use super::rows::extract_rows;

pub fn run(args: ExtractArgs) -> Result<()> {
    let layout = load_layout_profile(&args.document)?;

    let envelope = match load_document(&args.document) {
        Ok(document) => extract_document(&document, &layout)?,
        Err(error) => {
            ExtractEnvelope::failure(ErrorCategory::Document, format!("{error:#}"))
        }
    };

    match &args.output {
        Some(path) => {
            write_json_pretty(path, &envelope)?;
            info!(path = %path.display(), success = envelope.success, "wrote extraction payload");
        }
        None => {
            let rendered = serde_json::to_string_pretty(&envelope)
                .context("failed to serialize extraction payload")?;
            println!("{rendered}");
        }
    }

    if let Some(failure) = &envelope.error {
        bail!("extraction failed ({:?}): {}", failure.category, failure.message);
    }

    Ok(())
}

/// The core extraction operation: header from page one, clustered and
/// classified rows from every page, then hierarchy resolution over the
/// complete record list. Parsing gaps degrade to nulls; only an unusable
/// document or a fully empty result is a failure.
pub fn extract_document(
    document: &DocumentContent,
    layout: &LayoutProfile,
) -> Result<ExtractEnvelope> {
    if document.pages.is_empty() {
        return Ok(ExtractEnvelope::failure(
            ErrorCategory::Document,
            "document contains no pages",
        ));
    }

    let first_page_text = &document.pages[0].text;
    if first_page_text.trim().is_empty() {
        return Ok(ExtractEnvelope::failure(
            ErrorCategory::Document,
            "no extractable text on the first page",
        ));
    }

    let patterns = ColumnPatterns::new()?;
    let header = parse_header(first_page_text);

    let mut records = Vec::new();
    for page in &document.pages {
        records.extend(extract_rows(page, &patterns, layout));
    }

    attach_parents(&mut records);

    if records.is_empty() {
        warn!("document produced no table rows");
        return Ok(ExtractEnvelope::failure(
            ErrorCategory::NoData,
            "no account rows were extracted from the document",
        ));
    }

    info!(
        pages = document.pages.len(),
        records = records.len(),
        "extraction completed"
    );

    Ok(ExtractEnvelope::success(ExtractPayload {
        header,
        data: records,
    }))
}
