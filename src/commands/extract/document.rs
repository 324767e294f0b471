use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::info;

use crate::cli::DocumentArgs;
use crate::model::{DocumentContent, LayoutProfile, PageContent, Word};

pub fn load_layout_profile(args: &DocumentArgs) -> Result<LayoutProfile> {
    let Some(path) = &args.layout_profile else {
        return Ok(LayoutProfile::default());
    };

    let raw =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let profile: LayoutProfile = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    info!(path = %path.display(), "loaded layout profile");
    Ok(profile)
}

pub fn load_document(args: &DocumentArgs) -> Result<DocumentContent> {
    if let Some(path) = &args.pdf {
        return load_pdf_document(path);
    }
    if let Some(path) = &args.pages {
        return load_page_dump(path);
    }
    bail!("either --pdf or --pages must be provided");
}

fn load_page_dump(path: &Path) -> Result<DocumentContent> {
    let raw =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document: DocumentContent = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    info!(path = %path.display(), pages = document.pages.len(), "loaded page dump");
    Ok(document)
}

fn load_pdf_document(path: &Path) -> Result<DocumentContent> {
    let page_texts = extract_page_texts(path)?;
    let page_words = extract_page_words(path)?;

    let page_count = page_texts.len().max(page_words.len());
    let mut pages = Vec::with_capacity(page_count);
    for index in 0..page_count {
        pages.push(PageContent {
            text: page_texts.get(index).cloned().unwrap_or_default(),
            words: page_words.get(index).cloned().unwrap_or_default(),
        });
    }

    info!(path = %path.display(), pages = pages.len(), "extracted pdf text layer");
    Ok(DocumentContent { pages })
}

/// Per-page layout-preserving text, for header parsing. Pages come back
/// separated by form feeds; trailing blank pages are dropped.
fn extract_page_texts(pdf_path: &Path) -> Result<Vec<String>> {
    let output = Command::new("pdftotext")
        .arg("-enc")
        .arg("UTF-8")
        .arg("-layout")
        .arg(pdf_path)
        .arg("-")
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    while let Some(last_page) = pages.last() {
        if last_page.trim().is_empty() {
            pages.pop();
            continue;
        }
        break;
    }

    Ok(pages)
}

/// Per-word bounding boxes from the `-bbox` backend: `xMin`/`xMax` become the
/// horizontal extent, `yMin` the top baseline.
fn extract_page_words(pdf_path: &Path) -> Result<Vec<Vec<Word>>> {
    let output = Command::new("pdftotext")
        .arg("-enc")
        .arg("UTF-8")
        .arg("-bbox")
        .arg(pdf_path)
        .arg("-")
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext -bbox returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout).replace('\u{0000}', "");
    parse_bbox_words(&raw)
}

pub(super) fn parse_bbox_words(bbox_xml: &str) -> Result<Vec<Vec<Word>>> {
    let word_regex = Regex::new(
        r#"<word xMin="(?P<xmin>[0-9.\-]+)" yMin="(?P<ymin>[0-9.\-]+)" xMax="(?P<xmax>[0-9.\-]+)" yMax="[0-9.\-]+">(?P<text>.*)</word>"#,
    )?;

    let mut pages: Vec<Vec<Word>> = Vec::new();

    for line in bbox_xml.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("<page") {
            pages.push(Vec::new());
            continue;
        }

        let Some(captures) = word_regex.captures(trimmed) else {
            continue;
        };
        let Some(current_page) = pages.last_mut() else {
            continue;
        };

        let Ok(left) = captures["xmin"].parse::<f64>() else {
            continue;
        };
        let Ok(top) = captures["ymin"].parse::<f64>() else {
            continue;
        };
        let Ok(right) = captures["xmax"].parse::<f64>() else {
            continue;
        };

        current_page.push(Word {
            text: unescape_xml_entities(&captures["text"]),
            left,
            right,
            top,
        });
    }

    Ok(pages)
}

fn unescape_xml_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
