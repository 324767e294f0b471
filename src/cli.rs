use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "balancete",
    version,
    about = "Trial-balance extraction and reconciliation tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Reconcile(ReconcileArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DocumentArgs {
    /// Source PDF, read through pdftotext.
    #[arg(long, conflicts_with = "pages")]
    pub pdf: Option<PathBuf>,

    /// JSON page dump with per-word bounding boxes.
    #[arg(long)]
    pub pages: Option<PathBuf>,

    /// JSON file overriding the default column-geometry profile.
    #[arg(long)]
    pub layout_profile: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Write the extraction payload here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ReconcileArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Reconcile an extraction payload written by `extract --output`
    /// instead of reading a document.
    #[arg(long, conflicts_with_all = ["pdf", "pages"])]
    pub payload: Option<PathBuf>,

    #[arg(long, default_value = "balancete.sqlite")]
    pub db_path: PathBuf,

    /// File identifier stamped on every written row; without it the run is a
    /// dry run and nothing is persisted.
    #[arg(long)]
    pub arquivo_id: Option<i64>,

    /// Break ordering ties between zero-padding variants of the same
    /// classification by comparing the raw code strings.
    #[arg(long, default_value_t = false)]
    pub strict_ordering: bool,

    /// Write the merged reconciled accounts here as JSON.
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub summary_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "balancete.sqlite")]
    pub db_path: PathBuf,
}
