mod columns;
mod document;
mod header;
mod hierarchy;
mod rows;
mod run;

pub use document::{load_document, load_layout_profile};
pub use run::{extract_document, run};
