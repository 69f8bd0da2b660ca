use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};

pub mod json_writer;
pub mod summary;
pub mod tsv_writer;

pub(crate) fn create_buffered(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Float cell for TSV output; `NA` for undefined values.
pub(crate) fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.6}", v),
        _ => "NA".to_string(),
    }
}
