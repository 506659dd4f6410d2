use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::convert::pipeline::{ConvertOpts, FileOutcome, convert_file};
use crate::encode::natural::natural_sort;
use crate::foundation::error::{ConvertError, ConvertResult};

/// File extensions picked up by [`discover_inputs`], compared case-insensitively.
pub const INPUT_EXTENSIONS: [&str; 2] = ["webp", "gif"];

/// Outcome of one file inside a batch.
#[derive(Debug)]
pub struct FileReport {
    /// Source file.
    pub path: PathBuf,
    /// Conversion result for that file.
    pub result: ConvertResult<FileOutcome>,
}

/// Per-file results of [`convert_batch`], in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per input.
    pub files: Vec<FileReport>,
}

impl BatchReport {
    /// Every MP4 written by the batch, in input then segment order.
    pub fn outputs(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter_map(|f| f.result.as_ref().ok())
            .flat_map(|o| o.outputs().iter().cloned())
            .collect()
    }

    /// Number of files that produced at least one segment.
    pub fn converted(&self) -> usize {
        self.count(|r| matches!(r, Ok(FileOutcome::Converted(_))))
    }

    /// Number of files with nothing to encode.
    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, Ok(FileOutcome::Skipped(_))))
    }

    /// Number of files that failed.
    pub fn failed(&self) -> usize {
        self.count(Result::is_err)
    }

    fn count(&self, pred: impl Fn(&ConvertResult<FileOutcome>) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.result)).count()
    }
}

/// Convert every input independently; one file failing never stops the others.
///
/// With `jobs > 1` files are converted on a dedicated rayon pool of that size.
pub fn convert_batch(
    inputs: &[PathBuf],
    opts: &ConvertOpts,
    jobs: usize,
) -> ConvertResult<BatchReport> {
    if jobs == 0 {
        return Err(ConvertError::validation("jobs must be >= 1"));
    }
    opts.validate()?;

    let run = |path: &PathBuf| {
        let result = convert_file(path, opts);
        if let Err(err) = &result {
            tracing::error!(path = %path.display(), error = %err, "conversion failed");
        }
        FileReport {
            path: path.clone(),
            result,
        }
    };

    let files = if jobs > 1 && inputs.len() > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| {
                ConvertError::validation(format!("failed to build rayon thread pool: {e}"))
            })?;
        pool.install(|| inputs.par_iter().map(run).collect::<Vec<_>>())
    } else {
        inputs.iter().map(run).collect()
    };

    let report = BatchReport { files };
    tracing::info!(
        converted = report.converted(),
        skipped = report.skipped(),
        failed = report.failed(),
        "batch complete"
    );
    Ok(report)
}

/// List `*.webp` and `*.gif` files directly inside `dir`, in natural order.
pub fn discover_inputs(dir: &Path) -> ConvertResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read directory '{}'", dir.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("read directory '{}'", dir.display()))?
            .path();
        if path.is_file() && has_input_extension(&path) {
            found.push(path);
        }
    }
    natural_sort(&mut found);
    Ok(found)
}

fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| INPUT_EXTENSIONS.iter().any(|x| ext.eq_ignore_ascii_case(x)))
}

#[cfg(test)]
#[path = "../../tests/unit/convert/batch.rs"]
mod tests;
