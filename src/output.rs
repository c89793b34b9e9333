//! Persisting per-target diffs as `<target>.diff` files.

use crate::diff::UnifiedDiff;
use crate::parse::{ReadDiffError, parse_unified};
use error_set::error_set;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Extension of every persisted diff file
pub const DIFF_EXTENSION: &str = "diff";

error_set! {
    /// Errors from writing or reading diff files
    PersistError := {
        #[display("Failed to create output directory {path}: {message}")]
        CreateDir { path: String, message: String },
        #[display("Failed to write {path}: {message}")]
        Write { path: String, message: String },
        #[display("Failed to read {path}: {message}")]
        Load { path: String, message: String },
        ReadDiffError(ReadDiffError),
    }
}

/// Concatenate file blocks, each followed by a blank line.
pub fn render(diffs: &[UnifiedDiff]) -> String {
    diffs.iter().map(|diff| format!("{}\n", diff)).collect()
}

/// Write one `<name>.diff` per target into `output`, creating it if needed.
///
/// A target with no diffs still gets an empty file. Existing files are
/// overwritten. Returns the written paths in target order.
///
/// # Errors
///
/// Fails on the first directory or file that cannot be written.
pub fn save(
    targets: &BTreeMap<String, Vec<UnifiedDiff>>,
    output: &Path,
) -> Result<Vec<PathBuf>, PersistError> {
    fs::create_dir_all(output).map_err(|e| PersistError::CreateDir {
        path: output.display().to_string(),
        message: e.to_string(),
    })?;

    let mut written = Vec::with_capacity(targets.len());
    for (name, diffs) in targets {
        let path = output.join(format!("{name}.{DIFF_EXTENSION}"));
        fs::write(&path, render(diffs)).map_err(|e| PersistError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!(path = %path.display(), files = diffs.len(), "diff written");
        written.push(path);
    }

    Ok(written)
}

/// Read a diff file written by [`save`] (or any unified diff).
///
/// # Errors
///
/// Fails if the file cannot be read or does not parse.
pub fn load(path: &Path) -> Result<Vec<UnifiedDiff>, PersistError> {
    let text = fs::read_to_string(path).map_err(|e| PersistError::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(parse_unified(&text)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diff::{Hunk, Line};
    use similar_asserts::assert_eq;
    use tempfile::TempDir;

    fn sample() -> UnifiedDiff {
        UnifiedDiff::new(
            "app.go",
            "app.go",
            vec![Hunk::new(2, 3, vec![Line::delete("old"), Line::insert("new")])],
        )
    }

    #[test]
    fn render_separates_blocks() {
        let rendered = render(&[sample(), sample()]);
        let block = "--- app.go\n+++ app.go\n@@ -2,1 +2,1 @@\n-old\n+new\n";
        assert_eq!(rendered, format!("{block}\n{block}\n"));
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn save_writes_one_file_per_target() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("nested/out");
        let targets = BTreeMap::from([
            ("chain".to_string(), vec![sample()]),
            ("list".to_string(), Vec::new()),
        ]);

        let written = save(&targets, &output).unwrap();

        assert_eq!(written, vec![output.join("chain.diff"), output.join("list.diff")]);
        assert_eq!(fs::read_to_string(&written[1]).unwrap(), "");
        assert_eq!(load(&written[0]).unwrap(), vec![sample()]);
    }

    #[test]
    fn save_overwrites() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("chain.diff"), "stale").unwrap();

        let targets = BTreeMap::from([("chain".to_string(), Vec::new())]);
        save(&targets, dir.path()).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("chain.diff")).unwrap(), "");
    }

    #[test]
    fn output_path_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("out");
        fs::write(&blocker, "").unwrap();

        let err = save(&BTreeMap::new(), &blocker).unwrap_err();
        assert!(matches!(err, PersistError::CreateDir { .. }));
    }

    #[test]
    fn load_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("missing.diff")).unwrap_err();
        assert!(matches!(err, PersistError::Load { .. }));

        let bad = dir.path().join("bad.diff");
        fs::write(&bad, "not a diff\n").unwrap();
        let err = load(&bad).unwrap_err();
        assert!(matches!(err, PersistError::ReadDiffError(_)));
    }
}
