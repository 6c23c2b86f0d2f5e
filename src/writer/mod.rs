//! Results directory writer.
//!
//! Every file goes to a temp file in the target directory first and is then
//! renamed into place, so Allure never sees a half-written document.

use crate::error::{ConvertError, Result, ResultExt};
use crate::report::{TestContainer, TestResult};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

/// Writes Allure documents and attachments into one directory.
#[derive(Debug, Clone)]
pub struct ResultsWriter {
    dir: PathBuf,
}

impl ResultsWriter {
    /// Open (and create if missing) the output directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Store the raw log verbatim under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_attachment(&self, name: &str, contents: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ConvertError::InvalidAttachmentName {
                name: name.to_string(),
            });
        }
        self.write_atomic(name, contents.as_bytes())
    }

    /// Write `<uuid>-result.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_result(&self, result: &TestResult) -> Result<PathBuf> {
        self.write_json(&format!("{}-result.json", result.uuid), result)
    }

    /// Write `<uuid>-container.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_container(&self, container: &TestContainer) -> Result<PathBuf> {
        self.write_json(&format!("{}-container.json", container.uuid), container)
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let bytes = serde_json::to_vec(value)?;
        self.write_atomic(name, &bytes)
    }

    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let target = self.dir.join(name);
        let temp = self.dir.join(format!(".{name}.tmp"));

        let write = || -> std::io::Result<()> {
            let mut file = File::create(&temp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&temp, &target)
        };

        if let Err(err) = write() {
            fs::remove_file(&temp).ok();
            return Err(err)
                .with_context(|| format!("Failed to write {}", target.display()));
        }

        tracing::debug!(path = %target.display(), bytes = bytes.len(), "Wrote file");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ScenarioMeta, assemble_at};
    use crate::tree::StepTree;
    use tempfile::TempDir;

    const LOG: &str = "\
00:00:01.000 [ INFO] maestro.cli.runner.TestSuiteInteractor: Launch app RUNNING
00:00:02.500 [ INFO] maestro.cli.runner.TestSuiteInteractor: Launch app COMPLETED
";

    #[test]
    fn creates_missing_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested/allure-results");
        let writer = ResultsWriter::create(&dir).unwrap();
        assert!(dir.is_dir());
        let raw = writer.write_attachment("raw.txt", "x").unwrap();
        assert_eq!(raw, dir.join("raw.txt"));
    }

    #[test]
    fn writes_documents_and_attachment() {
        let temp = TempDir::new().unwrap();
        let writer = ResultsWriter::create(temp.path()).unwrap();

        let tree = StepTree::from_log(LOG);
        let meta = ScenarioMeta::new("Suite", "Login", "_raw_maestro_log.txt");
        let result = assemble_at(&tree, &meta, 1_750_000_000_000);
        let container = TestContainer::new("Suite", vec![result.uuid]);

        let raw = writer.write_attachment("_raw_maestro_log.txt", LOG).unwrap();
        let result_path = writer.write_result(&result).unwrap();
        let container_path = writer.write_container(&container).unwrap();

        assert_eq!(fs::read_to_string(raw).unwrap(), LOG);
        assert_eq!(
            result_path.file_name().unwrap().to_string_lossy(),
            format!("{}-result.json", result.uuid)
        );

        let text = fs::read_to_string(&result_path).unwrap();
        assert!(!text.contains('\n'), "compact JSON expected");
        let parsed: TestResult = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, result);

        let parsed: TestContainer =
            serde_json::from_str(&fs::read_to_string(container_path).unwrap()).unwrap();
        assert_eq!(parsed.children, vec![result.uuid]);
    }

    #[test]
    fn leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let writer = ResultsWriter::create(temp.path()).unwrap();
        writer.write_attachment("raw.txt", "x").unwrap();
        writer.write_attachment("raw.txt", "y").unwrap();

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["raw.txt"]);
        assert_eq!(fs::read_to_string(temp.path().join("raw.txt")).unwrap(), "y");
    }

    #[test]
    fn rejects_path_like_attachment_names() {
        let temp = TempDir::new().unwrap();
        let writer = ResultsWriter::create(temp.path()).unwrap();
        for name in ["../escape.txt", "", "dir\\raw.txt"] {
            let err = writer.write_attachment(name, "x").unwrap_err();
            assert!(matches!(err, ConvertError::InvalidAttachmentName { .. }));
            let structured = crate::error::StructuredError::from_error(&err);
            assert_eq!(structured.code.as_str(), "INVALID_ATTACHMENT_NAME");
            assert_eq!(structured.code.exit_code(), 4);
        }
    }
}
