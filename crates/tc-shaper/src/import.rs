use serde_json::Value;
use std::io::Write;
use std::path::Path;
use tc_core::{Result, to_indented_json};
use tempfile::NamedTempFile;

/// Settings document written to disk for `tcset --import-setting`.
///
/// The file lives as long as this value and is removed on drop, whether the
/// import succeeded or not.
#[derive(Debug)]
pub struct ImportFile {
    file: NamedTempFile,
}

impl ImportFile {
    pub fn write(settings: &Value) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("tcgui-import-")
            .suffix(".json")
            .tempfile()?;

        file.write_all(to_indented_json(settings)?.as_bytes())?;
        file.flush()?;

        tracing::debug!(path = %file.path().display(), "wrote import settings");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
