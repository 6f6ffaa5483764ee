use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DEFAULT_UPLOAD_NAME: &str = "input.pdf";
const TEMP_DIR_PREFIX: &str = "pdf2tts_";

/// Deletes a temporary directory exactly once: on [`DeferredCleanup::run_now`]
/// or, failing that, when dropped.
#[derive(Debug)]
pub struct DeferredCleanup {
    dir: Option<TempDir>,
}

impl DeferredCleanup {
    pub fn new(dir: TempDir) -> Self {
        Self { dir: Some(dir) }
    }

    pub fn path(&self) -> Option<&Path> {
        self.dir.as_ref().map(TempDir::path)
    }

    pub fn run_now(mut self) {
        self.run();
    }

    fn run(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let path = dir.path().to_path_buf();
        match dir.close() {
            Ok(()) => tracing::debug!(path = %path.display(), "Temporary directory removed"),
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove temporary directory"
            ),
        }
    }
}

impl Drop for DeferredCleanup {
    fn drop(&mut self) {
        self.run();
    }
}

/// Scratch space for one uploaded document and the audio made from it
#[derive(Debug)]
pub struct ConversionJob {
    input_path: PathBuf,
    output_path: PathBuf,
    download_name: String,
    cleanup: DeferredCleanup,
}

impl ConversionJob {
    /// Create a fresh, uniquely named directory under `temp_root`.
    ///
    /// `upload_name` is reduced to its final path component, so a client
    /// supplied name can never point outside the directory.
    pub fn create(temp_root: &Path, upload_name: Option<&str>) -> std::io::Result<Self> {
        let base_name = upload_name
            .and_then(|name| Path::new(name).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string());
        let stem = Path::new(&base_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "input".to_string());

        let temp_dir = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir_in(temp_root)?;

        let download_name = format!("{}.mp3", stem);
        let input_path = temp_dir.path().join(&base_name);
        let mut output_path = temp_dir.path().join(&download_name);
        if output_path == input_path {
            output_path = temp_dir.path().join(format!("{}.out.mp3", stem));
        }

        tracing::debug!(
            dir = %temp_dir.path().display(),
            input = %input_path.display(),
            "Conversion job created"
        );

        Ok(Self {
            input_path,
            output_path,
            download_name,
            cleanup: DeferredCleanup::new(temp_dir),
        })
    }

    pub fn dir(&self) -> Option<&Path> {
        self.cleanup.path()
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// File name offered to the client for the audio download
    pub fn download_name(&self) -> &str {
        &self.download_name
    }

    /// Stage uploaded bytes into the job directory
    pub async fn write_input(&self, data: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(&self.input_path, data).await
    }

    /// Remove the directory immediately
    pub fn cleanup_now(self) {
        self.cleanup.run_now();
    }

    /// Hand the directory's lifetime to whoever outlives the job
    pub fn into_cleanup(self) -> DeferredCleanup {
        self.cleanup
    }
}
