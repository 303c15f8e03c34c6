//! Client-side conversion workflow.
//!
//! [`ConversionController`] owns everything the user interacts with between
//! picking files and downloading results: the current selection, the chosen
//! target format, the progress of the running batch and its results.
//!
//! Files are read concurrently and patched into the selection by id as each
//! read completes. Conversion requests are then issued strictly one at a
//! time, in selection order, and a failed item never aborts the rest of the
//! queue.

use crate::client::ConvertService;
use crate::codec::detect_image_mime;
use crate::models::{ConversionRequest, ConversionResult, SelectedImage, TargetFormat};
use crate::progress::ProgressObserver;
use crate::{data_url, naming, Error, Result};
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Done,
}

pub struct ConversionController {
    selected: Vec<SelectedImage>,
    format: TargetFormat,
    send_original_names: bool,
    results: Vec<ConversionResult>,
    progress: f64,
    state: RunState,
}

impl Default for ConversionController {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionController {
    pub fn new() -> Self {
        Self {
            selected: Vec::new(),
            format: TargetFormat::default(),
            send_original_names: true,
            results: Vec::new(),
            progress: 0.0,
            state: RunState::Idle,
        }
    }

    /// Whether requests carry `originalName`. Without it the endpoint names
    /// every result `converted.<ext>`.
    pub fn with_original_names(mut self, enabled: bool) -> Self {
        self.send_original_names = enabled;
        self
    }

    pub fn set_format(&mut self, format: TargetFormat) {
        self.format = format;
    }

    pub fn format(&self) -> TargetFormat {
        self.format
    }

    pub fn selected(&self) -> &[SelectedImage] {
        &self.selected
    }

    pub fn results(&self) -> &[ConversionResult] {
        &self.results
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Replace the selection with placeholder records, one per name, in
    /// order. Returns the ids to patch with [`Self::apply_read`].
    pub fn begin_selection<I>(&mut self, names: I) -> Vec<Uuid>
    where
        I: IntoIterator<Item = String>,
    {
        self.selected = names
            .into_iter()
            .map(|name| SelectedImage::pending(name, 0))
            .collect();
        self.selected.iter().map(|image| image.id).collect()
    }

    /// Patch the record with `id` once its bytes have been read.
    ///
    /// Returns `false` when no such record exists, e.g. a late read for a
    /// selection that has since been replaced.
    pub fn apply_read(&mut self, id: Uuid, bytes: &[u8]) -> bool {
        let Some(image) = self.selected.iter_mut().find(|image| image.id == id) else {
            return false;
        };

        let mime_type = detect_image_mime(bytes);
        image.size = bytes.len() as u64;
        image.mime_type = mime_type.to_string();
        image.data = Some(data_url::encode(mime_type, bytes));
        true
    }

    /// Select files from disk, reading them concurrently.
    ///
    /// A file that cannot be read stays in the selection without data and
    /// fails when the run reaches it.
    pub async fn select_files(&mut self, paths: &[PathBuf]) {
        let ids = self.begin_selection(paths.iter().map(|path| file_name(path)));

        let mut reads = JoinSet::new();
        for (id, path) in ids.into_iter().zip(paths.iter().cloned()) {
            reads.spawn(async move {
                let bytes = tokio::fs::read(&path).await;
                (id, path, bytes)
            });
        }

        while let Some(joined) = reads.join_next().await {
            match joined {
                Ok((id, _, Ok(bytes))) => {
                    self.apply_read(id, &bytes);
                }
                Ok((_, path, Err(e))) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                }
                Err(e) => warn!("File read task failed: {}", e),
            }
        }

        info!("Selected {} file(s)", self.selected.len());
    }

    fn request_for(&self, image: &SelectedImage) -> Result<ConversionRequest> {
        let data = image
            .data
            .clone()
            .ok_or_else(|| Error::DataUrl(format!("{} has not been read yet", image.name)))?;

        let request = ConversionRequest::new(data, self.format);
        Ok(if self.send_original_names {
            request.with_original_name(image.name.clone())
        } else {
            request
        })
    }

    /// Convert every selected image, one request at a time.
    ///
    /// Progress is updated after each item settles, whether it succeeded or
    /// not. Failed items are logged and left out of the results.
    pub async fn convert_all(
        &mut self,
        service: &dyn ConvertService,
        observer: &dyn ProgressObserver,
    ) -> &[ConversionResult] {
        self.results.clear();
        self.progress = 0.0;
        self.state = RunState::Running;

        let total = self.selected.len();
        observer.on_run_start(total);
        info!("Converting {} image(s) to {}", total, self.format);

        let mut converted = Vec::new();
        let mut completed = 0;

        for image in &self.selected {
            let outcome = match self.request_for(image) {
                Ok(request) => service.convert(&request).await,
                Err(e) => Err(e),
            };

            completed += 1;
            self.progress = completed as f64 / total as f64 * 100.0;

            match outcome {
                Ok(result) => {
                    info!(
                        "Converted {} -> {} ({} bytes)",
                        image.name, result.name, result.size
                    );
                    observer.on_item_converted(completed, total, self.progress, &result);
                    converted.push(result);
                }
                Err(e) => {
                    error!("Error converting image {}: {}", image.name, e);
                    observer.on_item_failed(completed, total, self.progress, &image.name, &e);
                }
            }
        }

        self.results = converted;
        self.state = RunState::Done;
        observer.on_run_complete(&self.results);
        &self.results
    }

    /// Single link offering every result of the last run.
    ///
    /// Payloads are joined with `,` behind one `image/png` prefix, so only
    /// a single-result run yields a usable image.
    pub fn download_link(&self) -> Option<String> {
        if self.results.is_empty() {
            return None;
        }
        let joined = self
            .results
            .iter()
            .map(|result| result.data.as_str())
            .collect::<Vec<_>>()
            .join(",");
        Some(format!("data:image/png;base64,{}", joined))
    }

    pub fn download_name(&self) -> String {
        naming::download_name(self.format)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
