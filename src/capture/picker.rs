//! Image picker capability

use super::draft::{ImageSource, PickedImage};
use crate::config::PickerConfig;
use crate::utils::imaging::prepare_picked_image;
use crate::{FarmerError, Result};
use async_trait::async_trait;
use tracing::{debug, info};

/// Obtains one image from the device; `Ok(None)` means the user cancelled
#[async_trait]
pub trait ImagePicker: Send + Sync {
    async fn pick(&self, source: ImageSource) -> Result<Option<PickedImage>>;
}

/// Native file dialog picker for desktop builds
#[derive(Debug, Clone, Default)]
pub struct FileDialogPicker {
    config: PickerConfig,
}

impl FileDialogPicker {
    pub fn new(config: PickerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ImagePicker for FileDialogPicker {
    async fn pick(&self, source: ImageSource) -> Result<Option<PickedImage>> {
        if source == ImageSource::Camera {
            return Err(FarmerError::PermissionDenied(
                "no camera is available on this device".into(),
            ));
        }

        let handle = rfd::AsyncFileDialog::new()
            .set_title("Zaɓi hoto")
            .add_filter("Hotuna", &["jpg", "jpeg", "png"])
            .pick_file()
            .await;

        let Some(handle) = handle else {
            debug!("File dialog dismissed");
            return Ok(None);
        };

        let preview_ref = handle.file_name();
        let bytes = handle.read().await;
        info!("Picked {} ({} bytes)", preview_ref, bytes.len());

        let config = self.config.clone();
        let picked = tokio::task::spawn_blocking(move || {
            prepare_picked_image(&bytes, &preview_ref, &config)
        })
        .await
        .map_err(|e| FarmerError::PickerError(format!("Image preparation panicked: {}", e)))??;

        Ok(Some(picked))
    }
}
