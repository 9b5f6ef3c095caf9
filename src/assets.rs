use std::path::{Path, PathBuf};

use crate::constants::IMAGES_PATH;
use crate::model::PanelId;

/// Image reference for a panel, shared by markers and the detail view.
pub fn image_for_panel(id: &PanelId) -> String {
    format!("{}/{}.png", IMAGES_PATH, id)
}

/// Where a panel's image lives on disk below the data directory
pub fn image_path_on_disk(data_dir: &Path, id: &PanelId) -> PathBuf {
    data_dir.join(image_for_panel(id))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Present { width: u32, height: u32 },
    Missing,
}

impl ImageStatus {
    pub fn is_missing(&self) -> bool {
        matches!(self, ImageStatus::Missing)
    }
}

/// Check that a panel image exists and decodes far enough to read its size.
pub fn probe_image(data_dir: &Path, id: &PanelId) -> ImageStatus {
    let path = image_path_on_disk(data_dir, id);
    match image::image_dimensions(&path) {
        Ok((width, height)) => ImageStatus::Present { width, height },
        Err(e) => {
            tracing::debug!("Image for panel {} unavailable at {}: {}", id, path.display(), e);
            ImageStatus::Missing
        }
    }
}
