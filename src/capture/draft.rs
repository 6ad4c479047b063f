use std::sync::Arc;

/// Where the picker should take the image from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSource {
    Camera,
    Library,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSource::Camera => write!(f, "camera"),
            ImageSource::Library => write!(f, "library"),
        }
    }
}

/// Small RGBA rendition of an image for on-screen previews
#[derive(Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Thumbnail({}x{})", self.size[0], self.size[1])
    }
}

/// An image returned by the picker, already reduced for upload
#[derive(Clone, Debug, PartialEq)]
pub struct PickedImage {
    /// Where the image came from (file path or capture URI)
    pub preview_ref: String,
    /// Base64 (standard alphabet, no data-URI prefix)
    pub payload_base64: String,
    pub mime_type: String,
    pub thumbnail: Option<Arc<Thumbnail>>,
}

impl PickedImage {
    pub fn new(preview_ref: impl Into<String>, payload_base64: impl Into<String>) -> Self {
        Self {
            preview_ref: preview_ref.into(),
            payload_base64: payload_base64.into(),
            mime_type: "image/jpeg".to_string(),
            thumbnail: None,
        }
    }
}

/// Unsent image/question pair. Lives only in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaptureDraft {
    pub image_preview_ref: Option<String>,
    /// Shared so flow snapshots do not copy the encoded image
    pub image_payload: Option<Arc<str>>,
    pub image_mime: Option<String>,
    pub thumbnail: Option<Arc<Thumbnail>>,
    pub question_text: String,
}

impl CaptureDraft {
    pub fn set_image(&mut self, image: PickedImage) {
        self.image_preview_ref = Some(image.preview_ref);
        self.image_payload = if image.payload_base64.is_empty() {
            None
        } else {
            Some(Arc::from(image.payload_base64))
        };
        self.image_mime = Some(image.mime_type);
        self.thumbnail = image.thumbnail;
    }

    pub fn has_image(&self) -> bool {
        self.image_payload.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_question(&self) -> bool {
        !self.question_text.trim().is_empty()
    }

    /// Trimmed question, `None` when blank
    pub fn question(&self) -> Option<String> {
        let trimmed = self.question_text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Inline form stored with history records
    pub fn image_data_uri(&self) -> Option<String> {
        let payload = self.image_payload.as_deref().filter(|p| !p.is_empty())?;
        let mime = self.image_mime.as_deref().unwrap_or("image/jpeg");
        Some(format!("data:{};base64,{}", mime, payload))
    }

    pub fn is_empty(&self) -> bool {
        !self.has_image() && !self.has_question()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_is_not_an_image() {
        let mut draft = CaptureDraft::default();
        draft.set_image(PickedImage::new("file:///tmp/leaf.jpg", ""));
        assert!(!draft.has_image());
        assert!(draft.is_empty());
        assert!(draft.image_data_uri().is_none());
    }

    #[test]
    fn test_data_uri_uses_mime() {
        let mut draft = CaptureDraft::default();
        let mut image = PickedImage::new("file:///tmp/leaf.png", "iVBORw0KGgo=");
        image.mime_type = "image/png".into();
        draft.set_image(image);

        assert_eq!(
            draft.image_data_uri().as_deref(),
            Some("data:image/png;base64,iVBORw0KGgo=")
        );
    }

    #[test]
    fn test_clones_share_the_payload() {
        let mut draft = CaptureDraft::default();
        draft.set_image(PickedImage::new("file:///tmp/leaf.jpg", "aGVsbG8="));
        let copy = draft.clone();

        let (Some(a), Some(b)) = (&draft.image_payload, &copy.image_payload) else {
            panic!("payload missing");
        };
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn test_question_trimmed() {
        let draft = CaptureDraft {
            question_text: "  me ke damun masara?  ".into(),
            ..Default::default()
        };
        assert_eq!(draft.question().as_deref(), Some("me ke damun masara?"));

        let blank = CaptureDraft {
            question_text: " \n ".into(),
            ..Default::default()
        };
        assert!(blank.question().is_none());
    }
}
