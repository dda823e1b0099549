//! Image attachments: one cover and an ordered gallery.
//!
//! Each attachment is either a local preview awaiting its upload or a durable
//! remote URL. Uploads are optimistic (the preview shows immediately and is
//! rolled back on failure); deletes are not (the entry stays until the remote
//! delete succeeds).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Largest accepted upload, in bytes (5 MiB)
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Raster formats the storage collaborator accepts
pub const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Errors raised by the attachment manager
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// Content type outside [`ALLOWED_CONTENT_TYPES`]
    #[error("Invalid file type. Please upload a JPEG, PNG, or WebP image.")]
    UnsupportedType {
        /// Rejected content type
        content_type: String,
    },

    /// Larger than [`MAX_IMAGE_BYTES`]
    #[error("File is too large. Maximum size is 5MB.")]
    TooLarge {
        /// Size of the rejected file
        size: usize,
    },

    /// No gallery image at the given position
    #[error("Gallery image index {index} is out of range (have {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Gallery length
        len: usize,
    },

    /// The image has no remote reference yet
    #[error("The image is still uploading")]
    UploadInProgress,

    /// Cover delete without a cover
    #[error("There is no cover image to delete")]
    NoCover,
}

/// A file picked by the user
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Original file name
    pub file_name: String,
    /// MIME type reported by the picker
    pub content_type: String,
    /// Raw contents
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageFile {
    /// Bundle a picked file
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Check type and size before any network call
    ///
    /// # Errors
    ///
    /// [`ImageError::UnsupportedType`] is reported before [`ImageError::TooLarge`].
    pub fn validate(&self) -> Result<(), ImageError> {
        if !ALLOWED_CONTENT_TYPES.contains(&self.content_type.as_str()) {
            return Err(ImageError::UnsupportedType {
                content_type: self.content_type.clone(),
            });
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge {
                size: self.bytes.len(),
            });
        }
        Ok(())
    }
}

/// Client-side identity of an attachment, stable across upload completion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttachmentKey(Uuid);

impl AttachmentKey {
    /// Fresh random key
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttachmentKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttachmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to an in-memory preview of a picked file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalPreview(String);

impl LocalPreview {
    fn for_file(key: AttachmentKey, file: &ImageFile) -> Self {
        Self(format!("preview://{key}/{}", file.file_name))
    }

    /// Preview reference for rendering
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Durable public URL of an uploaded image
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Wrap a public URL
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Borrow the URL
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an attachment is in its lifecycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadState {
    /// Preview shown, upload not yet confirmed
    Pending(LocalPreview),
    /// Stored remotely
    Uploaded(ImageUrl),
}

/// A cover or gallery image
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageAttachment {
    /// Client-side identity
    pub key: AttachmentKey,
    /// Lifecycle state
    pub state: UploadState,
}

impl ImageAttachment {
    fn pending(file: &ImageFile) -> Self {
        let key = AttachmentKey::new();
        Self {
            key,
            state: UploadState::Pending(LocalPreview::for_file(key, file)),
        }
    }

    fn uploaded(url: ImageUrl) -> Self {
        Self {
            key: AttachmentKey::new(),
            state: UploadState::Uploaded(url),
        }
    }

    /// Remote URL, once uploaded
    #[must_use]
    pub const fn remote_url(&self) -> Option<&ImageUrl> {
        match &self.state {
            UploadState::Uploaded(url) => Some(url),
            UploadState::Pending(_) => None,
        }
    }

    /// Whether the upload is still in flight
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, UploadState::Pending(_))
    }
}

/// Cover plus gallery
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageAttachments {
    cover: Option<ImageAttachment>,
    // Previous cover, kept until its replacement is confirmed
    replaced_cover: Option<ImageAttachment>,
    gallery: Vec<ImageAttachment>,
}

impl ImageAttachments {
    /// Attachments of an event loaded for editing
    #[must_use]
    pub fn from_remote(cover: Option<ImageUrl>, gallery: Vec<ImageUrl>) -> Self {
        Self {
            cover: cover.map(ImageAttachment::uploaded),
            replaced_cover: None,
            gallery: gallery.into_iter().map(ImageAttachment::uploaded).collect(),
        }
    }

    /// Current cover, pending or uploaded
    #[must_use]
    pub const fn cover(&self) -> Option<&ImageAttachment> {
        self.cover.as_ref()
    }

    /// Gallery in display order
    #[must_use]
    pub fn gallery(&self) -> &[ImageAttachment] {
        &self.gallery
    }

    /// Durable cover URL: the confirmed cover, or the one being replaced
    #[must_use]
    pub fn cover_url(&self) -> Option<&ImageUrl> {
        self.cover
            .as_ref()
            .and_then(ImageAttachment::remote_url)
            .or_else(|| self.replaced_cover.as_ref().and_then(ImageAttachment::remote_url))
    }

    /// Uploaded gallery URLs in display order
    #[must_use]
    pub fn gallery_urls(&self) -> Vec<ImageUrl> {
        self.gallery
            .iter()
            .filter_map(ImageAttachment::remote_url)
            .cloned()
            .collect()
    }

    /// Whether a cover upload is in flight
    #[must_use]
    pub fn is_cover_uploading(&self) -> bool {
        self.cover.as_ref().is_some_and(ImageAttachment::is_pending)
    }

    /// Number of gallery uploads in flight
    #[must_use]
    pub fn gallery_uploads_in_flight(&self) -> usize {
        self.gallery.iter().filter(|a| a.is_pending()).count()
    }

    // ------------------------------------------------------------------
    // Cover
    // ------------------------------------------------------------------

    /// Show `file` as the cover preview ahead of its upload
    ///
    /// # Errors
    ///
    /// File validation errors, or [`ImageError::UploadInProgress`] while
    /// another cover upload is running.
    pub fn begin_cover_upload(&mut self, file: &ImageFile) -> Result<AttachmentKey, ImageError> {
        if self.is_cover_uploading() {
            return Err(ImageError::UploadInProgress);
        }
        file.validate()?;

        let attachment = ImageAttachment::pending(file);
        let key = attachment.key;
        self.replaced_cover = self.cover.replace(attachment);
        Ok(key)
    }

    /// Promote the pending cover; returns the replaced cover's URL to delete
    ///
    /// Completions for a key that is no longer the cover are ignored.
    pub fn complete_cover_upload(&mut self, key: AttachmentKey, url: ImageUrl) -> Option<ImageUrl> {
        match self.cover.as_mut() {
            Some(cover) if cover.key == key => {
                cover.state = UploadState::Uploaded(url);
                self.replaced_cover
                    .take()
                    .and_then(|old| old.remote_url().cloned())
            },
            _ => None,
        }
    }

    /// Roll the cover back to what it was before the upload started
    pub fn fail_cover_upload(&mut self, key: AttachmentKey) {
        if self.cover.as_ref().is_some_and(|c| c.key == key) {
            self.cover = self.replaced_cover.take();
        }
    }

    /// URL the remote delete should target
    ///
    /// # Errors
    ///
    /// [`ImageError::NoCover`] or [`ImageError::UploadInProgress`]; neither
    /// may reach the storage collaborator.
    pub fn cover_delete_target(&self) -> Result<ImageUrl, ImageError> {
        let cover = self.cover.as_ref().ok_or(ImageError::NoCover)?;
        cover.remote_url().cloned().ok_or(ImageError::UploadInProgress)
    }

    /// Drop the cover after its remote delete; `false` if it changed meanwhile
    ///
    /// A replaced cover with the same URL is forgotten too, so a later
    /// rollback cannot restore a deleted image.
    pub fn remove_cover(&mut self, url: &ImageUrl) -> bool {
        if self.replaced_cover.as_ref().and_then(ImageAttachment::remote_url) == Some(url) {
            self.replaced_cover = None;
        }
        if self.cover.as_ref().and_then(ImageAttachment::remote_url) == Some(url) {
            self.cover = None;
            true
        } else {
            false
        }
    }

    // ------------------------------------------------------------------
    // Gallery
    // ------------------------------------------------------------------

    /// Append `file` to the gallery as a preview ahead of its upload
    ///
    /// # Errors
    ///
    /// File validation errors; the gallery is left unchanged.
    pub fn begin_gallery_upload(&mut self, file: &ImageFile) -> Result<AttachmentKey, ImageError> {
        file.validate()?;
        let attachment = ImageAttachment::pending(file);
        let key = attachment.key;
        self.gallery.push(attachment);
        Ok(key)
    }

    /// Promote one gallery preview; `false` if the key is unknown
    pub fn complete_gallery_upload(&mut self, key: AttachmentKey, url: ImageUrl) -> bool {
        match self.gallery.iter_mut().find(|a| a.key == key) {
            Some(attachment) => {
                attachment.state = UploadState::Uploaded(url);
                true
            },
            None => false,
        }
    }

    /// Remove exactly the failed preview
    pub fn fail_gallery_upload(&mut self, key: AttachmentKey) -> bool {
        self.remove_gallery(key)
    }

    /// Key and URL the remote delete for `index` should target
    ///
    /// # Errors
    ///
    /// [`ImageError::IndexOutOfRange`] or [`ImageError::UploadInProgress`].
    pub fn gallery_delete_target(&self, index: usize) -> Result<(AttachmentKey, ImageUrl), ImageError> {
        let attachment = self.gallery.get(index).ok_or(ImageError::IndexOutOfRange {
            index,
            len: self.gallery.len(),
        })?;
        let url = attachment
            .remote_url()
            .cloned()
            .ok_or(ImageError::UploadInProgress)?;
        Ok((attachment.key, url))
    }

    /// Drop a gallery entry by key
    pub fn remove_gallery(&mut self, key: AttachmentKey) -> bool {
        let before = self.gallery.len();
        self.gallery.retain(|a| a.key != key);
        self.gallery.len() != before
    }
}
