use std::collections::BTreeMap;

use crate::ids::{GroupKey, RecordId};

/// Broad media category; render backends pick a decoder from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MediaKind {
    #[default]
    Image,
    Video,
    Animated,
}

/// Where the primary media lives and what it is.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaRef {
    pub kind: MediaKind,
    pub url: String,
    pub mime: Option<String>,
}

impl MediaRef {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Image,
            url: url.into(),
            mime: None,
        }
    }

    pub fn video(url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Video,
            url: url.into(),
            mime: None,
        }
    }
}

/// Pixel dimensions of a render target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dims {
    pub width: f32,
    pub height: f32,
}

impl Dims {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// One media record as delivered by the page source.
///
/// The carousel treats the payload as opaque; only `id` and `group` carry
/// meaning for pagination and focus.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    pub id: RecordId,
    pub group: GroupKey,
    pub media: MediaRef,
    /// Intrinsic media width in pixels, when the source knows it.
    pub width: Option<u32>,
    /// Intrinsic media height in pixels, when the source knows it.
    pub height: Option<u32>,
    /// Per-field URLs (thumbnail, preview, download, ...).
    pub field_urls: BTreeMap<String, String>,
}

impl Record {
    pub fn new(id: RecordId, group: GroupKey, media: MediaRef) -> Self {
        Self {
            id,
            group,
            media,
            width: None,
            height: None,
            field_urls: BTreeMap::new(),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_field_url(
        mut self,
        field: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        self.field_urls.insert(field.into(), url.into());
        self
    }

    /// Width / height, or 1.0 when either side is missing or zero.
    pub fn aspect_ratio(&self) -> f32 {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => w as f32 / h as f32,
            _ => 1.0,
        }
    }

    pub fn field_url(&self, field: &str) -> Option<&str> {
        self.field_urls.get(field).map(String::as_str)
    }
}
