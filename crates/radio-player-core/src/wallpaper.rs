//! Wallpaper selection bookkeeping.
//!
//! The visual application and pixel decoding live in the platform backend;
//! this module tracks which source is current, gates uploads by size, and
//! stamps every classification request with a generation token so a slow,
//! stale decode can never overwrite the theme of a newer selection.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WallpaperError {
    #[error("image is {size} bytes, above the {max} byte upload limit")]
    TooLarge { size: u64, max: u64 },
    #[error("invalid image URL or unable to load image: {0}")]
    Load(String),
}

/// A displayable wallpaper reference: a remote URL or an embedded data URL
/// produced from a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WallpaperSource {
    Url(String),
    Data(String),
}

impl WallpaperSource {
    /// Tag persisted alongside the reference so reload knows how to
    /// interpret it.
    pub fn kind(&self) -> &'static str {
        match self {
            WallpaperSource::Url(_) => "url",
            WallpaperSource::Data(_) => "data",
        }
    }

    /// The raw reference string, usable both as an image `src` and as a CSS
    /// `url(...)` payload.
    pub fn reference(&self) -> &str {
        match self {
            WallpaperSource::Url(s) | WallpaperSource::Data(s) => s,
        }
    }

    /// Rebuild a source from its persisted parts.
    pub fn from_parts(kind: &str, reference: String) -> Option<Self> {
        match kind {
            "url" => Some(WallpaperSource::Url(reference)),
            "data" => Some(WallpaperSource::Data(reference)),
            _ => None,
        }
    }
}

/// Reject an upload before any read or decode is attempted.
pub fn check_upload_size(size: u64, max: u64) -> Result<(), WallpaperError> {
    if size > max {
        Err(WallpaperError::TooLarge { size, max })
    } else {
        Ok(())
    }
}

/// Currently applied wallpaper and its derived theme.
#[derive(Debug, Clone, Default)]
pub struct WallpaperState {
    current: Option<WallpaperSource>,
    /// The binary theme flag. Never persisted; recomputed from pixels on
    /// every apply so theme and background can not drift apart.
    pub theme_is_light: bool,
    generation: u64,
}

impl WallpaperState {
    /// Record a new selection and hand out the token its classification
    /// must present. Replaces any previous selection wholesale.
    pub fn begin_apply(&mut self, source: WallpaperSource) -> u64 {
        self.current = Some(source);
        self.generation += 1;
        self.generation
    }

    /// Revert to the default wallpaper. Returns the token for classifying
    /// the default image.
    pub fn begin_reset(&mut self) -> u64 {
        self.current = None;
        self.generation += 1;
        self.generation
    }

    /// Accept a classification result only if it belongs to the selection
    /// that is still current. Returns whether the theme flag was updated.
    pub fn finish_classification(&mut self, generation: u64, is_light: bool) -> bool {
        if generation != self.generation {
            log::debug!("dropping stale brightness result (gen {generation} != {})", self.generation);
            return false;
        }
        self.theme_is_light = is_light;
        true
    }

    pub fn current(&self) -> Option<&WallpaperSource> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u64 = 5 * 1024 * 1024;

    #[test]
    fn upload_exactly_at_limit_is_accepted() {
        assert_eq!(check_upload_size(MAX, MAX), Ok(()));
    }

    #[test]
    fn oversized_upload_is_rejected() {
        let err = check_upload_size(MAX + 1, MAX).unwrap_err();
        assert_eq!(err, WallpaperError::TooLarge { size: MAX + 1, max: MAX });
    }

    #[test]
    fn kind_round_trips_through_persistence() {
        let url = WallpaperSource::Url("https://example.org/bg.jpg".to_string());
        let data = WallpaperSource::Data("data:image/png;base64,AAAA".to_string());
        for src in [url, data] {
            let rebuilt =
                WallpaperSource::from_parts(src.kind(), src.reference().to_string()).unwrap();
            assert_eq!(rebuilt, src);
        }
        assert!(WallpaperSource::from_parts("blob", String::new()).is_none());
    }

    #[test]
    fn matching_generation_applies_theme() {
        let mut w = WallpaperState::default();
        let token = w.begin_apply(WallpaperSource::Url("a".to_string()));
        assert!(w.finish_classification(token, true));
        assert!(w.theme_is_light);
    }

    #[test]
    fn stale_decode_cannot_overwrite_newer_selection() {
        let mut w = WallpaperState::default();
        let old = w.begin_apply(WallpaperSource::Url("slow.jpg".to_string()));
        let new = w.begin_apply(WallpaperSource::Url("fast.jpg".to_string()));
        assert!(w.finish_classification(new, false));
        // The slow decode finishes afterwards and must be ignored.
        assert!(!w.finish_classification(old, true));
        assert!(!w.theme_is_light);
        assert_eq!(w.current().unwrap().reference(), "fast.jpg");
    }

    #[test]
    fn reset_replaces_selection_and_invalidates_pending_tokens() {
        let mut w = WallpaperState::default();
        let token = w.begin_apply(WallpaperSource::Data("data:...".to_string()));
        let reset_token = w.begin_reset();
        assert!(w.current().is_none());
        assert!(!w.finish_classification(token, true));
        assert!(w.finish_classification(reset_token, false));
    }
}
