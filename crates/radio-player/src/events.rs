//! The seam between the egui app and the platform backend.
//!
//! Backend callbacks fire outside the frame loop, so they write into shared
//! `Rc<RefCell<...>>` cells that the app drains at the start of each frame.
//! Everything is single-threaded; the cells only bridge callback timing.

use std::cell::RefCell;
use std::rc::Rc;

use radio_player_core::MediaEvent;
use thiserror::Error;

/// Frequency bins written by the analyser poll, read by the visualizer.
pub type SharedSpectrum = Rc<RefCell<Vec<u8>>>;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("platform error: {0}")]
    Platform(String),
}

/// One-shot completion notifications from asynchronous platform work.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Media-element state change or play rejection.
    Media(MediaEvent),
    /// A local file passed the size gate and was read into a data URL.
    WallpaperPicked { data_url: String },
    /// A local file was rejected before any decode attempt.
    WallpaperRejected(String),
    /// A candidate wallpaper URL decoded successfully.
    UrlValidated(String),
    /// A candidate wallpaper URL failed to load.
    UrlRejected(String),
    /// Brightness classification finished for the given generation.
    Classified { generation: u64, is_light: bool },
}

/// FIFO of pending events, cloneable into platform closures.
#[derive(Clone, Default)]
pub struct EventQueue {
    inner: Rc<RefCell<Vec<UiEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: UiEvent) {
        self.inner.borrow_mut().push(event);
    }

    /// Take all pending events, oldest first.
    pub fn drain(&self) -> Vec<UiEvent> {
        self.inner.borrow_mut().drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order_and_empties_the_queue() {
        let q = EventQueue::new();
        q.push(UiEvent::UrlValidated("a".to_string()));
        q.push(UiEvent::UrlRejected("b".to_string()));
        let drained = q.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], UiEvent::UrlValidated("a".to_string()));
        assert!(q.drain().is_empty());
    }

    #[test]
    fn clones_share_the_same_queue() {
        let q = EventQueue::new();
        let handle = q.clone();
        handle.push(UiEvent::Classified { generation: 1, is_light: true });
        assert_eq!(q.drain().len(), 1);
    }
}
