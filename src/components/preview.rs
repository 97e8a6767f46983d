use std::sync::Arc;

use crate::canvas::RasterBuffer;
use crate::components::history::HistoryManager;

/// Switches the displayed image between the untouched reference and the
/// current edit. Never touches the history or the reference buffer.
pub struct PreviewToggler {
    original: Arc<RasterBuffer>,
    showing_original: bool,
}

impl PreviewToggler {
    pub fn new(original: RasterBuffer) -> Self {
        Self {
            original: Arc::new(original),
            showing_original: false,
        }
    }

    /// Flip the view and return the buffer that should now be displayed.
    pub fn toggle(&mut self, history: &HistoryManager) -> Arc<RasterBuffer> {
        self.showing_original = !self.showing_original;
        self.displayed(history)
    }

    /// Force the edited view back on (after undo/redo/reset).
    pub fn show_edited(&mut self) {
        self.showing_original = false;
    }

    pub fn showing_original(&self) -> bool {
        self.showing_original
    }

    pub fn original(&self) -> Arc<RasterBuffer> {
        Arc::clone(&self.original)
    }

    /// Buffer for the renderer given the current view mode.
    pub fn displayed(&self, history: &HistoryManager) -> Arc<RasterBuffer> {
        if self.showing_original {
            self.original()
        } else {
            history.current()
        }
    }
}
