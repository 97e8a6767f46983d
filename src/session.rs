use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::canvas::{Coordinate, RasterBuffer, Tolerance};
use crate::components::history::HistoryManager;
use crate::components::preview::PreviewToggler;
use crate::io::{self, ExportError, PngCompression};
use crate::ops::color_removal::erase_selection;
use crate::ops::selection::flood_select;
use crate::surface::{RenderSurface, SurfaceError};

// ============================================================================
// ERRORS & OUTCOMES
// ============================================================================

#[derive(Debug)]
pub enum SessionError {
    /// Another edit is still running; try again once it finishes.
    Busy,
    /// Original and processed images differ in size.
    DimensionMismatch {
        original: (u32, u32),
        processed: (u32, u32),
    },
    SurfaceUnavailable(SurfaceError),
    Export(ExportError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Busy => write!(f, "an edit is already in progress"),
            SessionError::DimensionMismatch { original, processed } => write!(
                f,
                "original is {}×{} but processed image is {}×{}",
                original.0, original.1, processed.0, processed.1
            ),
            SessionError::SurfaceUnavailable(e) => write!(f, "render surface unavailable: {}", e),
            SessionError::Export(e) => write!(f, "export failed: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::SurfaceUnavailable(e) => Some(e),
            SessionError::Export(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SurfaceError> for SessionError {
    fn from(e: SurfaceError) -> Self {
        SessionError::SurfaceUnavailable(e)
    }
}

impl From<ExportError> for SessionError {
    fn from(e: ExportError) -> Self {
        SessionError::Export(e)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Ready,
    Busy,
}

/// What a click did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A new history entry was committed; `erased` pixels lost their alpha.
    Committed { erased: usize },
    /// Nothing to erase (seed out of bounds or region already transparent).
    Unchanged,
    /// Another edit was running; the click was ignored.
    Dropped,
}

// ============================================================================
// EDIT SESSION
// ============================================================================

struct EditState {
    history: HistoryManager,
    preview: PreviewToggler,
    /// Background-removed image the session started from; target of `reset`.
    processed: Arc<RasterBuffer>,
    tolerance: Tolerance,
    zoom: f32,
}

/// Releases the busy flag on every exit path.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One Magic Brush editing session over a single product image.
///
/// All methods take `&self` so the session can sit behind an `Arc` in a
/// multi-threaded host. Only one edit runs at a time: a click arriving while
/// another edit is in flight is dropped, and undo/redo/reset are refused.
pub struct EditSession {
    id: Uuid,
    busy: AtomicBool,
    state: Mutex<EditState>,
}

impl EditSession {
    /// Start a session. `original` is the untouched source photo shown by the
    /// preview toggle; `processed` is the background-removed image being edited.
    pub fn new(original: RasterBuffer, processed: RasterBuffer) -> Result<Self, SessionError> {
        if original.dimensions() != processed.dimensions() {
            return Err(SessionError::DimensionMismatch {
                original: original.dimensions(),
                processed: processed.dimensions(),
            });
        }

        let id = Uuid::new_v4();
        let (w, h) = processed.dimensions();
        let processed = Arc::new(processed);
        let history = HistoryManager::from_shared(Arc::clone(&processed));

        crate::log_info!("session {}: started on {}×{} image", id, w, h);

        Ok(Self {
            id,
            busy: AtomicBool::new(false),
            state: Mutex::new(EditState {
                history,
                preview: PreviewToggler::new(original),
                processed,
                tolerance: Tolerance::DEFAULT,
                zoom: 100.0,
            }),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        if self.busy.load(Ordering::Acquire) {
            SessionState::Busy
        } else {
            SessionState::Ready
        }
    }

    fn try_begin(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.busy))
    }

    fn lock(&self) -> MutexGuard<'_, EditState> {
        // Every mutation completes under the lock, so a poisoned state is still consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- editing ------------------------------------------------------------

    /// Erase the region connected to `seed` using the current tolerance.
    ///
    /// On surface failure nothing is committed and the error is returned.
    pub fn click(
        &self,
        seed: Coordinate,
        surface: &mut dyn RenderSurface,
    ) -> Result<ClickOutcome, SessionError> {
        let Some(_guard) = self.try_begin() else {
            crate::log_info!("session {}: click at {} dropped, edit in progress", self.id, seed);
            return Ok(ClickOutcome::Dropped);
        };

        // The busy flag keeps other writers out, so the lock is not held while working
        let (current, tolerance) = {
            let st = self.lock();
            (st.history.current(), st.tolerance)
        };

        if !current.contains(seed) {
            crate::log_warn!("session {}: click at {} outside image", self.id, seed);
            return Ok(ClickOutcome::Unchanged);
        }

        let (w, h) = current.dimensions();
        if let Err(e) = surface.acquire(w, h) {
            crate::log_err!("session {}: surface acquire failed: {}", self.id, e);
            return Err(e.into());
        }

        let selection = flood_select(&current, seed, tolerance);
        let erasure = erase_selection(&current, &selection);
        if erasure.cleared == 0 {
            crate::log_info!(
                "session {}: click at {} selected {} already transparent pixels",
                self.id,
                seed,
                selection.len()
            );
            return Ok(ClickOutcome::Unchanged);
        }

        if let Err(e) = surface.present(&erasure.buffer) {
            crate::log_err!("session {}: surface present failed: {}", self.id, e);
            return Err(e.into());
        }

        let mut st = self.lock();
        st.history.commit(erasure.buffer, format!("Magic Brush {}", seed));
        st.preview.show_edited();
        crate::log_info!(
            "session {}: erased {} pixels at {} (tolerance {:.1}), history {}/{}",
            self.id,
            erasure.cleared,
            seed,
            tolerance.value(),
            st.history.len(),
            st.history.capacity()
        );
        Ok(ClickOutcome::Committed { erased: erasure.cleared })
    }

    /// Step back one edit. `Ok(None)` when there is nothing to undo.
    pub fn undo(&self) -> Result<Option<Arc<RasterBuffer>>, SessionError> {
        let _guard = self.try_begin().ok_or(SessionError::Busy)?;
        let mut st = self.lock();
        let buffer = st.history.undo();
        st.preview.show_edited();
        if buffer.is_some() {
            crate::log_info!("session {}: undo -> step {}", self.id, st.history.cursor());
        }
        Ok(buffer)
    }

    /// Reapply one undone edit. `Ok(None)` when there is nothing to redo.
    pub fn redo(&self) -> Result<Option<Arc<RasterBuffer>>, SessionError> {
        let _guard = self.try_begin().ok_or(SessionError::Busy)?;
        let mut st = self.lock();
        let buffer = st.history.redo();
        st.preview.show_edited();
        if buffer.is_some() {
            crate::log_info!("session {}: redo -> step {}", self.id, st.history.cursor());
        }
        Ok(buffer)
    }

    /// Throw away all edits and return to the processed image.
    pub fn reset(&self) -> Result<Arc<RasterBuffer>, SessionError> {
        let _guard = self.try_begin().ok_or(SessionError::Busy)?;
        let mut st = self.lock();
        let processed = Arc::clone(&st.processed);
        st.history.reset(Arc::clone(&processed));
        st.preview.show_edited();
        crate::log_info!("session {}: reset to processed image", self.id);
        Ok(processed)
    }

    // ---- view ---------------------------------------------------------------

    /// Flip between the original photo and the current edit. Allowed at any
    /// time; never touches history.
    pub fn toggle_preview(&self) -> Arc<RasterBuffer> {
        let mut st = self.lock();
        let EditState { history, preview, .. } = &mut *st;
        preview.toggle(history)
    }

    pub fn showing_original(&self) -> bool {
        self.lock().preview.showing_original()
    }

    /// What the renderer should show right now.
    pub fn displayed(&self) -> Arc<RasterBuffer> {
        let st = self.lock();
        st.preview.displayed(&st.history)
    }

    /// The current edited buffer, regardless of preview mode.
    pub fn current(&self) -> Arc<RasterBuffer> {
        self.lock().history.current()
    }

    pub fn original(&self) -> Arc<RasterBuffer> {
        self.lock().preview.original()
    }

    // ---- parameters ---------------------------------------------------------

    /// Takes effect from the next click.
    pub fn set_tolerance(&self, tolerance: Tolerance) {
        self.lock().tolerance = tolerance;
    }

    pub fn tolerance(&self) -> Tolerance {
        self.lock().tolerance
    }

    /// Display zoom in percent. Non-positive or non-finite values are ignored.
    pub fn set_zoom(&self, zoom: f32) {
        if zoom.is_finite() && zoom > 0.0 {
            self.lock().zoom = zoom;
        }
    }

    pub fn zoom(&self) -> f32 {
        self.lock().zoom
    }

    // ---- history info -------------------------------------------------------

    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.lock().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.lock().history.can_redo()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.lock().history.undo_description().map(str::to_string)
    }

    pub fn redo_description(&self) -> Option<String> {
        self.lock().history.redo_description().map(str::to_string)
    }

    pub fn memory_usage(&self) -> usize {
        self.lock().history.memory_usage()
    }

    // ---- output -------------------------------------------------------------

    /// Encode the current edit (never the preview) as PNG.
    pub fn export_png(&self, compression: PngCompression) -> Result<Vec<u8>, SessionError> {
        let current = self.current();
        Ok(io::encode_png_bytes(&current, compression)?)
    }

    /// Encode the current edit as PNG and write it to `path`.
    pub fn save_png(&self, path: &Path, compression: PngCompression) -> Result<(), SessionError> {
        let current = self.current();
        io::write_png(&current, path, compression)?;
        crate::log_info!("session {}: saved {}", self.id, path.display());
        Ok(())
    }
}
