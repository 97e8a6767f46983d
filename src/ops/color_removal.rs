use rayon::prelude::*;

use crate::canvas::RasterBuffer;
use crate::ops::selection::Selection;

/// Result of erasing a selection.
#[derive(Clone, Debug)]
pub struct Erasure {
    /// Copy of the input with every selected pixel's alpha set to 0.
    pub buffer: RasterBuffer,
    /// Selected pixels that were not already fully transparent.
    pub cleared: usize,
}

/// Produce a new buffer with the selected pixels made fully transparent.
///
/// Only alpha is touched; RGB is kept so undoing or re-selecting an erased
/// area behaves predictably. The input buffer is never modified.
pub fn erase_selection(buffer: &RasterBuffer, selection: &Selection) -> Erasure {
    let mut next = buffer.clone();
    if selection.is_empty() || selection.dimensions() != buffer.dimensions() {
        return Erasure { buffer: next, cleared: 0 };
    }

    let row_bytes = buffer.width() as usize * 4;
    let mask = selection.mask();
    let w = buffer.width() as usize;

    let cleared = next
        .as_raw_mut()
        .par_chunks_mut(row_bytes)
        .enumerate()
        .map(|(y, row)| {
            let mask_row = &mask[y * w..(y + 1) * w];
            let mut n = 0usize;
            for (px, &selected) in row.chunks_exact_mut(4).zip(mask_row) {
                if selected && px[3] != 0 {
                    px[3] = 0;
                    n += 1;
                }
            }
            n
        })
        .sum::<usize>();

    Erasure { buffer: next, cleared }
}
