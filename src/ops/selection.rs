use std::collections::VecDeque;

use crate::canvas::{Color, Coordinate, RasterBuffer, Tolerance};

/// Euclidean distance between two colors over all four channels.
#[inline]
pub fn color_distance(a: Color, b: Color) -> f32 {
    distance_sq(a, b).sqrt()
}

#[inline]
fn distance_sq(a: Color, b: Color) -> f32 {
    let dr = a.r as f32 - b.r as f32;
    let dg = a.g as f32 - b.g as f32;
    let db = a.b as f32 - b.b as f32;
    let da = a.a as f32 - b.a as f32;
    dr * dr + dg * dg + db * db + da * da
}

/// Pixels picked by one flood fill. Lives only for the duration of a click.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    width: u32,
    height: u32,
    /// `width * height` flags indexed by `y * width + x`.
    mask: Vec<bool>,
    pixel_count: usize,
    /// (x, y, width, height) of the selected region.
    bounds: Option<(u32, u32, u32, u32)>,
}

impl Selection {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            mask: vec![false; width as usize * height as usize],
            pixel_count: 0,
            bounds: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count == 0
    }

    pub fn len(&self) -> usize {
        self.pixel_count
    }

    pub fn bounds(&self) -> Option<(u32, u32, u32, u32)> {
        self.bounds
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width
            && y < self.height
            && self.mask[y as usize * self.width as usize + x as usize]
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Whether every pixel in `self` is also in `other`.
    pub fn is_subset_of(&self, other: &Selection) -> bool {
        self.dimensions() == other.dimensions()
            && self.mask.iter().zip(&other.mask).all(|(&a, &b)| !a || b)
    }

    /// Selected coordinates in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let w = self.width.max(1) as usize;
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, m)| **m)
            .map(move |(i, _)| ((i % w) as u32, (i / w) as u32))
    }
}

/// Select every pixel 4-connected to `seed` whose color lies within
/// `tolerance` of the seed pixel's color.
///
/// A seed outside the buffer yields an empty selection.
pub fn flood_select(buffer: &RasterBuffer, seed: Coordinate, tolerance: Tolerance) -> Selection {
    let (w, h) = buffer.dimensions();
    let mut selection = Selection::empty(w, h);

    let Some(target) = buffer.get(seed) else {
        return selection;
    };
    let tol = tolerance.value();
    let tol_sq = tol * tol;

    let (sx, sy) = (seed.x as u32, seed.y as u32);
    let mut min_x = sx;
    let mut min_y = sy;
    let mut max_x = sx;
    let mut max_y = sy;

    let mut visited = vec![false; w as usize * h as usize];
    let mut queue = VecDeque::with_capacity(1024);
    let stride = w as usize;
    let start_idx = sy as usize * stride + sx as usize;
    visited[start_idx] = true;
    // The seed matches itself at distance zero.
    selection.mask[start_idx] = true;
    selection.pixel_count = 1;
    queue.push_back((sx, sy));

    while let Some((px, py)) = queue.pop_front() {
        let neighbors = [
            (px.wrapping_sub(1), py),
            (px + 1, py),
            (px, py.wrapping_sub(1)),
            (px, py + 1),
        ];
        for (nx, ny) in neighbors {
            if nx >= w || ny >= h {
                continue;
            }
            let idx = ny as usize * stride + nx as usize;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            if distance_sq(buffer.pixel(nx, ny), target) <= tol_sq {
                selection.mask[idx] = true;
                selection.pixel_count += 1;
                min_x = min_x.min(nx);
                min_y = min_y.min(ny);
                max_x = max_x.max(nx);
                max_y = max_y.max(ny);
                queue.push_back((nx, ny));
            }
        }
    }

    selection.bounds = Some((min_x, min_y, max_x - min_x + 1, max_y - min_y + 1));
    selection
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgba(255, 0, 0, 255);
    const BLUE: Color = Color::rgba(0, 0, 255, 255);

    fn split_image() -> RasterBuffer {
        // 4x4: left half red, right half blue
        let mut buf = RasterBuffer::filled(4, 4, RED);
        for y in 0..4 {
            for x in 2..4 {
                buf.put(x, y, BLUE);
            }
        }
        buf
    }

    #[test]
    fn test_distance() {
        assert_eq!(color_distance(RED, RED), 0.0);
        assert_eq!(color_distance(Color::rgba(0, 0, 0, 0), Color::rgba(3, 4, 0, 0)), 5.0);
        assert_eq!(color_distance(RED, BLUE), color_distance(BLUE, RED));
        let max = color_distance(Color::rgba(0, 0, 0, 0), Color::rgba(255, 255, 255, 255));
        assert_eq!(max, 510.0);
    }

    #[test]
    fn test_solid_fill_selects_everything() {
        let buf = RasterBuffer::filled(5, 5, RED);
        let sel = flood_select(&buf, Coordinate::new(2, 2), Tolerance::new(0.0));
        assert_eq!(sel.len(), 25);
        assert_eq!(sel.bounds(), Some((0, 0, 5, 5)));
    }

    #[test]
    fn test_two_regions() {
        let sel = flood_select(&split_image(), Coordinate::new(0, 0), Tolerance::new(0.0));
        assert_eq!(sel.len(), 8);
        assert!(sel.iter().all(|(x, _)| x < 2));
        assert_eq!(sel.bounds(), Some((0, 0, 2, 4)));
    }

    #[test]
    fn test_out_of_bounds_seed_is_empty() {
        let buf = split_image();
        for seed in [Coordinate::new(4, 0), Coordinate::new(0, 4), Coordinate::new(-1, 2)] {
            let sel = flood_select(&buf, seed, Tolerance::new(100.0));
            assert!(sel.is_empty());
            assert_eq!(sel.bounds(), None);
        }
    }

    #[test]
    fn test_diagonal_is_not_connected() {
        // Checkerboard: with 4-connectivity the seed is isolated
        let mut buf = RasterBuffer::filled(3, 3, BLUE);
        for (x, y) in [(0, 0), (2, 0), (1, 1), (0, 2), (2, 2)] {
            buf.put(x, y, RED);
        }
        let sel = flood_select(&buf, Coordinate::new(1, 1), Tolerance::new(0.0));
        assert_eq!(sel.len(), 1);
        assert!(sel.contains(1, 1));
    }

    #[test]
    fn test_tolerance_compares_against_seed_not_neighbor() {
        // Red gradient in steps of 10; tolerance 15 reaches one step either way
        let mut buf = RasterBuffer::new(5, 1);
        for x in 0..5 {
            buf.put(x, 0, Color::rgba(200 + x as u8 * 10, 0, 0, 255));
        }
        let sel = flood_select(&buf, Coordinate::new(2, 0), Tolerance::new(15.0));
        assert_eq!(sel.iter().collect::<Vec<_>>(), vec![(1, 0), (2, 0), (3, 0)]);
    }

    #[test]
    fn test_alpha_counts_toward_distance() {
        let mut buf = RasterBuffer::filled(2, 1, RED);
        buf.put(1, 0, Color::rgba(255, 0, 0, 0));
        let sel = flood_select(&buf, Coordinate::new(0, 0), Tolerance::new(254.0));
        assert_eq!(sel.len(), 1);
        let sel = flood_select(&buf, Coordinate::new(0, 0), Tolerance::new(255.0));
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn test_larger_tolerance_is_superset() {
        let mut buf = RasterBuffer::new(6, 6);
        for y in 0..6 {
            for x in 0..6 {
                buf.put(x, y, Color::rgba((x * 37 + y * 11) as u8, (y * 23) as u8, 90, 255));
            }
        }
        let seed = Coordinate::new(3, 2);
        let mut prev = flood_select(&buf, seed, Tolerance::new(0.0));
        for t in [5.0, 20.0, 45.0, 80.0, 160.0, 510.0] {
            let next = flood_select(&buf, seed, Tolerance::new(t));
            assert!(prev.is_subset_of(&next), "tolerance {t} lost pixels");
            prev = next;
        }
        assert_eq!(prev.len(), 36);
    }

    #[test]
    fn test_wide_buffer_indexing() {
        // Rows are wider than tall so a swapped stride would land in the wrong row
        let mut buf = RasterBuffer::filled(9, 2, RED);
        buf.put(8, 1, BLUE);
        let sel = flood_select(&buf, Coordinate::new(8, 1), Tolerance::new(0.0));
        assert_eq!(sel.len(), 1);
        assert!(sel.contains(8, 1));
        assert!(!sel.contains(1, 8));
        assert!(!sel.contains(9, 1));
        assert!(sel.mask()[17]);
        assert_eq!(sel.iter().collect::<Vec<_>>(), vec![(8, 1)]);
    }
}
