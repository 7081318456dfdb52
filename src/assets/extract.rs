//! Sprite extraction from sheet-style art
//!
//! Finds the dominant opaque blob in an RGBA buffer (4-connected flood fill
//! over pixels above an alpha threshold) and returns a padded crop around it.

/// Pixels at or below this alpha count as background
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 22;
/// Transparent border kept around the crop
pub const DEFAULT_PADDING: u32 = 10;

/// Crop rectangle in source pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Side of the square canvas the crop is centered in
    pub fn square_side(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Offset of the crop inside its square canvas
    pub fn square_offset(&self) -> (u32, u32) {
        let side = self.square_side();
        ((side - self.width) / 2, (side - self.height) / 2)
    }
}

#[derive(Debug, Clone, Copy)]
struct Component {
    area: u32,
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
    center_dist_sq: f64,
}

impl Component {
    /// Larger wins; near-equal sizes prefer the blob closer to the image center
    fn beats(&self, best: &Component) -> bool {
        let area = self.area as f64;
        let best_area = best.area as f64;
        area > best_area * 1.08
            || (area > best_area * 0.92 && self.center_dist_sq < best.center_dist_sq)
    }
}

/// Locate the primary sprite in `rgba` (row-major, 4 bytes per pixel)
///
/// Returns `None` if the buffer does not match the dimensions or holds no
/// opaque pixels.
pub fn primary_component(
    rgba: &[u8],
    width: usize,
    height: usize,
    alpha_threshold: u8,
    padding: u32,
) -> Option<CropRect> {
    if width == 0 || height == 0 || rgba.len() != width * height * 4 {
        return None;
    }

    let opaque = |idx: usize| rgba[idx * 4 + 3] > alpha_threshold;
    let mut visited = vec![false; width * height];
    let mut stack: Vec<usize> = Vec::new();
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let mut best: Option<Component> = None;

    for start in 0..width * height {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        if !opaque(start) {
            continue;
        }

        let mut comp = Component {
            area: 0,
            min_x: start % width,
            min_y: start / width,
            max_x: start % width,
            max_y: start / width,
            center_dist_sq: 0.0,
        };
        let (mut sum_x, mut sum_y) = (0.0f64, 0.0f64);

        stack.clear();
        stack.push(start);
        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % width, idx / width);
            comp.area += 1;
            sum_x += x as f64;
            sum_y += y as f64;
            comp.min_x = comp.min_x.min(x);
            comp.max_x = comp.max_x.max(x);
            comp.min_y = comp.min_y.min(y);
            comp.max_y = comp.max_y.max(y);

            let mut visit = |n: usize| {
                if !visited[n] {
                    visited[n] = true;
                    if opaque(n) {
                        stack.push(n);
                    }
                }
            };
            if x > 0 {
                visit(idx - 1);
            }
            if x + 1 < width {
                visit(idx + 1);
            }
            if y > 0 {
                visit(idx - width);
            }
            if y + 1 < height {
                visit(idx + width);
            }
        }

        let (mx, my) = (sum_x / comp.area as f64, sum_y / comp.area as f64);
        comp.center_dist_sq = (mx - cx).powi(2) + (my - cy).powi(2);

        best = match best {
            Some(current) if !comp.beats(&current) => Some(current),
            _ => Some(comp),
        };
    }

    let best = best?;
    let pad = padding as usize;
    let x = best.min_x.saturating_sub(pad);
    let y = best.min_y.saturating_sub(pad);
    let crop_w = (best.max_x - best.min_x + 1 + pad * 2).min(width - x);
    let crop_h = (best.max_y - best.min_y + 1 + pad * 2).min(height - y);

    Some(CropRect {
        x: x as u32,
        y: y as u32,
        width: crop_w as u32,
        height: crop_h as u32,
    })
}
