//! Zhang-Suen thinning: reduce a binary mask to single-pixel-wide lines.
//!
//! Dilating an edge mask thickens every line; re-thinning restores the
//! one-pixel skeleton while keeping the connectivity the dilation
//! created. The algorithm alternates two sub-passes that peel boundary
//! pixels until no pixel changes.

use image::GrayImage;

/// Thin a binary mask to single-pixel-wide lines.
///
/// Foreground is any nonzero pixel; output is strictly binary. The
/// result is stable: thinning an already-thinned mask changes nothing.
#[must_use = "returns the thinned mask"]
#[allow(clippy::cast_possible_truncation)]
pub fn thin(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let w = width as usize;
    let h = height as usize;

    let mut grid: Vec<bool> = mask.pixels().map(|p| p.0[0] != 0).collect();
    let mut deletions: Vec<usize> = Vec::new();

    loop {
        let mut changed = false;
        for pass in [Pass::First, Pass::Second] {
            deletions.clear();
            for y in 0..h {
                for x in 0..w {
                    if grid[y * w + x] && should_delete(&grid, w, h, x, y, pass) {
                        deletions.push(y * w + x);
                    }
                }
            }
            for &idx in &deletions {
                grid[idx] = false;
            }
            changed |= !deletions.is_empty();
        }
        if !changed {
            break;
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        image::Luma([if grid[y as usize * w + x as usize] {
            255
        } else {
            0
        }])
    })
}

/// Which peeling sub-pass is running. The two passes differ only in
/// which cardinal-neighbor products must contain a background pixel,
/// alternating so lines erode evenly from both sides.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Pass {
    First,
    Second,
}

/// Zhang-Suen deletion test for the pixel at `(x, y)`.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn should_delete(grid: &[bool], w: usize, h: usize, x: usize, y: usize, pass: Pass) -> bool {
    let at = |dx: isize, dy: isize| -> bool {
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
            return false;
        }
        grid[ny as usize * w + nx as usize]
    };

    // Neighbors clockwise from north: p2..p9.
    let p = [
        at(0, -1),
        at(1, -1),
        at(1, 0),
        at(1, 1),
        at(0, 1),
        at(-1, 1),
        at(-1, 0),
        at(-1, -1),
    ];

    let neighbor_count = p.iter().filter(|&&v| v).count();
    if !(2..=6).contains(&neighbor_count) {
        return false;
    }

    // Transitions from background to foreground around the ring.
    let transitions = (0..8).filter(|&i| !p[i] && p[(i + 1) % 8]).count();
    if transitions != 1 {
        return false;
    }

    let (north, east, south, west) = (p[0], p[2], p[4], p[6]);
    match pass {
        Pass::First => !(north && east && south) && !(east && south && west),
        Pass::Second => !(north && east && west) && !(north && south && west),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foreground_count(mask: &GrayImage) -> u32 {
        mask.pixels().map(|p| u32::from(p.0[0] != 0)).sum()
    }

    #[test]
    fn empty_mask_unchanged() {
        let mask = GrayImage::new(10, 10);
        assert_eq!(thin(&mask), mask);
    }

    #[test]
    fn isolated_pixel_survives() {
        let mut mask = GrayImage::new(9, 9);
        mask.put_pixel(4, 4, image::Luma([255]));
        let thinned = thin(&mask);
        assert_eq!(thinned.get_pixel(4, 4).0[0], 255);
        assert_eq!(foreground_count(&thinned), 1);
    }

    #[test]
    fn thick_bar_becomes_thin_line() {
        // 3-pixel-tall horizontal bar across the image.
        let mask = GrayImage::from_fn(30, 11, |_, y| {
            if (4..7).contains(&y) {
                image::Luma([255])
            } else {
                image::Luma([0])
            }
        });
        let thinned = thin(&mask);

        assert!(foreground_count(&thinned) < foreground_count(&mask));
        // Interior columns must carry exactly one pixel.
        for x in 2..28 {
            let column: u32 = (0..11)
                .map(|y| u32::from(thinned.get_pixel(x, y).0[0] != 0))
                .sum();
            assert_eq!(column, 1, "column {x} is not single-pixel wide");
        }
    }

    #[test]
    fn thinning_is_stable() {
        let mask = GrayImage::from_fn(20, 20, |x, y| {
            if (5..15).contains(&x) && (8..12).contains(&y) {
                image::Luma([255])
            } else {
                image::Luma([0])
            }
        });
        let once = thin(&mask);
        let twice = thin(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn output_is_binary_and_dimension_equal() {
        let mask = GrayImage::from_fn(17, 13, |x, y| {
            if (x + y) % 3 == 0 {
                image::Luma([200])
            } else {
                image::Luma([0])
            }
        });
        let thinned = thin(&mask);
        assert_eq!(thinned.dimensions(), (17, 13));
        for pixel in thinned.pixels() {
            assert!(pixel.0[0] == 0 || pixel.0[0] == 255);
        }
    }
}
