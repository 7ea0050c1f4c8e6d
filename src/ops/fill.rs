use std::collections::VecDeque;

use image::Rgba;

use crate::canvas::PixelSurface;

/// Breadth-first flood fill over the 4-connected component containing the
/// seed. Exact color match only — no tolerance, hard edges.
///
/// Returns true when any pixel changed. A seed that is out of bounds or
/// already has `replacement` is a no-op, which also makes the fill
/// idempotent. Callers snapshot the surface first when the operation must
/// be undoable.
pub fn flood_fill(surface: &mut PixelSurface, seed_x: i32, seed_y: i32, replacement: Rgba<u8>) -> bool {
    let target = match surface.get_pixel(seed_x, seed_y) {
        Some(c) => c,
        None => return false,
    };
    if target == replacement {
        return false;
    }

    let mut queue: VecDeque<(i32, i32)> = VecDeque::new();
    queue.push_back((seed_x, seed_y));

    while let Some((x, y)) = queue.pop_front() {
        // Re-check on dequeue: filling recolors pixels, so this also skips
        // anything already processed.
        if surface.get_pixel(x, y) != Some(target) {
            continue;
        }
        surface.put_pixel(x, y, replacement);
        queue.push_back((x + 1, y));
        queue.push_back((x - 1, y));
        queue.push_back((x, y + 1));
        queue.push_back((x, y - 1));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::BACKGROUND;

    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    #[test]
    fn fills_the_whole_canvas_when_uniform() {
        let mut surface = PixelSurface::new(32, 32);
        assert!(flood_fill(&mut surface, 16, 16, BLUE));
        for y in 0..32 {
            for x in 0..32 {
                assert_eq!(surface.get_pixel(x, y), Some(BLUE));
            }
        }
    }

    #[test]
    fn refill_with_same_color_is_a_noop() {
        let mut surface = PixelSurface::new(16, 16);
        assert!(flood_fill(&mut surface, 8, 8, BLUE));
        let filled = surface.snapshot();
        assert!(!flood_fill(&mut surface, 0, 0, BLUE));
        assert_eq!(surface.snapshot(), filled);
    }

    #[test]
    fn out_of_bounds_seed_is_a_noop() {
        let mut surface = PixelSurface::new(8, 8);
        let before = surface.snapshot();
        assert!(!flood_fill(&mut surface, -1, 4, BLUE));
        assert!(!flood_fill(&mut surface, 4, 8, BLUE));
        assert_eq!(surface.snapshot(), before);
    }

    #[test]
    fn fill_stops_at_a_closed_boundary() {
        let mut surface = PixelSurface::new(20, 20);
        // Black box from (5,5) to (14,14); fill seeded inside.
        for i in 5..=14 {
            surface.put_pixel(i, 5, BLACK);
            surface.put_pixel(i, 14, BLACK);
            surface.put_pixel(5, i, BLACK);
            surface.put_pixel(14, i, BLACK);
        }
        assert!(flood_fill(&mut surface, 10, 10, BLUE));

        assert_eq!(surface.get_pixel(10, 10), Some(BLUE));
        assert_eq!(surface.get_pixel(6, 6), Some(BLUE));
        // The wall keeps its color and the outside stays background.
        assert_eq!(surface.get_pixel(5, 10), Some(BLACK));
        assert_eq!(surface.get_pixel(2, 2), Some(BACKGROUND));
        assert_eq!(surface.get_pixel(15, 10), Some(BACKGROUND));
    }

    #[test]
    fn diagonal_neighbors_are_not_connected() {
        let mut surface = PixelSurface::new(4, 4);
        // Checkerboard corner: (0,0) and (1,1) share only a corner once the
        // 4-neighbors of (0,0) are blocked.
        surface.put_pixel(1, 0, BLACK);
        surface.put_pixel(0, 1, BLACK);
        assert!(flood_fill(&mut surface, 0, 0, BLUE));
        assert_eq!(surface.get_pixel(0, 0), Some(BLUE));
        assert_eq!(surface.get_pixel(1, 1), Some(BACKGROUND));
    }
}
