//! Grid-cell helpers
//!
//! All positions in the engine are integer cells on a
//! `[0, width) x [0, height)` grid, with y growing downward.

use glam::IVec2;

/// Cardinal steps plus "stay put", for undirected wandering
pub const STEPS_AND_STAY: [IVec2; 5] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
    IVec2::new(0, 0),
];

/// Whether a cell lies inside the field
#[inline]
pub fn in_bounds(cell: IVec2, width: i32, height: i32) -> bool {
    cell.x >= 0 && cell.x < width && cell.y >= 0 && cell.y < height
}

/// Wrap a cell to the opposite edge (toroidal borders)
#[inline]
pub fn wrap(cell: IVec2, width: i32, height: i32) -> IVec2 {
    IVec2::new(cell.x.rem_euclid(width), cell.y.rem_euclid(height))
}

/// Manhattan distance between two cells
#[inline]
pub fn manhattan(a: IVec2, b: IVec2) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_bounds() {
        assert!(in_bounds(IVec2::new(0, 0), 10, 10));
        assert!(in_bounds(IVec2::new(9, 9), 10, 10));
        assert!(!in_bounds(IVec2::new(10, 5), 10, 10));
        assert!(!in_bounds(IVec2::new(5, -1), 10, 10));
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(IVec2::new(-1, 5), 10, 10), IVec2::new(9, 5));
        assert_eq!(wrap(IVec2::new(10, 5), 10, 10), IVec2::new(0, 5));
        assert_eq!(wrap(IVec2::new(3, -2), 10, 10), IVec2::new(3, 8));
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(manhattan(IVec2::new(0, 0), IVec2::new(3, 4)), 7);
        assert_eq!(manhattan(IVec2::new(5, 5), IVec2::new(5, 5)), 0);
        assert_eq!(manhattan(IVec2::new(2, 1), IVec2::new(-1, 1)), 3);
    }
}
