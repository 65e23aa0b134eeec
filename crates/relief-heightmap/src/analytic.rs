//! Closed-form height layouts. Pure, total and free of randomness.

use glam::IVec2;

use crate::grid::{Grid, HeightField};

/// Diamond-shaped pyramid centered on the grid: `|x - w/2| + |y - h/2|`.
pub fn radial(width: u32, height: u32) -> HeightField {
    let center = IVec2::new((width / 2) as i32, (height / 2) as i32);
    Grid::from_fn(width, height, |cell| {
        let d = (cell - center).abs();
        d.x + d.y
    })
}

/// Manhattan distance from the origin corner: `|x| + |y|`.
pub fn manhattan(width: u32, height: u32) -> HeightField {
    Grid::from_fn(width, height, |cell| cell.x.abs() + cell.y.abs())
}

/// Column-wise boustrophedon index: even columns count up along `y`, odd
/// columns count down, so consecutive values stay adjacent.
pub fn snake(width: u32, height: u32) -> HeightField {
    let h = height as i32;
    Grid::from_fn(width, height, |cell| {
        if cell.x % 2 == 0 {
            cell.x * h + cell.y
        } else {
            (cell.x + 1) * h - cell.y - 1
        }
    })
}

/// Concentric rectangular rings numbered `0..width*height` in clockwise
/// traversal order, starting along the `x = 0` edge.
pub fn spiral(width: u32, height: u32) -> HeightField {
    let mut field = Grid::filled(width, height, 0);
    let mut next = 0;

    let (mut min_x, mut max_x) = (0_i32, width as i32 - 1);
    let (mut min_y, mut max_y) = (0_i32, height as i32 - 1);

    while min_x <= max_x && min_y <= max_y {
        for y in min_y..=max_y {
            stamp(&mut field, &mut next, min_x, y);
        }
        min_x += 1;

        for x in min_x..=max_x {
            stamp(&mut field, &mut next, x, max_y);
        }
        max_y -= 1;

        if min_x <= max_x {
            for y in (min_y..=max_y).rev() {
                stamp(&mut field, &mut next, max_x, y);
            }
            max_x -= 1;
        }

        if min_y <= max_y {
            for x in (min_x..=max_x).rev() {
                stamp(&mut field, &mut next, x, min_y);
            }
            min_y += 1;
        }
    }

    field
}

#[inline]
fn stamp(field: &mut HeightField, next: &mut i32, x: i32, y: i32) {
    field[IVec2::new(x, y)] = *next;
    *next += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(field: &HeightField, x: i32, y: i32) -> i32 {
        field[IVec2::new(x, y)]
    }

    #[test]
    fn test_radial_center_and_corner() {
        let field = radial(4, 4);
        assert_eq!(at(&field, 0, 0), 4);
        assert_eq!(at(&field, 2, 2), 0);
        assert_eq!(at(&field, 3, 3), 2);
        assert_eq!(at(&field, 3, 0), 3);
    }

    #[test]
    fn test_radial_odd_dimensions() {
        let field = radial(5, 3);
        assert_eq!(at(&field, 2, 1), 0);
        assert_eq!(at(&field, 0, 0), 3);
        assert_eq!(at(&field, 4, 2), 3);
    }

    #[test]
    fn test_manhattan_matches_formula() {
        let field = manhattan(6, 4);
        for (cell, &h) in field.iter() {
            assert_eq!(h, cell.x + cell.y, "mismatch at {cell}");
        }
    }

    #[test]
    fn test_snake_alternates_direction() {
        let field = snake(3, 4);
        let column = |x: i32| (0..4).map(|y| at(&field, x, y)).collect::<Vec<_>>();
        assert_eq!(column(0), vec![0, 1, 2, 3]);
        assert_eq!(column(1), vec![7, 6, 5, 4]);
        assert_eq!(column(2), vec![8, 9, 10, 11]);
    }

    #[test]
    fn test_spiral_3x3_traversal_order() {
        let field = spiral(3, 3);
        let expected = [
            ((0, 0), 0),
            ((0, 1), 1),
            ((0, 2), 2),
            ((1, 2), 3),
            ((2, 2), 4),
            ((2, 1), 5),
            ((2, 0), 6),
            ((1, 0), 7),
            ((1, 1), 8),
        ];
        for ((x, y), value) in expected {
            assert_eq!(at(&field, x, y), value, "spiral mismatch at ({x}, {y})");
        }
    }

    #[test]
    fn test_spiral_is_a_permutation() {
        for (w, h) in [(1, 1), (1, 5), (5, 1), (4, 7), (8, 3), (6, 6)] {
            let field = spiral(w, h);
            let mut values = field.values().to_vec();
            values.sort_unstable();
            let expected: Vec<i32> = (0..(w * h) as i32).collect();
            assert_eq!(values, expected, "spiral {w}x{h} is not a permutation");
        }
    }

    #[test]
    fn test_spiral_consecutive_values_are_adjacent() {
        let field = spiral(5, 4);
        let mut by_value = vec![IVec2::ZERO; field.len()];
        for (cell, &h) in field.iter() {
            by_value[h as usize] = cell;
        }
        for pair in by_value.windows(2) {
            let step = (pair[1] - pair[0]).abs();
            assert_eq!(step.x + step.y, 1, "{} -> {} is not a unit step", pair[0], pair[1]);
        }
    }
}
