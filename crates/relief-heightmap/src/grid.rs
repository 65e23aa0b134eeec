//! Coordinate primitives and the dense 2-D grid shared by every generator.

use std::ops::{Index, IndexMut};

use glam::{DVec2, IVec2};

/// Integer cell coordinate `(x, y)`.
pub type IntCoord = IVec2;

/// Continuous position used by simulated agents.
pub type RealCoord = DVec2;

/// The four edge-adjacent offsets: up, down, left, right.
pub const NEIGHBORS_4: [IVec2; 4] = [
    IVec2::new(0, -1),
    IVec2::new(0, 1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
];

/// Round a continuous position to the cell it lies in.
#[inline]
pub fn to_cell(position: RealCoord) -> IntCoord {
    position.round().as_ivec2()
}

/// Dense `width × height` grid stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

/// Elevation per cell, fully assigned once a generator returns it.
pub type HeightField = Grid<i32>;

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `value`.
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width as usize * height as usize],
        }
    }
}

impl<T> Grid<T> {
    /// Build a grid by evaluating `f` at every cell.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(IntCoord) -> T) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                cells.push(f(IVec2::new(x, y)));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Grid width (extent along `x`).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height (extent along `y`).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` for a zero-sized grid.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns `true` if `cell` lies inside the grid.
    #[inline]
    pub fn contains(&self, cell: IntCoord) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    #[inline]
    fn offset(&self, cell: IntCoord) -> Option<usize> {
        self.contains(cell)
            .then(|| cell.y as usize * self.width as usize + cell.x as usize)
    }

    /// The value at `cell`, or `None` when out of bounds.
    pub fn get(&self, cell: IntCoord) -> Option<&T> {
        self.offset(cell).map(|i| &self.cells[i])
    }

    /// Mutable access to the value at `cell`, or `None` when out of bounds.
    pub fn get_mut(&mut self, cell: IntCoord) -> Option<&mut T> {
        self.offset(cell).map(|i| &mut self.cells[i])
    }

    /// Iterate `(cell, value)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (IntCoord, &T)> {
        let width = self.width.max(1) as usize;
        self.cells.iter().enumerate().map(move |(i, value)| {
            (IVec2::new((i % width) as i32, (i / width) as i32), value)
        })
    }

    /// Row-major cell values.
    pub fn values(&self) -> &[T] {
        &self.cells
    }

    /// Transform every cell, keeping the dimensions.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.cells.into_iter().map(f).collect(),
        }
    }
}

impl<T> Index<IntCoord> for Grid<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `cell` is out of bounds.
    fn index(&self, cell: IntCoord) -> &T {
        match self.get(cell) {
            Some(value) => value,
            None => panic!(
                "cell {cell} outside {}x{} grid",
                self.width, self.height
            ),
        }
    }
}

impl<T> IndexMut<IntCoord> for Grid<T> {
    fn index_mut(&mut self, cell: IntCoord) -> &mut T {
        let (width, height) = (self.width, self.height);
        match self.get_mut(cell) {
            Some(value) => value,
            None => panic!("cell {cell} outside {width}x{height} grid"),
        }
    }
}
