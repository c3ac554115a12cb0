use crate::*;

const ROW_BYTES: usize = (COLUMNS_MAX as usize).div_ceil(8);

/// One board row packed eight columns per byte.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RowBits([u8; ROW_BYTES]);

impl RowBits {
    pub const fn test(&self, col: Coord) -> bool {
        let byte = self.0[(col >> 3) as usize];
        byte & (1 << (col & 0x7)) != 0
    }

    /// Writes `value` at `col` and hands it back.
    pub fn set(&mut self, col: Coord, value: bool) -> bool {
        let pattern = 1u8 << (col & 0x7);
        let byte = &mut self.0[(col >> 3) as usize];
        if value {
            *byte |= pattern;
        } else {
            *byte &= !pattern;
        }
        value
    }

    pub const fn count_ones(&self) -> u32 {
        let mut total = 0;
        let mut i = 0;
        while i < ROW_BYTES {
            total += self.0[i].count_ones();
            i += 1;
        }
        total
    }
}

/// Fixed-size bit matrix covering the largest supported board.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BitMatrix([RowBits; ROWS_MAX as usize]);

impl BitMatrix {
    pub const fn new() -> Self {
        Self([RowBits([0; ROW_BYTES]); ROWS_MAX as usize])
    }

    pub const fn test(&self, (row, col): Coord2) -> bool {
        self.0[row as usize].test(col)
    }

    pub fn set(&mut self, (row, col): Coord2, value: bool) -> bool {
        self.0[row as usize].set(col, value)
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn row(&self, row: Coord) -> &RowBits {
        &self.0[row as usize]
    }

    /// Number of set bits across the whole matrix.
    pub fn count_ones(&self) -> CellCount {
        self.0.iter().map(|row| row.count_ones() as CellCount).sum()
    }
}

/// Counts how many of the up-to-8 neighbors of `coords` inside `size` have their bit set.
pub fn count_around(bits: &BitMatrix, coords: Coord2, size: Coord2) -> u8 {
    NeighborIter::new(coords, size)
        .map(|pos| bits.test(pos) as u8)
        .sum()
}
