use crate::*;

/// Bounded double-ended buffer of coordinates waiting for the flood fill.
///
/// A ring over a fixed array: `begin` is the physical slot of the front, `len` the number of live
/// entries. Only the operations the fill needs exist: push on either end, pop from the back.
#[derive(Clone, Debug)]
pub struct ExposeQueue {
    data: [Coord2; MAX_CELLS],
    begin: u16,
    len: u16,
}

impl ExposeQueue {
    pub const CAPACITY: usize = MAX_CELLS;

    pub const fn new() -> Self {
        Self {
            data: [(0, 0); MAX_CELLS],
            begin: 0,
            len: 0,
        }
    }

    pub const fn len(&self) -> usize {
        self.len as usize
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn is_full(&self) -> bool {
        self.len() == Self::CAPACITY
    }

    pub fn clear(&mut self) {
        self.begin = 0;
        self.len = 0;
    }

    /// Appends at the back. Returns `false` and drops `coords` when full.
    pub fn push_back(&mut self, coords: Coord2) -> bool {
        if self.is_full() {
            return false;
        }
        let end = self.physical(self.len());
        self.data[end] = coords;
        self.len += 1;
        true
    }

    /// Prepends at the front. Returns `false` and drops `coords` when full.
    pub fn push_front(&mut self, coords: Coord2) -> bool {
        if self.is_full() {
            return false;
        }
        self.begin = if self.begin == 0 {
            (Self::CAPACITY - 1) as u16
        } else {
            self.begin - 1
        };
        self.data[self.begin as usize] = coords;
        self.len += 1;
        true
    }

    pub fn pop_back(&mut self) -> Option<Coord2> {
        if self.is_empty() {
            return None;
        }
        self.len -= 1;
        Some(self.data[self.physical(self.len())])
    }

    /// Entries from front to back.
    pub fn iter(&self) -> impl Iterator<Item = Coord2> + '_ {
        (0..self.len()).map(|logical| self.data[self.physical(logical)])
    }

    fn physical(&self, logical: usize) -> usize {
        (self.begin as usize + logical) % Self::CAPACITY
    }
}

impl Default for ExposeQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[test]
    fn pop_back_returns_last_pushed_back() {
        let mut queue = ExposeQueue::new();
        queue.push_back((0, 1));
        queue.push_back((0, 2));

        assert_eq!(queue.pop_back(), Some((0, 2)));
        assert_eq!(queue.pop_back(), Some((0, 1)));
        assert_eq!(queue.pop_back(), None);
    }

    #[test]
    fn push_front_entries_come_out_after_older_ones() {
        let mut queue = ExposeQueue::new();
        queue.push_back((1, 1));
        queue.push_front((2, 2));
        queue.push_front((3, 3));

        assert_eq!(queue.iter().collect::<Vec<_>>(), [(3, 3), (2, 2), (1, 1)]);
        assert_eq!(queue.pop_back(), Some((1, 1)));
        assert_eq!(queue.pop_back(), Some((2, 2)));
        assert_eq!(queue.pop_back(), Some((3, 3)));
        assert!(queue.is_empty());
    }

    #[test]
    fn wraps_around_physical_start() {
        let mut queue = ExposeQueue::new();
        for i in 0..5 {
            queue.push_front((0, i));
        }
        assert_eq!(queue.len(), 5);
        assert_eq!(queue.pop_back(), Some((0, 0)));
        queue.push_back((9, 9));
        assert_eq!(queue.pop_back(), Some((9, 9)));
        assert_eq!(queue.pop_back(), Some((0, 1)));
    }

    #[test]
    fn full_queue_rejects_pushes() {
        let mut queue = ExposeQueue::new();
        for i in 0..ExposeQueue::CAPACITY {
            assert!(queue.push_back(((i / 30) as Coord, (i % 30) as Coord)));
        }
        assert!(queue.is_full());
        assert!(!queue.push_back((0, 0)));
        assert!(!queue.push_front((0, 0)));
        assert_eq!(queue.len(), ExposeQueue::CAPACITY);
    }

    #[test]
    fn clear_resets_indices() {
        let mut queue = ExposeQueue::new();
        queue.push_front((1, 1));
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.pop_back(), None);
    }
}
