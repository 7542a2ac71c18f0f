//! Ping-pong index for an output's pair of buffers.
//!
//! `current()` is the buffer the last draw wrote; `feedback()` is the other
//! one. Only [`PingPong::flip`] mutates the index, and only draw passes call
//! it.

/// Which of two buffers holds the most recent frame.
/// `current() + feedback() == 1` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PingPong {
    index: usize,
}

impl PingPong {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the buffer the last draw wrote to.
    pub fn current(&self) -> usize {
        self.index
    }

    /// Index of the buffer not currently selected.
    pub fn feedback(&self) -> usize {
        1 - self.index
    }

    /// Selects the other buffer and returns its index.
    pub fn flip(&mut self) -> usize {
        self.index = 1 - self.index;
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let pp = PingPong::new();
        assert_eq!(pp.current(), 0);
        assert_eq!(pp.feedback(), 1);
    }

    #[test]
    fn flip_returns_new_current() {
        let mut pp = PingPong::new();
        assert_eq!(pp.flip(), 1);
        assert_eq!(pp.current(), 1);
        assert_eq!(pp.feedback(), 0, "after flip, feedback should be 0");
    }

    #[test]
    fn indices_stay_complementary_over_100_flips() {
        let mut pp = PingPong::new();
        for i in 0..100 {
            assert_eq!(pp.current() + pp.feedback(), 1, "invariant broken at flip {i}");
            pp.flip();
        }
    }

    #[test]
    fn even_flip_count_restores_initial_odd_does_not() {
        let mut pp = PingPong::new();
        for _ in 0..50 {
            pp.flip();
        }
        assert_eq!(pp.current(), 0, "50 flips (even) should restore index 0");
        pp.flip();
        assert_eq!(pp.current(), 1, "51 flips (odd) should select index 1");
    }
}
