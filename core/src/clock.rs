use crate::*;

/// Divides vertical-sync ticks down to whole seconds.
#[derive(Clone, Debug)]
pub struct Clock {
    ticks_per_second: u8,
    current_ticks: u8,
}

impl Clock {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            ticks_per_second: timing.ticks_per_second.max(1),
            current_ticks: 0,
        }
    }

    /// Counts one tick, returning `true` when it completes a second.
    pub fn tick(&mut self) -> bool {
        self.current_ticks += 1;
        if self.current_ticks >= self.ticks_per_second {
            self.current_ticks = 0;
            true
        } else {
            false
        }
    }

    pub fn restart(&mut self) {
        self.current_ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_a_second_every_ticks_per_second() {
        let mut clock = Clock::new(TimingConfig::PAL);
        let seconds = (0..150).filter(|_| clock.tick()).count();
        assert_eq!(seconds, 3);
    }

    #[test]
    fn restart_discards_partial_second() {
        let mut clock = Clock::new(TimingConfig::new_unchecked(4, 9));
        clock.tick();
        clock.tick();
        clock.tick();
        clock.restart();
        assert!(!clock.tick());
        assert!(!clock.tick());
        assert!(!clock.tick());
        assert!(clock.tick());
    }
}
