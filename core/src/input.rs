use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::*;

bitflags! {
    /// One raw input sample, or a set of filtered direction pulses.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Buttons: u8 {
        const UP             = 1;
        const DOWN           = 1 << 1;
        const LEFT           = 1 << 2;
        const RIGHT          = 1 << 3;
        const FIRE           = 1 << 4;
        const FIRE_SECONDARY = 1 << 5;

        const DIRECTIONS = Self::UP.bits() | Self::DOWN.bits() | Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

const DIRECTION_ORDER: [Buttons; 4] = [Buttons::UP, Buttons::DOWN, Buttons::LEFT, Buttons::RIGHT];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireEvent {
    NoEvent,
    Press,
    LongPress,
    Release,
}

/// Turns the per-tick fire button level into discrete events.
#[derive(Clone, Debug)]
pub struct FireButtonFilter {
    pressed: bool,
    secondary_pressed: bool,
    down_count: u8,
    long_press_ticks: u8,
}

impl FireButtonFilter {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            pressed: false,
            secondary_pressed: false,
            down_count: 0,
            long_press_ticks: timing.long_press_ticks(),
        }
    }

    pub fn filter(&mut self, input: Buttons) -> FireEvent {
        let fire = input.contains(Buttons::FIRE);

        if self.pressed {
            if fire {
                self.down_count += 1;
                if self.down_count >= self.long_press_ticks {
                    self.down_count = 0;
                    return FireEvent::LongPress;
                }
                return FireEvent::NoEvent;
            }
            self.pressed = false;
            self.down_count = 0;
            return FireEvent::Release;
        }

        self.pressed = fire;
        if fire {
            return FireEvent::Press;
        }

        // the secondary button can only produce a long press, on release
        let secondary = input.contains(Buttons::FIRE_SECONDARY);
        if self.secondary_pressed {
            if !secondary {
                self.secondary_pressed = false;
                return FireEvent::LongPress;
            }
        } else {
            self.secondary_pressed = secondary;
        }

        FireEvent::NoEvent
    }
}

/// Turns held directions into move pulses: one on press, one more once the hold reaches the
/// repeat delay, then nothing until the direction is released.
#[derive(Clone, Debug)]
pub struct DirectionFilter {
    last: Buttons,
    held_ticks: [u8; 4],
    repeat_delay: u8,
}

impl DirectionFilter {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            last: Buttons::empty(),
            held_ticks: [0; 4],
            repeat_delay: timing.repeat_delay,
        }
    }

    /// Returns the directions that should move the cursor this tick.
    pub fn filter(&mut self, input: Buttons) -> Buttons {
        let mut pulses = Buttons::empty();

        for (held, direction) in self.held_ticks.iter_mut().zip(DIRECTION_ORDER) {
            let down = input.contains(direction);
            *held = if down { held.saturating_add(1) } else { 0 };

            let rising = down && !self.last.contains(direction);
            if rising || *held == self.repeat_delay {
                pulses |= direction;
            }
        }

        self.last = input & Buttons::DIRECTIONS;
        pulses
    }
}
