//! Key-state tracking and auto-repeat
//!
//! Discrete actions fire once on the key-down edge. Horizontal moves and soft
//! drop then auto-repeat: a first repeat after a short delay, then one every
//! interval, until key-up. Repeat timing runs on logical time fed in by the
//! tick driver, so it pauses with everything else.
//!
//! Paddle keys are plain held flags, sampled every paddle tick.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

const KEY_COUNT: usize = 8;

/// Logical keys understood by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
    PaddleLeft,
    PaddleRight,
    Pause,
}

impl Key {
    pub const ALL: [Key; KEY_COUNT] = [
        Key::MoveLeft,
        Key::MoveRight,
        Key::SoftDrop,
        Key::Rotate,
        Key::HardDrop,
        Key::PaddleLeft,
        Key::PaddleRight,
        Key::Pause,
    ];

    /// Map a DOM-style key name to a logical key
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" => Some(Key::MoveLeft),
            "ArrowRight" => Some(Key::MoveRight),
            "ArrowDown" => Some(Key::SoftDrop),
            "ArrowUp" => Some(Key::Rotate),
            " " | "Space" => Some(Key::HardDrop),
            "a" | "A" => Some(Key::PaddleLeft),
            "s" | "S" => Some(Key::PaddleRight),
            "p" | "P" => Some(Key::Pause),
            _ => None,
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// Piece action fired on the key-down edge
    pub fn action(self) -> Option<Action> {
        match self {
            Key::MoveLeft => Some(Action::MoveLeft),
            Key::MoveRight => Some(Action::MoveRight),
            Key::SoftDrop => Some(Action::SoftDrop),
            Key::Rotate => Some(Action::Rotate),
            Key::HardDrop => Some(Action::HardDrop),
            Key::PaddleLeft | Key::PaddleRight | Key::Pause => None,
        }
    }
}

/// Discrete piece action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
}

/// Auto-repeat state of one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPhase {
    #[default]
    Idle,
    /// Down, waiting out the initial delay
    Pressed { held_ms: u32 },
    /// Repeating; `since_ms` counts from the last repeat
    Repeating { since_ms: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RepeatTrack {
    key: Key,
    action: Action,
    phase: KeyPhase,
    delay_ms: u32,
    interval_ms: u32,
}

impl RepeatTrack {
    fn new(key: Key, action: Action, delay_ms: u32, interval_ms: u32) -> Self {
        Self {
            key,
            action,
            phase: KeyPhase::Idle,
            delay_ms: delay_ms.max(1),
            interval_ms: interval_ms.max(1),
        }
    }

    fn due_in(&self) -> Option<u32> {
        match self.phase {
            KeyPhase::Idle => None,
            KeyPhase::Pressed { held_ms } => Some(self.delay_ms.saturating_sub(held_ms).max(1)),
            KeyPhase::Repeating { since_ms } => {
                Some(self.interval_ms.saturating_sub(since_ms).max(1))
            }
        }
    }

    fn advance(&mut self, step_ms: u32, out: &mut Vec<Action>) {
        let mut since = match self.phase {
            KeyPhase::Idle => return,
            KeyPhase::Pressed { held_ms } => {
                let held = held_ms.saturating_add(step_ms);
                if held < self.delay_ms {
                    self.phase = KeyPhase::Pressed { held_ms: held };
                    return;
                }
                out.push(self.action);
                held - self.delay_ms
            }
            KeyPhase::Repeating { since_ms } => since_ms.saturating_add(step_ms),
        };
        while since >= self.interval_ms {
            out.push(self.action);
            since -= self.interval_ms;
        }
        self.phase = KeyPhase::Repeating { since_ms: since };
    }
}

/// Routes raw key events into piece actions and paddle direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRouter {
    held: [bool; KEY_COUNT],
    repeats: [RepeatTrack; 3],
}

impl InputRouter {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            held: [false; KEY_COUNT],
            repeats: [
                RepeatTrack::new(
                    Key::MoveLeft,
                    Action::MoveLeft,
                    tuning.repeat_delay_ms,
                    tuning.repeat_interval_ms,
                ),
                RepeatTrack::new(
                    Key::MoveRight,
                    Action::MoveRight,
                    tuning.repeat_delay_ms,
                    tuning.repeat_interval_ms,
                ),
                RepeatTrack::new(
                    Key::SoftDrop,
                    Action::SoftDrop,
                    tuning.soft_drop_delay_ms,
                    tuning.soft_drop_interval_ms,
                ),
            ],
        }
    }

    #[inline]
    pub fn is_held(&self, key: Key) -> bool {
        self.held[key.index()]
    }

    /// Mark a key held; false if it already was
    pub fn press(&mut self, key: Key) -> bool {
        let held = &mut self.held[key.index()];
        if *held {
            return false;
        }
        *held = true;
        true
    }

    /// Record a key press; returns the edge action, if any
    ///
    /// Presses of an already-held key (OS auto-repeat) are ignored.
    pub fn key_down(&mut self, key: Key) -> Option<Action> {
        if !self.press(key) {
            return None;
        }
        if let Some(track) = self.repeats.iter_mut().find(|t| t.key == key) {
            track.phase = KeyPhase::Pressed { held_ms: 0 };
        }
        key.action()
    }

    pub fn key_up(&mut self, key: Key) {
        self.held[key.index()] = false;
        if let Some(track) = self.repeats.iter_mut().find(|t| t.key == key) {
            track.phase = KeyPhase::Idle;
        }
    }

    /// -1 (left), 0 or 1 (right) from the held paddle keys
    pub fn paddle_direction(&self) -> i32 {
        self.is_held(Key::PaddleRight) as i32 - self.is_held(Key::PaddleLeft) as i32
    }

    /// Advance repeat timing and collect the actions that came due
    pub fn update(&mut self, step_ms: u32) -> Vec<Action> {
        let mut actions = Vec::new();
        for track in &mut self.repeats {
            track.advance(step_ms, &mut actions);
        }
        actions
    }

    /// Milliseconds until the next repeat fires, if any key is repeating
    pub fn next_due_ms(&self) -> Option<u32> {
        self.repeats.iter().filter_map(RepeatTrack::due_in).min()
    }

    pub fn repeat_phase(&self, key: Key) -> KeyPhase {
        self.repeats
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.phase)
            .unwrap_or_default()
    }

    /// Drop every pending repeat; the keys re-arm on their next press
    pub fn cancel_repeats(&mut self) {
        for track in &mut self.repeats {
            track.phase = KeyPhase::Idle;
            self.held[track.key.index()] = false;
        }
        for key in [Key::Rotate, Key::HardDrop] {
            self.held[key.index()] = false;
        }
    }
}
