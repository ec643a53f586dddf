//! Simulation clock
//!
//! The clock owns no timer. It only gates whether a tick may happen; the
//! caller decides when to ask (tests call `advance` directly, the real-time
//! driver asks once per second).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClockState {
    #[default]
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone, Default)]
pub struct SimulationClock {
    state: ClockState,
    /// Ticks delivered since the last reset
    ticks: u64,
    /// Set by `stop()`; a halted clock cannot be started again until reset
    halted: bool,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Stopped -> Running. Returns false if the transition was not taken.
    pub fn start(&mut self) -> bool {
        if self.state != ClockState::Stopped || self.halted {
            return false;
        }
        self.state = ClockState::Running;
        true
    }

    /// Running -> Paused
    pub fn pause(&mut self) -> bool {
        if self.state != ClockState::Running {
            return false;
        }
        self.state = ClockState::Paused;
        true
    }

    /// Paused -> Running
    pub fn resume(&mut self) -> bool {
        if self.state != ClockState::Paused {
            return false;
        }
        self.state = ClockState::Running;
        true
    }

    /// Any -> Stopped, terminal until `reset()`
    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.halted = true;
    }

    /// Discard all timing state and return to Stopped
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Consume one tick if the clock is running
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.ticks += 1;
        true
    }
}
