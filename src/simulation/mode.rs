use std::fmt;

use crate::config::{AMBIENT_SPAWN_PERIOD, RAIN_SPAWN_DELAY, RAIN_SPAWN_PERIOD};

/// Visual mode of scenes that support mode cycling
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Sparse single shells, one center drop every 10s
    #[default]
    Ambient,
    /// Like ambient, with echo rings trailing each shell
    Ringed,
    /// Rain: random drops at random positions with random shape
    Stochastic,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Ambient, Mode::Ringed, Mode::Stochastic];

    pub fn index(self) -> usize {
        match self {
            Mode::Ambient => 0,
            Mode::Ringed => 1,
            Mode::Stochastic => 2,
        }
    }

    /// Next mode in the ambient -> ringed -> stochastic -> ambient cycle
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn policy(self) -> ModePolicy {
        match self {
            Mode::Ambient => ModePolicy {
                cadence: Cadence::new(AMBIENT_SPAWN_PERIOD, AMBIENT_SPAWN_PERIOD),
                trails: false,
                entry: EntrySpawn::Center,
            },
            Mode::Ringed => ModePolicy {
                cadence: Cadence::new(AMBIENT_SPAWN_PERIOD, AMBIENT_SPAWN_PERIOD),
                trails: true,
                entry: EntrySpawn::Center,
            },
            Mode::Stochastic => ModePolicy {
                cadence: Cadence::new(RAIN_SPAWN_DELAY, RAIN_SPAWN_PERIOD),
                trails: false,
                entry: EntrySpawn::RainBurst,
            },
        }
    }

    pub fn is_stochastic(self) -> bool {
        self == Mode::Stochastic
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Ambient => "ambient",
            Mode::Ringed => "ringed",
            Mode::Stochastic => "stochastic",
        };
        f.write_str(name)
    }
}

/// Per-mode rendering and spawn behavior
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModePolicy {
    pub cadence: Cadence,
    /// Render echo rings behind the leading shell
    pub trails: bool,
    /// Spawn performed on entering the mode
    pub entry: EntrySpawn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntrySpawn {
    Center,
    RainBurst,
}

/// Auto-spawn schedule in ticks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cadence {
    pub initial_delay: u32,
    pub period: u32,
}

impl Cadence {
    pub const fn new(initial_delay: u32, period: u32) -> Self {
        Self {
            initial_delay,
            period,
        }
    }
}

/// Countdown to the next auto-spawn opportunity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SpawnTimer {
    cadence: Cadence,
    remaining: u32,
}

impl SpawnTimer {
    pub(crate) fn start(cadence: Cadence) -> Self {
        Self {
            cadence,
            remaining: cadence.initial_delay.max(1),
        }
    }

    /// Count one tick; true when an opportunity fires
    pub(crate) fn advance(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.remaining = self.cadence.period.max(1);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_has_order_three() {
        for mode in Mode::ALL {
            assert_eq!(mode.next().next().next(), mode);
            assert_ne!(mode.next(), mode);
        }
    }

    #[test]
    fn test_only_ringed_draws_trails() {
        let with_trails: Vec<Mode> = Mode::ALL.into_iter().filter(|m| m.policy().trails).collect();
        assert_eq!(with_trails, vec![Mode::Ringed]);
    }

    #[test]
    fn test_spawn_timer_fires_on_schedule() {
        let mut timer = SpawnTimer::start(Cadence::new(3, 2));
        let fired: Vec<bool> = (0..7).map(|_| timer.advance()).collect();
        assert_eq!(fired, vec![false, false, true, false, true, false, true]);
    }
}
