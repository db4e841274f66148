use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{SceneConfig, CENTER_X, CENTER_Y, DISPLAY_RADIUS, TICK_DT};
use crate::simulation::drop::{Drop, DropScales, DropSet};
use crate::simulation::mode::{EntrySpawn, Mode, SpawnTimer};
use crate::simulation::profile::Profile;

/// What happened to a spawn request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// Placed into a free slot
    Inserted(usize),
    /// Replaced the oldest drop in this slot
    Evicted(usize),
    /// Rain saturation: the scene is dense and young, spawn dropped
    Skipped,
}

/// Drops, clock, active profile and mode of one scene
pub struct Simulation {
    config: SceneConfig,
    drops: DropSet,
    /// Ticks since the last reset
    time: u64,
    profile_index: usize,
    mode: Mode,
    spawn_timer: Option<SpawnTimer>,
    low_power: bool,
    rng: StdRng,
}

impl Simulation {
    /// Fresh scene: reset plus the scene's opening drop
    pub fn new(config: SceneConfig, seed: u64) -> Self {
        let drops = DropSet::with_capacity(config.capacity);
        let mut sim = Self {
            config,
            drops,
            time: 0,
            profile_index: 0,
            mode: Mode::Ambient,
            spawn_timer: None,
            low_power: false,
            rng: StdRng::seed_from_u64(seed),
        };
        sim.reset();
        if sim.config.modes_enabled {
            sim.spawn_scheduled();
        }
        sim
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn drops(&self) -> &DropSet {
        &self.drops
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn profile_index(&self) -> usize {
        self.profile_index
    }

    pub fn profile(&self) -> &Profile {
        self.config.profiles.get(self.profile_index)
    }

    pub fn is_low_power(&self) -> bool {
        self.low_power
    }

    /// Echo rings are drawn only in ringed mode
    pub fn trails_enabled(&self) -> bool {
        self.config.modes_enabled && self.mode.policy().trails
    }

    /// Advance the clock and every drop by one step, retire faded drops, then
    /// take an auto-spawn opportunity if one is due.
    pub fn tick(&mut self) {
        self.time += 1;
        self.drops.age_all(TICK_DT);

        let retired = self.drops.retire_older_than(self.config.retire_age);
        if retired > 0 {
            log::debug!("Retired {} drop(s) at t={}", retired, self.time);
        }
        self.reseed_if_empty();

        if self.low_power {
            return;
        }
        let due = self.spawn_timer.as_mut().is_some_and(|t| t.advance());
        if due {
            self.spawn_scheduled();
        }
    }

    /// One step delivered by a low-power event
    pub fn low_power_tick(&mut self) {
        self.set_low_power(true);
        self.tick();
    }

    pub fn set_low_power(&mut self, on: bool) {
        if self.low_power != on {
            log::debug!("Low-power mode {}", if on { "on" } else { "off" });
        }
        self.low_power = on;
    }

    /// Spawn a plain drop
    pub fn spawn_drop(&mut self, x: f32, y: f32) -> SpawnOutcome {
        self.spawn_drop_with(x, y, DropScales::UNIT)
    }

    /// Spawn a drop with individual shape factors. When the set is full the
    /// oldest drop is evicted, unless the stochastic saturation rule skips it.
    pub fn spawn_drop_with(&mut self, x: f32, y: f32, scales: DropScales) -> SpawnOutcome {
        let drop = Drop::new(x, y, scales);
        let drop = match self.drops.insert(drop) {
            Ok(slot) => return SpawnOutcome::Inserted(slot),
            Err(drop) => drop,
        };

        if self.saturated() {
            log::debug!("Drop set saturated, skipping spawn at ({:.1}, {:.1})", x, y);
            return SpawnOutcome::Skipped;
        }

        let slot = self.drops.replace_oldest(drop);
        log::debug!("Evicted oldest drop in slot {}", slot);
        SpawnOutcome::Evicted(slot)
    }

    fn saturated(&self) -> bool {
        if !(self.config.modes_enabled && self.mode.is_stochastic()) {
            return false;
        }
        let policy = self.config.saturation;
        let oldest = self.drops.oldest_age().unwrap_or(f32::MAX);
        let youngest = self.drops.youngest_age().unwrap_or(f32::MAX);
        oldest < policy.min_replace_age && youngest < policy.min_replace_age * policy.young_fraction
    }

    /// Spawn a drop at the matrix center
    pub fn spawn_center(&mut self) -> SpawnOutcome {
        self.spawn_drop(CENTER_X, CENTER_Y)
    }

    /// Spawn `count` rain drops at uniform random positions in the display disk
    pub fn spawn_burst(&mut self, count: usize) {
        for _ in 0..count {
            self.spawn_rain_drop();
        }
    }

    fn spawn_rain_drop(&mut self) -> SpawnOutcome {
        let theta = TAU * self.rng.gen::<f64>();
        let radius = DISPLAY_RADIUS as f64 * self.rng.gen::<f64>().sqrt();
        let x = CENTER_X + (radius * theta.cos()) as f32;
        let y = CENTER_Y + (radius * theta.sin()) as f32;

        let rain = &self.config.rain;
        let mut weight = rain.weight.sample(self.rng.gen());
        if self.rng.gen::<f32>() < rain.heavy_weight.chance {
            weight = rain.heavy_weight.range.sample(self.rng.gen());
        }
        let sigma = rain.sigma.sample(self.rng.gen());
        let mut speed = rain.speed.sample(self.rng.gen());
        if self.rng.gen::<f32>() < rain.slow_speed.chance {
            speed = rain.slow_speed.range.sample(self.rng.gen());
        }
        let damping = rain.damping.sample(self.rng.gen());

        self.spawn_drop_with(
            x,
            y,
            DropScales {
                weight,
                sigma,
                speed,
                damping,
            },
        )
    }

    /// Number of rain drops for one stochastic opportunity
    fn rain_count(&mut self) -> usize {
        let u = self.rng.gen::<f64>();
        count_for(u, &self.config.rain.count_thresholds)
    }

    /// The auto-spawn action: a rain step in stochastic mode, otherwise a
    /// center drop.
    pub fn spawn_scheduled(&mut self) {
        if self.config.modes_enabled && self.mode.is_stochastic() {
            let n = self.rain_count();
            self.spawn_burst(n);
        } else {
            self.spawn_center();
        }
    }

    pub fn cycle_profile(&mut self) {
        self.profile_index = (self.profile_index + 1) % self.config.profiles.len();
        log::info!("Profile: {}", self.profile().name);
    }

    /// Advance ambient -> ringed -> stochastic -> ambient, restart the
    /// auto-spawn schedule and make the change visible right away.
    pub fn cycle_mode(&mut self) {
        self.enter_mode(self.mode.next());
    }

    fn enter_mode(&mut self, mode: Mode) {
        self.mode = mode;
        let policy = mode.policy();
        self.spawn_timer = Some(SpawnTimer::start(policy.cadence));
        log::info!("Switch to {} mode", mode);

        match policy.entry {
            EntrySpawn::Center => {
                self.spawn_center();
            }
            EntrySpawn::RainBurst => {
                let n = self.config.rain.entry_burst;
                self.spawn_burst(n);
            }
        }
    }

    /// Long press: cycle modes where the scene has them, otherwise cycle the
    /// profile and drop a new ripple at the center.
    pub fn long_press(&mut self) {
        if self.config.modes_enabled {
            self.cycle_mode();
        } else {
            self.cycle_profile();
            self.spawn_center();
        }
    }

    /// Shake burst, if this scene and mode react to shakes. Returns whether a
    /// burst was spawned.
    pub fn shake(&mut self) -> bool {
        let Some(shake) = self.config.shake else {
            return false;
        };
        if self.low_power {
            return false;
        }
        if shake.stochastic_only && !(self.config.modes_enabled && self.mode.is_stochastic()) {
            return false;
        }
        self.spawn_burst(shake.burst);
        true
    }

    /// Clear all drops and zero the clock. The auto-spawn schedule restarts.
    pub fn reset(&mut self) {
        self.time = 0;
        self.drops.clear();
        self.spawn_timer = self
            .config
            .modes_enabled
            .then(|| SpawnTimer::start(self.mode.policy().cadence));
        self.reseed_if_empty();
    }

    fn reseed_if_empty(&mut self) {
        if self.config.reseed_when_empty && self.drops.is_empty() {
            self.spawn_center();
        }
    }
}

/// Spawn count for a uniform sample `u`: the index of the first cumulative
/// threshold above `u`, or the last index if none is
pub fn count_for(u: f64, thresholds: &[f64]) -> usize {
    thresholds
        .iter()
        .position(|&t| u < t)
        .unwrap_or(thresholds.len().saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AMBIENT_SPAWN_PERIOD, RAIN_SPAWN_DELAY};

    fn ages(sim: &Simulation) -> Vec<f32> {
        sim.drops().iter().map(|d| d.age).collect()
    }

    #[test]
    fn test_rain_count_thresholds() {
        let thresholds = crate::config::RainConfig::default().count_thresholds;
        let cases = [
            (0.0, 0),
            (0.3499, 0),
            (0.35, 1),
            (0.8499, 1),
            (0.85, 2),
            (0.97, 3),
            (0.9999, 3),
        ];
        for (u, expected) in cases {
            assert_eq!(count_for(u, &thresholds), expected, "u = {}", u);
        }
        assert_eq!(count_for(0.5, &[]), 0);
    }

    #[test]
    fn test_clock_counts_whole_ticks() {
        let mut sim = Simulation::new(SceneConfig::classic(), 1);
        sim.time = (1 << 24) + 1;
        sim.tick();
        assert_eq!(sim.time(), (1 << 24) + 2);
    }

    #[test]
    fn test_classic_starts_with_center_drop() {
        let sim = Simulation::new(SceneConfig::classic(), 1);
        let drops: Vec<&Drop> = sim.drops().iter().collect();
        assert_eq!(drops.len(), 1);
        assert_eq!((drops[0].x, drops[0].y, drops[0].age), (12.0, 12.0, 0.0));
    }

    #[test]
    fn test_hamon_starts_ambient_with_center_drop() {
        let sim = Simulation::new(SceneConfig::hamon(), 1);
        assert_eq!(sim.mode(), Mode::Ambient);
        assert_eq!(sim.drops().len(), 1);
    }

    #[test]
    fn test_tick_ages_every_drop_by_one() {
        let mut sim = Simulation::new(SceneConfig::hamon(), 7);
        sim.spawn_drop(3.0, 4.0);
        sim.tick();
        sim.spawn_drop(5.0, 6.0);

        for _ in 0..30 {
            let before = ages(&sim);
            sim.tick();
            let after = ages(&sim);
            assert_eq!(before.len(), after.len());
            for (b, a) in before.iter().zip(&after) {
                assert_eq!(*a, b + 1.0);
            }
        }
        assert_eq!(sim.time(), 31);
    }

    #[test]
    fn test_drop_retired_after_threshold() {
        let mut config = SceneConfig::classic();
        config.reseed_when_empty = false;
        let mut sim = Simulation::new(config, 1);
        sim.spawn_center();
        assert_eq!(sim.drops().len(), 1);

        for _ in 0..399 {
            sim.tick();
        }
        assert_eq!(sim.drops().len(), 1);

        sim.tick();
        sim.tick();
        assert!(sim.drops().is_empty());
    }

    #[test]
    fn test_classic_reseeds_when_all_retired() {
        let mut sim = Simulation::new(SceneConfig::classic(), 1);
        for _ in 0..401 {
            sim.tick();
        }
        let ages = ages(&sim);
        assert_eq!(ages, vec![0.0]);
    }

    #[test]
    fn test_hamon_falls_silent() {
        let mut config = SceneConfig::hamon();
        config.modes_enabled = false;
        let mut sim = Simulation::new(config, 1);
        sim.spawn_center();
        for _ in 0..521 {
            sim.tick();
        }
        assert!(sim.drops().is_empty());
    }

    #[test]
    fn test_capacity_never_exceeded() {
        for config in [SceneConfig::classic(), SceneConfig::hamon()] {
            let capacity = config.capacity;
            let mut sim = Simulation::new(config, 99);
            for i in 0..50 {
                sim.spawn_drop(i as f32 % 25.0, 3.0);
                sim.spawn_burst(3);
                sim.tick();
                assert!(sim.drops().len() <= capacity);
            }
        }
    }

    #[test]
    fn test_full_set_evicts_oldest() {
        let mut sim = Simulation::new(SceneConfig::classic(), 1);
        sim.tick();
        sim.spawn_drop(1.0, 1.0);
        sim.spawn_drop(2.0, 2.0);
        assert!(sim.drops().is_full());

        assert_eq!(sim.spawn_drop(3.0, 3.0), SpawnOutcome::Evicted(0));
        assert!(sim.drops().iter().all(|d| d.age == 0.0));
    }

    #[test]
    fn test_burst_on_empty_set() {
        let mut config = SceneConfig::hamon();
        config.modes_enabled = false;
        let mut sim = Simulation::new(config, 5);
        sim.reset();
        assert!(sim.drops().is_empty());

        sim.spawn_burst(5);
        assert_eq!(sim.drops().len(), 5);
        assert!(sim.drops().iter().all(|d| d.age == 0.0));
    }

    #[test]
    fn test_burst_positions_inside_disk() {
        let mut config = SceneConfig::hamon();
        config.modes_enabled = false;
        config.capacity = 64;
        let mut sim = Simulation::new(config, 11);
        sim.reset();
        sim.spawn_burst(64);

        for d in sim.drops().iter() {
            let r = ((d.x - CENTER_X).powi(2) + (d.y - CENTER_Y).powi(2)).sqrt();
            assert!(r <= DISPLAY_RADIUS + 1e-3, "drop at radius {}", r);
            assert!(d.scales.weight >= 0.8 && d.scales.weight <= 1.8);
            assert!(d.scales.sigma >= 1.0 && d.scales.sigma <= 1.35);
            assert!(d.scales.speed >= 0.92 && d.scales.speed <= 1.26);
            assert!(d.scales.damping >= 0.9 && d.scales.damping <= 1.2);
        }
    }

    #[test]
    fn test_rain_saturation_skips_young_scene() {
        let mut sim = Simulation::new(SceneConfig::hamon(), 3);
        sim.cycle_mode();
        sim.cycle_mode();
        assert_eq!(sim.mode(), Mode::Stochastic);

        sim.reset();
        for i in 0..8 {
            sim.spawn_drop(i as f32, 2.0);
        }
        assert!(sim.drops().is_full());
        assert_eq!(sim.spawn_drop(20.0, 20.0), SpawnOutcome::Skipped);

        // Youngest drop past half the replace age: eviction allowed again
        let mut sim = Simulation::new(SceneConfig::hamon(), 3);
        sim.cycle_mode();
        sim.cycle_mode();
        sim.reset();
        for i in 0..8 {
            sim.spawn_drop(i as f32, 2.0);
        }
        sim.set_low_power(true);
        for _ in 0..25 {
            sim.tick();
        }
        assert!(matches!(sim.spawn_drop(20.0, 20.0), SpawnOutcome::Evicted(_)));
    }

    #[test]
    fn test_saturation_only_in_stochastic_mode() {
        let mut sim = Simulation::new(SceneConfig::hamon(), 3);
        for i in 0..8 {
            sim.spawn_drop(i as f32, 2.0);
        }
        assert!(matches!(sim.spawn_drop(20.0, 20.0), SpawnOutcome::Evicted(_)));
    }

    #[test]
    fn test_three_long_presses_restore_mode() {
        let mut sim = Simulation::new(SceneConfig::hamon(), 2);
        let start = sim.mode();
        let mut seen = Vec::new();
        for _ in 0..3 {
            sim.long_press();
            seen.push(sim.mode());
        }
        assert_eq!(seen, vec![Mode::Ringed, Mode::Stochastic, Mode::Ambient]);
        assert_eq!(sim.mode(), start);
    }

    #[test]
    fn test_mode_entry_spawns() {
        let mut sim = Simulation::new(SceneConfig::hamon(), 2);
        sim.reset();
        sim.cycle_mode();
        assert_eq!(sim.drops().len(), 1);
        assert!(sim.trails_enabled());

        sim.reset();
        sim.cycle_mode();
        assert_eq!(sim.mode(), Mode::Stochastic);
        assert_eq!(sim.drops().len(), 3);
    }

    #[test]
    fn test_classic_long_press_cycles_profile() {
        let mut sim = Simulation::new(SceneConfig::classic(), 2);
        assert_eq!(sim.profile().name, "soft");
        sim.long_press();
        assert_eq!(sim.profile().name, "crisp");
        assert_eq!(sim.drops().len(), 2);
        sim.long_press();
        sim.long_press();
        assert_eq!(sim.profile_index(), 0);
        assert_eq!(sim.mode(), Mode::Ambient);
    }

    #[test]
    fn test_ambient_auto_spawn_cadence() {
        let mut sim = Simulation::new(SceneConfig::hamon(), 2);
        sim.reset();
        for _ in 0..AMBIENT_SPAWN_PERIOD - 1 {
            sim.tick();
        }
        assert!(sim.drops().is_empty());
        sim.tick();
        assert_eq!(ages(&sim), vec![0.0]);
    }

    #[test]
    fn test_low_power_suppresses_auto_spawn() {
        let mut sim = Simulation::new(SceneConfig::hamon(), 2);
        sim.reset();
        for _ in 0..AMBIENT_SPAWN_PERIOD * 2 {
            sim.low_power_tick();
        }
        assert!(sim.drops().is_empty());
        assert!(!sim.shake());
    }

    #[test]
    fn test_stochastic_auto_spawn_stays_bounded() {
        let mut sim = Simulation::new(SceneConfig::hamon(), 8);
        sim.cycle_mode();
        sim.cycle_mode();
        sim.reset();
        for _ in 0..RAIN_SPAWN_DELAY + 35 * 40 {
            sim.tick();
            assert!(sim.drops().len() <= 8);
        }
        assert!(!sim.drops().is_empty());
    }

    #[test]
    fn test_shake_only_bursts_in_stochastic_mode() {
        let mut sim = Simulation::new(SceneConfig::hamon(), 4);
        assert!(!sim.shake());

        sim.cycle_mode();
        sim.cycle_mode();
        sim.reset();
        assert!(sim.shake());
        assert_eq!(sim.drops().len(), 8);

        let mut classic = Simulation::new(SceneConfig::classic(), 4);
        assert!(!classic.shake());
    }

    #[test]
    fn test_reset_zeroes_time() {
        let mut sim = Simulation::new(SceneConfig::classic(), 4);
        for _ in 0..10 {
            sim.tick();
        }
        sim.reset();
        assert_eq!(sim.time(), 0);
        assert_eq!(ages(&sim), vec![0.0]);
    }

    #[test]
    fn test_same_seed_same_rain() {
        let run = |seed| {
            let mut sim = Simulation::new(SceneConfig::hamon(), seed);
            sim.cycle_mode();
            sim.cycle_mode();
            sim.drops().iter().map(|d| (d.x, d.y)).collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }
}
