use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::config::{SceneConfig, SHAKE_COOLDOWN_MS};
use crate::field::{FieldRenderer, Frame, OutputFormat};
use crate::simulation::Simulation;

/// Input to the toy, in arrival order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Regular frame tick (~25 Hz)
    Tick,
    /// Single step delivered by the low-power (always-on display) path
    LowPowerTick,
    /// Cycle mode or profile
    LongPress,
    /// Shake gesture; rate limited by [`SharedToy`]
    Shake,
    Reset,
}

/// Simulation plus renderer. Not synchronized; see [`SharedToy`].
pub struct Toy {
    sim: Simulation,
    renderer: FieldRenderer,
}

impl Toy {
    pub fn new(config: SceneConfig, seed: u64) -> Self {
        let renderer = FieldRenderer::new(&config);
        log::info!(
            "Scene {}: {} drops max, {:?} model, seed {}",
            config.name,
            config.capacity,
            config.wave_model,
            seed
        );
        Self {
            sim: Simulation::new(config, seed),
            renderer,
        }
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.renderer = self.renderer.with_output(output);
        self
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Regular tick; leaves low-power mode
    pub fn on_tick(&mut self) {
        self.sim.set_low_power(false);
        self.sim.tick();
    }

    /// Apply one event. Returns true when a new frame is due.
    pub fn on_event(&mut self, event: Event) -> bool {
        match event {
            Event::Tick => {
                self.on_tick();
                true
            }
            Event::LowPowerTick => {
                self.sim.low_power_tick();
                true
            }
            Event::LongPress => {
                log::debug!("Long press");
                self.sim.set_low_power(false);
                self.sim.long_press();
                false
            }
            Event::Shake => {
                self.sim.set_low_power(false);
                if self.sim.shake() {
                    log::debug!("Shake burst, {} drops live", self.sim.drops().len());
                }
                false
            }
            Event::Reset => {
                log::info!("Scene reset");
                self.sim.set_low_power(false);
                self.sim.reset();
                false
            }
        }
    }

    pub fn render(&self) -> Frame {
        self.renderer.render(&self.sim)
    }
}

/// At most one shake per cooldown window
#[derive(Clone, Copy, Debug)]
pub struct ShakeLimiter {
    cooldown: Duration,
    last: Option<Instant>,
}

impl ShakeLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown, last: None }
    }

    /// True if a shake at `now` may fire; records it if so
    pub fn try_fire(&mut self, now: Instant) -> bool {
        let ready = self
            .last
            .map_or(true, |last| now.saturating_duration_since(last) > self.cooldown);
        if ready {
            self.last = Some(now);
        }
        ready
    }
}

impl Default for ShakeLimiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(SHAKE_COOLDOWN_MS))
    }
}

struct Inner {
    toy: Toy,
    shakes: ShakeLimiter,
}

/// Mutex-guarded toy. Tick and input handlers may live on different threads;
/// each event is applied, and its frame rendered, under one lock.
#[derive(Clone)]
pub struct SharedToy {
    inner: Arc<Mutex<Inner>>,
}

impl SharedToy {
    pub fn new(toy: Toy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                toy,
                shakes: ShakeLimiter::default(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // a panic mid-event leaves plain numeric state behind; keep going
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply `event` received at `now`, returning the new frame if one is due
    pub fn dispatch(&self, event: Event, now: Instant) -> Option<Frame> {
        let mut inner = self.lock();
        if event == Event::Shake && !inner.shakes.try_fire(now) {
            log::debug!("Shake ignored, cooling down");
            return None;
        }
        inner.toy.on_event(event).then(|| inner.toy.render())
    }

    pub fn render(&self) -> Frame {
        self.lock().toy.render()
    }

    /// Run `f` against the current state without letting events interleave
    pub fn inspect<R>(&self, f: impl FnOnce(&Simulation) -> R) -> R {
        f(self.lock().toy.simulation())
    }
}
