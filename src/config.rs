use crate::field::{OutputFormat, WaveModel};
use crate::simulation::profile::{Profile, ProfileTable};

/// Matrix dimensions (25x25 LEDs, circular visible area)
pub const GRID_WIDTH: usize = 25;
pub const GRID_HEIGHT: usize = 25;
pub const CELL_COUNT: usize = GRID_WIDTH * GRID_HEIGHT;

/// Matrix center in cell coordinates
pub const CENTER_X: f32 = (GRID_WIDTH as f32 - 1.0) * 0.5;
pub const CENTER_Y: f32 = (GRID_HEIGHT as f32 - 1.0) * 0.5;

/// Radius of the visible disk, roughly through the centers of the outer LEDs
pub const DISPLAY_RADIUS: f32 = 12.4;

/// Normal frame rate of the tick driver
pub const FPS: f32 = 25.0;

/// Tick period at FPS (40ms)
pub const TICK_PERIOD_MS: u64 = 40;

/// Simulation time advanced by one tick
pub const TICK_DT: f32 = 1.0;

/// Minimum spacing between two shake bursts
pub const SHAKE_COOLDOWN_MS: u64 = 800;

/// Auto-spawn every 10s in ambient/ringed modes (in ticks)
pub const AMBIENT_SPAWN_PERIOD: u32 = 250;

/// Stochastic mode: first opportunity after 200ms, then every 1400ms (in ticks)
pub const RAIN_SPAWN_DELAY: u32 = 5;
pub const RAIN_SPAWN_PERIOD: u32 = 35;

// ============================================
// Scene configuration
// ============================================

/// Attack/decay constants of the per-drop envelope
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeConfig {
    /// Time constant of the rising edge (ticks)
    pub attack: f32,
    /// Exponential fade rate per tick
    pub fade: f32,
}

/// Soft circular edge. Cells farther than `radius + outer_margin` are dark,
/// cells closer than `radius - inner_margin` are unmasked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeConfig {
    pub radius: f32,
    pub outer_margin: f32,
    pub inner_margin: f32,
}

/// Echo rings drawn behind the leading shell in ringed mode
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailConfig {
    pub count: u32,
    /// Distance in pixels between consecutive rings
    pub spacing: f32,
    /// Per-ring attenuation, applied as `gain^k`
    pub gain: f32,
    /// Shell widening per ring, applied as `1 + widen * k`
    pub widen: f32,
    /// Envelope lag per ring in ticks
    pub envelope_lag: f32,
}

/// Linear signal mapping applied before clipping to [0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneConfig {
    pub bias: f32,
    pub gain: f32,
}

/// A uniform range `base + span * u`, u in [0, 1)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleRange {
    pub base: f32,
    pub span: f32,
}

impl ScaleRange {
    pub const fn new(base: f32, span: f32) -> Self {
        Self { base, span }
    }

    pub fn sample(&self, u: f32) -> f32 {
        self.base + self.span * u
    }
}

/// A range that is replaced by an alternate one with probability `chance`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RareRange {
    pub chance: f32,
    pub range: ScaleRange,
}

/// Randomized drop parameters for stochastic ("rain") spawns
#[derive(Clone, Debug, PartialEq)]
pub struct RainConfig {
    pub weight: ScaleRange,
    pub heavy_weight: RareRange,
    pub sigma: ScaleRange,
    pub speed: ScaleRange,
    pub slow_speed: RareRange,
    pub damping: ScaleRange,
    /// Cumulative probabilities for spawning 0, 1, 2, ... drops per opportunity
    pub count_thresholds: Vec<f64>,
    /// Drops spawned when entering stochastic mode
    pub entry_burst: usize,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            weight: ScaleRange::new(0.8, 0.6),
            heavy_weight: RareRange {
                chance: 0.10,
                range: ScaleRange::new(1.3, 0.5),
            },
            sigma: ScaleRange::new(1.0, 0.35),
            speed: ScaleRange::new(1.02, 0.24),
            slow_speed: RareRange {
                chance: 0.06,
                range: ScaleRange::new(0.92, 0.10),
            },
            damping: ScaleRange::new(0.9, 0.3),
            count_thresholds: vec![0.35, 0.85, 0.97, 1.0],
            entry_burst: 3,
        }
    }
}

/// When the drop set is full in stochastic mode, a spawn is skipped if the
/// oldest drop is younger than `min_replace_age` and the youngest is younger
/// than `min_replace_age * young_fraction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SaturationPolicy {
    pub min_replace_age: f32,
    pub young_fraction: f32,
}

impl Default for SaturationPolicy {
    fn default() -> Self {
        Self {
            min_replace_age: 50.0,
            young_fraction: 0.5,
        }
    }
}

/// Shake handling; absent for scenes that ignore shakes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShakeConfig {
    pub burst: usize,
    /// Only burst while in stochastic mode
    pub stochastic_only: bool,
}

/// Every tunable of one scene variant
#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub name: &'static str,
    pub capacity: usize,
    pub wave_model: WaveModel,
    pub profiles: ProfileTable,
    /// Drops older than this many ticks are retired
    pub retire_age: f32,
    /// Seed a center drop whenever the scene would otherwise be empty
    pub reseed_when_empty: bool,
    /// Scene cycles through ambient/ringed/stochastic modes
    pub modes_enabled: bool,
    pub envelope: EnvelopeConfig,
    pub edge: EdgeConfig,
    pub tone: ToneConfig,
    pub output: OutputFormat,
    pub trails: TrailConfig,
    pub rain: RainConfig,
    pub saturation: SaturationPolicy,
    pub shake: Option<ShakeConfig>,
}

impl SceneConfig {
    /// Three-drop oscillating ripples, profile cycling on long press
    pub fn classic() -> Self {
        Self {
            name: "classic",
            capacity: 3,
            wave_model: WaveModel::Oscillatory,
            profiles: ProfileTable::preset(vec![
                Profile::new("soft", 0.22, 4.0, 0.06),
                Profile::new("crisp", 0.35, 3.0, 0.05),
                Profile::new("languid", 0.16, 5.5, 0.08),
            ]),
            retire_age: 400.0,
            reseed_when_empty: true,
            modes_enabled: false,
            envelope: EnvelopeConfig {
                attack: 6.0,
                fade: 0.004,
            },
            edge: EdgeConfig {
                radius: DISPLAY_RADIUS,
                outer_margin: 0.5,
                inner_margin: 1.0,
            },
            tone: ToneConfig {
                bias: 12.0 / 255.0,
                gain: 115.0 / 255.0,
            },
            output: OutputFormat::ArgbGray,
            trails: TrailConfig::default(),
            rain: RainConfig::default(),
            saturation: SaturationPolicy::default(),
            shake: None,
        }
    }

    /// Eight-drop expanding shells with ambient/ringed/stochastic modes
    pub fn hamon() -> Self {
        let speed = DISPLAY_RADIUS / (2.5 * FPS);
        Self {
            name: "hamon",
            capacity: 8,
            wave_model: WaveModel::Shell,
            profiles: ProfileTable::preset(vec![
                Profile::new("standard", speed, 1.8, 0.07),
                Profile::new("fine", speed, 1.6, 0.07),
                Profile::new("broad", speed, 2.1, 0.07),
            ]),
            retire_age: 520.0,
            reseed_when_empty: false,
            modes_enabled: true,
            envelope: EnvelopeConfig {
                attack: 4.0,
                fade: 0.0065,
            },
            edge: EdgeConfig {
                radius: DISPLAY_RADIUS,
                outer_margin: 1.2,
                inner_margin: 0.2,
            },
            tone: ToneConfig {
                bias: 0.0,
                gain: 1.10,
            },
            output: OutputFormat::Levels(2040),
            trails: TrailConfig::default(),
            rain: RainConfig::default(),
            saturation: SaturationPolicy::default(),
            shake: Some(ShakeConfig {
                burst: 8,
                stochastic_only: true,
            }),
        }
    }

    /// Look up a preset by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" => Some(Self::classic()),
            "hamon" => Some(Self::hamon()),
            _ => None,
        }
    }

    /// Scene and RNG seed from `RIPPLE_SCENE` / `RIPPLE_SEED`
    pub fn from_env() -> (Self, u64) {
        let scene = match std::env::var("RIPPLE_SCENE") {
            Ok(name) => Self::by_name(&name).unwrap_or_else(|| {
                log::warn!("Unknown RIPPLE_SCENE {:?}, using hamon", name);
                Self::hamon()
            }),
            Err(_) => Self::hamon(),
        };

        let seed = match std::env::var("RIPPLE_SEED") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("RIPPLE_SEED {:?} is not a u64, using random seed", raw);
                rand::random()
            }),
            Err(_) => rand::random(),
        };

        (scene, seed)
    }
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            count: 3,
            spacing: 3.8,
            gain: 0.72,
            widen: 0.25,
            envelope_lag: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_middle_cell() {
        assert_eq!(CENTER_X, 12.0);
        assert_eq!(CENTER_Y, 12.0);
        assert_eq!(CELL_COUNT, 625);
    }

    #[test]
    fn test_presets_by_name() {
        assert_eq!(SceneConfig::by_name("Classic").map(|c| c.capacity), Some(3));
        assert_eq!(SceneConfig::by_name(" hamon ").map(|c| c.capacity), Some(8));
        assert!(SceneConfig::by_name("disco").is_none());
    }

    #[test]
    fn test_rain_thresholds_end_at_one() {
        let rain = RainConfig::default();
        assert_eq!(rain.count_thresholds.last().copied(), Some(1.0));
        assert!(rain.count_thresholds.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_hamon_speed_crosses_radius_in_two_and_a_half_seconds() {
        let scene = SceneConfig::hamon();
        let speed = scene.profiles.get(0).speed;
        let ticks = DISPLAY_RADIUS / speed;
        assert!((ticks - 2.5 * FPS).abs() < 1e-3);
    }
}
