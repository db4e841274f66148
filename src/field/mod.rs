//! Brightness field of the matrix.
//!
//! Every cell sums the contribution of each live drop, maps the sum through
//! the scene's bias/gain, clips to [0, 1] and fades out towards the circular
//! edge. Frames are recomputed from scratch; nothing is carried over.

mod frame;

pub use frame::{Frame, OutputFormat};

use std::f32::consts::TAU;

use crate::config::{
    EdgeConfig, EnvelopeConfig, SceneConfig, ToneConfig, TrailConfig, CENTER_X, CENTER_Y,
    GRID_HEIGHT, GRID_WIDTH,
};
use crate::simulation::{Drop, Profile, Simulation};

/// Spatial wave model of a scene
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveModel {
    /// Concentric light/dark ripples: `exp(-a r) env(age) cos(2π (r - v age) / λ)`
    Oscillatory,
    /// One bright gaussian ring expanding at speed v
    Shell,
}

/// Attack/decay amplitude of a drop at `age`: rises from 0, then fades slowly
pub fn envelope(age: f32, env: &EnvelopeConfig) -> f32 {
    let attack = 1.0 - (-age / env.attack).exp();
    let decay = (-env.fade * age).exp();
    attack * decay
}

/// Cubic Hermite step; `edge0 > edge1` gives a falling edge
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Soft circular mask at distance `r` from the matrix center: 1 inside,
/// 0 beyond the outer margin
pub fn edge_mask(r: f32, edge: &EdgeConfig) -> f32 {
    let outer = edge.radius + edge.outer_margin;
    if r > outer {
        return 0.0;
    }
    smoothstep(outer, edge.radius - edge.inner_margin, r)
}

/// Renders a [`Simulation`] into a [`Frame`]
#[derive(Clone, Debug)]
pub struct FieldRenderer {
    model: WaveModel,
    envelope: EnvelopeConfig,
    edge: EdgeConfig,
    tone: ToneConfig,
    trails: TrailConfig,
    output: OutputFormat,
}

impl FieldRenderer {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            model: config.wave_model,
            envelope: config.envelope,
            edge: config.edge,
            tone: config.tone,
            trails: config.trails,
            output: config.output,
        }
    }

    /// Select the output packing; the presentation layer owns this choice
    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }

    /// Compute the full frame for the current simulation state
    pub fn render(&self, sim: &Simulation) -> Frame {
        let profile = sim.profile();
        let trails = sim.trails_enabled();
        let mut frame = Frame::blank(self.output);

        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                let dx = x as f32 - CENTER_X;
                let dy = y as f32 - CENTER_Y;
                let mask = edge_mask((dx * dx + dy * dy).sqrt(), &self.edge);
                if mask <= 0.0 {
                    continue;
                }

                let sum: f32 = sim
                    .drops()
                    .iter()
                    .map(|drop| self.contribution(drop, x as f32, y as f32, profile, trails))
                    .sum();

                let value = (self.tone.bias + self.tone.gain * sum).clamp(0.0, 1.0);
                frame.set(y * GRID_WIDTH + x, value * mask);
            }
        }

        frame
    }

    /// Raw signal of one drop at cell (x, y), before bias/gain
    pub fn contribution(&self, drop: &Drop, x: f32, y: f32, profile: &Profile, trails: bool) -> f32 {
        let r = ((x - drop.x).powi(2) + (y - drop.y).powi(2)).sqrt();
        let s = drop.scales;
        let speed = profile.speed * s.speed;
        let damping = profile.damping / s.damping;
        let spatial = (-damping * r).exp();

        match self.model {
            WaveModel::Oscillatory => {
                let wavelength = profile.width * s.sigma;
                let phase = TAU * (r - speed * drop.age) / wavelength;
                spatial * envelope(drop.age / s.damping, &self.envelope) * s.weight * phase.cos()
            }
            WaveModel::Shell => {
                let sigma = profile.width * s.sigma;
                let r0 = speed * drop.age;
                let amp = spatial * envelope(drop.age / s.damping, &self.envelope) * s.weight;
                let mut sum = amp * gaussian_shell(r - r0, sigma);

                if trails {
                    sum += self.trail_sum(drop, r, r0, sigma, spatial);
                }
                sum
            }
        }
    }

    fn trail_sum(&self, drop: &Drop, r: f32, r0: f32, sigma: f32, spatial: f32) -> f32 {
        let t = &self.trails;
        let s = drop.scales;
        let mut sum = 0.0;
        for k in 1..=t.count {
            let kf = k as f32;
            let rk = r0 - kf * t.spacing;
            if rk < 0.0 {
                break;
            }
            let sigma_k = sigma * (1.0 + t.widen * kf);
            let age_k = (drop.age - t.envelope_lag * kf).max(0.0);
            let env_k = envelope(age_k / s.damping, &self.envelope);
            sum += t.gain.powi(k as i32) * s.weight * spatial * env_k * gaussian_shell(r - rk, sigma_k);
        }
        sum
    }
}

fn gaussian_shell(dr: f32, sigma: f32) -> f32 {
    (-0.5 * (dr * dr) / (sigma * sigma)).exp()
}
