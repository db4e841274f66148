//! Ripple field renderer for a 25x25 circular LED matrix.
//!
//! [`simulation::Simulation`] owns the wave sources ("drops"), the clock and
//! the active profile/mode; [`field::FieldRenderer`] turns that state into a
//! brightness [`field::Frame`]. A host drives both through
//! [`driver::SharedToy`] by feeding it [`driver::Event`]s.

pub mod config;
pub mod driver;
pub mod field;
pub mod simulation;

pub use config::SceneConfig;
pub use driver::{Event, SharedToy, Toy};
pub use field::{FieldRenderer, Frame, OutputFormat, WaveModel};
pub use simulation::{Mode, Simulation};
