pub mod drop;
pub mod mode;
pub mod profile;
pub mod state;

pub use drop::{Drop, DropScales, DropSet};
pub use mode::{Cadence, EntrySpawn, Mode, ModePolicy};
pub use profile::{Profile, ProfileError, ProfileTable};
pub use state::{Simulation, SpawnOutcome};
