use thiserror::Error;

/// Physical constants of a wave profile.
///
/// `width` is the wavelength for the oscillatory model and the ring thickness
/// (sigma) for the single-shell model.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub name: &'static str,
    /// Propagation speed in pixels per tick
    pub speed: f32,
    pub width: f32,
    /// Spatial damping coefficient (per pixel)
    pub damping: f32,
}

impl Profile {
    pub const fn new(name: &'static str, speed: f32, width: f32, damping: f32) -> Self {
        Self {
            name,
            speed,
            width,
            damping,
        }
    }

    fn validate(&self) -> Result<(), ProfileError> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(ProfileError::InvalidWidth {
                name: self.name,
                width: self.width,
            });
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(ProfileError::InvalidSpeed {
                name: self.name,
                speed: self.speed,
            });
        }
        if !self.damping.is_finite() || self.damping < 0.0 {
            return Err(ProfileError::InvalidDamping {
                name: self.name,
                damping: self.damping,
            });
        }
        Ok(())
    }
}

/// Errors produced while building a [`ProfileTable`].
#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("profile table requires at least one profile")]
    Empty,
    #[error("profile {name:?}: width must be finite and positive, got {width}")]
    InvalidWidth { name: &'static str, width: f32 },
    #[error("profile {name:?}: speed must be finite and non-negative, got {speed}")]
    InvalidSpeed { name: &'static str, speed: f32 },
    #[error("profile {name:?}: damping must be finite and non-negative, got {damping}")]
    InvalidDamping { name: &'static str, damping: f32 },
}

/// Non-empty table of validated profiles. Rendering never re-checks them.
#[derive(Clone, Debug)]
pub struct ProfileTable {
    profiles: Vec<Profile>,
}

impl ProfileTable {
    pub fn new(profiles: Vec<Profile>) -> Result<Self, ProfileError> {
        if profiles.is_empty() {
            return Err(ProfileError::Empty);
        }
        for profile in &profiles {
            profile.validate()?;
        }
        Ok(Self { profiles })
    }

    /// Built-in tables; their constants are covered by tests
    pub(crate) fn preset(profiles: Vec<Profile>) -> Self {
        debug_assert!(Self::new(profiles.clone()).is_ok(), "invalid preset profiles");
        Self { profiles }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Profile at `index`, wrapped into the table
    pub fn get(&self, index: usize) -> &Profile {
        &self.profiles[index % self.profiles.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    #[test]
    fn test_presets_are_valid() {
        for scene in [SceneConfig::classic(), SceneConfig::hamon()] {
            let profiles: Vec<Profile> = scene.profiles.iter().cloned().collect();
            assert_eq!(profiles.len(), 3);
            assert!(ProfileTable::new(profiles).is_ok(), "{} presets", scene.name);
        }
    }

    #[test]
    fn test_empty_table_rejected() {
        assert_eq!(ProfileTable::new(Vec::new()).err(), Some(ProfileError::Empty));
    }

    #[test]
    fn test_zero_width_rejected() {
        let err = ProfileTable::new(vec![Profile::new("flat", 0.2, 0.0, 0.05)]).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidWidth { name: "flat", .. }));
    }

    #[test]
    fn test_bad_speed_and_damping_rejected() {
        let err = ProfileTable::new(vec![Profile::new("back", -0.1, 2.0, 0.05)]).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidSpeed { .. }));

        let err = ProfileTable::new(vec![Profile::new("nan", 0.1, 2.0, f32::NAN)]).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidDamping { .. }));
    }

    #[test]
    fn test_get_wraps() {
        let table = ProfileTable::new(vec![
            Profile::new("a", 0.1, 1.0, 0.0),
            Profile::new("b", 0.2, 2.0, 0.0),
        ])
        .unwrap();
        assert_eq!(table.get(3).name, "b");
    }
}
