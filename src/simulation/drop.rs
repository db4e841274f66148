use crate::config::{GRID_HEIGHT, GRID_WIDTH};

/// Per-drop shape factors. All 1.0 for plain drops.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropScales {
    /// Amplitude multiplier
    pub weight: f32,
    /// Ring thickness multiplier
    pub sigma: f32,
    /// Propagation speed multiplier
    pub speed: f32,
    /// Divides both the spatial damping and the envelope clock
    pub damping: f32,
}

impl DropScales {
    pub const UNIT: Self = Self {
        weight: 1.0,
        sigma: 1.0,
        speed: 1.0,
        damping: 1.0,
    };
}

impl Default for DropScales {
    fn default() -> Self {
        Self::UNIT
    }
}

/// A point wave source
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drop {
    pub x: f32,
    pub y: f32,
    /// Ticks since spawn
    pub age: f32,
    pub scales: DropScales,
}

impl Drop {
    /// New drop at age 0; the position is clamped onto the grid
    pub fn new(x: f32, y: f32, scales: DropScales) -> Self {
        Self {
            x: clamp_coord(x, GRID_WIDTH),
            y: clamp_coord(y, GRID_HEIGHT),
            age: 0.0,
            scales,
        }
    }
}

fn clamp_coord(v: f32, extent: usize) -> f32 {
    let max = (extent - 1) as f32;
    if v.is_nan() {
        max * 0.5
    } else {
        v.clamp(0.0, max)
    }
}

/// Fixed-capacity slot arena of drops. Empty slots are `None`; the backing
/// storage is sized once and never grows.
#[derive(Clone, Debug)]
pub struct DropSet {
    slots: Box<[Option<Drop>]>,
}

impl DropSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Drop> {
        self.slots.iter().flatten()
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    /// Advance every live drop by `dt`
    pub fn age_all(&mut self, dt: f32) {
        for drop in self.slots.iter_mut().flatten() {
            drop.age += dt;
        }
    }

    /// Remove drops older than `max_age`, returning how many were removed
    pub fn retire_older_than(&mut self, max_age: f32) -> usize {
        let mut retired = 0;
        for slot in self.slots.iter_mut() {
            if slot.is_some_and(|d| d.age > max_age) {
                *slot = None;
                retired += 1;
            }
        }
        retired
    }

    /// Place into the first free slot; hands the drop back when full
    pub fn insert(&mut self, drop: Drop) -> Result<usize, Drop> {
        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(drop);
                Ok(index)
            }
            None => Err(drop),
        }
    }

    /// Replace the oldest drop (first one on ties)
    pub fn replace_oldest(&mut self, drop: Drop) -> usize {
        let index = self.oldest_slot().unwrap_or(0);
        self.slots[index] = Some(drop);
        index
    }

    pub fn oldest_age(&self) -> Option<f32> {
        self.oldest_slot()
            .and_then(|i| self.slots[i].map(|d| d.age))
    }

    pub fn youngest_age(&self) -> Option<f32> {
        self.iter().map(|d| d.age).reduce(f32::min)
    }

    fn oldest_slot(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some(d) = slot {
                if best.map_or(true, |(_, age)| d.age > age) {
                    best = Some((i, d.age));
                }
            }
        }
        best.map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drop_at(x: f32, y: f32) -> Drop {
        Drop::new(x, y, DropScales::UNIT)
    }

    #[test]
    fn test_new_drop_clamped_to_grid() {
        let d = drop_at(-3.0, 40.0);
        assert_eq!((d.x, d.y), (0.0, 24.0));
        assert_eq!(d.age, 0.0);
    }

    #[test]
    fn test_insert_until_full() {
        let mut set = DropSet::with_capacity(3);
        for i in 0..3 {
            assert_eq!(set.insert(drop_at(i as f32, 0.0)), Ok(i));
        }
        assert!(set.is_full());
        assert!(set.insert(drop_at(5.0, 5.0)).is_err());
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_replace_oldest() {
        let mut set = DropSet::with_capacity(2);
        set.insert(drop_at(1.0, 1.0)).unwrap();
        set.age_all(10.0);
        set.insert(drop_at(2.0, 2.0)).unwrap();
        set.age_all(1.0);

        assert_eq!(set.oldest_age(), Some(11.0));
        assert_eq!(set.youngest_age(), Some(1.0));

        let slot = set.replace_oldest(drop_at(3.0, 3.0));
        assert_eq!(slot, 0);
        assert_eq!(set.oldest_age(), Some(1.0));
        assert_eq!(set.youngest_age(), Some(0.0));
    }

    #[test]
    fn test_retire_frees_slot() {
        let mut set = DropSet::with_capacity(3);
        set.insert(drop_at(1.0, 1.0)).unwrap();
        set.age_all(5.0);
        set.insert(drop_at(2.0, 2.0)).unwrap();

        assert_eq!(set.retire_older_than(4.0), 1);
        assert_eq!(set.len(), 1);
        assert_eq!(set.insert(drop_at(3.0, 3.0)), Ok(0));
    }
}
