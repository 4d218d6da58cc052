use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// [Observation] is the 1-based sequence number of a persisted record.
/// Numbering continues across sittings when the summary file already
/// holds data rows.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize)]
pub struct Observation(pub u64);

impl Observation {
    /// Mutates the [Observation] by 1.
    pub fn increase_by_one(&mut self) {
        self.0 += 1
    }

    /// Returns a new [Observation] increased by 1.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

/// [Units] is a signed win or loss expressed in initial-bet units.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Deserialize, Serialize)]
pub struct Units(i64);

impl Units {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn reversed(&self) -> Self {
        Self(-self.0)
    }
}

impl From<i64> for Units {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Units> for i64 {
    fn from(value: Units) -> Self {
        value.0
    }
}

impl Add for Units {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Units {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}
