use chrono::{DateTime, Utc};
use derive_more::{Deref, Display};

use crate::Name;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub muscle_group: MuscleGroupID,
    pub difficulty: Difficulty,
    pub image: String,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: UserID,
}

#[derive(Deref, Display, Debug, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(String);

impl From<&str> for ExerciseID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ExerciseID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuscleGroup {
    pub id: MuscleGroupID,
    pub name: Name,
}

#[derive(Deref, Display, Debug, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct MuscleGroupID(String);

impl From<&str> for MuscleGroupID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MuscleGroupID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Deref, Display, Debug, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct UserID(String);

impl From<&str> for UserID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Deref, Display, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const EASIEST: Difficulty = Difficulty(1);
    pub const HARDEST: Difficulty = Difficulty(5);

    pub fn new(value: u8) -> Result<Self, DifficultyError> {
        if !(Self::EASIEST.0..=Self::HARDEST.0).contains(&value) {
            return Err(DifficultyError::OutOfRange(value));
        }
        Ok(Self(value))
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = DifficultyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DifficultyError {
    #[error("Difficulty must be in the range 1 to 5 ({0})")]
    OutOfRange(u8),
}
