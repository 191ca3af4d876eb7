use std::num::NonZeroU32;

use derive_more::{Deref, Display};

use crate::{Exercise, MuscleGroup, ReadError};

#[allow(async_fn_in_trait)]
pub trait CatalogRepository {
    async fn read_muscle_groups(&self) -> Result<Vec<MuscleGroup>, ReadError>;
    async fn read_exercises(&self, page: Page) -> Result<Vec<Exercise>, ReadError>;
}

#[derive(Deref, Display, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Page(NonZeroU32);

impl Page {
    pub const FIRST: Page = Page(NonZeroU32::MIN);

    #[must_use]
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    #[must_use]
    pub fn number(self) -> u32 {
        self.0.get()
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    #[must_use]
    pub fn previous(self) -> Option<Self> {
        Self::new(self.number() - 1)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::FIRST
    }
}

/// The last successfully fetched catalog data.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CatalogPage {
    pub page: Page,
    pub exercises: Vec<Exercise>,
    pub muscle_groups: Vec<MuscleGroup>,
}

impl CatalogPage {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty() && self.muscle_groups.is_empty()
    }
}
