use std::collections::{BTreeSet, HashSet};

use crate::{Exercise, MuscleGroup, MuscleGroupID};

/// Compound filter over a page of exercises.
///
/// The filter is a value: edits return a new filter and never touch one that was already handed
/// out.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExerciseFilter {
    pub name: String,
    pub muscle_groups: BTreeSet<MuscleGroupID>,
}

impl ExerciseFilter {
    /// Returns the exercises matching the name pattern or any of the selected muscle groups.
    ///
    /// The name pattern is matched as case-sensitive literal text. An empty filter lets every
    /// exercise pass. The order of `exercises` is kept and each exercise ID occurs at most once.
    #[must_use]
    pub fn exercises<'a>(
        &self,
        exercises: impl IntoIterator<Item = &'a Exercise>,
    ) -> Vec<&'a Exercise> {
        let mut seen = HashSet::new();
        exercises
            .into_iter()
            .filter(|e| self.matches(e))
            .filter(|e| seen.insert(&e.id))
            .collect()
    }

    #[must_use]
    pub fn matches(&self, exercise: &Exercise) -> bool {
        if self.is_empty() {
            return true;
        }
        (!self.name.is_empty() && exercise.name.contains(&self.name))
            || self.muscle_groups.contains(&exercise.muscle_group)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.muscle_groups.is_empty()
    }

    #[must_use]
    pub fn with_name(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            muscle_groups: self.muscle_groups.clone(),
        }
    }

    #[must_use]
    pub fn with_muscle_group_toggled(&self, muscle_group: &MuscleGroupID) -> Self {
        let mut muscle_groups = self.muscle_groups.clone();
        if !muscle_groups.remove(muscle_group) {
            muscle_groups.insert(muscle_group.clone());
        }
        Self {
            name: self.name.clone(),
            muscle_groups,
        }
    }

    #[must_use]
    pub fn muscle_group_list<'a>(
        &self,
        muscle_groups: &'a [MuscleGroup],
    ) -> Vec<(&'a MuscleGroup, bool)> {
        muscle_groups
            .iter()
            .map(|m| (m, self.muscle_groups.contains(&m.id)))
            .collect()
    }
}
