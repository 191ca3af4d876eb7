use crate::{Exercise, ExerciseID};

/// Exercises chosen for a workout, in the order they were chosen.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    exercises: Vec<Exercise>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes the exercise if it is selected, otherwise appends it.
    pub fn toggle(&mut self, exercise: &Exercise) {
        match self.index_of(&exercise.id) {
            Some(index) => {
                self.exercises.remove(index);
            }
            None => self.exercises.push(exercise.clone()),
        }
    }

    /// 1-based position of the exercise in the selection.
    #[must_use]
    pub fn position_of(&self, id: &ExerciseID) -> Option<usize> {
        self.index_of(id).map(|index| index + 1)
    }

    #[must_use]
    pub fn contains(&self, id: &ExerciseID) -> bool {
        self.index_of(id).is_some()
    }

    #[must_use]
    pub fn members(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn into_members(self) -> Vec<Exercise> {
        self.exercises
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    fn index_of(&self, id: &ExerciseID) -> Option<usize> {
        self.exercises.iter().position(|e| e.id == *id)
    }
}
