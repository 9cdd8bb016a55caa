use crate::models::{Exercise, SetType};

/// Contiguous run of exercises performed back-to-back.
///
/// Normal exercises always form a group of one; superset and circuit
/// exercises chain onto the previous exercise through `linked_to_previous`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseGroup {
    pub exercises: Vec<Exercise>,
}

impl ExerciseGroup {
    fn open(first: Exercise) -> Self {
        Self {
            exercises: vec![first],
        }
    }

    pub fn set_type(&self) -> SetType {
        self.exercises
            .first()
            .map(|exercise| exercise.set_type)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn contains(&self, exercise_id: i64) -> bool {
        self.position(exercise_id).is_some()
    }

    pub fn position(&self, exercise_id: i64) -> Option<usize> {
        self.exercises
            .iter()
            .position(|exercise| exercise.id == exercise_id)
    }

    pub fn last(&self) -> Option<&Exercise> {
        self.exercises.last()
    }

    pub fn ids(&self) -> Vec<i64> {
        self.exercises.iter().map(|exercise| exercise.id).collect()
    }

    /// Header shown above a chained group, or the exercise name for singletons.
    pub fn label(&self) -> String {
        match (self.len(), self.set_type()) {
            (n, SetType::Superset) if n > 1 => "Superset".to_string(),
            (n, SetType::Circuit) if n > 1 => "Circuit".to_string(),
            _ => self
                .exercises
                .first()
                .map(|exercise| exercise.name.clone())
                .unwrap_or_default(),
        }
    }
}

fn continues_chain(previous: &Exercise, exercise: &Exercise) -> bool {
    exercise.linked_to_previous
        && exercise.set_type == previous.set_type
        && exercise.set_type.is_chainable()
}

/// Partition an ordered exercise list into groups in a single pass.
///
/// Pure: the same input always yields the same groups.
pub fn group_exercises(exercises: &[Exercise]) -> Vec<ExerciseGroup> {
    let mut groups = Vec::new();
    let mut current: Option<ExerciseGroup> = None;

    for exercise in exercises {
        current = match current.take() {
            Some(mut group) => {
                let chained = group
                    .last()
                    .map(|previous| continues_chain(previous, exercise))
                    .unwrap_or(false);
                if chained {
                    group.exercises.push(exercise.clone());
                    Some(group)
                } else {
                    groups.push(group);
                    Some(ExerciseGroup::open(exercise.clone()))
                }
            }
            None => Some(ExerciseGroup::open(exercise.clone())),
        };
    }

    if let Some(group) = current {
        groups.push(group);
    }

    groups
}

pub fn group_of(exercises: &[Exercise], exercise_id: i64) -> Option<ExerciseGroup> {
    group_exercises(exercises)
        .into_iter()
        .find(|group| group.contains(exercise_id))
}

/// `None` when the exercise is not part of the list.
pub fn is_last_in_group(exercises: &[Exercise], exercise_id: i64) -> Option<bool> {
    group_of(exercises, exercise_id)
        .and_then(|group| group.last().map(|last| last.id == exercise_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(id: i64, set_type: SetType, linked: bool) -> Exercise {
        Exercise::new(id, format!("exercise-{id}")).with_set_type(set_type, linked)
    }

    fn ids(groups: &[ExerciseGroup]) -> Vec<Vec<i64>> {
        groups.iter().map(ExerciseGroup::ids).collect()
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group_exercises(&[]).is_empty());
    }

    #[test]
    fn superset_chain_between_normal_exercises() {
        let list = vec![
            exercise(1, SetType::Normal, false),
            exercise(2, SetType::Superset, false),
            exercise(3, SetType::Superset, true),
            exercise(4, SetType::Normal, false),
        ];
        assert_eq!(ids(&group_exercises(&list)), vec![vec![1], vec![2, 3], vec![4]]);
    }

    #[test]
    fn linked_exercises_with_different_types_do_not_merge() {
        let list = vec![
            exercise(1, SetType::Superset, false),
            exercise(2, SetType::Circuit, true),
        ];
        assert_eq!(ids(&group_exercises(&list)), vec![vec![1], vec![2]]);
    }

    #[test]
    fn unlinked_superset_opens_its_own_group() {
        let list = vec![
            exercise(1, SetType::Superset, false),
            exercise(2, SetType::Superset, true),
            exercise(3, SetType::Superset, false),
            exercise(4, SetType::Superset, true),
        ];
        assert_eq!(ids(&group_exercises(&list)), vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn linked_normal_and_dropset_exercises_stay_single() {
        let list = vec![
            exercise(1, SetType::Normal, false),
            exercise(2, SetType::Normal, true),
            exercise(3, SetType::Dropset, false),
            exercise(4, SetType::Dropset, true),
        ];
        assert_eq!(
            ids(&group_exercises(&list)),
            vec![vec![1], vec![2], vec![3], vec![4]]
        );
    }

    #[test]
    fn long_circuit_chains_together() {
        let list = vec![
            exercise(1, SetType::Circuit, false),
            exercise(2, SetType::Circuit, true),
            exercise(3, SetType::Circuit, true),
            exercise(4, SetType::Circuit, true),
        ];
        let groups = group_exercises(&list);
        assert_eq!(ids(&groups), vec![vec![1, 2, 3, 4]]);
        assert_eq!(groups[0].label(), "Circuit");
    }

    #[test]
    fn regrouping_is_stable() {
        let list = vec![
            exercise(1, SetType::Superset, false),
            exercise(2, SetType::Superset, true),
            exercise(3, SetType::Normal, false),
        ];
        assert_eq!(group_exercises(&list), group_exercises(&list));
    }

    #[test]
    fn last_in_group_queries() {
        let list = vec![
            exercise(1, SetType::Superset, false),
            exercise(2, SetType::Superset, true),
            exercise(3, SetType::Normal, false),
        ];
        assert_eq!(is_last_in_group(&list, 1), Some(false));
        assert_eq!(is_last_in_group(&list, 2), Some(true));
        assert_eq!(is_last_in_group(&list, 3), Some(true));
        assert_eq!(is_last_in_group(&list, 99), None);
        assert_eq!(group_of(&list, 1).map(|g| g.label()), Some("Superset".to_string()));
        assert_eq!(group_of(&list, 3).map(|g| g.label()), Some("exercise-3".to_string()));
    }
}
