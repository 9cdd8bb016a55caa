pub mod algorithm;

pub use algorithm::{group_exercises, group_of, is_last_in_group, ExerciseGroup};
