//! Exercise snapshot as delivered by the backend for a plan.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SetType {
    #[default]
    Normal,
    Superset,
    Circuit,
    Dropset,
    GiantSet,
}

impl SetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetType::Normal => "normal",
            SetType::Superset => "superset",
            SetType::Circuit => "circuit",
            SetType::Dropset => "dropset",
            SetType::GiantSet => "giant_set",
        }
    }

    /// Superset and circuit exercises can be chained to the previous one.
    pub fn is_chainable(&self) -> bool {
        matches!(self, SetType::Superset | SetType::Circuit)
    }
}

impl std::str::FromStr for SetType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "normal" => Ok(SetType::Normal),
            "superset" => Ok(SetType::Superset),
            "circuit" => Ok(SetType::Circuit),
            "dropset" => Ok(SetType::Dropset),
            "giant_set" => Ok(SetType::GiantSet),
            other => Err(anyhow::anyhow!("unknown set type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub target_series: u32,
    /// Reps, or seconds when `is_isometric` is set.
    pub target_reps_or_seconds: u32,
    pub target_weight: f64,
    pub rest_seconds: u32,
    pub set_type: SetType,
    pub linked_to_previous: bool,
    pub is_isometric: bool,
    pub display_order: i64,
}

impl Exercise {
    /// Plain exercise with sensible defaults, mostly useful for seeding plans.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            target_series: 3,
            target_reps_or_seconds: 10,
            target_weight: 0.0,
            rest_seconds: 60,
            set_type: SetType::Normal,
            linked_to_previous: false,
            is_isometric: false,
            display_order: id,
        }
    }

    pub fn with_set_type(mut self, set_type: SetType, linked_to_previous: bool) -> Self {
        self.set_type = set_type;
        self.linked_to_previous = linked_to_previous;
        self
    }

    pub fn with_rest(mut self, rest_seconds: u32) -> Self {
        self.rest_seconds = rest_seconds;
        self
    }

    pub fn with_target_series(mut self, target_series: u32) -> Self {
        self.target_series = target_series;
        self
    }
}
