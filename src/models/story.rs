use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub name: String,
    pub sprint: String,
    pub status: Option<String>,
    pub story_type: String, // "Story" | "Bug" | "Task" | ...
    pub estimate: Option<f64>,
    pub progress: Option<f64>,
}

/// Points left and mean progress of a sprint's backlog at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SprintTally {
    pub points_left: f64,
    pub progress: f64,
    pub story_count: usize,
}
