pub mod chart;
pub mod snapshot;
pub mod sprint;
pub mod story;
