//! Goal planning: prompt, model call, fallback plans and the state machine tying them together

pub mod fallback;
pub mod keywords;
pub mod orchestrator;
pub mod prompt;
pub mod types;

pub use orchestrator::Planner;
pub use types::{GoalRequest, PlanResponse, TaskItem};
