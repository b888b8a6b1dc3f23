mod json;
mod tasks;

pub use tasks::{json_candidates, parse_candidates, parse_task_list};
