//! Turn a normalized model reply into ordered task records

use serde_json::{Map, Value};
use tracing::debug;

use super::json::{extract_json_array, extract_json_from_response, normalize_value};
use crate::error::ParserError;
use crate::planner::types::TaskItem;

/// JSON-looking substrings of a model reply, most specific first.
///
/// The object span handles `{"tasks": [...]}`; the array span rescues a bare
/// `[{...}, {...}]`, which the greedy object span would cut in half.
pub fn json_candidates(raw: &str) -> Vec<String> {
    let mut candidates = Vec::new();

    // Some replies arrive as one JSON-encoded string
    let trimmed = raw.trim();
    if trimmed.len() > 1 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        candidates.push(trimmed.to_string());
    }

    let object = extract_json_from_response(raw);
    if object.starts_with('{') {
        candidates.push(object);
    }
    if let Some(array) = extract_json_array(raw) {
        if !candidates.contains(&array) {
            candidates.push(array);
        }
    }

    candidates
}

/// Parse the first candidate that yields a non-empty task list
pub fn parse_candidates(candidates: &[String]) -> Result<Vec<TaskItem>, ParserError> {
    let mut last_err = ParserError::NoPayload;

    for candidate in candidates {
        match parse_tasks_json(candidate) {
            Ok(tasks) => return Ok(tasks),
            Err(e) => {
                debug!(
                    "Rejected candidate ({}): {}...",
                    e,
                    candidate.chars().take(120).collect::<String>()
                );
                last_err = e;
            }
        }
    }

    Err(last_err)
}

/// Normalize and parse a raw model reply in one go
pub fn parse_task_list(raw: &str) -> Result<Vec<TaskItem>, ParserError> {
    parse_candidates(&json_candidates(raw))
}

/// Accept `{"tasks": [...]}` or a bare array
pub fn parse_tasks_json(json_str: &str) -> Result<Vec<TaskItem>, ParserError> {
    // A reply that is itself a JSON string holds the payload one level down
    let value = match normalize_value(serde_json::from_str(json_str)?) {
        Value::String(inner) => serde_json::from_str(&inner)?,
        other => other,
    };

    let entries = match value {
        Value::Object(mut obj) => match obj.remove("tasks") {
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(ParserError::UnexpectedShape(format!(
                    "\"tasks\" is {}, expected an array",
                    kind_of(&other)
                )))
            }
            None => {
                return Err(ParserError::UnexpectedShape(
                    "object without a \"tasks\" field".to_string(),
                ))
            }
        },
        Value::Array(entries) => entries,
        other => {
            return Err(ParserError::UnexpectedShape(format!(
                "top-level {}",
                kind_of(&other)
            )))
        }
    };

    let tasks: Vec<TaskItem> = entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| entry.as_object().map(|obj| task_from_object(idx, obj)))
        .collect();

    if tasks.is_empty() {
        return Err(ParserError::NoTasks);
    }

    Ok(tasks)
}

/// Build a task from one array entry; missing fields get defaults.
/// Issue fields are carried over so a saved plan can be re-read.
fn task_from_object(idx: usize, obj: &Map<String, Value>) -> TaskItem {
    let step = text_field(obj, "step").unwrap_or_else(|| format!("Step {}", idx + 1));
    let task = text_field(obj, "task").unwrap_or_else(|| "Task".to_string());
    let mut item = TaskItem::new(step, task);

    if let Some(description) = text_field(obj, "description") {
        item.description = description;
    }
    if let Some(estimate) = text_field(obj, "estimated_time") {
        item.estimated_time = estimate;
    }
    item.technologies = list_field(obj, "technologies");
    item.deliverables = list_field(obj, "deliverables");
    item.jira_issue = text_field(obj, "jira_issue");
    item.jira_link = text_field(obj, "jira_link");
    item.github_issue = text_field(obj, "github_issue");
    item.github_link = text_field(obj, "github_link");
    item
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(scalar_text)
}

fn list_field(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(other).into_iter().collect(),
        None => Vec::new(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_encoded_reply() {
        let raw = r#""```json\n{\"tasks\": [{\"step\": \"Design\", \"task\": \"Sketch screens\"}]}\n```""#;
        assert_eq!(json_candidates(raw)[0], raw);

        let tasks = parse_task_list(raw).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task, "Sketch screens");

        assert!(parse_tasks_json(r#""just words""#).is_err());
    }

    #[test]
    fn test_parse_wrapped_tasks_in_order() {
        let raw = r#"Here is the plan: ```json {"tasks":[
            {"step": "Backend Development", "task": "Build API", "description": "REST endpoints",
             "technologies": ["Rust", "Postgres"], "deliverables": ["API"], "estimated_time": "2 weeks"},
            {"step": "Design", "task": "Design Mockups", "description": "Figma screens",
             "technologies": ["Figma"], "deliverables": ["Mockups"], "estimated_time": "1 week"}
        ]} ``` Thanks!"#;

        let tasks = parse_task_list(raw).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].step, "Backend Development");
        assert_eq!(tasks[0].technologies, vec!["Rust", "Postgres"]);
        assert_eq!(tasks[1].task, "Design Mockups");
        assert_eq!(tasks[1].estimated_time, "1 week");
    }

    #[test]
    fn test_bare_array_survives_normalization() {
        let raw = r#"```json
[{"step": "One", "task": "First"}, {"step": "Two", "task": "Second"}]
```"#;
        let tasks = parse_task_list(raw).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].step, "Two");
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let tasks = parse_tasks_json(r#"{"tasks": [{"task": "Only a title"}, {}]}"#).unwrap();
        assert_eq!(tasks[0].step, "Step 1");
        assert_eq!(tasks[0].description, "Only a title");
        assert!(tasks[0].technologies.is_empty());
        assert_eq!(tasks[0].estimated_time, "TBD");
        assert_eq!(tasks[1].step, "Step 2");
        assert_eq!(tasks[1].task, "Task");
    }

    #[test]
    fn test_loose_field_types() {
        let tasks = parse_tasks_json(
            r#"[{"step": "QA", "task": "Test", "technologies": "Jest", "estimated_time": 3,
                 "deliverables": ["Report", 7, null, ""]}]"#,
        )
        .unwrap();
        assert_eq!(tasks[0].technologies, vec!["Jest"]);
        assert_eq!(tasks[0].estimated_time, "3");
        assert_eq!(tasks[0].deliverables, vec!["Report", "7"]);
    }

    #[test]
    fn test_saved_plan_keeps_issue_links() {
        let tasks = parse_task_list(
            r#"{"tasks": [{"step": "Backend", "task": "API", "github_issue": "7",
                "github_link": "https://github.com/acme/widgets/issues/7"}], "note": "x"}"#,
        )
        .unwrap();
        assert_eq!(tasks[0].github_issue.as_deref(), Some("7"));
        assert!(tasks[0].jira_issue.is_none());
    }

    #[test]
    fn test_non_object_entries_skipped() {
        let tasks = parse_tasks_json(r#"{"tasks": ["junk", {"step": "S", "task": "T"}]}"#).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].step, "S");
    }

    #[test]
    fn test_wrong_shapes_rejected() {
        assert!(matches!(
            parse_tasks_json(r#"{"plan": []}"#),
            Err(ParserError::UnexpectedShape(_))
        ));
        assert!(matches!(
            parse_tasks_json(r#"{"tasks": "none"}"#),
            Err(ParserError::UnexpectedShape(_))
        ));
        assert!(matches!(
            parse_tasks_json(r#"{"tasks": []}"#),
            Err(ParserError::NoTasks)
        ));
        assert!(matches!(parse_tasks_json("{oops"), Err(ParserError::Json(_))));
    }

    #[test]
    fn test_prose_has_no_candidates() {
        assert!(json_candidates("I would start by talking to users.").is_empty());
        assert!(matches!(
            parse_task_list("I would start by talking to users."),
            Err(ParserError::NoPayload)
        ));
    }
}
