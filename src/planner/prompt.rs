const PLAN_PROMPT: &str = include_str!("../../prompts/plan.md");

/// Fill the planning template with the caller's goal
pub fn render_prompt(goal: &str) -> String {
    PLAN_PROMPT.replace("{{GOAL}}", goal.trim())
}
