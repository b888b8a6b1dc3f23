//! CLI handler for the `schema` subcommand

use crate::config::Config;
use schemars::schema_for;

/// JSON Schema describing `planagent.yaml`
pub fn config_schema() -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&schema_for!(Config))?)
}

pub fn execute() -> anyhow::Result<()> {
    println!("{}", config_schema()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_covers_every_section() {
        let schema = config_schema().unwrap();
        for field in ["server", "llm", "jira", "github", "enrichment", "fallback"] {
            assert!(schema.contains(&format!("\"{}\"", field)), "missing {}", field);
        }
        assert!(schema.contains("mobile_keywords"));
        assert!(schema.contains("request_timeout_sec"));
    }
}
