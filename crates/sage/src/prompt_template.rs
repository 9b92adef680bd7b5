use indoc::indoc;
use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

use crate::models::tool::ToolDescriptor;

const SYSTEM_TEMPLATE: &str = indoc! {r#"
    You are a helpful research assistant. Today is {{ date }}.

    You have access to the following tools:
    {% for tool in tools %}
    - {{ tool.name }}: {{ tool.description }}
    {%- endfor %}

    Use a tool whenever it would give a more accurate or more current answer than you could
    give from memory, and call several tools at once when the question needs more than one
    lookup. When no tool is needed, answer directly. If a tool reports that something was not
    found or failed, say so plainly instead of guessing.

    When the user shares a document, base your answer on its content.
"#};

#[derive(Serialize)]
struct ToolSummary<'a> {
    name: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct SystemContext<'a> {
    date: String,
    tools: Vec<ToolSummary<'a>>,
}

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

/// Render the system prompt that introduces every available tool to the model
pub fn system_prompt(tools: &[ToolDescriptor]) -> Result<String, TeraError> {
    let context = SystemContext {
        date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        tools: tools
            .iter()
            .map(|tool| ToolSummary {
                name: &tool.name,
                description: &tool.description,
            })
            .collect(),
    };
    load_prompt(SYSTEM_TEMPLATE, &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_load_prompt() {
        let template = "Hello, {{ name }}! You are {{ age }} years old.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "Alice".to_string());
        context.insert("age".to_string(), 30.to_string());

        let result = load_prompt(template, &context).unwrap();
        assert_eq!(result, "Hello, Alice! You are 30 years old.");
    }

    #[test]
    fn test_load_prompt_missing_variable() {
        let template = "Hello, {{ name }}! You are {{ age }} years old.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "Alice".to_string());
        assert!(load_prompt(template, &context).is_err());
    }

    #[test]
    fn test_system_prompt_lists_tools_in_order() {
        let tools = vec![
            ToolDescriptor::new("weather", "Get current weather", json!({})),
            ToolDescriptor::new("country_info", "Facts about a country", json!({})),
        ];
        let prompt = system_prompt(&tools).unwrap();

        let weather = prompt.find("- weather: Get current weather").unwrap();
        let country = prompt.find("- country_info: Facts about a country").unwrap();
        assert!(weather < country);
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_system_prompt_without_tools() {
        let prompt = system_prompt(&[]).unwrap();
        assert!(prompt.starts_with("You are a helpful research assistant."));
    }
}
