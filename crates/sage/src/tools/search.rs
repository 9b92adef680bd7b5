use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{endpoint, parse_arguments, Tool};
use crate::errors::AgentResult;
use crate::models::tool::ToolDescriptor;

const MAX_RESULTS: usize = 3;

/// Which Tavily index a search runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTopic {
    General,
    News,
}

impl SearchTopic {
    fn as_str(self) -> &'static str {
        match self {
            SearchTopic::General => "general",
            SearchTopic::News => "news",
        }
    }
}

/// Web or news search backed by the Tavily search API
pub struct SearchTool {
    client: reqwest::Client,
    host: String,
    api_key: Option<String>,
    topic: SearchTopic,
    descriptor: ToolDescriptor,
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl SearchTool {
    pub fn web(client: reqwest::Client, host: &str, api_key: Option<String>) -> Self {
        Self::new(
            client,
            host,
            api_key,
            SearchTopic::General,
            ToolDescriptor::new(
                "web_search",
                "Search the web for current information, facts, and answers to general questions.",
                query_schema("The search query"),
            ),
        )
    }

    pub fn news(client: reqwest::Client, host: &str, api_key: Option<String>) -> Self {
        Self::new(
            client,
            host,
            api_key,
            SearchTopic::News,
            ToolDescriptor::new(
                "news_search",
                "Search for recent news articles",
                query_schema("News topic to search"),
            ),
        )
    }

    fn new(
        client: reqwest::Client,
        host: &str,
        api_key: Option<String>,
        topic: SearchTopic,
        descriptor: ToolDescriptor,
    ) -> Self {
        Self {
            client,
            host: host.to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
            topic,
            descriptor,
        }
    }

    async fn search(&self, query: &str) -> Result<SearchResponse, String> {
        let Some(api_key) = &self.api_key else {
            return Err("no search API key is configured".to_string());
        };

        let payload = json!({
            "api_key": api_key,
            "query": query,
            "topic": self.topic.as_str(),
            "max_results": MAX_RESULTS,
            "include_answer": true,
            "search_depth": "basic",
        });

        let response = self
            .client
            .post(endpoint(&self.host, "search"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "search request failed");
                "the search service could not be reached".to_string()
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("the search service returned {}", status.as_u16()));
        }

        response.json::<SearchResponse>().await.map_err(|e| {
            tracing::warn!(error = %e, "unreadable search response");
            "the search service returned an unreadable response".to_string()
        })
    }
}

fn query_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": description
            }
        },
        "required": ["query"]
    })
}

fn format_results(query: &str, response: SearchResponse) -> String {
    let mut sections = Vec::new();
    if let Some(answer) = response.answer.filter(|a| !a.trim().is_empty()) {
        sections.push(format!("Answer: {}", answer.trim()));
    }

    let hits: Vec<String> = response
        .results
        .iter()
        .take(MAX_RESULTS)
        .enumerate()
        .map(|(i, hit)| format!("{}. {} ({})\n{}", i + 1, hit.title, hit.url, hit.content))
        .collect();

    if sections.is_empty() && hits.is_empty() {
        return format!("No results found for \"{}\"", query);
    }
    if !hits.is_empty() {
        sections.push(hits.join("\n\n"));
    }
    sections.join("\n\n")
}

#[async_trait]
impl Tool for SearchTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, arguments: Value) -> AgentResult<String> {
        let args: SearchArgs = parse_arguments(arguments)?;
        Ok(match self.search(&args.query).await {
            Ok(response) => format_results(&args.query, response),
            Err(reason) => format!("Search failed: {}", reason),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_answer_and_hits() {
        let response = SearchResponse {
            answer: Some("Rust 1.0 shipped in 2015.".to_string()),
            results: vec![
                SearchHit {
                    title: "Announcing Rust 1.0".to_string(),
                    url: "https://blog.rust-lang.org/2015/05/15/Rust-1.0.html".to_string(),
                    content: "Today we are very proud to announce the 1.0 release".to_string(),
                },
                SearchHit {
                    title: "Rust (programming language)".to_string(),
                    url: "https://en.wikipedia.org/wiki/Rust".to_string(),
                    content: "Rust is a general-purpose programming language".to_string(),
                },
            ],
        };
        let text = format_results("rust release", response);
        assert_eq!(
            text,
            "Answer: Rust 1.0 shipped in 2015.\n\n\
             1. Announcing Rust 1.0 (https://blog.rust-lang.org/2015/05/15/Rust-1.0.html)\n\
             Today we are very proud to announce the 1.0 release\n\n\
             2. Rust (programming language) (https://en.wikipedia.org/wiki/Rust)\n\
             Rust is a general-purpose programming language"
        );
    }

    #[test]
    fn test_format_empty() {
        let response = SearchResponse {
            answer: None,
            results: vec![],
        };
        assert_eq!(
            format_results("zzqx", response),
            "No results found for \"zzqx\""
        );
    }

    #[tokio::test]
    async fn test_missing_api_key_is_reported_as_text() {
        let tool = SearchTool::web(reqwest::Client::new(), "http://localhost:1", None);
        let text = tool.execute(json!({"query": "anything"})).await.unwrap();
        assert!(text.starts_with("Search failed:"));
    }

    #[test]
    fn test_topics() {
        let client = reqwest::Client::new();
        assert_eq!(
            SearchTool::news(client.clone(), "http://h", None).topic,
            SearchTopic::News
        );
        assert_eq!(
            SearchTool::web(client, "http://h", None).descriptor().name,
            "web_search"
        );
    }
}
