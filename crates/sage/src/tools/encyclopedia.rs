use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{endpoint, parse_arguments, truncate_chars, Tool};
use crate::errors::AgentResult;
use crate::models::tool::ToolDescriptor;

const TOP_RESULTS: &str = "2";
const MAX_CONTENT_CHARS: usize = 2000;
const NO_RESULTS: &str = "No good Wikipedia Search Result was found";
const LOOKUP_FAILED: &str = "Encyclopedia lookup failed";

/// Summaries of the best matching Wikipedia articles
pub struct EncyclopediaTool {
    client: reqwest::Client,
    host: String,
    descriptor: ToolDescriptor,
}

#[derive(Deserialize)]
struct LookupArgs {
    query: String,
}

#[derive(Deserialize)]
struct QueryResponse<T> {
    query: Option<T>,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchEntry>,
}

#[derive(Deserialize)]
struct SearchEntry {
    title: String,
}

#[derive(Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
}

impl EncyclopediaTool {
    pub fn new(client: reqwest::Client, host: &str) -> Self {
        Self {
            client,
            host: host.to_string(),
            descriptor: ToolDescriptor::new(
                "encyclopedia_lookup",
                "Search Wikipedia for factual, historical, or general knowledge questions.",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Topic to search"
                        }
                    },
                    "required": ["query"]
                }),
            ),
        }
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        params: &[(&str, &str)],
    ) -> reqwest::Result<QueryResponse<T>> {
        self.client
            .get(endpoint(&self.host, "w/api.php"))
            .query(params)
            .query(&[("format", "json"), ("formatversion", "2")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    async fn lookup(&self, query: &str) -> reqwest::Result<Vec<Page>> {
        let search: QueryResponse<SearchQuery> = self
            .get(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", TOP_RESULTS),
            ])
            .await?;
        let titles = search.query.map(|q| q.search).unwrap_or_default();

        let mut pages = Vec::new();
        for entry in titles {
            let extract: QueryResponse<PagesQuery> = self
                .get(&[
                    ("action", "query"),
                    ("prop", "extracts"),
                    ("exintro", "1"),
                    ("explaintext", "1"),
                    ("redirects", "1"),
                    ("titles", entry.title.as_str()),
                ])
                .await?;
            pages.extend(
                extract
                    .query
                    .map(|q| q.pages)
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|page| page.extract.as_deref().is_some_and(|e| !e.is_empty())),
            );
        }
        Ok(pages)
    }
}

fn format_pages(pages: &[Page]) -> String {
    let summaries: Vec<String> = pages
        .iter()
        .map(|page| {
            format!(
                "Page: {}\nSummary: {}",
                page.title,
                page.extract.as_deref().unwrap_or_default()
            )
        })
        .collect();
    if summaries.is_empty() {
        return NO_RESULTS.to_string();
    }
    truncate_chars(&summaries.join("\n\n"), MAX_CONTENT_CHARS)
}

#[async_trait]
impl Tool for EncyclopediaTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, arguments: Value) -> AgentResult<String> {
        let args: LookupArgs = parse_arguments(arguments)?;
        Ok(match self.lookup(&args.query).await {
            Ok(pages) => format_pages(&pages),
            Err(e) => {
                tracing::warn!(error = %e, "encyclopedia lookup failed");
                LOOKUP_FAILED.to_string()
            }
        })
    }
}
