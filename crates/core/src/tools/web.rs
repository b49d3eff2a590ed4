//! URL fetch-and-summarize against the web collaborator.

use super::{Tool, ToolContext, ToolFamily};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

/// A fetched page reduced to what the model needs to talk about it.
#[derive(Debug, Clone)]
pub struct PageSummary {
    pub title: String,
    pub summary: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebBackend: Send + Sync {
    async fn fetch_summary(&self, url: &str) -> anyhow::Result<PageSummary>;
}

pub struct FetchUrlTool {
    backend: Arc<dyn WebBackend>,
}

impl FetchUrlTool {
    pub fn new(backend: Arc<dyn WebBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for FetchUrlTool {
    fn name(&self) -> &str {
        "fetch_url"
    }

    fn description(&self) -> &str {
        "Fetches a web page and returns its title and a short summary."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "Absolute http(s) URL to fetch." }
            },
            "required": ["url"]
        })
    }

    fn long_running(&self) -> bool {
        true
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<Value> {
        let Some(url) = args.get("url").and_then(Value::as_str) else {
            return Ok(json!({"success": false, "error": "missing required argument: url"}));
        };
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Ok(json!({"success": false, "error": format!("not an http(s) url: {url}")}));
        }

        ctx.report(ToolFamily::Web, "fetching", url).await;
        let page = self.backend.fetch_summary(url).await?;
        Ok(json!({
            "url": url,
            "title": page.title,
            "summary": page.summary,
        }))
    }
}
