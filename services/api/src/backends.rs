//! HTTP implementations of the tool backend traits.
//!
//! The Canvas, Interpreter and summarizer collaborators run as separate
//! services; each backend here is a thin reqwest client against the URL
//! configured for it. Request/response shapes are the collaborators'
//! contract, kept private to this module.

use anyhow::Context;
use async_trait::async_trait;
use murmur_core::tools::{
    CanvasBackend, CanvasDraft, ExecutionOutcome, InterpreterBackend, PageSummary, WebBackend,
};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct HttpCanvasBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCanvasBackend {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    prior_source: Option<&'a str>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    findings: &'a [String],
}

#[derive(Deserialize)]
struct GenerateResponse {
    title: String,
    source: String,
}

#[async_trait]
impl CanvasBackend for HttpCanvasBackend {
    async fn generate<'a>(
        &self,
        description: &str,
        prior_source: Option<&'a str>,
        findings: &[String],
    ) -> anyhow::Result<CanvasDraft> {
        let response: GenerateResponse = self
            .client
            .post(format!("{}/generate", self.base_url))
            .json(&GenerateRequest {
                description,
                prior_source,
                findings,
            })
            .send()
            .await
            .context("canvas service unreachable")?
            .error_for_status()
            .context("canvas service rejected the request")?
            .json()
            .await
            .context("canvas service returned a malformed document")?;
        Ok(CanvasDraft {
            title: response.title,
            source: response.source,
        })
    }
}

#[derive(Clone)]
pub struct HttpInterpreterBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInterpreterBackend {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    language: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct ExecuteResponse {
    stdout: String,
    stderr: String,
    exit_code: i32,
}

#[async_trait]
impl InterpreterBackend for HttpInterpreterBackend {
    async fn execute(&self, language: &str, code: &str) -> anyhow::Result<ExecutionOutcome> {
        let response: ExecuteResponse = self
            .client
            .post(format!("{}/execute", self.base_url))
            .json(&ExecuteRequest { language, code })
            .send()
            .await
            .context("interpreter service unreachable")?
            .error_for_status()
            .context("interpreter service rejected the request")?
            .json()
            .await
            .context("interpreter service returned a malformed result")?;
        Ok(ExecutionOutcome {
            stdout: response.stdout,
            stderr: response.stderr,
            exit_code: response.exit_code,
        })
    }
}

#[derive(Clone)]
pub struct HttpWebBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWebBackend {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    title: String,
    summary: String,
}

#[async_trait]
impl WebBackend for HttpWebBackend {
    async fn fetch_summary(&self, url: &str) -> anyhow::Result<PageSummary> {
        let response: SummarizeResponse = self
            .client
            .post(format!("{}/summarize", self.base_url))
            .json(&SummarizeRequest { url })
            .send()
            .await
            .context("summarizer service unreachable")?
            .error_for_status()
            .context("summarizer service rejected the request")?
            .json()
            .await
            .context("summarizer service returned a malformed summary")?;
        Ok(PageSummary {
            title: response.title,
            summary: response.summary,
        })
    }
}
