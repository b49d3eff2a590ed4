//! Code execution against the Interpreter collaborator.

use super::{Tool, ToolContext, ToolFamily};
use crate::artifacts::{ArtifactStore, CodeArtifact};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

/// Result of one sandboxed execution.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// The Interpreter collaborator: runs a snippet in a sandbox and reports
/// captured output.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InterpreterBackend: Send + Sync {
    async fn execute(&self, language: &str, code: &str) -> anyhow::Result<ExecutionOutcome>;
}

fn execution_response(artifact: &CodeArtifact) -> Value {
    json!({
        "artifact_id": artifact.id,
        "language": artifact.language,
        "exit_code": artifact.exit_code,
        "stdout": artifact.stdout,
        "stderr": artifact.stderr,
        "status": if artifact.exit_code == 0 { "completed" } else { "failed" },
    })
}

pub struct RunCodeTool {
    backend: Arc<dyn InterpreterBackend>,
    store: ArtifactStore<CodeArtifact>,
}

impl RunCodeTool {
    pub fn new(backend: Arc<dyn InterpreterBackend>, store: ArtifactStore<CodeArtifact>) -> Self {
        Self { backend, store }
    }
}

#[async_trait]
impl Tool for RunCodeTool {
    fn name(&self) -> &str {
        "run_code"
    }

    fn description(&self) -> &str {
        "Executes a code snippet in a sandbox and returns its output."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": { "type": "string", "description": "The snippet to execute." },
                "language": {
                    "type": "string",
                    "description": "Language of the snippet. Defaults to python."
                }
            },
            "required": ["code"]
        })
    }

    fn long_running(&self) -> bool {
        true
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<Value> {
        let Some(code) = args.get("code").and_then(Value::as_str) else {
            return Ok(json!({"success": false, "error": "missing required argument: code"}));
        };
        let language = args
            .get("language")
            .and_then(Value::as_str)
            .unwrap_or("python");

        ctx.report(ToolFamily::Interpreter, "executing", format!("{language} snippet"))
            .await;
        let outcome = self.backend.execute(language, code).await?;

        let artifact = CodeArtifact {
            id: Uuid::new_v4(),
            language: language.to_string(),
            code: code.to_string(),
            stdout: outcome.stdout,
            stderr: outcome.stderr,
            exit_code: outcome.exit_code,
        };
        self.store.insert(artifact.id, artifact.clone()).await;
        Ok(execution_response(&artifact))
    }
}

pub struct EditCodeTool {
    backend: Arc<dyn InterpreterBackend>,
    store: ArtifactStore<CodeArtifact>,
}

impl EditCodeTool {
    pub fn new(backend: Arc<dyn InterpreterBackend>, store: ArtifactStore<CodeArtifact>) -> Self {
        Self { backend, store }
    }
}

#[async_trait]
impl Tool for EditCodeTool {
    fn name(&self) -> &str {
        "edit_code"
    }

    fn description(&self) -> &str {
        "Replaces a previously executed snippet with new code and re-runs it."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "artifact_id": {
                    "type": "string",
                    "description": "Id of the snippet to replace, as returned by run_code."
                },
                "code": { "type": "string", "description": "The replacement snippet." }
            },
            "required": ["artifact_id", "code"]
        })
    }

    fn long_running(&self) -> bool {
        true
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<Value> {
        let id = args
            .get("artifact_id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok());
        let Some(id) = id else {
            return Ok(json!({"success": false, "error": "artifact_id must be a valid artifact id"}));
        };
        let Some(code) = args.get("code").and_then(Value::as_str) else {
            return Ok(json!({"success": false, "error": "missing required argument: code"}));
        };
        let Some(existing) = self.store.get(id).await else {
            return Ok(json!({"success": false, "error": format!("no code artifact with id {id}")}));
        };

        ctx.report(
            ToolFamily::Interpreter,
            "executing",
            format!("re-running {} snippet", existing.language),
        )
        .await;
        let outcome = self.backend.execute(&existing.language, code).await?;

        let artifact = CodeArtifact {
            id,
            language: existing.language,
            code: code.to_string(),
            stdout: outcome.stdout,
            stderr: outcome.stderr,
            exit_code: outcome.exit_code,
        };
        self.store.insert(id, artifact.clone()).await;
        Ok(execution_response(&artifact))
    }
}
