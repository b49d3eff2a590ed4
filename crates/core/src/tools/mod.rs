//! Server-side tool execution.
//!
//! The model requests tool invocations over the live session; the relay
//! resolves each request through a [`ToolExecutor`]. Tools come in two
//! classes: instant ones (pure computation, resolved inline) and
//! long-running ones that delegate to an external collaborator and report
//! progress along the way. Either way the executor never fails at the
//! protocol level: a broken invocation produces a structured
//! `{success: false, error}` payload, because the model must receive *some*
//! result to continue its turn.

mod canvas;
mod clock;
mod interpreter;
mod web;

pub use canvas::{CanvasBackend, CanvasDraft, CreateAppTool, EditAppTool, validate_document};
pub use clock::CurrentTimeTool;
pub use interpreter::{EditCodeTool, ExecutionOutcome, InterpreterBackend, RunCodeTool};
pub use web::{FetchUrlTool, PageSummary, WebBackend};

use crate::session::FunctionSpec;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// One tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub args: Value,
}

/// How the upstream should consume a tool result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheduling {
    /// Consumed in the current turn, in arrival order.
    #[default]
    Default,
    /// Preempts whatever the model is currently generating.
    Interrupt,
}

/// A resolved tool invocation, ready to send upstream.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub id: String,
    pub name: String,
    pub response: Value,
    pub scheduling: Scheduling,
}

/// Tool families, used to route progress updates to distinct client events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFamily {
    Canvas,
    Interpreter,
    Web,
}

/// An interim status report from a long-running tool.
#[derive(Debug, Clone)]
pub struct ToolProgress {
    pub call_id: String,
    pub family: ToolFamily,
    pub status: String,
    pub message: String,
}

/// Execution context handed to a tool: the originating call id plus a sink
/// for progress reports. Instant tools ignore it.
pub struct ToolContext {
    call_id: String,
    progress: mpsc::Sender<ToolProgress>,
}

impl ToolContext {
    pub fn new(call_id: String, progress: mpsc::Sender<ToolProgress>) -> Self {
        Self { call_id, progress }
    }

    /// Reports a progress phase. Delivery is best-effort: if the session
    /// that spawned the tool is gone, the report is dropped.
    pub async fn report(&self, family: ToolFamily, status: &str, message: impl Into<String>) {
        let _ = self
            .progress
            .send(ToolProgress {
                call_id: self.call_id.clone(),
                family,
                status: status.to_string(),
                message: message.into(),
            })
            .await;
    }
}

/// A callable tool. Implementations must be cheap to construct and safe to
/// share; per-invocation state lives in the arguments and context.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema for the tool's arguments.
    fn parameters(&self) -> Value;

    /// Whether execution delegates to a multi-step external operation.
    /// The relay uses this to decide between inline execution and spawning.
    fn long_running(&self) -> bool {
        false
    }

    /// Runs the tool. An `Err` here is an implementation failure; the
    /// executor converts it to a structured result before it can reach the
    /// protocol layer.
    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<Value>;
}

/// Name-keyed registry of tools with injected backing stores.
pub struct ToolExecutor {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolExecutor {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        let tools = tools
            .into_iter()
            .map(|t| (t.name().to_string(), t))
            .collect();
        Self { tools }
    }

    /// Whether a tool name resolves to a long-running implementation.
    /// Unknown names count as instant so their failure result is produced
    /// without a spawn.
    pub fn is_long_running(&self, name: &str) -> bool {
        self.tools.get(name).is_some_and(|t| t.long_running())
    }

    /// Declarations for the given enabled tool names, in registry-agnostic
    /// (sorted) order. Names that do not resolve are skipped.
    pub fn declarations(&self, enabled: &[String]) -> Vec<FunctionSpec> {
        let mut specs: Vec<FunctionSpec> = enabled
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| FunctionSpec {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters(),
            })
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Resolves one tool call to a result payload. Never fails: unknown
    /// names, bad arguments and backend errors all come back as
    /// `{success: false, error}`.
    pub async fn execute(
        &self,
        call: &ToolCallRequest,
        progress: mpsc::Sender<ToolProgress>,
    ) -> Value {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(name = %call.name, "Model requested an unknown tool");
            return json!({
                "success": false,
                "error": format!("unknown tool: {}", call.name),
            });
        };

        info!(name = %call.name, call_id = %call.id, "Executing tool");
        let ctx = ToolContext::new(call.id.clone(), progress);
        match tool.run(call.args.clone(), &ctx).await {
            Ok(mut value) => {
                // Tools return their payload; the success marker is part of
                // the executor contract, so fill it in when absent.
                if let Some(obj) = value.as_object_mut() {
                    obj.entry("success").or_insert(json!(true));
                }
                value
            }
            Err(e) => {
                warn!(name = %call.name, error = %e, "Tool execution failed");
                json!({ "success": false, "error": e.to_string() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "always_fails"
        }
        fn description(&self) -> &str {
            "fails"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn run(&self, _args: Value, _ctx: &ToolContext) -> anyhow::Result<Value> {
            anyhow::bail!("backend exploded")
        }
    }

    fn progress_sink() -> mpsc::Sender<ToolProgress> {
        mpsc::channel(8).0
    }

    #[tokio::test]
    async fn unknown_tool_yields_structured_failure() {
        let executor = ToolExecutor::new(vec![]);
        let call = ToolCallRequest {
            id: "c1".into(),
            name: "nope".into(),
            args: json!({}),
        };
        let result = executor.execute(&call, progress_sink()).await;
        assert_eq!(result["success"], json!(false));
        assert!(result["error"].as_str().unwrap().contains("unknown tool"));
    }

    #[tokio::test]
    async fn tool_error_is_contained_not_propagated() {
        let executor = ToolExecutor::new(vec![Arc::new(FailingTool)]);
        let call = ToolCallRequest {
            id: "c2".into(),
            name: "always_fails".into(),
            args: json!({}),
        };
        let result = executor.execute(&call, progress_sink()).await;
        assert_eq!(result["success"], json!(false));
        assert_eq!(result["error"], json!("backend exploded"));
    }

    #[tokio::test]
    async fn success_marker_is_added_when_missing() {
        struct BareTool;
        #[async_trait]
        impl Tool for BareTool {
            fn name(&self) -> &str {
                "bare"
            }
            fn description(&self) -> &str {
                "returns a payload without a success field"
            }
            fn parameters(&self) -> Value {
                json!({"type": "object", "properties": {}})
            }
            async fn run(&self, _args: Value, _ctx: &ToolContext) -> anyhow::Result<Value> {
                Ok(json!({"answer": 42}))
            }
        }

        let executor = ToolExecutor::new(vec![Arc::new(BareTool)]);
        let call = ToolCallRequest {
            id: "c3".into(),
            name: "bare".into(),
            args: json!({}),
        };
        let result = executor.execute(&call, progress_sink()).await;
        assert_eq!(result["success"], json!(true));
        assert_eq!(result["answer"], json!(42));
    }

    #[test]
    fn declarations_filter_to_enabled_names() {
        let executor = ToolExecutor::new(vec![Arc::new(FailingTool), Arc::new(CurrentTimeTool)]);
        let specs = executor.declarations(&["get_current_time".into(), "missing".into()]);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "get_current_time");
    }
}
