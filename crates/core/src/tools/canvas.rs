//! App generation against the Canvas collaborator.
//!
//! `create_app` and `edit_app` delegate to a [`CanvasBackend`] and run the
//! generated document through a structural check. Failed checks are fed
//! back to the backend with the findings appended, up to a bounded number
//! of attempts; past the ceiling the best draft is kept and returned with a
//! warning instead of failing the call.

use super::{Tool, ToolContext, ToolFamily};
use crate::artifacts::{AppArtifact, ArtifactStore};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

/// One generated document from the Canvas collaborator.
#[derive(Debug, Clone)]
pub struct CanvasDraft {
    pub title: String,
    pub source: String,
}

/// The Canvas collaborator: given a description (and, for edits, the prior
/// source plus open validation findings), produce a draft application.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CanvasBackend: Send + Sync {
    async fn generate<'a>(
        &self,
        description: &str,
        prior_source: Option<&'a str>,
        findings: &[String],
    ) -> anyhow::Result<CanvasDraft>;
}

/// Structural validation for generated documents. The collaborator emits
/// single-file HTML apps; anything that would not render standalone is a
/// finding worth a repair round.
pub fn validate_document(source: &str) -> Vec<String> {
    let mut findings = Vec::new();
    let lower = source.to_lowercase();
    if !lower.contains("<html") || !lower.contains("</html>") {
        findings.push("document must be a complete <html> element".to_string());
    }
    if !lower.contains("<body") {
        findings.push("document is missing a <body> element".to_string());
    }
    if lower.contains("src=\"http") || lower.contains("href=\"http") {
        findings.push("document must not reference external resources".to_string());
    }
    if source.len() < 64 {
        findings.push("document is implausibly short".to_string());
    }
    findings
}

async fn generate_with_repair(
    backend: &dyn CanvasBackend,
    ctx: &ToolContext,
    description: &str,
    prior_source: Option<&str>,
    retry_limit: u32,
) -> anyhow::Result<(CanvasDraft, Vec<String>)> {
    let mut findings: Vec<String> = Vec::new();
    let mut best: Option<(CanvasDraft, Vec<String>)> = None;

    for attempt in 1..=retry_limit.max(1) {
        let status = if attempt == 1 { "generating" } else { "fixing" };
        ctx.report(
            ToolFamily::Canvas,
            status,
            format!("attempt {attempt} of {}", retry_limit.max(1)),
        )
        .await;

        let draft = backend
            .generate(description, prior_source, &findings)
            .await?;
        ctx.report(ToolFamily::Canvas, "validating", draft.title.clone())
            .await;
        findings = validate_document(&draft.source);

        let better = match &best {
            Some((_, open)) => findings.len() < open.len(),
            None => true,
        };
        if better {
            best = Some((draft, findings.clone()));
        }
        if findings.is_empty() {
            break;
        }
    }

    match best {
        Some(result) => Ok(result),
        None => anyhow::bail!("generation produced no draft"),
    }
}

fn artifact_response(artifact: &AppArtifact) -> Value {
    let mut response = json!({
        "app_id": artifact.id,
        "title": artifact.title,
        "status": if artifact.open_issues.is_empty() { "ready" } else { "ready_with_warnings" },
    });
    if !artifact.open_issues.is_empty() {
        response["warning"] = json!(format!(
            "validation finished with open issues: {}",
            artifact.open_issues.join("; ")
        ));
    }
    response
}

pub struct CreateAppTool {
    backend: Arc<dyn CanvasBackend>,
    store: ArtifactStore<AppArtifact>,
    retry_limit: u32,
}

impl CreateAppTool {
    pub fn new(
        backend: Arc<dyn CanvasBackend>,
        store: ArtifactStore<AppArtifact>,
        retry_limit: u32,
    ) -> Self {
        Self {
            backend,
            store,
            retry_limit,
        }
    }
}

#[async_trait]
impl Tool for CreateAppTool {
    fn name(&self) -> &str {
        "create_app"
    }

    fn description(&self) -> &str {
        "Generates a new single-file application from a description and stores it for the user."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "description": {
                    "type": "string",
                    "description": "What the application should do, in plain language."
                }
            },
            "required": ["description"]
        })
    }

    fn long_running(&self) -> bool {
        true
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<Value> {
        let Some(description) = args.get("description").and_then(Value::as_str) else {
            return Ok(json!({"success": false, "error": "missing required argument: description"}));
        };

        let (draft, open_issues) =
            generate_with_repair(&*self.backend, ctx, description, None, self.retry_limit).await?;

        let artifact = AppArtifact {
            id: Uuid::new_v4(),
            title: draft.title,
            source: draft.source,
            open_issues,
        };
        self.store.insert(artifact.id, artifact.clone()).await;
        Ok(artifact_response(&artifact))
    }
}

pub struct EditAppTool {
    backend: Arc<dyn CanvasBackend>,
    store: ArtifactStore<AppArtifact>,
    retry_limit: u32,
}

impl EditAppTool {
    pub fn new(
        backend: Arc<dyn CanvasBackend>,
        store: ArtifactStore<AppArtifact>,
        retry_limit: u32,
    ) -> Self {
        Self {
            backend,
            store,
            retry_limit,
        }
    }
}

#[async_trait]
impl Tool for EditAppTool {
    fn name(&self) -> &str {
        "edit_app"
    }

    fn description(&self) -> &str {
        "Revises a previously generated application in place, given its id and the requested changes."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "app_id": {
                    "type": "string",
                    "description": "Id of the application to edit, as returned by create_app."
                },
                "changes": {
                    "type": "string",
                    "description": "The requested changes, in plain language."
                }
            },
            "required": ["app_id", "changes"]
        })
    }

    fn long_running(&self) -> bool {
        true
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<Value> {
        let id = args
            .get("app_id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok());
        let Some(id) = id else {
            return Ok(json!({"success": false, "error": "app_id must be a valid artifact id"}));
        };
        let Some(changes) = args.get("changes").and_then(Value::as_str) else {
            return Ok(json!({"success": false, "error": "missing required argument: changes"}));
        };
        let Some(existing) = self.store.get(id).await else {
            return Ok(json!({"success": false, "error": format!("no application with id {id}")}));
        };

        let (draft, open_issues) = generate_with_repair(
            &*self.backend,
            ctx,
            changes,
            Some(&existing.source),
            self.retry_limit,
        )
        .await?;

        let artifact = AppArtifact {
            id,
            title: draft.title,
            source: draft.source,
            open_issues,
        };
        self.store.insert(id, artifact.clone()).await;
        Ok(artifact_response(&artifact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    const CLEAN: &str = "<html><head><title>t</title></head><body><p>hello world</p></body></html>";
    const BROKEN: &str = "<div>not a full document, but long enough to pass the length check</div>";

    fn ctx() -> (ToolContext, mpsc::Receiver<super::super::ToolProgress>) {
        let (tx, rx) = mpsc::channel(32);
        (ToolContext::new("call-7".into(), tx), rx)
    }

    #[test]
    fn validator_accepts_complete_documents() {
        assert!(validate_document(CLEAN).is_empty());
    }

    #[test]
    fn validator_flags_external_references_and_missing_structure() {
        let findings =
            validate_document("<html><body><script src=\"http://x/y.js\"></script></body>");
        assert!(findings.iter().any(|f| f.contains("external")));
        assert!(findings.iter().any(|f| f.contains("</html>")));
    }

    #[tokio::test]
    async fn clean_generation_succeeds_on_first_attempt() {
        let mut backend = MockCanvasBackend::new();
        backend.expect_generate().times(1).returning(|_, _, _| {
            Ok(CanvasDraft {
                title: "Timer".into(),
                source: CLEAN.into(),
            })
        });
        let store = ArtifactStore::new();
        let tool = CreateAppTool::new(Arc::new(backend), store.clone(), 3);
        let (ctx, _rx) = ctx();

        let result = tool
            .run(json!({"description": "a timer"}), &ctx)
            .await
            .unwrap();
        assert_eq!(result["status"], json!("ready"));
        assert!(result.get("warning").is_none());
        assert_eq!(store.ids().await.len(), 1);
    }

    #[tokio::test]
    async fn validation_failure_triggers_repair_with_findings() {
        let mut backend = MockCanvasBackend::new();
        backend
            .expect_generate()
            .times(1)
            .withf(|_, _, findings| findings.is_empty())
            .returning(|_, _, _| {
                Ok(CanvasDraft {
                    title: "Timer".into(),
                    source: BROKEN.into(),
                })
            });
        backend
            .expect_generate()
            .times(1)
            .withf(|_, _, findings| !findings.is_empty())
            .returning(|_, _, _| {
                Ok(CanvasDraft {
                    title: "Timer".into(),
                    source: CLEAN.into(),
                })
            });
        let tool = CreateAppTool::new(Arc::new(backend), ArtifactStore::new(), 3);
        let (ctx, mut rx) = ctx();

        let result = tool
            .run(json!({"description": "a timer"}), &ctx)
            .await
            .unwrap();
        assert_eq!(result["status"], json!("ready"));

        let mut statuses = Vec::new();
        while let Ok(p) = rx.try_recv() {
            statuses.push(p.status);
        }
        assert!(statuses.contains(&"generating".to_string()));
        assert!(statuses.contains(&"fixing".to_string()));
    }

    #[tokio::test]
    async fn retry_ceiling_returns_best_draft_with_warning() {
        let mut backend = MockCanvasBackend::new();
        backend.expect_generate().times(2).returning(|_, _, _| {
            Ok(CanvasDraft {
                title: "Timer".into(),
                source: BROKEN.into(),
            })
        });
        let tool = CreateAppTool::new(Arc::new(backend), ArtifactStore::new(), 2);
        let (ctx, _rx) = ctx();

        let result = tool
            .run(json!({"description": "a timer"}), &ctx)
            .await
            .unwrap();
        assert_eq!(result["status"], json!("ready_with_warnings"));
        assert!(
            result["warning"]
                .as_str()
                .unwrap()
                .contains("open issues")
        );
    }

    #[tokio::test]
    async fn edit_of_unknown_artifact_is_a_structured_failure() {
        let backend = MockCanvasBackend::new();
        let tool = EditAppTool::new(Arc::new(backend), ArtifactStore::new(), 3);
        let (ctx, _rx) = ctx();

        let result = tool
            .run(
                json!({"app_id": Uuid::new_v4().to_string(), "changes": "make it blue"}),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(result["success"], json!(false));
        assert!(result["error"].as_str().unwrap().contains("no application"));
    }

    #[tokio::test]
    async fn edit_passes_prior_source_to_backend() {
        let store = ArtifactStore::new();
        let id = Uuid::new_v4();
        store
            .insert(
                id,
                AppArtifact {
                    id,
                    title: "Timer".into(),
                    source: CLEAN.into(),
                    open_issues: vec![],
                },
            )
            .await;

        let mut backend = MockCanvasBackend::new();
        backend
            .expect_generate()
            .times(1)
            .withf(|_, prior, _| matches!(prior, Some(s) if *s == CLEAN))
            .returning(|_, _, _| {
                Ok(CanvasDraft {
                    title: "Timer v2".into(),
                    source: CLEAN.into(),
                })
            });
        let tool = EditAppTool::new(Arc::new(backend), store.clone(), 3);
        let (ctx, _rx) = ctx();

        let result = tool
            .run(json!({"app_id": id.to_string(), "changes": "rename"}), &ctx)
            .await
            .unwrap();
        assert_eq!(result["title"], json!("Timer v2"));
        assert_eq!(store.get(id).await.unwrap().title, "Timer v2");
    }
}
