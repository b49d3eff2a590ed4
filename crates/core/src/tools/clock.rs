//! Server clock lookup, the one instant tool in the default registry.

use super::{Tool, ToolContext};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};

pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "get_current_time"
    }

    fn description(&self) -> &str {
        "Returns the current server date and time, optionally shifted to a UTC offset in hours."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "utc_offset_hours": {
                    "type": "integer",
                    "description": "Whole-hour offset from UTC, -12 to 14. Defaults to 0."
                }
            }
        })
    }

    async fn run(&self, args: Value, _ctx: &ToolContext) -> anyhow::Result<Value> {
        let offset_hours = match args.get("utc_offset_hours") {
            None | Some(Value::Null) => 0,
            Some(v) => match v.as_i64() {
                Some(h) if (-12..=14).contains(&h) => h,
                _ => {
                    // Invalid input is a structured failure, not an error.
                    return Ok(json!({
                        "success": false,
                        "error": format!("utc_offset_hours must be a whole number of hours between -12 and 14, got {v}"),
                    }));
                }
            },
        };

        let now = Utc::now() + chrono::Duration::hours(offset_hours);
        Ok(json!({
            "iso8601": now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "utc_offset_hours": offset_hours,
            "weekday": now.format("%A").to_string(),
        }))
    }
}
