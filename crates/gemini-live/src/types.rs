//! Wire types for the `BidiGenerateContent` protocol, plus the pure
//! translation layer between domain types and wire frames.
//!
//! The upstream schema treats *presence* as the enabling signal for most
//! optional features, so the builders here omit fields rather than sending
//! `false`/`null`. That rule is load-bearing: sending an empty
//! `sessionResumption` object, for example, enables resumption.

use crate::{ContextTurn, LiveEvent};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use murmur_core::session::{MediaResolution, ResponseModality, SessionConfig};
use murmur_core::tools::{Scheduling, ToolCallRequest, ToolOutcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

// --- Client -> upstream frames ---

/// Top-level client frame. Serializes externally tagged, which is exactly
/// the single-key envelope the upstream expects: `{"setup": {...}}`.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub enum OutboundFrame {
    Setup(Setup),
    RealtimeInput(RealtimeInput),
    ClientContent(ClientContent),
    ToolResponse(ToolResponse),
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct EmptyObject {}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    pub model: String,
    pub generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDecl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_resumption: Option<SessionResumption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window_compression: Option<ContextWindowCompression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_audio_transcription: Option<EmptyObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_audio_transcription: Option<EmptyObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proactivity: Option<Proactivity>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<ResponseModality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_resolution: Option<MediaResolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_affective_dialog: Option<bool>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    pub thinking_budget: i32,
    pub include_thoughts: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionResumption {
    /// Present to resume a prior session; absent to start fresh with
    /// resumption enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ContextWindowCompression {
    pub sliding_window: EmptyObject,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Proactivity {
    pub proactive_audio: bool,
}

#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ToolDecl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<EmptyObject>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
    pub behavior: Behavior,
}

/// Whether the model should wait for this function's result before
/// continuing its turn.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Behavior {
    Blocking,
    NonBlocking,
}

#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_start: Option<EmptyObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_end: Option<EmptyObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_stream_end: Option<bool>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ClientContent {
    pub turns: Vec<Content>,
    pub turn_complete: bool,
}

#[derive(Serialize, Debug)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Serialize, Debug)]
pub struct Part {
    pub text: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub function_responses: Vec<FunctionResponse>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub id: String,
    pub name: String,
    pub response: Value,
    /// Only emitted for interrupt-scheduled results; default scheduling is
    /// the upstream's own default and is expressed by omission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduling: Option<ResponseScheduling>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseScheduling {
    Interrupt,
}

// --- Frame builders ---

/// Translates a session configuration (and optional resumption handle)
/// into the setup frame.
pub fn build_setup(cfg: &SessionConfig, resume_handle: Option<&str>) -> Setup {
    let audio = cfg.audio_modality();

    let mut tools = Vec::new();
    if cfg.tools.search {
        tools.push(ToolDecl {
            google_search: Some(EmptyObject {}),
            function_declarations: vec![],
        });
    }
    if cfg.tools.functions && !cfg.tools.declarations.is_empty() {
        tools.push(ToolDecl {
            google_search: None,
            function_declarations: cfg
                .tools
                .declarations
                .iter()
                .map(|spec| FunctionDeclaration {
                    name: spec.name.clone(),
                    description: spec.description.clone(),
                    parameters: spec.parameters.clone(),
                    behavior: if cfg.tool_is_async(&spec.name) {
                        Behavior::NonBlocking
                    } else {
                        Behavior::Blocking
                    },
                })
                .collect(),
        });
    }

    Setup {
        model: cfg.model.clone(),
        generation_config: GenerationConfig {
            response_modalities: cfg.response_modalities.clone(),
            temperature: Some(cfg.temperature),
            speech_config: audio.then(|| SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: cfg.voice.clone(),
                    },
                },
            }),
            media_resolution: Some(cfg.media_resolution),
            thinking_config: (cfg.thinking.budget != 0).then(|| ThinkingConfig {
                thinking_budget: cfg.thinking.budget,
                include_thoughts: cfg.thinking.include_thoughts,
            }),
            enable_affective_dialog: (audio && cfg.affective_dialog).then_some(true),
        },
        system_instruction: (!cfg.system_instruction.is_empty()).then(|| Content {
            role: "system".to_string(),
            parts: vec![Part {
                text: cfg.system_instruction.clone(),
            }],
        }),
        tools,
        session_resumption: cfg.session_resumption.then(|| SessionResumption {
            handle: resume_handle.map(str::to_string),
        }),
        context_window_compression: cfg.context_compression.then(|| ContextWindowCompression {
            sliding_window: EmptyObject {},
        }),
        input_audio_transcription: (audio && cfg.input_transcription).then(EmptyObject::default),
        output_audio_transcription: (audio && cfg.output_transcription).then(EmptyObject::default),
        proactivity: (audio && cfg.proactive_audio).then(|| Proactivity {
            proactive_audio: true,
        }),
    }
}

pub fn audio_frame(data: &[u8], mime_type: &str) -> OutboundFrame {
    OutboundFrame::RealtimeInput(RealtimeInput {
        audio: Some(Blob {
            mime_type: mime_type.to_string(),
            data: BASE64.encode(data),
        }),
        ..Default::default()
    })
}

pub fn video_frame(data: &[u8], mime_type: &str) -> OutboundFrame {
    OutboundFrame::RealtimeInput(RealtimeInput {
        video: Some(Blob {
            mime_type: mime_type.to_string(),
            data: BASE64.encode(data),
        }),
        ..Default::default()
    })
}

/// The text-turn sequence. The model streams audio continuously, so a bare
/// text turn would queue behind unfinished speech; signaling activity first
/// triggers the upstream barge-in, then the text lands as a complete turn.
/// The activity frame MUST precede the content frame.
pub fn text_turn_frames(text: &str) -> [OutboundFrame; 2] {
    [
        OutboundFrame::RealtimeInput(RealtimeInput {
            activity_start: Some(EmptyObject {}),
            ..Default::default()
        }),
        OutboundFrame::ClientContent(ClientContent {
            turns: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: text.to_string(),
                }],
            }],
            turn_complete: true,
        }),
    ]
}

pub fn context_frame(turns: &[ContextTurn], turn_complete: bool) -> OutboundFrame {
    OutboundFrame::ClientContent(ClientContent {
        turns: turns
            .iter()
            .map(|t| Content {
                role: t.role.clone(),
                parts: vec![Part {
                    text: t.text.clone(),
                }],
            })
            .collect(),
        turn_complete,
    })
}

pub fn audio_stream_end_frame() -> OutboundFrame {
    OutboundFrame::RealtimeInput(RealtimeInput {
        audio_stream_end: Some(true),
        ..Default::default()
    })
}

pub fn tool_response_frame(outcomes: &[ToolOutcome]) -> OutboundFrame {
    OutboundFrame::ToolResponse(ToolResponse {
        function_responses: outcomes
            .iter()
            .map(|o| FunctionResponse {
                id: o.id.clone(),
                name: o.name.clone(),
                response: o.response.clone(),
                scheduling: match o.scheduling {
                    Scheduling::Default => None,
                    Scheduling::Interrupt => Some(ResponseScheduling::Interrupt),
                },
            })
            .collect(),
    })
}

// --- Upstream -> client frames ---

/// Server frame envelope. The upstream sends a oneof as a JSON object with
/// exactly one of these fields populated.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerFrame {
    pub setup_complete: Option<EmptyObject>,
    pub server_content: Option<ServerContent>,
    pub tool_call: Option<ToolCallFrame>,
    pub go_away: Option<GoAwayFrame>,
    pub session_resumption_update: Option<SessionResumptionUpdate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerContent {
    pub model_turn: Option<ModelTurn>,
    pub input_transcription: Option<Transcription>,
    pub output_transcription: Option<Transcription>,
    pub interrupted: Option<bool>,
    pub turn_complete: Option<bool>,
    pub generation_complete: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct ModelTurn {
    pub parts: Vec<ServerPart>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerPart {
    pub text: Option<String>,
    pub inline_data: Option<ServerBlob>,
    pub thought: Option<bool>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ServerBlob {
    #[serde(default)]
    pub mime_type: Option<String>,
    pub data: String,
}

#[derive(Deserialize, Debug)]
pub struct Transcription {
    pub text: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallFrame {
    pub function_calls: Vec<FunctionCallFrame>,
}

#[derive(Deserialize, Debug)]
pub struct FunctionCallFrame {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub args: Option<Value>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GoAwayFrame {
    pub time_left: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionResumptionUpdate {
    pub new_handle: Option<String>,
    pub resumable: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u64>,
    pub response_token_count: Option<u64>,
    pub total_token_count: Option<u64>,
}

impl ServerFrame {
    /// Flattens one server frame into zero or more events, in the order
    /// the upstream laid them out. `setup_complete` is handled by the
    /// connect handshake and produces no event here.
    pub fn into_events(self, include_thoughts: bool) -> Vec<LiveEvent> {
        let mut events = Vec::new();

        if let Some(content) = self.server_content {
            if let Some(t) = content.input_transcription {
                events.push(LiveEvent::InputTranscript { text: t.text });
            }
            if let Some(t) = content.output_transcription {
                events.push(LiveEvent::OutputTranscript { text: t.text });
            }
            if let Some(turn) = content.model_turn {
                for part in turn.parts {
                    if part.thought == Some(true) {
                        // Thoughts are a client-gated feature; drop them at
                        // the earliest point that knows the preference.
                        if include_thoughts {
                            if let Some(text) = part.text {
                                events.push(LiveEvent::Thought { text });
                            }
                        }
                    } else if let Some(blob) = part.inline_data {
                        match BASE64.decode(&blob.data) {
                            Ok(data) => events.push(LiveEvent::Audio {
                                data,
                                mime: blob
                                    .mime_type
                                    .unwrap_or_else(|| "audio/pcm;rate=24000".to_string()),
                            }),
                            Err(e) => {
                                warn!(error = %e, "Discarding undecodable inline data part");
                            }
                        }
                    } else if let Some(text) = part.text {
                        events.push(LiveEvent::Text { text });
                    }
                }
            }
            if content.interrupted == Some(true) {
                events.push(LiveEvent::Interrupted);
            }
            if content.generation_complete == Some(true) {
                events.push(LiveEvent::GenerationComplete);
            }
            if content.turn_complete == Some(true) {
                events.push(LiveEvent::TurnComplete);
            }
        }

        if let Some(tc) = self.tool_call {
            let calls = tc
                .function_calls
                .into_iter()
                .map(|c| ToolCallRequest {
                    id: c.id,
                    name: c.name,
                    args: c.args.unwrap_or_else(|| Value::Object(Default::default())),
                })
                .collect();
            events.push(LiveEvent::ToolCall { calls });
        }

        if let Some(ga) = self.go_away {
            events.push(LiveEvent::GoAway {
                time_left: ga.time_left,
            });
        }

        if let Some(update) = self.session_resumption_update {
            events.push(LiveEvent::ResumptionUpdate {
                handle: update.new_handle,
                resumable: update.resumable.unwrap_or(false),
            });
        }

        if let Some(usage) = self.usage_metadata {
            events.push(LiveEvent::Usage {
                prompt_tokens: usage.prompt_token_count,
                response_tokens: usage.response_token_count,
                total_tokens: usage.total_token_count,
            });
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::session::{
        ClientSessionOverrides, FunctionSpec, ThinkingSettings, ToolSettings,
    };
    use serde_json::json;
    use std::collections::HashMap;

    fn audio_config() -> SessionConfig {
        let defaults = SessionConfig {
            model: "models/native-audio".into(),
            system_instruction: "Be brief.".into(),
            response_modalities: vec![ResponseModality::Audio],
            voice: "Puck".into(),
            temperature: 0.8,
            context_compression: true,
            session_resumption: true,
            affective_dialog: true,
            proactive_audio: true,
            thinking: ThinkingSettings {
                budget: -1,
                include_thoughts: true,
            },
            input_transcription: true,
            output_transcription: true,
            media_resolution: MediaResolution::Medium,
            tools: ToolSettings {
                search: true,
                functions: true,
                enabled: vec![],
                declarations: vec![
                    FunctionSpec {
                        name: "get_current_time".into(),
                        description: "clock".into(),
                        parameters: json!({"type": "object"}),
                    },
                    FunctionSpec {
                        name: "run_code".into(),
                        description: "sandbox".into(),
                        parameters: json!({"type": "object"}),
                    },
                ],
            },
            async_tools: HashMap::from([("run_code".into(), true)]),
        };
        SessionConfig::merged(&defaults, ClientSessionOverrides::default())
    }

    #[test]
    fn setup_serializes_with_single_key_envelope() {
        let setup = build_setup(&audio_config(), None);
        let value = serde_json::to_value(OutboundFrame::Setup(setup)).unwrap();
        assert!(value.get("setup").is_some());
        assert_eq!(value["setup"]["model"], json!("models/native-audio"));
    }

    #[test]
    fn disabled_features_are_omitted_not_false() {
        let mut cfg = audio_config();
        cfg.session_resumption = false;
        cfg.context_compression = false;
        cfg.input_transcription = false;
        cfg.proactive_audio = false;
        cfg.affective_dialog = false;
        cfg.thinking.budget = 0;

        let value = serde_json::to_value(build_setup(&cfg, None)).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("sessionResumption"));
        assert!(!obj.contains_key("contextWindowCompression"));
        assert!(!obj.contains_key("inputAudioTranscription"));
        assert!(!obj.contains_key("proactivity"));
        let gen_cfg = value["generationConfig"].as_object().unwrap();
        assert!(!gen_cfg.contains_key("thinkingConfig"));
        assert!(!gen_cfg.contains_key("enableAffectiveDialog"));
    }

    #[test]
    fn resumption_handle_replaces_bare_enable_flag() {
        let cfg = audio_config();
        let fresh = serde_json::to_value(build_setup(&cfg, None)).unwrap();
        assert_eq!(fresh["sessionResumption"], json!({}));

        let resumed = serde_json::to_value(build_setup(&cfg, Some("handle-123"))).unwrap();
        assert_eq!(resumed["sessionResumption"]["handle"], json!("handle-123"));
    }

    #[test]
    fn modality_gated_fields_are_dropped_for_text_sessions() {
        let mut cfg = audio_config();
        cfg.response_modalities = vec![ResponseModality::Text];

        let value = serde_json::to_value(build_setup(&cfg, None)).unwrap();
        assert!(value.get("inputAudioTranscription").is_none());
        assert!(value.get("outputAudioTranscription").is_none());
        assert!(value.get("proactivity").is_none());
        assert!(value["generationConfig"].get("speechConfig").is_none());
    }

    #[test]
    fn function_declarations_are_stamped_with_behavior() {
        let value = serde_json::to_value(build_setup(&audio_config(), None)).unwrap();
        let tools = value["tools"].as_array().unwrap();
        // Search tool first, then the function declarations.
        assert_eq!(tools[0], json!({"googleSearch": {}}));
        let decls = tools[1]["functionDeclarations"].as_array().unwrap();
        let by_name: HashMap<&str, &str> = decls
            .iter()
            .map(|d| (d["name"].as_str().unwrap(), d["behavior"].as_str().unwrap()))
            .collect();
        assert_eq!(by_name["get_current_time"], "BLOCKING");
        assert_eq!(by_name["run_code"], "NON_BLOCKING");
    }

    #[test]
    fn text_turn_signals_activity_before_content() {
        let [first, second] = text_turn_frames("hi");
        let first = serde_json::to_value(first).unwrap();
        let second = serde_json::to_value(second).unwrap();
        assert!(first["realtimeInput"].get("activityStart").is_some());
        assert_eq!(second["clientContent"]["turnComplete"], json!(true));
        assert_eq!(
            second["clientContent"]["turns"][0]["parts"][0]["text"],
            json!("hi")
        );
    }

    #[test]
    fn interrupt_scheduling_is_tagged_and_default_is_omitted() {
        let outcomes = vec![
            ToolOutcome {
                id: "a".into(),
                name: "get_current_time".into(),
                response: json!({"success": true}),
                scheduling: Scheduling::Default,
            },
            ToolOutcome {
                id: "b".into(),
                name: "run_code".into(),
                response: json!({"success": true}),
                scheduling: Scheduling::Interrupt,
            },
        ];
        let value = serde_json::to_value(tool_response_frame(&outcomes)).unwrap();
        let responses = value["toolResponse"]["functionResponses"].as_array().unwrap();
        assert!(responses[0].get("scheduling").is_none());
        assert_eq!(responses[1]["scheduling"], json!("INTERRUPT"));
    }

    #[test]
    fn audio_parts_decode_into_audio_events() {
        let frame: ServerFrame = serde_json::from_value(json!({
            "serverContent": {
                "modelTurn": {
                    "parts": [
                        {"inlineData": {"mimeType": "audio/pcm;rate=24000", "data": BASE64.encode([1u8, 2, 3])}}
                    ]
                },
                "turnComplete": true
            }
        }))
        .unwrap();
        let events = frame.into_events(false);
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            LiveEvent::Audio {
                data: vec![1, 2, 3],
                mime: "audio/pcm;rate=24000".into()
            }
        );
        assert_eq!(events[1], LiveEvent::TurnComplete);
    }

    #[test]
    fn thought_parts_are_filtered_unless_enabled() {
        let make = || -> ServerFrame {
            serde_json::from_value(json!({
                "serverContent": {
                    "modelTurn": {
                        "parts": [{"text": "mulling it over", "thought": true}]
                    }
                }
            }))
            .unwrap()
        };
        assert!(make().into_events(false).is_empty());
        assert_eq!(
            make().into_events(true),
            vec![LiveEvent::Thought {
                text: "mulling it over".into()
            }]
        );
    }

    #[test]
    fn tool_call_frames_become_one_batched_event() {
        let frame: ServerFrame = serde_json::from_value(json!({
            "toolCall": {
                "functionCalls": [
                    {"id": "f1", "name": "get_current_time", "args": {"utc_offset_hours": 2}},
                    {"id": "f2", "name": "run_code"}
                ]
            }
        }))
        .unwrap();
        let events = frame.into_events(false);
        let LiveEvent::ToolCall { calls } = &events[0] else {
            panic!("expected tool call event");
        };
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args, json!({"utc_offset_hours": 2}));
        // Missing args default to an empty object.
        assert_eq!(calls[1].args, json!({}));
    }

    #[test]
    fn go_away_and_resumption_updates_decode() {
        let frame: ServerFrame =
            serde_json::from_value(json!({"goAway": {"timeLeft": "30s"}})).unwrap();
        assert_eq!(
            frame.into_events(false),
            vec![LiveEvent::GoAway {
                time_left: Some("30s".into())
            }]
        );

        let frame: ServerFrame = serde_json::from_value(json!({
            "sessionResumptionUpdate": {"newHandle": "h-9", "resumable": true}
        }))
        .unwrap();
        assert_eq!(
            frame.into_events(false),
            vec![LiveEvent::ResumptionUpdate {
                handle: Some("h-9".into()),
                resumable: true
            }]
        );
    }
}
