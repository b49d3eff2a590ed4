//! Per-connection session configuration.
//!
//! A `SessionConfig` is assembled exactly once per upstream connection by
//! merging client-supplied overrides onto server defaults. It is replaced
//! wholesale by an `update_config` message and discarded when the relay
//! session ends; nothing mutates it mid-connection.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Output modality requested from the model.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseModality {
    Text,
    Audio,
}

/// Resolution hint for vision input frames.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaResolution {
    #[serde(rename = "MEDIA_RESOLUTION_LOW")]
    Low,
    #[serde(rename = "MEDIA_RESOLUTION_MEDIUM")]
    Medium,
    #[serde(rename = "MEDIA_RESOLUTION_HIGH")]
    High,
}

/// Reasoning budget for the model. A budget of 0 disables thinking; a
/// negative budget lets the model decide dynamically.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingSettings {
    pub budget: i32,
    pub include_thoughts: bool,
}

impl Default for ThinkingSettings {
    fn default() -> Self {
        Self {
            budget: 0,
            include_thoughts: false,
        }
    }
}

/// Declared schema of one callable function, as advertised to the model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Which tool surfaces the session exposes to the model.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ToolSettings {
    /// Whether the built-in search grounding tool is attached.
    pub search: bool,
    /// Whether function calling is enabled at all.
    pub functions: bool,
    /// Tool names the client opted into. Declarations are filtered to this
    /// list when the upstream session is set up.
    pub enabled: Vec<String>,
    /// Concrete declarations, resolved from the executor at connect time.
    #[serde(skip)]
    pub declarations: Vec<FunctionSpec>,
}

/// Immutable-per-connection session configuration.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub model: String,
    pub system_instruction: String,
    pub response_modalities: Vec<ResponseModality>,
    pub voice: String,
    pub temperature: f32,
    pub context_compression: bool,
    pub session_resumption: bool,
    pub affective_dialog: bool,
    pub proactive_audio: bool,
    pub thinking: ThinkingSettings,
    pub input_transcription: bool,
    pub output_transcription: bool,
    pub media_resolution: MediaResolution,
    pub tools: ToolSettings,
    /// Tool name -> run on the async (interrupt-scheduled) path. Names
    /// absent from the map execute on the sync path.
    pub async_tools: HashMap<String, bool>,
}

impl SessionConfig {
    pub fn audio_modality(&self) -> bool {
        self.response_modalities.contains(&ResponseModality::Audio)
    }

    /// Whether results for this tool should be delivered on the async
    /// (interrupt) path rather than consumed in turn order.
    pub fn tool_is_async(&self, name: &str) -> bool {
        self.async_tools.get(name).copied().unwrap_or(false)
    }

    /// Merges client overrides onto server defaults.
    ///
    /// The deployed native-audio model does not support a text response
    /// modality, so whatever the client asked for, the merged configuration
    /// always comes out audio-only.
    pub fn merged(defaults: &SessionConfig, overrides: ClientSessionOverrides) -> SessionConfig {
        let mut cfg = defaults.clone();
        if let Some(model) = overrides.model {
            cfg.model = model;
        }
        if let Some(text) = overrides.system_instruction {
            cfg.system_instruction = text;
        }
        if let Some(voice) = overrides.voice {
            cfg.voice = voice;
        }
        if let Some(t) = overrides.temperature {
            cfg.temperature = t.clamp(0.0, 2.0);
        }
        if let Some(v) = overrides.context_compression {
            cfg.context_compression = v;
        }
        if let Some(v) = overrides.session_resumption {
            cfg.session_resumption = v;
        }
        if let Some(v) = overrides.affective_dialog {
            cfg.affective_dialog = v;
        }
        if let Some(v) = overrides.proactive_audio {
            cfg.proactive_audio = v;
        }
        if let Some(v) = overrides.thinking {
            cfg.thinking = v;
        }
        if let Some(v) = overrides.input_transcription {
            cfg.input_transcription = v;
        }
        if let Some(v) = overrides.output_transcription {
            cfg.output_transcription = v;
        }
        if let Some(v) = overrides.media_resolution {
            cfg.media_resolution = v;
        }
        if let Some(v) = overrides.search {
            cfg.tools.search = v;
        }
        if let Some(v) = overrides.functions {
            cfg.tools.functions = v;
        }
        if let Some(v) = overrides.enabled_tools {
            cfg.tools.enabled = v;
        }
        for (name, is_async) in overrides.async_tools.unwrap_or_default() {
            cfg.async_tools.insert(name, is_async);
        }
        // The client may request TEXT; the model would reject it.
        cfg.response_modalities = vec![ResponseModality::Audio];
        cfg
    }
}

/// Client-supplied configuration overrides carried by `connect`,
/// `update_config` and `reconnect` messages. Every field is optional;
/// omitted fields keep the server default.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSessionOverrides {
    pub model: Option<String>,
    pub system_instruction: Option<String>,
    /// Accepted for wire compatibility but always forced to `["AUDIO"]`.
    pub response_modalities: Option<Vec<ResponseModality>>,
    pub voice: Option<String>,
    pub temperature: Option<f32>,
    pub context_compression: Option<bool>,
    pub session_resumption: Option<bool>,
    pub affective_dialog: Option<bool>,
    pub proactive_audio: Option<bool>,
    pub thinking: Option<ThinkingSettings>,
    pub input_transcription: Option<bool>,
    pub output_transcription: Option<bool>,
    pub media_resolution: Option<MediaResolution>,
    pub search: Option<bool>,
    pub functions: Option<bool>,
    pub enabled_tools: Option<Vec<String>>,
    pub async_tools: Option<HashMap<String, bool>>,
}
