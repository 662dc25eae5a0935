use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use voiceforge_types::{Voice, decode_list};
use voiceforge_util::build_path;

use super::common::{NoArguments, or_dash, render_list, request_body, unwrap_record};
use crate::registry::{ToolContext, ToolInput, ToolOutput, ToolRegistry};
use crate::types::{ToolError, ToolSpec};

const VOICES_PATH: &str = "/api/voices";
const VOICE_PATH: &str = "/api/voices/{voiceId}";
const SPEECH_PATH: &str = "/api/tts/generate";

/// Keys under which deployments return the location of the generated audio.
const AUDIO_LOCATION_KEYS: &[&str] = &["audioUrl", "url"];

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoiceRef {
    #[schemars(length(min = 1))]
    pub voice_id: String,
}

impl ToolInput for VoiceRef {}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpeechSettingsInput {
    #[schemars(range(min = 0.0, max = 1.0))]
    pub stability: Option<f64>,
    #[schemars(range(min = 0.0, max = 1.0))]
    pub similarity_boost: Option<f64>,
    #[schemars(range(min = 0.0, max = 1.0))]
    pub style: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSpeechInput {
    /// Text to synthesize.
    #[schemars(length(min = 1))]
    pub text: String,
    /// Voice id or name, as returned by list_voices.
    #[schemars(length(min = 1))]
    pub voice: String,
    pub settings: Option<SpeechSettingsInput>,
}

impl ToolInput for GenerateSpeechInput {}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register(
        ToolSpec::read_only("list_voices", "List the text-to-speech voices available to the account."),
        list_voices,
    );
    registry.register(
        ToolSpec::read_only("get_voice", "Get one voice with its default settings."),
        get_voice,
    );
    registry.register(
        ToolSpec::write(
            "generate_speech",
            "Synthesize speech from text with one of the available voices. Consumes account credits.",
        ),
        generate_speech,
    );
}

async fn list_voices(context: Arc<ToolContext>, _input: NoArguments) -> Result<ToolOutput, ToolError> {
    let payload = context.platform.get(VOICES_PATH).await?;
    let voices: Vec<Voice> = decode_list(&payload, "voices");
    let lines = voices
        .iter()
        .map(|voice| {
            format!(
                "• {} [{}] ({})",
                or_dash(voice.name.as_deref()),
                or_dash(voice.category.as_deref()),
                or_dash(voice.id.as_deref())
            )
        })
        .collect();
    Ok(ToolOutput::text(render_list(
        &format!("Found {} voices:", voices.len()),
        lines,
        "No voices available",
    )))
}

async fn get_voice(context: Arc<ToolContext>, input: VoiceRef) -> Result<ToolOutput, ToolError> {
    let payload = context
        .platform
        .get(&build_path(VOICE_PATH, &[("voiceId", input.voice_id.as_str())]))
        .await?;
    Ok(ToolOutput::raw(&unwrap_record(payload, "voice")))
}

async fn generate_speech(context: Arc<ToolContext>, input: GenerateSpeechInput) -> Result<ToolOutput, ToolError> {
    let body = request_body(SPEECH_PATH, &input)?;
    let payload = context.platform.post(SPEECH_PATH, &body).await?;
    Ok(ToolOutput::text(speech_summary(&input, &payload)))
}

/// Inline audio can be megabytes of base64, so only its location is shown.
fn speech_summary(input: &GenerateSpeechInput, payload: &Value) -> String {
    let location = AUDIO_LOCATION_KEYS
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str));
    let mut summary = format!(
        "Speech generated with voice {} ({} characters)",
        input.voice,
        input.text.chars().count()
    );
    match location {
        Some(location) => summary.push_str(&format!("\n\nAudio: {location}")),
        None if payload.get("audio").is_some() => summary.push_str("\n\nAudio returned inline"),
        None => {}
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input() -> GenerateSpeechInput {
        GenerateSpeechInput {
            text: "Ciao".into(),
            voice: "alloy".into(),
            settings: None,
        }
    }

    #[test]
    fn summary_reports_audio_location() {
        let summary = speech_summary(&input(), &json!({ "audioUrl": "https://cdn.example/a.mp3" }));
        assert!(summary.contains("alloy"));
        assert!(summary.contains("4 characters"));
        assert!(summary.ends_with("Audio: https://cdn.example/a.mp3"));
    }

    #[test]
    fn summary_never_echoes_inline_audio() {
        let summary = speech_summary(&input(), &json!({ "audio": "UklGRiQAAABXQVZF" }));
        assert!(!summary.contains("UklGR"));
        assert!(summary.contains("inline"));
    }
}
