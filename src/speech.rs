//! Text-to-speech through the platform's own synthesizer.
//!
//! macOS uses `say`, Linux `espeak`, Windows PowerShell's `System.Speech`.
//! Speaking is fire-and-forget: [`speak_text`] never reports failure to the
//! caller.

use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use crate::config::Platform;

/// Words per minute at rate 1.0.
const BASE_WPM: f32 = 175.0;

/// Locale tags with a known voice.
pub const SUPPORTED_VOICES: [&str; 12] = [
    "en-US", "es-ES", "fr-FR", "de-DE", "it-IT", "pt-PT", "ru-RU", "ja-JP", "ko-KR", "zh-CN",
    "ar-SA", "hi-IN",
];

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOptions {
    /// Locale tag, e.g. `"en-US"`.
    pub language: String,
    /// Relative speed, 1.0 = normal. `None` means 0.8.
    pub rate: Option<f32>,
    /// Relative pitch, 1.0 = normal. `None` means 1.0.
    pub pitch: Option<f32>,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            rate: Some(0.8),
            pitch: Some(1.0),
        }
    }
}

impl SpeechOptions {
    pub fn for_language(code: &str) -> Self {
        Self {
            language: code.to_string(),
            ..Self::default()
        }
    }

    pub fn words_per_minute(&self) -> u32 {
        (BASE_WPM * self.rate.unwrap_or(0.8)).round().max(1.0) as u32
    }

    /// Pitch on espeak's 0..=99 scale.
    pub fn espeak_pitch(&self) -> u32 {
        (50.0 * self.pitch.unwrap_or(1.0)).round().clamp(0.0, 99.0) as u32
    }
}

pub trait SpeechEngine {
    fn speak(&self, text: &str, options: &SpeechOptions) -> Result<()>;
}

// ---------------------------------------------------------------------------
// System synthesizer
// ---------------------------------------------------------------------------

/// Spawns the platform's speech command and waits for it to finish.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSpeech;

impl SpeechEngine for SystemSpeech {
    fn speak(&self, text: &str, options: &SpeechOptions) -> Result<()> {
        let mut command = speech_command(text, options);
        let program = command.get_program().to_string_lossy().into_owned();
        let status = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("failed to run {program}"))?;
        if !status.success() {
            anyhow::bail!("{program} exited with {status}");
        }
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn speech_command(text: &str, options: &SpeechOptions) -> Command {
    let mut command = Command::new("say");
    command
        .arg("-r")
        .arg(options.words_per_minute().to_string())
        .arg(text);
    command
}

#[cfg(windows)]
fn speech_command(text: &str, options: &SpeechOptions) -> Command {
    // SAPI rate runs -10..=10 around 0 = normal.
    let rate = ((options.rate.unwrap_or(0.8) - 1.0) * 10.0)
        .round()
        .clamp(-10.0, 10.0) as i32;
    let script = format!(
        "Add-Type -AssemblyName System.Speech; \
         $s = New-Object System.Speech.Synthesis.SpeechSynthesizer; \
         $s.Rate = {rate}; $s.Speak($env:REPAIR_AI_SPEECH_TEXT)"
    );
    let mut command = Command::new("powershell");
    // Text passes through the environment, not the script body.
    command
        .args(["-NoProfile", "-Command", &script])
        .env("REPAIR_AI_SPEECH_TEXT", text);
    command
}

#[cfg(not(any(target_os = "macos", windows)))]
fn speech_command(text: &str, options: &SpeechOptions) -> Command {
    let voice = options
        .language
        .split('-')
        .next()
        .unwrap_or("en")
        .to_ascii_lowercase();
    let mut command = Command::new("espeak");
    command
        .arg("-v")
        .arg(voice)
        .arg("-s")
        .arg(options.words_per_minute().to_string())
        .arg("-p")
        .arg(options.espeak_pitch().to_string())
        .arg(text);
    command
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Speak `text`, swallowing any failure. Empty text is a no-op; on the web
/// platform the call is only logged.
pub fn speak_text(
    engine: &dyn SpeechEngine,
    platform: Platform,
    text: &str,
    options: &SpeechOptions,
) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if platform == Platform::Web {
        eprintln!("[repair-ai] web platform, would speak: {text}");
        return;
    }
    if let Err(err) = engine.speak(text, options) {
        eprintln!("[repair-ai] speech failed: {err:#}");
    }
}

pub fn supported_voices() -> &'static [&'static str] {
    &SUPPORTED_VOICES
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct RecordingEngine {
        spoken: RefCell<Vec<(String, String)>>,
        fail: bool,
    }

    impl SpeechEngine for RecordingEngine {
        fn speak(&self, text: &str, options: &SpeechOptions) -> Result<()> {
            self.spoken
                .borrow_mut()
                .push((text.to_string(), options.language.clone()));
            if self.fail {
                anyhow::bail!("no synthesizer");
            }
            Ok(())
        }
    }

    #[test]
    fn defaults() {
        let options = SpeechOptions::default();
        assert_eq!(options.language, "en-US");
        assert_eq!(options.words_per_minute(), 140);
        assert_eq!(options.espeak_pitch(), 50);
    }

    #[test]
    fn pitch_is_clamped() {
        let options = SpeechOptions {
            pitch: Some(3.0),
            ..SpeechOptions::default()
        };
        assert_eq!(options.espeak_pitch(), 99);
    }

    #[test]
    fn speaks_trimmed_text_natively() {
        let engine = RecordingEngine::default();
        speak_text(
            &engine,
            Platform::Native,
            "  Remove the battery.  ",
            &SpeechOptions::for_language("fr-FR"),
        );
        assert_eq!(
            engine.spoken.borrow().as_slice(),
            &[("Remove the battery.".to_string(), "fr-FR".to_string())]
        );
    }

    #[test]
    fn empty_text_and_web_are_skipped() {
        let engine = RecordingEngine::default();
        speak_text(&engine, Platform::Native, "   ", &SpeechOptions::default());
        speak_text(&engine, Platform::Web, "hello", &SpeechOptions::default());
        assert!(engine.spoken.borrow().is_empty());
    }

    #[test]
    fn engine_failure_is_swallowed() {
        let engine = RecordingEngine {
            fail: true,
            ..RecordingEngine::default()
        };
        speak_text(&engine, Platform::Native, "hello", &SpeechOptions::default());
        assert_eq!(engine.spoken.borrow().len(), 1);
    }

    #[test]
    fn voice_list() {
        assert_eq!(supported_voices().len(), 12);
        assert!(supported_voices().contains(&"hi-IN"));
    }
}
