use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::backends::{self, TextCompletion};
use crate::captions;
use crate::config::AiConfig;
use crate::encoding::FfmpegWriter;
use crate::renderer::{self, SceneFont};
use crate::scenes;
use crate::schema::{VideoRequest, BASE_WIDTH, FPS};

/// Runs the whole pipeline for one request: optional AI caption override,
/// six rendered scenes, one encode to `output_path`. Everything after the
/// caption step is terminal on failure; the caption step never fails.
pub fn assemble_video(config: &AiConfig, request: &VideoRequest, output_path: &Path) -> Result<()> {
    // The caption step degrades to the request's own text on any failure;
    // the backends are only constructed when a prompt asks for them.
    let backends = if request.prompt.trim().is_empty() {
        Vec::new()
    } else {
        backends::configured_backends(config).unwrap_or_else(|error| {
            warn!("caption backends unavailable: {error:#}");
            Vec::new()
        })
    };
    let (opening_text, closing_text) = resolve_texts(&backends, request);

    info!(
        "generating video | theme: {:?} | format: {:?} | resolution: {:?}",
        request.theme, request.format, request.resolution
    );

    let (width, height) = request.resolution.dimensions();
    let scale = width as f32 / BASE_WIDTH;
    let palette = request.theme.palette();
    let scene_list = scenes::build_scenes(&opening_text, &closing_text, &palette, scale);

    let font = renderer::load_font();
    let mut writer = FfmpegWriter::spawn(width, height, FPS, request.format, output_path)?;

    for (index, scene) in scene_list.iter().enumerate() {
        info!(
            "rendering scene {}/{} ({}s)",
            index + 1,
            scene_list.len(),
            scene.duration_secs
        );
        write_clip(&mut writer, &font, scene, (width, height))?;
    }

    writer.finish()?;
    info!("video saved to {}", output_path.display());
    Ok(())
}

/// Resolves the opening/closing caption texts for one request. The caption
/// provider is consulted only for a non-empty prompt; an absent or unparsable
/// result keeps the request's own text unchanged.
fn resolve_texts(backends: &[Box<dyn TextCompletion>], request: &VideoRequest) -> (String, String) {
    let mut opening_text = request.opening_text.clone();
    let mut closing_text = request.closing_text.clone();

    if request.prompt.trim().is_empty() {
        return (opening_text, closing_text);
    }

    let pair = captions::generate_captions(backends, &request.prompt);
    match pair.opening {
        Some(text) => {
            info!("AI opening text: {text}");
            opening_text = text;
        }
        None => info!("using provided opening text: {opening_text}"),
    }
    match pair.closing {
        Some(text) => {
            info!("AI closing text: {text}");
            closing_text = text;
        }
        None => info!("using provided closing text: {closing_text}"),
    }

    (opening_text, closing_text)
}

/// A scene is one static frame held for its duration: render once, write the
/// same bytes `duration * fps` times.
fn write_clip(
    writer: &mut FfmpegWriter,
    font: &SceneFont,
    scene: &scenes::Scene,
    canvas: (u32, u32),
) -> Result<()> {
    let clip = renderer::make_scene_clip(font, scene, canvas);
    let raw = clip.frame.into_raw();
    for _ in 0..clip.duration_secs * FPS {
        writer.write_frame(&raw)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DEFAULT_CLOSING_TEXT, DEFAULT_OPENING_TEXT};
    use anyhow::Result;

    struct RefusingBackend;

    impl TextCompletion for RefusingBackend {
        fn name(&self) -> &'static str {
            "refusing"
        }

        fn complete(&self, _system: Option<&str>, _user: &str) -> Result<String> {
            panic!("the caption provider must not be consulted");
        }
    }

    struct CannedBackend {
        reply: &'static str,
    }

    impl TextCompletion for CannedBackend {
        fn name(&self) -> &'static str {
            "canned"
        }

        fn complete(&self, _system: Option<&str>, _user: &str) -> Result<String> {
            Ok(self.reply.to_owned())
        }
    }

    #[test]
    fn empty_prompt_never_consults_the_provider() {
        let backends: Vec<Box<dyn TextCompletion>> = vec![Box::new(RefusingBackend)];
        let request = VideoRequest::default();
        let (opening, closing) = resolve_texts(&backends, &request);
        assert_eq!(opening, DEFAULT_OPENING_TEXT);
        assert_eq!(closing, DEFAULT_CLOSING_TEXT);

        let request = VideoRequest {
            prompt: "   ".to_owned(),
            opening_text: "Om".to_owned(),
            closing_text: "Shanti".to_owned(),
            ..VideoRequest::default()
        };
        let (opening, closing) = resolve_texts(&backends, &request);
        assert_eq!(opening, "Om");
        assert_eq!(closing, "Shanti");
    }

    #[test]
    fn undelimited_reply_keeps_the_request_texts_unchanged() {
        let backends: Vec<Box<dyn TextCompletion>> = vec![Box::new(CannedBackend {
            reply: "Rise, O Shiva. Peace Eternal.",
        })];
        let request = VideoRequest {
            prompt: "a night of cosmic dance".to_owned(),
            opening_text: "Om".to_owned(),
            closing_text: "Shanti".to_owned(),
            ..VideoRequest::default()
        };
        let (opening, closing) = resolve_texts(&backends, &request);
        assert_eq!(opening, "Om");
        assert_eq!(closing, "Shanti");
    }

    #[test]
    fn parsed_reply_overrides_both_texts() {
        let backends: Vec<Box<dyn TextCompletion>> = vec![Box::new(CannedBackend {
            reply: "Opening: Rise, O Shiva | Closing: Peace Eternal",
        })];
        let request = VideoRequest {
            prompt: "a night of cosmic dance".to_owned(),
            ..VideoRequest::default()
        };
        let (opening, closing) = resolve_texts(&backends, &request);
        assert_eq!(opening, "Rise, O Shiva");
        assert_eq!(closing, "Peace Eternal");
    }
}
