use crate::schema::{Rgb, ThemePalette};

pub const WHITE: Rgb = [255, 255, 255];
pub const GOLD: Rgb = [255, 215, 0];
pub const BLACK: Rgb = [0, 0, 0];
pub const CYAN: Rgb = [0, 255, 255];
pub const ORANGE: Rgb = [255, 165, 0];

/// Attribution line appended to the closing caption after a blank line.
pub const ATTRIBUTION_LINE: &str = "Powered by Google Gemini";

/// Where a scene's caption text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionSlot {
    /// The request's opening text (AI-overridable).
    Opening,
    /// The request's closing text (AI-overridable), plus the attribution line.
    Closing,
    Fixed(&'static str),
}

/// Where a scene's background color comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundSource {
    ThemeScene1,
    ThemeScene2,
    ThemeScene5,
    Fixed(Rgb),
}

/// One row of the fixed scene table. Font sizes are specified at the 1080p
/// baseline and scaled by `target_width / 1920` before rendering.
#[derive(Debug, Clone, Copy)]
pub struct SceneSpec {
    pub duration_secs: u32,
    pub caption: CaptionSlot,
    pub base_font_px: f32,
    pub color: Rgb,
    pub background: BackgroundSource,
}

/// The six scenes, in playback order. Only the caption text of scenes 1 and 6
/// varies per request; everything else is fixed.
pub const SCENE_PLAN: [SceneSpec; 6] = [
    SceneSpec {
        duration_secs: 5,
        caption: CaptionSlot::Opening,
        base_font_px: 70.0,
        color: WHITE,
        background: BackgroundSource::ThemeScene1,
    },
    SceneSpec {
        duration_secs: 8,
        caption: CaptionSlot::Fixed("Himalayan Temple & Glowing Diyas"),
        base_font_px: 60.0,
        color: GOLD,
        background: BackgroundSource::ThemeScene2,
    },
    SceneSpec {
        duration_secs: 10,
        caption: CaptionSlot::Fixed("Abhishekam & Om Namah Shivaya"),
        base_font_px: 60.0,
        color: BLACK,
        background: BackgroundSource::Fixed([200, 200, 220]),
    },
    SceneSpec {
        duration_secs: 10,
        caption: CaptionSlot::Fixed("Lord Shiva Darshan - Divine Blue Aura"),
        base_font_px: 60.0,
        color: CYAN,
        background: BackgroundSource::Fixed([0, 20, 60]),
    },
    SceneSpec {
        duration_secs: 10,
        caption: CaptionSlot::Fixed("Tandava - Cosmic Dance"),
        base_font_px: 80.0,
        color: ORANGE,
        background: BackgroundSource::ThemeScene5,
    },
    SceneSpec {
        duration_secs: 7,
        caption: CaptionSlot::Closing,
        base_font_px: 60.0,
        color: BLACK,
        background: BackgroundSource::Fixed([255, 223, 0]),
    },
];

/// A scene with every per-request parameter resolved, ready to render.
#[derive(Debug, Clone)]
pub struct Scene {
    pub duration_secs: u32,
    pub text: String,
    pub font_px: f32,
    pub color: Rgb,
    pub background: Rgb,
}

pub fn build_scenes(
    opening_text: &str,
    closing_text: &str,
    palette: &ThemePalette,
    scale: f32,
) -> Vec<Scene> {
    SCENE_PLAN
        .iter()
        .map(|spec| {
            let text = match spec.caption {
                CaptionSlot::Opening => opening_text.to_owned(),
                CaptionSlot::Closing => format!("{closing_text}\n\n{ATTRIBUTION_LINE}"),
                CaptionSlot::Fixed(text) => text.to_owned(),
            };
            let background = match spec.background {
                BackgroundSource::ThemeScene1 => palette.scene1,
                BackgroundSource::ThemeScene2 => palette.scene2,
                BackgroundSource::ThemeScene5 => palette.scene5,
                BackgroundSource::Fixed(color) => color,
            };
            Scene {
                duration_secs: spec.duration_secs,
                text,
                // int() truncation, matching the baseline-size table exactly
                // at scale 1.0.
                font_px: (spec.base_font_px * scale).floor(),
                color: spec.color,
                background,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Theme;

    #[test]
    fn total_duration_is_fifty_seconds() {
        let total: u32 = SCENE_PLAN.iter().map(|spec| spec.duration_secs).sum();
        assert_eq!(total, 50);
    }

    #[test]
    fn scene_table_order_and_parameters() {
        let durations: Vec<u32> = SCENE_PLAN.iter().map(|s| s.duration_secs).collect();
        assert_eq!(durations, vec![5, 8, 10, 10, 10, 7]);
        let fonts: Vec<f32> = SCENE_PLAN.iter().map(|s| s.base_font_px).collect();
        assert_eq!(fonts, vec![70.0, 60.0, 60.0, 60.0, 80.0, 60.0]);
        assert_eq!(SCENE_PLAN[0].caption, CaptionSlot::Opening);
        assert_eq!(SCENE_PLAN[5].caption, CaptionSlot::Closing);
    }

    #[test]
    fn captions_and_theme_backgrounds_resolve() {
        let palette = Theme::FieryTandava.palette();
        let scenes = build_scenes("Rise", "Peace", &palette, 1.0);
        assert_eq!(scenes.len(), 6);
        assert_eq!(scenes[0].text, "Rise");
        assert_eq!(scenes[5].text, format!("Peace\n\n{ATTRIBUTION_LINE}"));
        assert_eq!(scenes[0].background, palette.scene1);
        assert_eq!(scenes[1].background, palette.scene2);
        assert_eq!(scenes[4].background, palette.scene5);
        assert_eq!(scenes[2].background, [200, 200, 220]);
        assert_eq!(scenes[3].background, [0, 20, 60]);
        assert_eq!(scenes[5].background, [255, 223, 0]);
    }

    #[test]
    fn font_sizes_scale_with_target_width() {
        let palette = Theme::DivineBlue.palette();
        let scale = 854.0 / 1920.0;
        let scenes = build_scenes("a", "b", &palette, scale);
        assert_eq!(scenes[0].font_px, (70.0 * scale).floor());
        assert_eq!(scenes[4].font_px, (80.0 * scale).floor());

        let full = build_scenes("a", "b", &palette, 1.0);
        assert_eq!(full[0].font_px, 70.0);
    }
}
