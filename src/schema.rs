use serde::Deserialize;

/// Width every base font size in the scene table is specified against.
pub const BASE_WIDTH: f32 = 1920.0;
pub const FPS: u32 = 24;

pub const DEFAULT_OPENING_TEXT: &str = "The Night of Cosmic Awakening...";
pub const DEFAULT_CLOSING_TEXT: &str = "Happy Maha Shivaratri";

pub type Rgb = [u8; 3];

/// One video generation request, as extracted by the caller. Field names
/// mirror the JSON body of the original web form (`openingText` etc.), so a
/// request body deserializes directly; unknown enum strings map to defaults
/// instead of erroring.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoRequest {
    pub theme: Theme,
    pub opening_text: String,
    pub closing_text: String,
    pub format: OutputFormat,
    pub resolution: Resolution,
    pub prompt: String,
}

impl Default for VideoRequest {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            opening_text: DEFAULT_OPENING_TEXT.to_owned(),
            closing_text: DEFAULT_CLOSING_TEXT.to_owned(),
            format: OutputFormat::default(),
            resolution: Resolution::default(),
            prompt: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Theme {
    #[default]
    DivineBlue,
    FieryTandava,
    GoldenMorning,
}

/// Background colors for the scenes whose color varies by theme.
/// Scenes 3, 4 and 6 use fixed colors regardless of theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub scene1: Rgb,
    pub scene2: Rgb,
    pub scene5: Rgb,
}

impl Theme {
    /// Lenient lookup: anything unrecognized falls back to `divine_blue`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fiery_tandava" => Self::FieryTandava,
            "golden_morning" => Self::GoldenMorning,
            _ => Self::DivineBlue,
        }
    }

    pub fn palette(self) -> ThemePalette {
        match self {
            Self::DivineBlue => ThemePalette {
                scene1: [10, 10, 30],
                scene2: [20, 5, 0],
                scene5: [50, 0, 0],
            },
            Self::FieryTandava => ThemePalette {
                scene1: [30, 0, 0],
                scene2: [40, 10, 0],
                scene5: [80, 20, 0],
            },
            Self::GoldenMorning => ThemePalette {
                scene1: [50, 40, 10],
                scene2: [60, 50, 20],
                scene5: [70, 30, 10],
            },
        }
    }
}

impl From<String> for Theme {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Resolution {
    R360p,
    R480p,
    R720p,
    #[default]
    R1080p,
    R4k,
}

impl Resolution {
    /// Lenient lookup: anything unrecognized falls back to `1080p`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "360p" => Self::R360p,
            "480p" => Self::R480p,
            "720p" => Self::R720p,
            "4k" => Self::R4k,
            _ => Self::R1080p,
        }
    }

    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::R360p => (640, 360),
            Self::R480p => (854, 480),
            Self::R720p => (1280, 720),
            Self::R1080p => (1920, 1080),
            Self::R4k => (3840, 2160),
        }
    }
}

impl From<String> for Resolution {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum OutputFormat {
    #[default]
    Mp4,
    Webm,
    Avi,
}

impl OutputFormat {
    /// Lenient lookup: anything unrecognized falls back to `mp4`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "webm" => Self::Webm,
            "avi" => Self::Avi,
            _ => Self::Mp4,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::Avi => "avi",
        }
    }
}

impl From<String> for OutputFormat {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}
