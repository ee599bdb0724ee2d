use std::fs;
use std::path::PathBuf;

use fontdue::layout::{
    CoordinateSystem, HorizontalAlign, Layout, LayoutSettings, TextStyle, VerticalAlign, WrapStyle,
};
use fontdue::Font;
use image::{Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::scenes::Scene;
use crate::schema::Rgb;

pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Host font locations tried in order. The first entry matches the original
/// tool, which looked for `arial.ttf` next to the process.
const FONT_CANDIDATES: [&str; 7] = [
    "arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// The caption font: a host TrueType face when one can be found, otherwise a
/// built-in 5x7 bitmap face so rendering never fails outright.
pub enum SceneFont {
    Truetype(Font),
    Builtin,
}

pub fn load_font() -> SceneFont {
    for candidate in FONT_CANDIDATES {
        let path = PathBuf::from(candidate);
        let Ok(bytes) = fs::read(&path) else {
            continue;
        };
        match Font::from_bytes(bytes, fontdue::FontSettings::default()) {
            Ok(font) => {
                debug!("using font {}", path.display());
                return SceneFont::Truetype(font);
            }
            Err(error) => {
                warn!("failed to parse font {}: {error}", path.display());
            }
        }
    }
    warn!("no usable TrueType font found, falling back to the built-in bitmap font");
    SceneFont::Builtin
}

/// A static frame held for a fixed number of seconds.
pub struct RenderedClip {
    pub frame: RgbaImage,
    pub duration_secs: u32,
}

/// Renders the scene caption over its solid background color.
pub fn make_scene_clip(font: &SceneFont, scene: &Scene, canvas: (u32, u32)) -> RenderedClip {
    let background = [scene.background[0], scene.background[1], scene.background[2], 255];
    let frame = render_scene_text(
        font,
        &scene.text,
        canvas,
        scene.font_px,
        scene.color,
        background,
    );
    RenderedClip {
        frame,
        duration_secs: scene.duration_secs,
    }
}

/// Rasters `text` centered on a `canvas`-sized image. The text block is
/// positioned from the rendered glyph bounding box of the exact string;
/// embedded line breaks are honored, with lines left-aligned inside the
/// block and the block as a whole centered.
pub fn render_scene_text(
    font: &SceneFont,
    text: &str,
    canvas: (u32, u32),
    font_px: f32,
    color: Rgb,
    background: [u8; 4],
) -> RgbaImage {
    let (width, height) = canvas;
    let mut image = RgbaImage::from_pixel(width, height, Rgba(background));

    match font {
        SceneFont::Truetype(font) => draw_truetype(&mut image, font, text, font_px, color),
        SceneFont::Builtin => draw_builtin(&mut image, text, font_px, color),
    }

    image
}

struct PlacedGlyph {
    x: f32,
    y: f32,
    width: usize,
    height: usize,
    coverage: Vec<u8>,
}

fn draw_truetype(image: &mut RgbaImage, font: &Font, text: &str, font_px: f32, color: Rgb) {
    let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings {
        x: 0.0,
        y: 0.0,
        max_width: None,
        max_height: None,
        horizontal_align: HorizontalAlign::Left,
        vertical_align: VerticalAlign::Top,
        line_height: 1.0,
        wrap_style: WrapStyle::Letter,
        wrap_hard_breaks: true,
    });
    layout.append(&[font], &TextStyle::new(text, font_px, 0));

    let mut placed = Vec::new();
    let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
    let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);

    for glyph in layout.glyphs() {
        if glyph.width == 0 || glyph.height == 0 {
            continue;
        }
        let (_, coverage) = font.rasterize_config(glyph.key);
        min_x = min_x.min(glyph.x);
        min_y = min_y.min(glyph.y);
        max_x = max_x.max(glyph.x + glyph.width as f32);
        max_y = max_y.max(glyph.y + glyph.height as f32);
        placed.push(PlacedGlyph {
            x: glyph.x,
            y: glyph.y,
            width: glyph.width,
            height: glyph.height,
            coverage,
        });
    }

    if placed.is_empty() {
        return;
    }

    let offset_x = (image.width() as f32 - (max_x - min_x)) / 2.0 - min_x;
    let offset_y = (image.height() as f32 - (max_y - min_y)) / 2.0 - min_y;

    for glyph in &placed {
        let x = (glyph.x + offset_x).round() as i32;
        let y = (glyph.y + offset_y).round() as i32;
        blend_coverage(image, x, y, glyph.width, glyph.height, &glyph.coverage, color);
    }
}

fn blend_coverage(
    image: &mut RgbaImage,
    x: i32,
    y: i32,
    width: usize,
    height: usize,
    coverage: &[u8],
    color: Rgb,
) {
    for row in 0..height {
        let py = y + row as i32;
        if py < 0 || py >= image.height() as i32 {
            continue;
        }
        for col in 0..width {
            let px = x + col as i32;
            if px < 0 || px >= image.width() as i32 {
                continue;
            }
            let mask = coverage[row * width + col];
            if mask == 0 {
                continue;
            }
            blend_pixel(
                image.get_pixel_mut(px as u32, py as u32),
                [color[0], color[1], color[2], mask],
            );
        }
    }
}

/// Source-over blend in integer math.
fn blend_pixel(dst: &mut Rgba<u8>, src: [u8; 4]) {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return;
    }
    let da = u32::from(dst.0[3]);
    let out_a = sa + da * (255 - sa) / 255;
    if out_a == 0 {
        return;
    }
    for channel in 0..3 {
        let s = u32::from(src[channel]);
        let d = u32::from(dst.0[channel]);
        dst.0[channel] = ((s * sa + d * da * (255 - sa) / 255) / out_a) as u8;
    }
    dst.0[3] = out_a as u8;
}

// Built-in 5x7 face, one column per byte with bit 0 at the top. Glyph cells
// advance 6 columns and lines advance 8 rows before scaling.
const BUILTIN_COLS: usize = 5;
const BUILTIN_ROWS: u32 = 7;
const BUILTIN_ADVANCE: u32 = 6;
const BUILTIN_LINE_ADVANCE: u32 = 8;

fn draw_builtin(image: &mut RgbaImage, text: &str, font_px: f32, color: Rgb) {
    let scale = (font_px / BUILTIN_ROWS as f32).round().max(1.0) as u32;
    let lines: Vec<&str> = text.split('\n').collect();

    let block_width = lines
        .iter()
        .map(|line| builtin_line_width(line, scale))
        .max()
        .unwrap_or(0);
    let line_count = lines.len() as u32;
    let block_height = line_count * BUILTIN_LINE_ADVANCE * scale - scale;

    let x0 = (image.width() as i32 - block_width as i32) / 2;
    let y0 = (image.height() as i32 - block_height as i32) / 2;

    for (line_index, line) in lines.iter().enumerate() {
        let y = y0 + (line_index as u32 * BUILTIN_LINE_ADVANCE * scale) as i32;
        for (char_index, ch) in line.chars().enumerate() {
            let x = x0 + (char_index as u32 * BUILTIN_ADVANCE * scale) as i32;
            draw_builtin_glyph(image, x, y, ch, scale, color);
        }
    }
}

fn builtin_line_width(line: &str, scale: u32) -> u32 {
    let chars = line.chars().count() as u32;
    if chars == 0 {
        0
    } else {
        chars * BUILTIN_ADVANCE * scale - scale
    }
}

fn draw_builtin_glyph(image: &mut RgbaImage, x: i32, y: i32, ch: char, scale: u32, color: Rgb) {
    let glyph = builtin_glyph(ch);
    for (col, bits) in glyph.iter().enumerate() {
        for row in 0..BUILTIN_ROWS {
            if (bits >> row) & 1 == 0 {
                continue;
            }
            let px = x + (col as u32 * scale) as i32;
            let py = y + (row * scale) as i32;
            fill_square(image, px, py, scale, color);
        }
    }
}

fn fill_square(image: &mut RgbaImage, x: i32, y: i32, size: u32, color: Rgb) {
    for dy in 0..size {
        let py = y + dy as i32;
        if py < 0 || py >= image.height() as i32 {
            continue;
        }
        for dx in 0..size {
            let px = x + dx as i32;
            if px < 0 || px >= image.width() as i32 {
                continue;
            }
            *image.get_pixel_mut(px as u32, py as u32) = Rgba([color[0], color[1], color[2], 255]);
        }
    }
}

fn builtin_glyph(ch: char) -> [u8; BUILTIN_COLS] {
    let index = if ch.is_ascii() && (' '..='\u{7f}').contains(&ch) {
        ch as usize - 0x20
    } else {
        b'?' as usize - 0x20
    };
    FONT_5X7[index]
}

#[rustfmt::skip]
const FONT_5X7: [[u8; BUILTIN_COLS]; 96] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x4F, 0x00, 0x00], // '!'
    [0x00, 0x07, 0x00, 0x07, 0x00], // '"'
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // '#'
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // '$'
    [0x23, 0x13, 0x08, 0x64, 0x62], // '%'
    [0x36, 0x49, 0x55, 0x22, 0x50], // '&'
    [0x00, 0x05, 0x03, 0x00, 0x00], // '\''
    [0x00, 0x1C, 0x22, 0x41, 0x00], // '('
    [0x00, 0x41, 0x22, 0x1C, 0x00], // ')'
    [0x14, 0x08, 0x3E, 0x08, 0x14], // '*'
    [0x08, 0x08, 0x3E, 0x08, 0x08], // '+'
    [0x00, 0x50, 0x30, 0x00, 0x00], // ','
    [0x08, 0x08, 0x08, 0x08, 0x08], // '-'
    [0x00, 0x60, 0x60, 0x00, 0x00], // '.'
    [0x20, 0x10, 0x08, 0x04, 0x02], // '/'
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // '0'
    [0x00, 0x42, 0x7F, 0x40, 0x00], // '1'
    [0x42, 0x61, 0x51, 0x49, 0x46], // '2'
    [0x21, 0x41, 0x45, 0x4B, 0x31], // '3'
    [0x18, 0x14, 0x12, 0x7F, 0x10], // '4'
    [0x27, 0x45, 0x45, 0x45, 0x39], // '5'
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // '6'
    [0x01, 0x71, 0x09, 0x05, 0x03], // '7'
    [0x36, 0x49, 0x49, 0x49, 0x36], // '8'
    [0x06, 0x49, 0x49, 0x29, 0x1E], // '9'
    [0x00, 0x36, 0x36, 0x00, 0x00], // ':'
    [0x00, 0x56, 0x36, 0x00, 0x00], // ';'
    [0x08, 0x14, 0x22, 0x41, 0x00], // '<'
    [0x14, 0x14, 0x14, 0x14, 0x14], // '='
    [0x00, 0x41, 0x22, 0x14, 0x08], // '>'
    [0x02, 0x01, 0x51, 0x09, 0x06], // '?'
    [0x32, 0x49, 0x79, 0x41, 0x3E], // '@'
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // 'A'
    [0x7F, 0x49, 0x49, 0x49, 0x36], // 'B'
    [0x3E, 0x41, 0x41, 0x41, 0x22], // 'C'
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // 'D'
    [0x7F, 0x49, 0x49, 0x49, 0x41], // 'E'
    [0x7F, 0x09, 0x09, 0x09, 0x01], // 'F'
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // 'G'
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // 'H'
    [0x00, 0x41, 0x7F, 0x41, 0x00], // 'I'
    [0x20, 0x40, 0x41, 0x3F, 0x01], // 'J'
    [0x7F, 0x08, 0x14, 0x22, 0x41], // 'K'
    [0x7F, 0x40, 0x40, 0x40, 0x40], // 'L'
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // 'M'
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // 'N'
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // 'O'
    [0x7F, 0x09, 0x09, 0x09, 0x06], // 'P'
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // 'Q'
    [0x7F, 0x09, 0x19, 0x29, 0x46], // 'R'
    [0x46, 0x49, 0x49, 0x49, 0x31], // 'S'
    [0x01, 0x01, 0x7F, 0x01, 0x01], // 'T'
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // 'U'
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // 'V'
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // 'W'
    [0x63, 0x14, 0x08, 0x14, 0x63], // 'X'
    [0x07, 0x08, 0x70, 0x08, 0x07], // 'Y'
    [0x61, 0x51, 0x49, 0x45, 0x43], // 'Z'
    [0x00, 0x7F, 0x41, 0x41, 0x00], // '['
    [0x02, 0x04, 0x08, 0x10, 0x20], // '\\'
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ']'
    [0x04, 0x02, 0x01, 0x02, 0x04], // '^'
    [0x40, 0x40, 0x40, 0x40, 0x40], // '_'
    [0x00, 0x01, 0x02, 0x04, 0x00], // '`'
    [0x20, 0x54, 0x54, 0x54, 0x78], // 'a'
    [0x7F, 0x48, 0x44, 0x44, 0x38], // 'b'
    [0x38, 0x44, 0x44, 0x44, 0x20], // 'c'
    [0x38, 0x44, 0x44, 0x48, 0x7F], // 'd'
    [0x38, 0x54, 0x54, 0x54, 0x18], // 'e'
    [0x08, 0x7E, 0x09, 0x01, 0x02], // 'f'
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // 'g'
    [0x7F, 0x08, 0x04, 0x04, 0x78], // 'h'
    [0x00, 0x44, 0x7D, 0x40, 0x00], // 'i'
    [0x20, 0x40, 0x44, 0x3D, 0x00], // 'j'
    [0x7F, 0x10, 0x28, 0x44, 0x00], // 'k'
    [0x00, 0x41, 0x7F, 0x40, 0x00], // 'l'
    [0x7C, 0x04, 0x18, 0x04, 0x78], // 'm'
    [0x7C, 0x08, 0x04, 0x04, 0x78], // 'n'
    [0x38, 0x44, 0x44, 0x44, 0x38], // 'o'
    [0x7C, 0x14, 0x14, 0x14, 0x08], // 'p'
    [0x08, 0x14, 0x14, 0x18, 0x7C], // 'q'
    [0x7C, 0x08, 0x04, 0x04, 0x08], // 'r'
    [0x48, 0x54, 0x54, 0x54, 0x20], // 's'
    [0x04, 0x3F, 0x44, 0x40, 0x20], // 't'
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // 'u'
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // 'v'
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // 'w'
    [0x44, 0x28, 0x10, 0x28, 0x44], // 'x'
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // 'y'
    [0x44, 0x64, 0x54, 0x4C, 0x44], // 'z'
    [0x00, 0x08, 0x36, 0x41, 0x00], // '{'
    [0x00, 0x00, 0x7F, 0x00, 0x00], // '|'
    [0x00, 0x41, 0x36, 0x08, 0x00], // '}'
    [0x08, 0x04, 0x08, 0x10, 0x08], // '~'
    [0x00, 0x00, 0x00, 0x00, 0x00], // DEL
];
