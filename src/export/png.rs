use crate::color::{ColorMapper, Palette, Rgb};
use crate::heightfield::HeightField;
use crate::noise::NoiseSource;
use crate::normals::estimate_normal;
use crate::render::Light;
use font8x8::UnicodeFonts;
use image::{ImageResult, Rgb as Pixel, RgbImage};
use std::path::Path;

/// Float colour in `[0, 1]` → 8-bit pixel.
fn to_pixel(c: Rgb) -> Pixel<u8> {
    Pixel(c.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8))
}

/// Writes an image and logs where it went.
pub fn save(img: &RgbImage, path: &Path) -> ImageResult<()> {
    img.save(path)?;
    tracing::info!(path = %path.display(), "wrote image");
    Ok(())
}

// ── Top-down preview ──────────────────────────────────────────────────────────

/// One pixel per grid vertex (x → column, z → row), coloured exactly as the
/// mesh colours it and shaded by the vertex normal under `light`.
pub fn render_preview(
    field: &HeightField,
    mapper: &ColorMapper,
    noise: &impl NoiseSource,
    light: &Light,
) -> RgbImage {
    let mut img = RgbImage::new(field.width() as u32, field.depth() as u32);
    for z in 0..field.depth() {
        for x in 0..field.width() {
            let v = field.place_vertex(x, z);
            let color = mapper.color_for(v, field.min_height(), field.max_height(), noise);
            let shaded = light.shade(color, estimate_normal(field, x, z));
            img.put_pixel(x as u32, z as u32, to_pixel(shaded));
        }
    }
    img
}

pub fn export_preview(
    field: &HeightField,
    mapper: &ColorMapper,
    noise: &impl NoiseSource,
    path: &Path,
) -> ImageResult<()> {
    save(&render_preview(field, mapper, noise, &Light::default()), path)
}

// ── Legend PNG ────────────────────────────────────────────────────────────────

/// Scale factor for the bitmap font (each logical pixel becomes `SCALE` screen pixels).
const FONT_SCALE: u32 = 2;
/// Width of one character in screen pixels.
const CHAR_W: u32 = 8 * FONT_SCALE;
/// Height of one character in screen pixels.
const CHAR_H: u32 = 8 * FONT_SCALE;

/// Draw a single character at (x, y) using the 8×8 bitmap font.
fn draw_char(img: &mut RgbImage, c: char, x: u32, y: u32, color: [u8; 3]) {
    let Some(glyph) = font8x8::BASIC_FONTS.get(c) else {
        return;
    };
    for (row, &byte) in glyph.iter().enumerate() {
        for col in 0u32..8 {
            if byte & (1 << col) == 0 {
                continue;
            }
            let px = x + col * FONT_SCALE;
            let py = y + row as u32 * FONT_SCALE;
            fill_rect(img, px, py, FONT_SCALE, FONT_SCALE, color);
        }
    }
}

fn draw_str(img: &mut RgbImage, s: &str, x: u32, y: u32, color: [u8; 3]) {
    for (i, c) in s.chars().enumerate() {
        draw_char(img, c, x + i as u32 * CHAR_W, y, color);
    }
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
    for py in y..(y + h).min(img.height()) {
        for px in x..(x + w).min(img.width()) {
            img.put_pixel(px, py, Pixel(color));
        }
    }
}

fn outline_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
    for dx in 0..w {
        img.put_pixel(x + dx, y, Pixel(color));
        img.put_pixel(x + dx, y + h - 1, Pixel(color));
    }
    for dy in 0..h {
        img.put_pixel(x, y + dy, Pixel(color));
        img.put_pixel(x + w - 1, y + dy, Pixel(color));
    }
}

/// A run of identical palette entries, shown as one legend row.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Band {
    pub first: usize,
    pub last: usize,
    pub color: Rgb,
    /// Heights at which the band starts and ends.
    pub from: f32,
    pub to: f32,
}

/// Collapses consecutive equal palette entries and attaches the height range
/// each run covers within `[min_height, max_height]`.
pub fn palette_bands(palette: &Palette, min_height: f32, max_height: f32) -> Vec<Band> {
    let colors = palette.colors();
    let steps = (colors.len() - 1).max(1) as f32;
    let height_at = |i: usize| min_height + (max_height - min_height) * i as f32 / steps;

    let mut bands: Vec<Band> = Vec::new();
    for (i, &color) in colors.iter().enumerate() {
        match bands.last_mut() {
            Some(band) if band.color == color => {
                band.last = i;
                band.to = height_at(i);
            }
            _ => bands.push(Band {
                first: i,
                last: i,
                color,
                from: height_at(i),
                to: height_at(i),
            }),
        }
    }
    bands
}

/// Outer margin and row pitch of the legend, in screen pixels.
const MARGIN: u32 = 12;
const LINE_H: u32 = CHAR_H + 4;
const SWATCH_W: u32 = 40;

const LEGEND_BG: [u8; 3] = [24, 20, 16];
const LEGEND_INK: [u8; 3] = [225, 220, 205];
const LEGEND_RULE: [u8; 3] = [90, 80, 64];

fn band_label(band: &Band) -> String {
    let index = if band.first == band.last {
        format!("{:>2}", band.first)
    } else {
        format!("{}-{}", band.first, band.last)
    };
    format!("{index:<6}{:>6.0} - {:<6.0}", band.from, band.to)
}

fn text_width(s: &str) -> u32 {
    s.chars().count() as u32 * CHAR_W
}

/// Run metadata as `key: value` lines, a rule, then one swatch per palette
/// band from the highest down.
pub fn render_legend(field: &HeightField, palette: &Palette, meta: &[(&str, String)]) -> RgbImage {
    let bands = palette_bands(palette, field.min_height(), field.max_height());
    let meta_lines: Vec<String> = meta.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    let band_lines: Vec<(Rgb, String)> =
        bands.iter().rev().map(|b| (b.color, band_label(b))).collect();

    let meta_w = meta_lines.iter().map(|l| text_width(l)).max().unwrap_or(0);
    let band_w = band_lines
        .iter()
        .map(|(_, l)| SWATCH_W + MARGIN + text_width(l))
        .max()
        .unwrap_or(0);
    let rule_h = if meta_lines.is_empty() { 0 } else { MARGIN };
    let img_w = 2 * MARGIN + meta_w.max(band_w);
    let img_h = 2 * MARGIN + (meta_lines.len() + band_lines.len()) as u32 * LINE_H + rule_h;

    let mut img = RgbImage::from_pixel(img_w, img_h, Pixel(LEGEND_BG));
    let mut y = MARGIN;
    for line in &meta_lines {
        draw_str(&mut img, line, MARGIN, y, LEGEND_INK);
        y += LINE_H;
    }
    if rule_h > 0 {
        fill_rect(&mut img, MARGIN, y + rule_h / 2 - 1, img_w - 2 * MARGIN, 1, LEGEND_RULE);
        y += rule_h;
    }
    for (color, label) in &band_lines {
        fill_rect(&mut img, MARGIN, y, SWATCH_W, CHAR_H, to_pixel(*color).0);
        outline_rect(&mut img, MARGIN, y, SWATCH_W, CHAR_H, LEGEND_RULE);
        draw_str(&mut img, label, MARGIN + SWATCH_W + MARGIN, y, LEGEND_INK);
        y += LINE_H;
    }
    img
}

pub fn export_legend(
    field: &HeightField,
    palette: &Palette,
    meta: &[(&str, String)],
    path: &Path,
) -> ImageResult<()> {
    save(&render_legend(field, palette, meta), path)
}
