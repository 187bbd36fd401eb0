//! TrueType fonts for the card text.
//!
//! Fonts are read at run time from `<fonts_dir>/<family>/{regular,bold}.ttf`.

use super::{TextStyle, Typesetter};
use crate::error::ScrapeError;
use ab_glyph::{FontVec, PxScale};
use clap::ValueEnum;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FontFamily {
    Geist,
    Roboto,
}

impl FontFamily {
    pub fn dir_name(self) -> &'static str {
        match self {
            FontFamily::Geist => "geist",
            FontFamily::Roboto => "roboto",
        }
    }
}

/// Regular and bold faces of one family.
pub struct FontSet {
    regular: FontVec,
    bold: FontVec,
}

impl FontSet {
    #[instrument(level = "info", skip(fonts_dir), fields(fonts_dir = %fonts_dir.display()))]
    pub async fn load(fonts_dir: &Path, family: FontFamily) -> Result<Self, ScrapeError> {
        let dir = fonts_dir.join(family.dir_name());
        let fonts = Self {
            regular: load_font(&dir.join("regular.ttf")).await?,
            bold: load_font(&dir.join("bold.ttf")).await?,
        };
        info!("Loaded fonts");
        Ok(fonts)
    }

    fn face(&self, style: TextStyle) -> (&FontVec, PxScale) {
        let font = match style {
            TextStyle::Name => &self.bold,
            TextStyle::Title | TextStyle::Job => &self.regular,
        };
        (font, PxScale::from(style.px()))
    }
}

async fn load_font(path: &Path) -> Result<FontVec, ScrapeError> {
    let bytes = fs::read(path).await?;
    FontVec::try_from_vec(bytes).map_err(|e| ScrapeError::Font {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

impl Typesetter for FontSet {
    fn text_size(&self, style: TextStyle, text: &str) -> (u32, u32) {
        let (font, scale) = self.face(style);
        text_size(scale, font, text)
    }

    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        style: TextStyle,
        color: Rgba<u8>,
        x: i32,
        y: i32,
        text: &str,
    ) {
        let (font, scale) = self.face(style);
        draw_text_mut(canvas, color, x, y, scale, font, text);
    }
}
