//! OpenGraph card renderer.
//!
//! Turns an export written by the JugRu scraper into one PNG per speaker:
//! the talk title over a template background, a round avatar with the
//! speaker's name and job title underneath, and the conference logo in the
//! top-right corner.
//!
//! Layout, for a 1920x1061 template:
//!
//! ```text
//! +-------------------------------------------+------+
//! |                                           | logo |
//! |   Talk title, word-wrapped,                +------+
//! |   at most four lines                      |
//! |                                           |
//! |   (avatar)  Speaker Name                  |
//! |             Job title                     |
//! +-------------------------------------------------+
//! ```

pub mod fonts;
pub mod images;

use crate::cli::OpenGraphArgs;
use crate::error::ScrapeError;
use crate::models::{Export, TalkRecord};
use crate::utils::ensure_writable_dir;
use fonts::FontSet;
use image::{ImageFormat, Rgba, RgbaImage, imageops};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument, warn};

const CONTENT_MARGIN: u32 = 220;
const TITLE_Y: u32 = 275;
const TITLE_LINE_HEIGHT: u32 = 100;
const MAX_TITLE_LINES: usize = 4;
const BOTTOM_Y: u32 = 800;
const AVATAR_SIZE: u32 = 120;
const AVATAR_RING: u32 = 4;
const SPEAKER_GAP: u32 = 40;
const JOB_GAP: u32 = 20;
const LOGO_SIZE: u32 = 150;
const LOGO_MARGIN: u32 = 50;

const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const JOB_COLOR: Rgba<u8> = Rgba([180, 180, 180, 255]);

/// Which piece of card text is being set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Name,
    Job,
}

impl TextStyle {
    pub fn px(self) -> f32 {
        match self {
            TextStyle::Title => 90.0,
            TextStyle::Name => 48.0,
            TextStyle::Job => 36.0,
        }
    }
}

/// Measures and draws text. [`FontSet`] is the real implementation.
pub trait Typesetter {
    /// Width and height of `text` in pixels.
    fn text_size(&self, style: TextStyle, text: &str) -> (u32, u32);

    /// Draw `text` with its top-left corner at `(x, y)`.
    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        style: TextStyle,
        color: Rgba<u8>,
        x: i32,
        y: i32,
        text: &str,
    );
}

/// Greedy word wrap. A word wider than `max_width` on its own still gets
/// a line of its own.
pub fn wrap_title(title: &str, max_width: u32, measure: impl Fn(&str) -> u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in title.split_whitespace() {
        let candidate = current
            .iter()
            .copied()
            .chain(std::iter::once(word))
            .collect::<Vec<_>>()
            .join(" ");
        if measure(&candidate) <= max_width {
            current.push(word);
        } else if current.is_empty() {
            lines.push(word.to_string());
        } else {
            lines.push(current.join(" "));
            current = vec![word];
        }
    }
    if !current.is_empty() {
        lines.push(current.join(" "));
    }
    lines
}

/// `Jane Doe` -> `Jane_Doe_opengraph.png`.
pub fn output_filename(name: &str) -> String {
    format!("{}_opengraph.png", name.replace([' ', '/'], "_"))
}

/// Draw one card on a copy of `template`.
pub fn render_speaker(
    template: &RgbaImage,
    talk: &TalkRecord,
    avatar: Option<&RgbaImage>,
    logo: Option<&RgbaImage>,
    text: &dyn Typesetter,
) -> RgbaImage {
    let mut card = template.clone();
    let width = card.width();

    let title_width = width.saturating_sub(CONTENT_MARGIN * 2);
    let lines = wrap_title(&talk.talk_title, title_width, |line| {
        text.text_size(TextStyle::Title, line).0
    });
    for (i, line) in lines.iter().take(MAX_TITLE_LINES).enumerate() {
        let y = TITLE_Y + i as u32 * TITLE_LINE_HEIGHT;
        text.draw_text(&mut card, TextStyle::Title, TEXT_COLOR, CONTENT_MARGIN as i32, y as i32, line);
    }

    if let Some(avatar) = avatar {
        imageops::overlay(&mut card, avatar, CONTENT_MARGIN.into(), BOTTOM_Y.into());
    }

    let speaker_x = (CONTENT_MARGIN + AVATAR_SIZE + SPEAKER_GAP) as i32;
    text.draw_text(&mut card, TextStyle::Name, TEXT_COLOR, speaker_x, BOTTOM_Y as i32, &talk.name);
    let (_, name_height) = text.text_size(TextStyle::Name, &talk.name);
    let job_y = (BOTTOM_Y + name_height + JOB_GAP) as i32;
    text.draw_text(&mut card, TextStyle::Job, JOB_COLOR, speaker_x, job_y, &talk.job_title);

    if let Some(logo) = logo {
        let x = i64::from(width) - i64::from(LOGO_SIZE + LOGO_MARGIN);
        imageops::overlay(&mut card, logo, x, LOGO_MARGIN.into());
    }

    card
}

async fn speaker_avatar(url: &str) -> Option<RgbaImage> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    match images::fetch_image(url, AVATAR_SIZE).await {
        Ok(photo) => Some(images::round_avatar(&photo, AVATAR_SIZE, AVATAR_RING)),
        Err(e) => {
            warn!(error = %e, %url, "Avatar unavailable, rendering without it");
            None
        }
    }
}

/// Render a card for every talk into `output_dir`.
///
/// A logo or avatar that can't be loaded is left off the card. Speakers
/// sharing a name share a filename, so the later card wins.
///
/// # Returns
///
/// Paths of the written PNG files, in talk order.
#[instrument(level = "info", skip_all, fields(talks = talks.len(), output_dir = %output_dir.display()))]
pub async fn render_all(
    talks: &[TalkRecord],
    logo_source: Option<&str>,
    template: &RgbaImage,
    text: &dyn Typesetter,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, ScrapeError> {
    if let Err(e) = ensure_writable_dir(output_dir).await {
        error!(error = %e, "Output directory is not writable");
        return Err(e.into());
    }

    let logo = match logo_source.filter(|source| !source.trim().is_empty()) {
        Some(source) => match images::load_logo(source, LOGO_SIZE).await {
            Ok(logo) => Some(logo),
            Err(e) => {
                warn!(error = %e, "Logo unavailable, rendering without it");
                None
            }
        },
        None => None,
    };

    let mut written = Vec::with_capacity(talks.len());
    for talk in talks {
        let avatar = speaker_avatar(&talk.avatar_url).await;
        let card = render_speaker(template, talk, avatar.as_ref(), logo.as_ref(), text);

        let mut png = Vec::new();
        card.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        let path = output_dir.join(output_filename(&talk.name));
        fs::write(&path, png).await?;
        info!(path = %path.display(), speaker = %talk.name, "Wrote OpenGraph card");
        written.push(path);
    }

    Ok(written)
}

/// Load the export, template and fonts named in `args` and render every card.
#[instrument(level = "info", skip_all, fields(file = %args.file.display(), font = ?args.font))]
pub async fn run_opengraph(args: &OpenGraphArgs) -> Result<Vec<PathBuf>, ScrapeError> {
    let export: Export = serde_json::from_str(&fs::read_to_string(&args.file).await?)?;
    let template = image::load_from_memory(&fs::read(&args.template).await?)?.to_rgba8();
    let fonts = FontSet::load(&args.fonts_dir, args.font).await?;

    let (talks, logo) = export.into_parts();
    info!(
        talks = talks.len(),
        width = template.width(),
        height = template.height(),
        "Rendering OpenGraph cards"
    );
    render_all(&talks, logo.as_deref(), &template, &fonts, &args.images_dir).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logo::SVG_DATA_URI_PREFIX;
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use image::DynamicImage;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="32" height="32"><rect width="32" height="32" fill="#00ff00"/></svg>"##;

    /// Draws every string as a solid block, half an em wide per character.
    struct BlockText;

    impl Typesetter for BlockText {
        fn text_size(&self, style: TextStyle, text: &str) -> (u32, u32) {
            if text.is_empty() {
                return (0, 0);
            }
            let px = style.px() as u32;
            (text.chars().count() as u32 * px / 2, px)
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
            let (w, h) = self.text_size(style, text);
            if w > 0 && h > 0 {
                draw_filled_rect_mut(canvas, Rect::at(x, y).of_size(w, h), color);
            }
        }
    }

    fn template() -> RgbaImage {
        RgbaImage::from_pixel(1920, 1061, BLACK)
    }

    fn talk(name: &str, title: &str, avatar_url: &str) -> TalkRecord {
        TalkRecord {
            name: name.to_string(),
            job_title: "Acme".to_string(),
            talk_title: title.to_string(),
            talk_description: None,
            avatar_url: avatar_url.to_string(),
        }
    }

    fn red_png() -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, RED))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn svg_logo_uri() -> String {
        format!("{SVG_DATA_URI_PREFIX}{}", STANDARD.encode(GREEN_SVG))
    }

    fn chars(line: &str) -> u32 {
        line.chars().count() as u32
    }

    #[test]
    fn test_wrap_title_greedy() {
        assert_eq!(
            wrap_title("one two three four", 9, chars),
            vec!["one two", "three", "four"]
        );
        assert_eq!(wrap_title("  ", 9, chars), Vec::<String>::new());
    }

    #[test]
    fn test_wrap_title_long_word_gets_own_line() {
        assert_eq!(
            wrap_title("a supercalifragilistic b", 5, chars),
            vec!["a", "supercalifragilistic", "b"]
        );
    }

    #[test]
    fn test_output_filename() {
        assert_eq!(output_filename("Jane Doe"), "Jane_Doe_opengraph.png");
        assert_eq!(output_filename("A/B Team"), "A_B_Team_opengraph.png");
    }

    #[test]
    fn test_render_speaker_layout() {
        // 10-letter words at 45px each: three per 1480px line, five lines
        let title = vec!["abcdefghij"; 15].join(" ");
        let avatar = images::round_avatar(
            &DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, RED)),
            AVATAR_SIZE,
            AVATAR_RING,
        );
        let card = render_speaker(
            &template(),
            &talk("Jane Doe", &title, ""),
            Some(&avatar),
            None,
            &BlockText,
        );

        assert_eq!(card.dimensions(), (1920, 1061));
        assert_eq!(*card.get_pixel(221, 276), TEXT_COLOR);
        assert_eq!(*card.get_pixel(221, 576), TEXT_COLOR);
        // Fifth line is dropped
        assert_eq!(*card.get_pixel(221, 676), BLACK);
        assert_eq!(*card.get_pixel(284, 864), RED);
        assert_eq!(*card.get_pixel(284, 801), TEXT_COLOR);
        // Name at the avatar's top, job title below it
        assert_eq!(*card.get_pixel(381, 801), TEXT_COLOR);
        assert_eq!(*card.get_pixel(381, 869), JOB_COLOR);
        // No logo
        assert_eq!(*card.get_pixel(1795, 125), BLACK);
    }

    #[tokio::test]
    async fn test_render_all_with_avatar_and_logo() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jane.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(red_png()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("output");
        let talks = vec![talk(
            "Jane Doe",
            "Scaling Systems",
            &format!("{}/jane.png", server.uri()),
        )];
        let logo = svg_logo_uri();

        let written = render_all(&talks, Some(&logo), &template(), &BlockText, &out)
            .await
            .unwrap();

        assert_eq!(written, vec![out.join("Jane_Doe_opengraph.png")]);
        let card = image::open(&written[0]).unwrap().to_rgba8();
        assert_eq!(card.dimensions(), (1920, 1061));
        assert_eq!(*card.get_pixel(284, 864), RED);
        assert_eq!(*card.get_pixel(1795, 125), Rgba([0, 255, 0, 255]));
        assert_eq!(*card.get_pixel(221, 276), TEXT_COLOR);
    }

    #[tokio::test]
    async fn test_render_all_survives_missing_avatar_and_bad_logo() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let talks = vec![
            talk("Jane Doe", "First", &format!("{}/gone.png", server.uri())),
            talk("John Roe", "Second", ""),
        ];

        let written = render_all(
            &talks,
            Some("data:image/png;base64"),
            &template(),
            &BlockText,
            dir.path(),
        )
        .await
        .unwrap();

        assert_eq!(written.len(), 2);
        let card = image::open(&written[0]).unwrap().to_rgba8();
        assert_eq!(*card.get_pixel(284, 864), BLACK);
        assert_eq!(*card.get_pixel(1795, 125), BLACK);
    }

    #[tokio::test]
    async fn test_run_opengraph_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let args = OpenGraphArgs {
            file: dir.path().join("jugru_talks.json"),
            font: fonts::FontFamily::Geist,
            fonts_dir: dir.path().join("fonts"),
            template: dir.path().join("template.png"),
            images_dir: dir.path().join("output"),
        };

        let err = run_opengraph(&args).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Io(_)));
        assert!(!args.images_dir.exists());
    }
}
