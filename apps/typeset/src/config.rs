use anyhow::{bail, Context, Result};

use typeset::layout::{default_page_config, PageConfig};

/// Body font sizes accepted from the environment, in points.
const FONT_SIZE_RANGE: std::ops::RangeInclusive<f32> = 6.0..=16.0;

/// Process configuration loaded from environment variables.
/// Fails at startup if a variable is set to an invalid value.
#[derive(Debug, Clone)]
pub struct Config {
    pub rust_log: String,
    /// Overrides the 10pt body size when set.
    pub base_font_size: Option<f32>,
    pub compress: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let base_font_size = match std::env::var("TYPESET_BASE_FONT_SIZE") {
            Ok(raw) => Some(
                parse_font_size(&raw)
                    .context("TYPESET_BASE_FONT_SIZE must be a number of points")?,
            ),
            Err(_) => None,
        };
        let compress = match std::env::var("TYPESET_COMPRESS") {
            Ok(raw) => parse_flag(&raw).context("TYPESET_COMPRESS must be true or false")?,
            Err(_) => true,
        };

        Ok(Config {
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            base_font_size,
            compress,
        })
    }

    /// Page config with the environment overrides applied.
    pub fn page_config(&self) -> PageConfig {
        let mut page = default_page_config();
        if let Some(size) = self.base_font_size {
            page.base_font_size = size;
        }
        page.compress = self.compress;
        page
    }
}

fn parse_font_size(raw: &str) -> Result<f32> {
    let size: f32 = raw
        .trim()
        .parse()
        .with_context(|| format!("'{raw}' is not a number"))?;
    if !FONT_SIZE_RANGE.contains(&size) {
        bail!(
            "{size}pt is outside {}..={}",
            FONT_SIZE_RANGE.start(),
            FONT_SIZE_RANGE.end()
        );
    }
    Ok(size)
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("'{other}' is not a boolean"),
    }
}
