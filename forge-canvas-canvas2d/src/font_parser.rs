//! CSS font string parsing.
//!
//! Turns strings like `"24px Arial"` or `"bold italic 14pt 'Noto Sans', sans-serif"`
//! into the pieces cosmic-text needs.

use crate::error::{Canvas2dError, Canvas2dResult};
use cosmic_text::{Style, Weight};

/// Root em size used to resolve relative units.
const ROOT_EM_PX: f32 = 16.0;

/// Parsed font specification from a CSS font string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFont {
    /// Font style (normal, italic, oblique).
    pub style: Style,
    /// Font weight (100-900 or keywords like bold).
    pub weight: Weight,
    /// Font size in pixels.
    pub size_px: f32,
    /// Font families in order of preference.
    pub families: Vec<String>,
}

impl Default for ParsedFont {
    fn default() -> Self {
        Self {
            style: Style::Normal,
            weight: Weight::NORMAL,
            size_px: 10.0,
            families: vec!["sans-serif".to_string()],
        }
    }
}

/// Parse a CSS font shorthand: `[style] [variant] [weight] size[/line-height] family[, family]*`.
///
/// An empty string yields the default font (`10px sans-serif`).
pub fn parse_font(font_str: &str) -> Canvas2dResult<ParsedFont> {
    let mut rest = font_str.trim();
    let mut font = ParsedFont::default();
    if rest.is_empty() {
        return Ok(font);
    }

    // Leading keywords until the size token.
    loop {
        let (word, after) = split_word(rest);
        if word.is_empty() || starts_size(word) {
            break;
        }
        match word {
            "italic" => font.style = Style::Italic,
            "oblique" => font.style = Style::Oblique,
            "bold" => font.weight = Weight::BOLD,
            "bolder" => font.weight = Weight::EXTRA_BOLD,
            "lighter" => font.weight = Weight::LIGHT,
            "normal" | "small-caps" => {}
            _ if word.parse::<u16>().is_ok() => font.weight = Weight(word.parse().unwrap_or(400)),
            _ => match keyword_size(word) {
                Some(_) => break,
                None => {
                    return Err(Canvas2dError::FontParseError(format!(
                        "Unexpected token `{word}` in font `{font_str}`"
                    )))
                }
            },
        }
        rest = after;
    }

    let (size_token, after) = split_word(rest);
    // `16px/1.2 Arial`: drop the line height
    let size_part = size_token.split('/').next().unwrap_or_default();
    font.size_px = parse_size(size_part)
        .ok_or_else(|| Canvas2dError::FontParseError(format!("Invalid font size in `{font_str}`")))?;

    let families = parse_families(after);
    if !families.is_empty() {
        font.families = families;
    }
    Ok(font)
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], &s[end..]),
        None => (s, ""),
    }
}

/// Numeric weights are three-digit multiples of 100, sizes carry a unit or a decimal point.
fn starts_size(word: &str) -> bool {
    if let Ok(weight) = word.parse::<u16>() {
        return !((100..=900).contains(&weight) && weight % 100 == 0);
    }
    word.starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

fn keyword_size(word: &str) -> Option<f32> {
    let px = match word {
        "xx-small" => 9.0,
        "x-small" => 10.0,
        "small" => 13.0,
        "medium" => 16.0,
        "large" => 18.0,
        "x-large" => 24.0,
        "xx-large" => 32.0,
        _ => return None,
    };
    Some(px)
}

fn parse_size(token: &str) -> Option<f32> {
    if let Some(px) = keyword_size(token) {
        return Some(px);
    }
    let split = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    let (number, unit) = token.split_at(split);
    let value: f32 = number.parse().ok()?;
    let scale = match unit {
        "" | "px" => 1.0,
        "pt" => 4.0 / 3.0,
        "em" | "rem" => ROOT_EM_PX,
        "%" => ROOT_EM_PX / 100.0,
        _ => return None,
    };
    let size = value * scale;
    (size.is_finite() && size > 0.0).then_some(size)
}

fn parse_families(s: &str) -> Vec<String> {
    s.split(',')
        .map(|family| family.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|family| !family.is_empty())
        .map(str::to_string)
        .collect()
}
