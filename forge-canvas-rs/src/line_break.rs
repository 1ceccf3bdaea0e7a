//! Greedy line breaking over token streams.

use crate::error::FcError;
use crate::measure::WidthOracle;
use crate::surface::TextMeasure;
use crate::token::{Token, TokenKind};
use log::warn;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BreakOptions {
    /// Width budget; `None` disables wrapping.
    pub max_width: Option<f32>,
    /// Break between words where possible instead of between characters.
    pub wrap: bool,
    /// Honor `\n` in the text.
    pub multiline: bool,
}

/// One output line. Adjacent text is kept in a single token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Line {
    pub tokens: Vec<Token>,
}

impl Line {
    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        let mut line = Line::default();
        line.extend(tokens);
        line
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The line's text, emoji included verbatim.
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.content.as_str()).collect()
    }

    /// True for a line holding one emoji or one grapheme.
    pub fn is_single_unit(&self) -> bool {
        match self.tokens.as_slice() {
            [token] => token.is_emoji() || token.content.graphemes(true).count() == 1,
            _ => false,
        }
    }

    pub fn width<M: TextMeasure + ?Sized>(
        &self,
        oracle: &mut WidthOracle,
        surface: &mut M,
    ) -> Result<f32, FcError> {
        oracle.measure_run(surface, &self.tokens)
    }

    fn push(&mut self, token: Token) {
        if token.content.is_empty() {
            return;
        }
        match self.tokens.last_mut() {
            Some(last) if last.kind == TokenKind::Text && token.kind == TokenKind::Text => {
                last.content.push_str(&token.content);
            }
            _ => self.tokens.push(token),
        }
    }

    fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) {
        for token in tokens {
            self.push(token);
        }
    }

    fn with(&self, tokens: &[Token]) -> Line {
        let mut line = self.clone();
        line.extend(tokens.iter().cloned());
        line
    }
}

/// Break `tokens` into lines.
///
/// Always returns at least one line. If measuring fails, the whole input is
/// returned as a single line.
pub fn break_lines<M: TextMeasure + ?Sized>(
    tokens: &[Token],
    options: &BreakOptions,
    oracle: &mut WidthOracle,
    surface: &mut M,
) -> Vec<Line> {
    match try_break_lines(tokens, options, oracle, surface) {
        Ok(lines) => lines,
        Err(err) => {
            warn!("Line breaking failed, drawing text as a single line: {err}");
            vec![Line::from_tokens(tokens.iter().cloned())]
        }
    }
}

fn try_break_lines<M: TextMeasure + ?Sized>(
    tokens: &[Token],
    options: &BreakOptions,
    oracle: &mut WidthOracle,
    surface: &mut M,
) -> Result<Vec<Line>, FcError> {
    let segments = if options.multiline {
        split_explicit_lines(tokens)
    } else {
        vec![tokens.to_vec()]
    };

    let max_width = options.max_width.filter(|w| w.is_finite() && *w > 0.0);
    let Some(max_width) = max_width else {
        return Ok(segments.into_iter().map(Line::from_tokens).collect());
    };

    let mut breaker = Breaker {
        oracle,
        surface,
        max_width,
        lines: Vec::new(),
    };
    for segment in segments {
        let whole = Line::from_tokens(segment.iter().cloned());
        if breaker.fits(&whole)? {
            breaker.lines.push(whole);
        } else if options.wrap {
            breaker.wrap_words(split_words(&segment))?;
        } else {
            let rest = breaker.break_units(units(&segment), Line::default())?;
            breaker.lines.push(rest);
        }
    }
    Ok(breaker.lines)
}

struct Breaker<'a, M: TextMeasure + ?Sized> {
    oracle: &'a mut WidthOracle,
    surface: &'a mut M,
    max_width: f32,
    lines: Vec<Line>,
}

impl<M: TextMeasure + ?Sized> Breaker<'_, M> {
    fn fits(&mut self, line: &Line) -> Result<bool, FcError> {
        Ok(line.width(&mut *self.oracle, &mut *self.surface)? <= self.max_width)
    }

    /// Greedy word wrap. Whitespace at a soft break is dropped.
    fn wrap_words(&mut self, pieces: Vec<Piece>) -> Result<(), FcError> {
        let mut current = Line::default();
        let mut pending_space: Vec<Token> = Vec::new();

        for piece in pieces {
            let word = match piece {
                Piece::Space(space) => {
                    pending_space.push(space);
                    continue;
                }
                Piece::Word(word) => word,
            };

            let candidate = current.with(&pending_space).with(&word);
            pending_space.clear();
            if self.fits(&candidate)? {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                self.lines.push(std::mem::take(&mut current));
            }
            let alone = Line::from_tokens(word.iter().cloned());
            current = if self.fits(&alone)? {
                alone
            } else {
                self.break_units(units(&word), Line::default())?
            };
        }

        if !pending_space.is_empty() {
            let candidate = current.with(&pending_space);
            if self.fits(&candidate)? {
                current = candidate;
            }
        }
        self.lines.push(current);
        Ok(())
    }

    /// Place units one at a time starting from `current`, flushing full lines.
    /// A unit that alone is wider than the budget still gets its own line.
    /// Returns the unfinished last line.
    fn break_units(&mut self, units: Vec<Token>, mut current: Line) -> Result<Line, FcError> {
        for unit in units {
            if current.is_empty() {
                current.push(unit);
                continue;
            }
            let candidate = current.with(std::slice::from_ref(&unit));
            if self.fits(&candidate)? {
                current = candidate;
            } else {
                self.lines.push(std::mem::replace(&mut current, Line::from_tokens([unit])));
            }
        }
        Ok(current)
    }
}

/// Split on `\n` inside text tokens. Emoji never contain newlines.
fn split_explicit_lines(tokens: &[Token]) -> Vec<Vec<Token>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for token in tokens {
        if token.is_emoji() {
            current.push(token.clone());
            continue;
        }
        let mut parts = token.content.split('\n');
        if let Some(first) = parts.next() {
            push_text(&mut current, first);
        }
        for part in parts {
            segments.push(std::mem::take(&mut current));
            push_text(&mut current, part);
        }
    }
    segments.push(current);
    segments
}

fn push_text(tokens: &mut Vec<Token>, text: &str) {
    if !text.is_empty() {
        tokens.push(Token::text(text));
    }
}

enum Piece {
    Space(Token),
    Word(Vec<Token>),
}

/// Group tokens into whitespace runs and words. An emoji touching text with
/// no whitespace in between belongs to that word.
fn split_words(tokens: &[Token]) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut word: Vec<Token> = Vec::new();
    let mut space = String::new();

    for token in tokens {
        if token.is_emoji() {
            if !space.is_empty() {
                pieces.push(Piece::Space(Token::text(std::mem::take(&mut space))));
            }
            word.push(token.clone());
            continue;
        }
        let mut text = String::new();
        for grapheme in token.content.graphemes(true) {
            if grapheme.chars().all(char::is_whitespace) {
                if !text.is_empty() {
                    word.push(Token::text(std::mem::take(&mut text)));
                }
                if !word.is_empty() {
                    pieces.push(Piece::Word(std::mem::take(&mut word)));
                }
                space.push_str(grapheme);
            } else {
                if !space.is_empty() {
                    pieces.push(Piece::Space(Token::text(std::mem::take(&mut space))));
                }
                text.push_str(grapheme);
            }
        }
        if !text.is_empty() {
            word.push(Token::text(text));
        }
    }
    if !word.is_empty() {
        pieces.push(Piece::Word(word));
    }
    if !space.is_empty() {
        pieces.push(Piece::Space(Token::text(space)));
    }
    pieces
}

/// Graphemes of text tokens, emoji whole.
fn units(tokens: &[Token]) -> Vec<Token> {
    let mut units = Vec::new();
    for token in tokens {
        if token.is_emoji() {
            units.push(token.clone());
        } else {
            units.extend(token.content.graphemes(true).map(Token::text));
        }
    }
    units
}
