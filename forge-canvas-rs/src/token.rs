//! Splitting text into text runs and atomic emoji tokens.

use regex::Regex;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

lazy_static! {
    static ref CUSTOM_EMOJI: Regex =
        Regex::new(r"^<(a)?:([A-Za-z0-9_]+):([0-9]+)>").expect("valid custom emoji pattern");
    // Checked against the start of a grapheme cluster, so ZWJ sequences, flags,
    // and skin tone modifiers come along with the whole cluster. Bare (c), (r)
    // and TM stay text unless followed by FE0F.
    static ref EMOJI_CLUSTER: Regex = Regex::new(
        r"^(?:\p{Emoji_Presentation}|\p{Regional_Indicator}|[0-9#*]\x{FE0F}?\x{20E3}|[\p{Extended_Pictographic}&&[^\x{A9}\x{AE}\x{2122}]]|\p{Extended_Pictographic}\x{FE0F})"
    )
    .expect("valid emoji cluster pattern");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Text,
    Emoji,
}

/// The emoji an emoji token refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EmojiRef {
    /// Platform emoji written as `<:name:id>` or `<a:name:id>`.
    Custom {
        name: String,
        id: String,
        animated: bool,
    },
    /// A Unicode emoji grapheme cluster.
    Unicode { codepoints: Vec<u32> },
}

impl EmojiRef {
    /// Text drawn in place of the image when it cannot be loaded.
    pub fn fallback_text<'a>(&'a self, content: &'a str) -> &'a str {
        match self {
            EmojiRef::Custom { name, .. } => name,
            EmojiRef::Unicode { .. } => content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact slice of the input this token came from.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<EmojiRef>,
}

impl Token {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Text,
            content: content.into(),
            emoji: None,
        }
    }

    pub fn emoji(content: impl Into<String>, emoji: EmojiRef) -> Self {
        Self {
            kind: TokenKind::Emoji,
            content: content.into(),
            emoji: Some(emoji),
        }
    }

    pub fn is_emoji(&self) -> bool {
        self.kind == TokenKind::Emoji
    }

    /// The text drawn for this token when no image is available.
    pub fn fallback_text(&self) -> &str {
        match &self.emoji {
            Some(emoji) => emoji.fallback_text(&self.content),
            None => &self.content,
        }
    }
}

/// Tokenize `text` into text runs and emoji.
///
/// Custom emoji references win over Unicode emoji at the same position.
/// Concatenating the `content` of the result gives back `text` exactly.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];

        if let Some(caps) = CUSTOM_EMOJI.captures(rest) {
            flush_text(&mut tokens, &text[text_start..pos]);
            let matched = &caps[0];
            tokens.push(Token::emoji(
                matched,
                EmojiRef::Custom {
                    name: caps[2].to_string(),
                    id: caps[3].to_string(),
                    animated: caps.get(1).is_some(),
                },
            ));
            pos += matched.len();
            text_start = pos;
            continue;
        }

        let Some(cluster) = rest.graphemes(true).next() else {
            break;
        };
        if EMOJI_CLUSTER.is_match(cluster) {
            flush_text(&mut tokens, &text[text_start..pos]);
            tokens.push(Token::emoji(
                cluster,
                EmojiRef::Unicode {
                    codepoints: cluster.chars().map(u32::from).collect(),
                },
            ));
            pos += cluster.len();
            text_start = pos;
        } else {
            // A prepended mark can pull `<` into the same cluster.
            pos += cluster
                .char_indices()
                .skip(1)
                .find(|&(i, c)| c == '<' && CUSTOM_EMOJI.is_match(&rest[i..]))
                .map_or(cluster.len(), |(i, _)| i);
        }
    }
    flush_text(&mut tokens, &text[text_start..]);

    tokens
}

fn flush_text(tokens: &mut Vec<Token>, span: &str) {
    if !span.is_empty() {
        tokens.push(Token::text(span));
    }
}
