//! CDN URL conventions for emoji images.

use crate::config::ResolverConfig;
use crate::token::EmojiRef;

const VARIATION_SELECTOR_16: u32 = 0xFE0F;

/// Twemoji asset key: lowercase hex codepoints joined with `-`, without U+FE0F.
pub fn twemoji_key(codepoints: &[u32]) -> String {
    codepoints
        .iter()
        .filter(|cp| **cp != VARIATION_SELECTOR_16)
        .map(|cp| format!("{cp:x}"))
        .collect::<Vec<_>>()
        .join("-")
}

pub fn emoji_url(emoji: &EmojiRef, config: &ResolverConfig) -> String {
    match emoji {
        EmojiRef::Custom { id, animated, .. } => {
            let extension = if *animated { "gif" } else { "png" };
            format!(
                "{}/{id}.{extension}",
                config.discord_cdn_base.trim_end_matches('/')
            )
        }
        EmojiRef::Unicode { codepoints } => format!(
            "{}/{}.png",
            config.twemoji_base.trim_end_matches('/'),
            twemoji_key(codepoints)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![0x1F600], "1f600")]
    #[case(vec![0x2764, 0xFE0F], "2764")]
    #[case(vec![0x31, 0xFE0F, 0x20E3], "31-20e3")]
    #[case(vec![0x1F468, 0x200D, 0x1F469, 0x200D, 0x1F467], "1f468-200d-1f469-200d-1f467")]
    #[case(vec![0x1F3F3, 0xFE0F, 0x200D, 0x1F308], "1f3f3-200d-1f308")]
    fn test_twemoji_key(#[case] codepoints: Vec<u32>, #[case] expected: &str) {
        assert_eq!(twemoji_key(&codepoints), expected);
    }

    #[test]
    fn test_custom_emoji_urls() {
        let config = ResolverConfig::default();
        let animated = EmojiRef::Custom {
            name: "party".to_string(),
            id: "123456789012345678".to_string(),
            animated: true,
        };
        assert_eq!(
            emoji_url(&animated, &config),
            "https://cdn.discordapp.com/emojis/123456789012345678.gif"
        );
        let still = EmojiRef::Custom {
            name: "party".to_string(),
            id: "42".to_string(),
            animated: false,
        };
        assert_eq!(
            emoji_url(&still, &config),
            "https://cdn.discordapp.com/emojis/42.png"
        );
    }

    #[test]
    fn test_unicode_emoji_url() {
        let config = ResolverConfig {
            twemoji_base: "https://example.com/72x72/".to_string(),
            ..ResolverConfig::default()
        };
        let emoji = EmojiRef::Unicode {
            codepoints: vec![0x1F600],
        };
        assert_eq!(
            emoji_url(&emoji, &config),
            "https://example.com/72x72/1f600.png"
        );
    }
}
