//! Token width measurement.

use crate::error::FcError;
use crate::surface::TextMeasure;
use crate::token::Token;
use std::collections::HashMap;

/// Measures tokens against a surface's active font.
///
/// Emoji are fixed squares of `emoji_size`. Text widths are memoized, so the
/// font must not change while an oracle is in use.
#[derive(Debug, Clone)]
pub struct WidthOracle {
    emoji_size: f32,
    memo: HashMap<String, f32>,
}

impl WidthOracle {
    pub fn new(emoji_size: f32) -> Self {
        Self {
            emoji_size,
            memo: HashMap::new(),
        }
    }

    pub fn emoji_size(&self) -> f32 {
        self.emoji_size
    }

    pub fn measure_str<M: TextMeasure + ?Sized>(
        &mut self,
        surface: &mut M,
        text: &str,
    ) -> Result<f32, FcError> {
        if text.is_empty() {
            return Ok(0.0);
        }
        if let Some(width) = self.memo.get(text) {
            return Ok(*width);
        }
        let width = surface.measure_text(text)?;
        self.memo.insert(text.to_string(), width);
        Ok(width)
    }

    pub fn measure<M: TextMeasure + ?Sized>(
        &mut self,
        surface: &mut M,
        token: &Token,
    ) -> Result<f32, FcError> {
        if token.is_emoji() {
            Ok(self.emoji_size)
        } else {
            self.measure_str(surface, &token.content)
        }
    }

    /// Sum of token widths.
    pub fn measure_run<M: TextMeasure + ?Sized>(
        &mut self,
        surface: &mut M,
        tokens: &[Token],
    ) -> Result<f32, FcError> {
        tokens
            .iter()
            .try_fold(0.0, |sum, token| Ok(sum + self.measure(&mut *surface, token)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;

    /// Every char is 10px wide; counts calls to the backend.
    struct FixedMeasure {
        calls: usize,
    }

    impl TextMeasure for FixedMeasure {
        fn measure_text(&mut self, text: &str) -> Result<f32, FcError> {
            self.calls += 1;
            Ok(text.chars().count() as f32 * 10.0)
        }
    }

    #[test]
    fn test_emoji_have_fixed_width() {
        let mut surface = FixedMeasure { calls: 0 };
        let mut oracle = WidthOracle::new(24.0);
        let tokens = tokenize("👨‍👩‍👧<:long_custom_name:1>😀");
        for token in &tokens {
            assert_eq!(oracle.measure(&mut surface, token).unwrap(), 24.0);
        }
        assert_eq!(surface.calls, 0);
    }

    #[test]
    fn test_measure_run_sums_tokens() {
        let mut surface = FixedMeasure { calls: 0 };
        let mut oracle = WidthOracle::new(16.0);
        let tokens = tokenize("ab 😀 cd");
        assert_eq!(oracle.measure_run(&mut surface, &tokens).unwrap(), 30.0 + 16.0 + 30.0);
    }

    #[test]
    fn test_text_widths_are_memoized() {
        let mut surface = FixedMeasure { calls: 0 };
        let mut oracle = WidthOracle::new(16.0);
        oracle.measure_str(&mut surface, "hello").unwrap();
        oracle.measure_str(&mut surface, "hello").unwrap();
        oracle.measure_str(&mut surface, "").unwrap();
        assert_eq!(surface.calls, 1);
    }

    #[test]
    fn test_errors_propagate() {
        struct Failing;
        impl TextMeasure for Failing {
            fn measure_text(&mut self, _text: &str) -> Result<f32, FcError> {
                Err(FcError::Measurement("no font".to_string()))
            }
        }
        let mut oracle = WidthOracle::new(16.0);
        assert!(oracle.measure_run(&mut Failing, &tokenize("x")).is_err());
    }
}
