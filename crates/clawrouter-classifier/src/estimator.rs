// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Coarse token estimation.
//!
//! The estimator sits on the hot path and only feeds coarse bucket
//! decisions, so a byte-length approximation is enough: one token per
//! four bytes, rounded up.

/// Estimated token count for raw prompt text.
pub fn estimate_tokens(text: &str) -> u64 {
    (text.len() as u64).div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_zero_tokens() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn rounds_up_to_the_next_token() {
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn counts_bytes_not_chars() {
        // Four 3-byte characters: 12 bytes, 3 tokens.
        assert_eq!(estimate_tokens("日本語字"), 3);
    }

    #[test]
    fn large_prose_lands_in_the_right_bucket() {
        let text = "x".repeat(125_000);
        assert!(estimate_tokens(&text) > 100_000 / 4);
        assert_eq!(estimate_tokens(&text), 31_250);
    }
}
