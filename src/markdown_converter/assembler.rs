//! Final spacing pass.
//!
//! Resolves the separators left in a document [`Fragment`] in one pass:
//!
//! 1. A run of newlines and block separators becomes exactly one blank line.
//! 2. A run of inline separators becomes a single space, unless the output
//!    already ends in whitespace or the next text starts with whitespace or
//!    closing punctuation.
//! 3. Inline separators at the start of a line (or of the document) vanish.
//!
//! The result is trimmed. On separator-free input the pass only trims, so
//! finalizing already finalized text is a no-op.

use super::fragment::{Fragment, FragmentToken};

/// Resolve every separator and return the final Markdown text.
#[must_use]
pub fn finalize(fragment: Fragment) -> String {
    let mut out = String::new();
    let mut pending_block = false;
    let mut pending_inline = false;

    for token in fragment.into_tokens() {
        match token {
            FragmentToken::BlockBreak => {
                pending_block = true;
                pending_inline = false;
            }
            FragmentToken::InlineBreak => {
                if !pending_block {
                    pending_inline = true;
                }
            }
            FragmentToken::Text(text) => {
                if text.is_empty() {
                    continue;
                }
                if pending_block {
                    let text = text.trim_start_matches(['\n', '\r']);
                    if text.is_empty() {
                        continue;
                    }
                    let kept = out.trim_end_matches([' ', '\t', '\n', '\r']).len();
                    out.truncate(kept);
                    if !out.is_empty() {
                        out.push_str("\n\n");
                    }
                    out.push_str(text);
                    pending_block = false;
                } else {
                    if pending_inline && needs_space(&out, &text) {
                        out.push(' ');
                    }
                    out.push_str(&text);
                }
                pending_inline = false;
            }
        }
    }

    out.trim().to_string()
}

fn is_closing_punctuation(c: char) -> bool {
    matches!(
        c,
        '.' | ',' | ';' | ':' | '!' | '?' | ')' | ']' | '}'
            | '。' | '，' | '；' | '：' | '！' | '？' | '、' | '）' | '】' | '」'
    )
}

fn needs_space(out: &str, next: &str) -> bool {
    match (out.chars().next_back(), next.chars().next()) {
        (None, _) | (_, None) => false,
        (Some(prev), Some(first)) => {
            !prev.is_whitespace() && !first.is_whitespace() && !is_closing_punctuation(first)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn build(tokens: Vec<FragmentToken>) -> Fragment {
        let mut fragment = Fragment::new();
        for token in tokens {
            match token {
                FragmentToken::Text(t) => fragment.push_text(t),
                FragmentToken::BlockBreak => fragment.push_block_break(),
                FragmentToken::InlineBreak => fragment.push_inline_break(),
            }
        }
        fragment
    }

    #[test]
    fn test_block_runs_collapse_to_one_blank_line() {
        let f = build(vec![
            FragmentToken::Text("a\n\n\n".into()),
            FragmentToken::BlockBreak,
            FragmentToken::Text("\n".into()),
            FragmentToken::BlockBreak,
            FragmentToken::Text("b".into()),
        ]);
        assert_eq!(finalize(f), "a\n\nb");
    }

    #[test]
    fn test_inline_breaks() {
        let f = build(vec![
            FragmentToken::InlineBreak,
            FragmentToken::Text("Hello".into()),
            FragmentToken::InlineBreak,
            FragmentToken::InlineBreak,
            FragmentToken::Text("**world**".into()),
            FragmentToken::InlineBreak,
            FragmentToken::Text("\nnext".into()),
            FragmentToken::InlineBreak,
            FragmentToken::Text(" spaced".into()),
            FragmentToken::InlineBreak,
            FragmentToken::Text("`x`".into()),
            FragmentToken::InlineBreak,
            FragmentToken::Text("。".into()),
        ]);
        assert_eq!(finalize(f), "Hello **world**\nnext spaced `x`。");
    }

    #[test]
    fn test_inline_break_absorbed_by_block() {
        let f = build(vec![
            FragmentToken::Text("a".into()),
            FragmentToken::InlineBreak,
            FragmentToken::BlockBreak,
            FragmentToken::InlineBreak,
            FragmentToken::Text("b".into()),
        ]);
        assert_eq!(finalize(f), "a\n\nb");
    }

    #[test]
    fn test_blank_lines_inside_text_survive() {
        let f = build(vec![
            FragmentToken::BlockBreak,
            FragmentToken::Text("```\nx\n\n\ny\n```".into()),
            FragmentToken::BlockBreak,
        ]);
        assert_eq!(finalize(f), "```\nx\n\n\ny\n```");
    }

    fn token_strategy() -> impl Strategy<Value = FragmentToken> {
        prop_oneof![
            "[a-z *\\n]{0,8}".prop_map(FragmentToken::Text),
            Just(FragmentToken::BlockBreak),
            Just(FragmentToken::InlineBreak),
        ]
    }

    proptest! {
        #[test]
        fn prop_finalize_is_idempotent(tokens in prop::collection::vec(token_strategy(), 0..24)) {
            let once = finalize(build(tokens));
            let twice = finalize(Fragment::from(once.clone()));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_no_blank_line_runs_from_markers(words in prop::collection::vec("[a-z]{1,5}", 1..8)) {
            let mut f = Fragment::new();
            for w in &words {
                f.push_block_break();
                f.push_text(w.clone());
                f.push_block_break();
            }
            let out = finalize(f);
            prop_assert!(!out.contains("\n\n\n"));
            prop_assert_eq!(out, words.join("\n\n"));
        }
    }
}
