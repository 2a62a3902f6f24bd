//! Intermediate Markdown with structural separators.
//!
//! Handlers never emit blank lines or beautifying spaces directly. They emit
//! [`FragmentToken::BlockBreak`] ("a blank line belongs here") and
//! [`FragmentToken::InlineBreak`] ("a space belongs here unless at line start")
//! and leave the final spacing to the assembler, which sees the whole document.

/// One piece of a [`Fragment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentToken {
    Text(String),
    BlockBreak,
    InlineBreak,
}

/// Ordered token sequence produced by converting a node or node list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    tokens: Vec<FragmentToken>,
}

impl From<String> for Fragment {
    fn from(value: String) -> Self {
        let mut fragment = Fragment::new();
        fragment.push_text(value);
        fragment
    }
}

impl From<&str> for Fragment {
    fn from(value: &str) -> Self {
        Fragment::from(value.to_string())
    }
}

impl Fragment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text surrounded by inline separators.
    #[must_use]
    pub fn inline(text: impl Into<String>) -> Self {
        let mut fragment = Fragment::new();
        fragment.push_inline_break();
        fragment.push_text(text);
        fragment.push_inline_break();
        fragment
    }

    /// Text surrounded by block separators.
    #[must_use]
    pub fn block(text: impl Into<String>) -> Self {
        let mut fragment = Fragment::new();
        fragment.push_block_break();
        fragment.push_text(text);
        fragment.push_block_break();
        fragment
    }

    /// Append text, merging with a preceding text token.
    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if let Some(FragmentToken::Text(last)) = self.tokens.last_mut() {
            last.push_str(&text);
        } else {
            self.tokens.push(FragmentToken::Text(text));
        }
    }

    pub fn push_block_break(&mut self) {
        self.tokens.push(FragmentToken::BlockBreak);
    }

    pub fn push_inline_break(&mut self) {
        self.tokens.push(FragmentToken::InlineBreak);
    }

    pub fn append(&mut self, other: Fragment) {
        for token in other.tokens {
            match token {
                FragmentToken::Text(text) => self.push_text(text),
                marker => self.tokens.push(marker),
            }
        }
    }

    #[must_use]
    pub fn tokens(&self) -> &[FragmentToken] {
        &self.tokens
    }

    #[must_use]
    pub fn into_tokens(self) -> Vec<FragmentToken> {
        self.tokens
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True when no token carries visible text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.tokens.iter().all(|token| match token {
            FragmentToken::Text(text) => text.trim().is_empty(),
            _ => true,
        })
    }

    /// Text content with every separator dropped.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.tokens
            .iter()
            .filter_map(|token| match token {
                FragmentToken::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Remove inline separators and whitespace from both ends.
    ///
    /// Block separators are kept: they carry structure, not spacing.
    #[must_use]
    pub fn trim_inline(mut self) -> Self {
        loop {
            match self.tokens.first_mut() {
                Some(FragmentToken::InlineBreak) => {
                    self.tokens.remove(0);
                }
                Some(FragmentToken::Text(text)) => {
                    let trimmed = text.trim_start();
                    if trimmed.is_empty() {
                        self.tokens.remove(0);
                    } else {
                        *text = trimmed.to_string();
                        break;
                    }
                }
                _ => break,
            }
        }
        loop {
            match self.tokens.last_mut() {
                Some(FragmentToken::InlineBreak) => {
                    self.tokens.pop();
                }
                Some(FragmentToken::Text(text)) => {
                    let trimmed = text.trim_end();
                    if trimmed.is_empty() {
                        self.tokens.pop();
                    } else {
                        text.truncate(trimmed.len());
                        break;
                    }
                }
                _ => break,
            }
        }
        self
    }

    /// Turn block separators into real blank lines and trim the edges.
    ///
    /// Runs of newlines and block separators collapse to exactly one blank
    /// line, the same rule the assembler applies to the whole document.
    /// Inline separators survive except where a block separator absorbs them.
    /// Needed before any line-prefixing transform, which would otherwise
    /// prefix the wrong lines.
    #[must_use]
    pub fn resolve_block_breaks(self) -> Self {
        let mut out: Vec<FragmentToken> = Vec::with_capacity(self.tokens.len());
        let mut pending_block = false;

        for token in self.tokens {
            match token {
                FragmentToken::BlockBreak => {
                    while matches!(out.last(), Some(FragmentToken::InlineBreak)) {
                        out.pop();
                    }
                    pending_block = true;
                }
                FragmentToken::InlineBreak => {
                    if !pending_block {
                        out.push(FragmentToken::InlineBreak);
                    }
                }
                FragmentToken::Text(text) => {
                    if text.is_empty() {
                        continue;
                    }
                    if pending_block {
                        let has_content = trim_trailing_newlines(&mut out);
                        let text = text.trim_start_matches(['\n', '\r']);
                        if text.is_empty() {
                            continue;
                        }
                        if has_content {
                            push_merged(&mut out, "\n\n".to_string());
                        }
                        push_merged(&mut out, text.to_string());
                        pending_block = false;
                    } else {
                        push_merged(&mut out, text);
                    }
                }
            }
        }

        Fragment { tokens: out }.trim_inline()
    }

    /// Prefix each line, as split on real newlines.
    ///
    /// `prefix_for(index, line_text)` receives the separator-free text of the
    /// line. A line that receives a non-empty prefix loses its leading inline
    /// separators, since it no longer starts a line. Block separators are
    /// kept in place, so callers normally resolve them first.
    #[must_use]
    pub fn prefix_lines(self, mut prefix_for: impl FnMut(usize, &str) -> String) -> Self {
        let mut lines: Vec<Vec<FragmentToken>> = vec![Vec::new()];
        for token in self.tokens {
            match token {
                FragmentToken::Text(text) => {
                    let mut parts = text.split('\n');
                    if let Some(first) = parts.next()
                        && !first.is_empty()
                        && let Some(line) = lines.last_mut()
                    {
                        line.push(FragmentToken::Text(first.to_string()));
                    }
                    for part in parts {
                        let mut line = Vec::new();
                        if !part.is_empty() {
                            line.push(FragmentToken::Text(part.to_string()));
                        }
                        lines.push(line);
                    }
                }
                marker => {
                    if let Some(line) = lines.last_mut() {
                        line.push(marker);
                    }
                }
            }
        }

        let mut result = Fragment::new();
        for (index, line) in lines.into_iter().enumerate() {
            if index > 0 {
                result.push_text("\n");
            }
            let plain: String = line
                .iter()
                .filter_map(|token| match token {
                    FragmentToken::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect();
            let prefix = prefix_for(index, &plain);
            let mut tokens = line.into_iter().peekable();
            if !prefix.is_empty() {
                result.push_text(prefix);
                while matches!(tokens.peek(), Some(FragmentToken::InlineBreak)) {
                    tokens.next();
                }
            }
            for token in tokens {
                match token {
                    FragmentToken::Text(text) => result.push_text(text),
                    marker => result.tokens.push(marker),
                }
            }
        }
        result
    }
}

/// Strip trailing newlines (and the spaces around them) from the output.
/// Returns whether any visible content precedes the cut.
fn trim_trailing_newlines(out: &mut Vec<FragmentToken>) -> bool {
    while let Some(last) = out.last_mut() {
        match last {
            FragmentToken::Text(text) => {
                let trimmed_len = text.trim_end_matches([' ', '\t', '\n', '\r']).len();
                if trimmed_len == 0 {
                    out.pop();
                } else {
                    text.truncate(trimmed_len);
                    return true;
                }
            }
            FragmentToken::InlineBreak => {
                out.pop();
            }
            FragmentToken::BlockBreak => return !out.is_empty(),
        }
    }
    false
}

fn push_merged(out: &mut Vec<FragmentToken>, text: String) {
    if let Some(FragmentToken::Text(last)) = out.last_mut() {
        last.push_str(&text);
    } else {
        out.push(FragmentToken::Text(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use FragmentToken::*;

    #[test]
    fn test_push_text_merges() {
        let mut f = Fragment::new();
        f.push_text("a");
        f.push_text("b");
        f.push_text("");
        assert_eq!(f.tokens(), &[Text("ab".into())]);
    }

    #[test]
    fn test_trim_inline_strips_edges_only() {
        let mut f = Fragment::new();
        f.push_inline_break();
        f.push_text("  x ");
        f.push_inline_break();
        f.push_text("y  ");
        f.push_inline_break();
        let trimmed = f.trim_inline();
        assert_eq!(
            trimmed.tokens(),
            &[Text("x ".into()), InlineBreak, Text("y".into())]
        );
        assert!(Fragment::inline("   ").trim_inline().is_empty());
    }

    #[test]
    fn test_resolve_block_breaks_collapses_runs() {
        let mut f = Fragment::new();
        f.push_block_break();
        f.push_text("a\n");
        f.push_inline_break();
        f.push_block_break();
        f.push_block_break();
        f.push_text("\n\nb");
        f.push_inline_break();
        f.push_text("c");
        f.push_block_break();
        let resolved = f.resolve_block_breaks();
        assert_eq!(
            resolved.tokens(),
            &[Text("a\n\nb".into()), InlineBreak, Text("c".into())]
        );
    }

    #[test]
    fn test_prefix_lines_drops_leading_inline_breaks() {
        let mut f = Fragment::from("one\n");
        f.push_inline_break();
        f.push_text("two\n\nthree");
        let prefixed = f.prefix_lines(|i, line| {
            if i == 0 || line.is_empty() {
                String::new()
            } else {
                "  ".to_string()
            }
        });
        assert_eq!(prefixed.plain_text(), "one\n  two\n\n  three");
        assert!(!prefixed.tokens().contains(&InlineBreak));
    }

    #[test]
    fn test_is_blank() {
        let mut f = Fragment::new();
        f.push_block_break();
        f.push_text(" \n");
        assert!(f.is_blank());
        f.push_text("x");
        assert!(!f.is_blank());
    }
}
