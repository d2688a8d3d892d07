//! Block name matching against individual path segments.

/// How a block name is compared against a path segment.
///
/// Matching is always against a whole segment (the text between two `/`),
/// never a substring, so `news` does not match `newsletter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchRule {
    /// Segment must equal the block name byte for byte.
    #[default]
    Exact,
    /// Segment must equal the block name ignoring ASCII case.
    IgnoreAsciiCase,
}

impl MatchRule {
    /// Builds the rule from the `case_insensitive_blocks` config switch.
    pub fn from_case_insensitive(case_insensitive: bool) -> Self {
        if case_insensitive {
            MatchRule::IgnoreAsciiCase
        } else {
            MatchRule::Exact
        }
    }

    pub fn matches(self, segment: &str, block: &str) -> bool {
        match self {
            MatchRule::Exact => segment == block,
            MatchRule::IgnoreAsciiCase => segment.eq_ignore_ascii_case(block),
        }
    }
}

/// Returns the prefix of `path` that ends right after the first segment
/// matching `block`, or `None` if no segment matches.
pub fn block_root<'a>(path: &'a str, block: &str, rule: MatchRule) -> Option<&'a str> {
    let mut offset = 0;
    for segment in path.split('/') {
        let end = offset + segment.len();
        if !segment.is_empty() && rule.matches(segment, block) {
            return Some(&path[..end]);
        }
        offset = end + 1;
    }
    None
}

/// True if the last non-empty segment of `path` matches `block`.
pub(super) fn ends_with_block(path: &str, block: &str, rule: MatchRule) -> bool {
    path.split('/')
        .filter(|s| !s.is_empty())
        .last()
        .is_some_and(|last| rule.matches(last, block))
}
