use regex::{Regex, RegexBuilder};
use tracing::debug;

/// A run of text, flagged when it matched the highlight term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            matched: false,
        }
    }
}

/// Case-insensitive literal matcher for search-within-results.
///
/// The term is escaped before compiling, so `.` or `(` in user input match
/// themselves. An empty term matches nothing.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    pub fn new(term: &str) -> Self {
        if term.is_empty() {
            return Self { pattern: None };
        }

        let pattern = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build();

        match pattern {
            Ok(re) => Self { pattern: Some(re) },
            Err(e) => {
                // Only reachable if the escaped term exceeds the size limit.
                debug!("Highlight term rejected: {}", e);
                Self { pattern: None }
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// Split `text` into alternating plain and matched runs. Empty runs are
    /// not emitted; with no active term the whole text is one plain run.
    pub fn segments(&self, text: &str) -> Vec<Segment> {
        let Some(re) = &self.pattern else {
            return vec![Segment::plain(text)];
        };

        let mut out = Vec::new();
        let mut last = 0;
        for m in re.find_iter(text) {
            if m.start() > last {
                out.push(Segment::plain(&text[last..m.start()]));
            }
            out.push(Segment {
                text: m.as_str().to_string(),
                matched: true,
            });
            last = m.end();
        }
        if last < text.len() || out.is_empty() {
            out.push(Segment::plain(&text[last..]));
        }
        out
    }
}

/// One-shot form of [`Highlighter::segments`].
pub fn highlight(text: &str, term: &str) -> Vec<Segment> {
    Highlighter::new(term).segments(text)
}
