use serde_json::Value;

use crate::vehicle::format::{format_value, label_for_key};
use crate::vehicle::highlight::Highlighter;
use crate::vehicle::sections::{SectionId, Sections};

/// Narrowing applied to a sectioned result before display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    /// Substring looked up in key, value text and label.
    pub term: Option<String>,
    pub section: Option<SectionId>,
}

impl FieldFilter {
    pub fn new(term: Option<&str>, section: Option<SectionId>) -> Self {
        Self {
            term: term
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            section,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_none() && self.section.is_none()
    }

    /// Whether one field passes the term check.
    pub fn matches(&self, key: &str, value: &Value) -> bool {
        match &self.term {
            None => true,
            Some(term) => field_matches(key, value, term),
        }
    }

    pub fn apply(&self, sections: Sections) -> Sections {
        let sections = match self.section {
            Some(id) => sections.only(id),
            None => sections,
        };

        match &self.term {
            None => sections,
            Some(term) => {
                let matcher = Highlighter::new(term);
                sections.retain_fields(|key, value| matches_with(&matcher, key, value))
            }
        }
    }
}

/// Case-insensitive substring test against key, value text, or label.
///
/// Uses the same matcher as highlighting, so a field kept by the filter
/// always shows a highlighted run.
pub fn field_matches(key: &str, value: &Value, term: &str) -> bool {
    matches_with(&Highlighter::new(term), key, value)
}

fn matches_with(matcher: &Highlighter, key: &str, value: &Value) -> bool {
    matcher.is_match(key) || matcher.is_match(&format_value(value)) || matcher.is_match(&label_for_key(key))
}
