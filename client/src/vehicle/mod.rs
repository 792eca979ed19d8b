//! Presentation helpers for vehicle records: section grouping, labels,
//! value text, in-result filtering and highlighting.

pub mod filter;
pub mod format;
pub mod highlight;
pub mod sections;

pub use self::filter::{FieldFilter, field_matches};
pub use self::format::{PLACEHOLDER, format_value, label_for_key};
pub use self::highlight::{Highlighter, Segment, highlight};
pub use self::sections::{Section, SectionId, Sections, group_by_section};
