use regex::{Regex, RegexBuilder};

/// Default pattern for both fields, matches every window.
pub const MATCH_ANY: &str = ".*";

/// Class and title patterns of a window lookup.
///
/// Patterns are searched for anywhere in the subject (no implicit anchors) and
/// ignore case, so `fire` matches `Firefox-Browser`.
#[derive(Debug, Clone)]
pub struct WindowFilter {
    wm_class: Regex,
    title: Regex,
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

impl WindowFilter {
    pub fn new(wm_class_pattern: &str, title_pattern: &str) -> Result<Self, regex::Error> {
        Ok(WindowFilter {
            wm_class: compile(wm_class_pattern)?,
            title: compile(title_pattern)?,
        })
    }

    pub fn is_match(&self, wm_class: &str, title: &str) -> bool {
        self.wm_class.is_match(wm_class) && self.title.is_match(title)
    }

    pub fn wm_class_pattern(&self) -> &str {
        self.wm_class.as_str()
    }

    pub fn title_pattern(&self) -> &str {
        self.title.as_str()
    }
}
