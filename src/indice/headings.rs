//! Heading extraction.
//!
//! A heading is any line that starts with one or more `#`, followed by a
//! whitespace character and a non-empty title. Detection is purely
//! line-based: headings inside fenced code blocks count too, which keeps the
//! change detector and the outline in agreement about what a heading is.

/// A parsed heading line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: usize,
    pub title: String,
}

impl Heading {
    /// Parses a single line, returning `None` when it is not a heading.
    pub fn parse(line: &str) -> Option<Self> {
        let level = line.chars().take_while(|c| *c == '#').count();
        if level == 0 {
            return None;
        }
        // `#` is one byte, so `level` is also a byte offset
        let rest = &line[level..];
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let title = rest.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            level,
            title: title.to_string(),
        })
    }
}

/// Returns every heading line of `content`, top to bottom, verbatim.
pub fn extract_headings(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| Heading::parse(line).is_some())
        .map(str::to_string)
        .collect()
}
