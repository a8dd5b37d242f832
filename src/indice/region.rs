//! # Index Regions
//!
//! The generated outline lives between two HTML comment markers so that it is
//! invisible in rendered markdown and easy to find again:
//!
//! ```text
//! <!-- inicio índice -->
//! #indice
//!
//! - [[Projects/Alpha|Alpha]]
//! <!-- fin índice -->
//! ```
//!
//! Everything between the markers is machine-owned and replaced wholesale;
//! everything outside them is never touched. The `#indice` line inside the
//! region is what tags the document as an index document.
//!
//! Two rewrite modes exist:
//!
//! - **Bulk** ([`rewrite`]): used by background rebuilds. A document without a
//!   region is left alone.
//! - **Interactive** ([`rewrite_at`], [`plan_edit`]): used when a person asks
//!   for an index. A document without a region gets a new one at the cursor.

use std::ops::Range;

pub const START_MARKER: &str = "<!-- inicio índice -->";
pub const END_MARKER: &str = "<!-- fin índice -->";

/// Location of the first marker region in a text, as byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMatch {
    /// From the start marker through the end marker.
    pub outer: Range<usize>,
    /// Between the markers.
    pub interior: Range<usize>,
}

/// A single replacement: `range` of the original text becomes `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionEdit {
    pub range: Range<usize>,
    pub text: String,
}

impl RegionEdit {
    pub fn apply(&self, original: &str) -> String {
        let mut out = String::with_capacity(original.len() + self.text.len());
        out.push_str(&original[..self.range.start]);
        out.push_str(&self.text);
        out.push_str(&original[self.range.end..]);
        out
    }

    pub fn is_insertion(&self) -> bool {
        self.range.is_empty()
    }
}

/// Finds the first start marker followed, possibly lines later, by an end
/// marker. The end marker closest to the start marker wins.
pub fn find_region(text: &str) -> Option<RegionMatch> {
    let start = text.find(START_MARKER)?;
    let interior_start = start + START_MARKER.len();
    let interior_end = interior_start + text[interior_start..].find(END_MARKER)?;
    Some(RegionMatch {
        outer: start..interior_end + END_MARKER.len(),
        interior: interior_start..interior_end,
    })
}

/// What goes between the markers for a given outline.
pub fn region_body(outline: &str) -> String {
    format!("\n#indice\n\n{}\n", outline)
}

/// A complete region, as inserted into a document that has none.
pub fn new_region(outline: &str) -> String {
    format!("\n{}{}{}\n", START_MARKER, region_body(outline), END_MARKER)
}

/// Bulk rewrite: replaces the interior of the first region, or returns the
/// text unchanged when there is no region.
pub fn rewrite(text: &str, outline: &str) -> String {
    match find_region(text) {
        Some(region) => RegionEdit {
            range: region.interior,
            text: region_body(outline),
        }
        .apply(text),
        None => text.to_string(),
    }
}

/// Interactive rewrite: like [`rewrite`], but inserts a fresh region at
/// `cursor` (a byte offset) when the text has none.
pub fn rewrite_at(text: &str, cursor: usize, outline: &str) -> String {
    plan_edit(text, cursor, outline).apply(text)
}

/// The edit [`rewrite_at`] would make, without applying it.
///
/// A cursor past the end of the text is clamped to the end, and a cursor
/// inside a multi-byte character is moved back to its start.
pub fn plan_edit(text: &str, cursor: usize, outline: &str) -> RegionEdit {
    if let Some(region) = find_region(text) {
        return RegionEdit {
            range: region.interior,
            text: region_body(outline),
        };
    }

    let mut at = cursor.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    RegionEdit {
        range: at..at,
        text: new_region(outline),
    }
}
