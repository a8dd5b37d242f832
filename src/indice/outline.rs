//! # Outline Builder
//!
//! Turns a folder subtree into the nested markdown list written inside index
//! regions. For a vault like
//!
//! ```text
//! Projects/
//! ├── Alpha.md        (# A, ## B)
//! ├── Beta.md         (no headings)
//! └── Sub/
//!     └── Gamma.md
//! ```
//!
//! `build(Projects, 0, None)` produces
//!
//! ```text
//! - [[Projects/Alpha|Alpha]]
//! \t- [[Projects/Alpha#A|A]]
//! \t\t- [[Projects/Alpha#B|B]]
//! - [[Projects/Beta|Beta]]
//!
//! # Sub
//! - [[Projects/Sub/Gamma|Gamma]]
//! ```
//!
//! ## Rules
//!
//! - Documents of a folder are sorted by file name with [`compare_names`].
//! - A sub-folder at depth `d` opens with a level-`d` heading of its name; the
//!   folder being built at depth 0 gets no heading.
//! - Index documents (tagged `#indice`) and the excluded document are skipped.
//! - Headings are re-read from live content, never from the change ledger.
//!   Only levels 1–3 are listed, indented one tab per level. A document that
//!   cannot be read is listed without headings.
//! - Sub-folders follow in path order, each preceded by a blank line.
//! - Past `max_depth` a folder contributes nothing.
//!
//! The same vault state always yields the same bytes, which is what makes
//! region rewrites idempotent.

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::Result;
use crate::headings::{extract_headings, Heading};
use crate::model::{Document, Folder};
use crate::store::VaultStore;
use crate::tags::has_index_tag;
use std::cmp::Ordering;
use tracing::warn;

/// Headings at this level or deeper are left out of outlines.
pub const MAX_HEADING_LEVEL: usize = 4;

pub struct OutlineBuilder<'a, S: VaultStore + ?Sized> {
    store: &'a S,
    max_depth: usize,
}

impl<'a, S: VaultStore + ?Sized> OutlineBuilder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn build(&self, folder: &Folder, depth: usize, exclude: Option<&Document>) -> Result<String> {
        if depth > self.max_depth {
            return Ok(String::new());
        }

        let mut docs = self.store.child_documents(folder)?;
        docs.sort_by(|a, b| compare_names(a.name(), b.name()));

        let mut outline = String::new();
        if depth != 0 {
            outline.push_str(&format!("{} {}\n", "#".repeat(depth), folder.name));
        }

        for doc in &docs {
            if exclude.is_some_and(|excluded| excluded.path == doc.path) {
                continue;
            }
            if self.is_index(doc) {
                continue;
            }
            self.push_document(&mut outline, doc);
        }

        for child in self.store.child_folders(folder)? {
            outline.push('\n');
            outline.push_str(&self.build(&child, depth + 1, None)?);
        }

        Ok(outline)
    }

    fn is_index(&self, doc: &Document) -> bool {
        match self.store.tags(doc) {
            Ok(tags) => has_index_tag(&tags),
            Err(e) => {
                warn!(path = %doc.path, error = %e, "Failed to read tags, listing document");
                false
            }
        }
    }

    /// A document that cannot be read still gets its bullet, without headings.
    fn push_document(&self, outline: &mut String, doc: &Document) {
        let target = doc.link_target();
        outline.push_str(&format!("- [[{}|{}]]\n", target, doc.basename));

        let content = match self.store.read(doc) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %doc.path, error = %e, "Failed to read headings");
                return;
            }
        };
        for line in extract_headings(&content) {
            let Some(heading) = Heading::parse(&line) else {
                continue;
            };
            if heading.level >= MAX_HEADING_LEVEL {
                continue;
            }
            outline.push_str(&format!(
                "{}- [[{}#{}|{}]]\n",
                "\t".repeat(heading.level),
                target,
                heading.title,
                heading.title
            ));
        }
    }
}

/// Orders display names the way a reader expects: letters compare
/// case-insensitively and ignoring common Latin accents first, then
/// unaccented before accented, then lowercase before uppercase.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let primary = |s: &str| -> Vec<char> {
        s.chars()
            .flat_map(char::to_lowercase)
            .map(fold_accent)
            .collect()
    };
    let secondary = |s: &str| -> Vec<char> { s.chars().flat_map(char::to_lowercase).collect() };

    primary(a)
        .cmp(&primary(b))
        .then_with(|| secondary(a).cmp(&secondary(b)))
        .then_with(|| case_order(a, b))
        .then_with(|| a.cmp(b))
}

fn case_order(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            continue;
        }
        if x.is_lowercase() && y.is_uppercase() {
            return Ordering::Less;
        }
        if x.is_uppercase() && y.is_lowercase() {
            return Ordering::Greater;
        }
    }
    Ordering::Equal
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemVault;

    fn projects_vault() -> MemVault {
        MemVault::new()
            .with_document("Projects/Alpha.md", "# A\ntext\n## B\n")
            .with_document("Projects/Beta.md", "no headings here\n")
            .with_document("Projects/Sub/Gamma.md", "")
    }

    fn outline_of(vault: &MemVault, folder: &str) -> String {
        let folder = vault.folder(folder).unwrap().unwrap();
        OutlineBuilder::new(vault).build(&folder, 0, None).unwrap()
    }

    #[test]
    fn test_projects_scenario() {
        let vault = projects_vault();
        let expected = "\
- [[Projects/Alpha|Alpha]]
\t- [[Projects/Alpha#A|A]]
\t\t- [[Projects/Alpha#B|B]]
- [[Projects/Beta|Beta]]

# Sub
- [[Projects/Sub/Gamma|Gamma]]
";
        assert_eq!(outline_of(&vault, "Projects"), expected);
    }

    #[test]
    fn test_build_is_deterministic() {
        let vault = projects_vault();
        assert_eq!(outline_of(&vault, "Projects"), outline_of(&vault, "Projects"));
    }

    #[test]
    fn test_documents_sorted_case_insensitively() {
        let vault = MemVault::new()
            .with_document("b.md", "")
            .with_document("A.md", "")
            .with_document("c.md", "");
        assert_eq!(
            outline_of(&vault, "/"),
            "- [[A|A]]\n- [[b|b]]\n- [[c|c]]\n"
        );
    }

    #[test]
    fn test_compare_names() {
        let mut names = vec!["Zeta.md", "árbol.md", "b.md", "B.md", "a.md", "Índice.md"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(
            names,
            vec!["a.md", "árbol.md", "b.md", "B.md", "Índice.md", "Zeta.md"]
        );
    }

    #[test]
    fn test_excluded_document_is_skipped() {
        let vault = projects_vault();
        let folder = vault.folder("Projects").unwrap().unwrap();
        let alpha = vault.document("Projects/Alpha.md").unwrap().unwrap();

        let outline = OutlineBuilder::new(&vault)
            .build(&folder, 0, Some(&alpha))
            .unwrap();

        assert!(!outline.contains("Alpha"));
        assert!(outline.starts_with("- [[Projects/Beta|Beta]]\n"));
    }

    #[test]
    fn test_index_documents_are_never_listed() {
        let vault = projects_vault()
            .with_document("Projects/Index.md", "#indice\n# Heading\n")
            .with_document("Projects/Sub/Sub Index.md", "---\ntags: [indice]\n---\n");
        let outline = outline_of(&vault, "Projects");
        assert!(!outline.contains("Index"));
    }

    #[test]
    fn test_only_heading_levels_one_to_three() {
        let vault = MemVault::new().with_document(
            "Deep.md",
            "# L1\n## L2\n### L3\n#### L4\n##### L5\n",
        );
        let outline = outline_of(&vault, "/");
        assert_eq!(
            outline,
            "- [[Deep|Deep]]\n\t- [[Deep#L1|L1]]\n\t\t- [[Deep#L2|L2]]\n\t\t\t- [[Deep#L3|L3]]\n"
        );
    }

    #[test]
    fn test_empty_folder_yields_heading_only() {
        let vault = MemVault::new().with_folder("Empty");
        assert_eq!(outline_of(&vault, "/"), "\n# Empty\n");
        assert_eq!(outline_of(&vault, "Empty"), "");
    }

    #[test]
    fn test_nested_folder_headings_follow_depth() {
        let vault = MemVault::new()
            .with_document("a/b/c/doc.md", "")
            .with_document("a/first.md", "");
        let outline = outline_of(&vault, "a");
        assert_eq!(
            outline,
            "- [[a/first|first]]\n\n# b\n\n## c\n- [[a/b/c/doc|doc]]\n"
        );
    }

    #[test]
    fn test_depth_cap() {
        let vault = MemVault::new()
            .with_document("root.md", "")
            .with_document("L1/one.md", "")
            .with_document("L1/L2/two.md", "")
            .with_document("L1/L2/L3/three.md", "");
        let outline = OutlineBuilder::new(&vault)
            .with_max_depth(2)
            .build(&Folder::root(), 0, None)
            .unwrap();

        assert!(outline.contains("## L2\n- [[L1/L2/two|two]]\n"));
        assert!(!outline.contains("L3"));
        assert!(!outline.contains("three"));
    }

    #[test]
    fn test_unreadable_document_keeps_its_bullet() {
        let vault = MemVault::new()
            .with_document("Projects/Alpha.md", "# A\n")
            .with_document("Projects/Broken.md", "# Hidden\n");
        vault.fail_reads_of("Projects/Broken.md");

        assert_eq!(
            outline_of(&vault, "Projects"),
            "- [[Projects/Alpha|Alpha]]\n\t- [[Projects/Alpha#A|A]]\n- [[Projects/Broken|Broken]]\n"
        );
    }

    #[test]
    fn test_listing_errors_propagate() {
        struct Broken;
        impl VaultStore for Broken {
            fn documents(&self) -> Result<Vec<Document>> {
                Err(crate::error::IndiceError::Store("listing failed".to_string()))
            }
            fn folders(&self) -> Result<Vec<Folder>> {
                Ok(Vec::new())
            }
            fn read(&self, doc: &Document) -> Result<String> {
                Err(crate::error::IndiceError::NotFound(doc.path.clone()))
            }
            fn write(&self, _doc: &Document, _content: &str) -> Result<()> {
                Ok(())
            }
        }

        let result = OutlineBuilder::new(&Broken).build(&Folder::root(), 0, None);
        assert!(result.is_err());
    }
}
