//! # Tags
//!
//! Index documents are recognized by a reserved tag, [`INDEX_TAG`]. Tags are
//! derived from document content the way markdown vault tools read them:
//!
//! - inline `#tag` tokens in prose, preceded by whitespace or the start of a
//!   text run, made of letters, digits, `_`, `-` and `/`, and not purely
//!   numeric (so `#1` is not a tag);
//! - the `tags:` key of a YAML front matter block, as an inline list
//!   (`tags: a, b`), a flow list (`tags: [a, b]`) or a block list.
//!
//! Code spans and code blocks never contribute tags. Markdown structure is
//! parsed with `pulldown-cmark`, so headings such as `# Title` are not
//! mistaken for tags while the `#indice` line written into every index region
//! is.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, TextMergeStream};

/// The tag that marks a document as an index document.
pub const INDEX_TAG: &str = "#indice";

/// Extracts the tags of a document, `#`-prefixed, deduplicated, in order.
pub fn extract_tags(content: &str) -> Vec<String> {
    let parser = Parser::new_ext(content, Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
    let mut tags = Vec::new();
    let mut in_code_block = false;
    let mut in_metadata = false;

    for event in TextMergeStream::new(parser) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Start(Tag::MetadataBlock(_)) => in_metadata = true,
            Event::End(TagEnd::MetadataBlock(_)) => in_metadata = false,
            Event::Text(text) if in_metadata => {
                for tag in front_matter_tags(&text) {
                    push_unique(&mut tags, tag);
                }
            }
            Event::Text(text) if !in_code_block => scan_inline(&text, &mut tags),
            _ => {}
        }
    }
    tags
}

/// Whether `tag` is the reserved index tag. Tags are case-insensitive.
pub fn is_index_tag(tag: &str) -> bool {
    tag.eq_ignore_ascii_case(INDEX_TAG)
}

pub fn has_index_tag(tags: &[String]) -> bool {
    tags.iter().any(|tag| is_index_tag(tag))
}

fn scan_inline(text: &str, tags: &mut Vec<String>) {
    let mut prev: Option<char> = None;
    for (i, c) in text.char_indices() {
        if c == '#' && prev.map_or(true, char::is_whitespace) {
            let body: String = text[i + 1..]
                .chars()
                .take_while(|c| is_tag_char(*c))
                .collect();
            let body = body.trim_end_matches('/');
            if is_valid_tag(body) {
                push_unique(tags, format!("#{}", body));
            }
        }
        prev = Some(c);
    }
}

fn front_matter_tags(yaml: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut lines = yaml.lines().peekable();

    while let Some(line) = lines.next() {
        let Some(value) = line
            .strip_prefix("tags:")
            .or_else(|| line.strip_prefix("tag:"))
        else {
            continue;
        };
        let value = value.trim();

        if value.is_empty() {
            // Block list: following `- item` lines
            while let Some(item) = lines.peek().and_then(|l| l.trim_start().strip_prefix("- ")) {
                found.push(item.to_string());
                lines.next();
            }
        } else {
            let inner = value
                .strip_prefix('[')
                .and_then(|v| v.strip_suffix(']'))
                .unwrap_or(value);
            found.extend(
                inner
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .map(str::to_string),
            );
        }
    }

    found
        .iter()
        .map(|raw| raw.trim().trim_matches(|c| c == '"' || c == '\''))
        .map(|raw| raw.trim_start_matches('#'))
        .filter(|name| is_valid_tag(name))
        .map(|name| format!("#{}", name))
        .collect()
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '/')
}

fn is_valid_tag(body: &str) -> bool {
    !body.is_empty()
        && body.chars().all(is_tag_char)
        && !body.chars().all(|c| c.is_ascii_digit())
}

fn push_unique(tags: &mut Vec<String>, tag: String) {
    if !tags.contains(&tag) {
        tags.push(tag);
    }
}
