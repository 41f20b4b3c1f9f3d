//! Heading-driven section splitting for generic documents.
//!
//! A line whose trimmed form starts with `## ` opens a section; everything
//! up to the next such line is its content. Text before the first heading
//! is dropped.

use std::collections::{HashMap, HashSet};

use contentminer_core::{DuplicateIdPolicy, Section, SectionType};

/// Marker that opens a section.
pub const HEADING_PREFIX: &str = "## ";

/// Id used when a title has no slug-able characters.
pub const EMPTY_SLUG_ID: &str = "section";

/// Lowercase a title and collapse every run of non-`[a-z0-9]` into one `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_sep = false;
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c);
        } else {
            pending_sep = true;
        }
    }
    slug
}

/// Heading title if `line` opens a section.
pub fn heading_title(line: &str) -> Option<&str> {
    line.trim().strip_prefix(HEADING_PREFIX).map(str::trim)
}

/// Split text into sections, disambiguating colliding ids.
pub fn extract_sections(text: &str) -> Vec<Section> {
    extract_sections_with(text, DuplicateIdPolicy::default())
}

/// Split text into sections, resolving colliding ids with `policy`.
pub fn extract_sections_with(text: &str, policy: DuplicateIdPolicy) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;

    for line in text.lines() {
        if let Some(title) = heading_title(line) {
            if let Some(done) = current.take() {
                sections.push(done);
            }
            let mut id = slugify(title);
            if id.is_empty() {
                id = EMPTY_SLUG_ID.to_string();
            }
            current = Some(Section::new(id, title).with_type(SectionType::detect(title)));
        } else if let Some(section) = current.as_mut() {
            if !line.trim().is_empty() {
                section.content.push(line.to_string());
            }
        }
    }
    if let Some(done) = current {
        sections.push(done);
    }

    resolve_duplicate_ids(sections, policy)
}

/// Make ids unique according to `policy`. Order is preserved.
pub fn resolve_duplicate_ids(sections: Vec<Section>, policy: DuplicateIdPolicy) -> Vec<Section> {
    match policy {
        DuplicateIdPolicy::Disambiguate => {
            let mut taken: HashSet<String> = HashSet::new();
            sections
                .into_iter()
                .map(|mut section| {
                    if taken.contains(&section.id) {
                        let base = section.id.clone();
                        let mut n = 2;
                        while taken.contains(&format!("{base}-{n}")) {
                            n += 1;
                        }
                        section.id = format!("{base}-{n}");
                    }
                    taken.insert(section.id.clone());
                    section
                })
                .collect()
        }
        DuplicateIdPolicy::KeepFirst => {
            let mut taken: HashSet<String> = HashSet::new();
            sections
                .into_iter()
                .filter(|s| taken.insert(s.id.clone()))
                .collect()
        }
        DuplicateIdPolicy::Merge => {
            let mut index: HashMap<String, usize> = HashMap::new();
            let mut merged: Vec<Section> = Vec::new();
            for section in sections {
                match index.get(&section.id) {
                    Some(&i) => merged[i].content.extend(section.content),
                    None => {
                        index.insert(section.id.clone(), merged.len());
                        merged.push(section);
                    }
                }
            }
            merged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("TL;DR"), "tl-dr");
        assert_eq!(slugify("  Key Takeaways!! (2024) "), "key-takeaways-2024");
        assert_eq!(slugify("Café & Crème"), "caf-cr-me");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_basic_extraction() {
        let text = "preamble is dropped\n## TL;DR\nShort version.\n\n## Main Points\n- one\n  - nested\n";
        let sections = extract_sections(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].id, "tl-dr");
        assert_eq!(sections[0].title, "TL;DR");
        assert_eq!(sections[0].content, vec!["Short version."]);
        assert_eq!(sections[1].content, vec!["- one", "  - nested"]);
    }

    #[test]
    fn test_deeper_headings_are_content() {
        let sections = extract_sections("## Top\n### Sub\ntext\n# Title");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content, vec!["### Sub", "text", "# Title"]);
    }

    #[test]
    fn test_indented_heading_and_empty_slug() {
        let sections = extract_sections("   ##   Spaced Title  \nbody\n## ???\nx");
        assert_eq!(sections[0].title, "Spaced Title");
        assert_eq!(sections[0].id, "spaced-title");
        assert_eq!(sections[1].id, EMPTY_SLUG_ID);
    }

    #[test]
    fn test_no_headings() {
        assert!(extract_sections("").is_empty());
        assert!(extract_sections("just prose\nno headings").is_empty());
    }

    #[test]
    fn test_duplicate_disambiguate() {
        let text = "## Notes\na\n## Notes\nb\n## Notes 2\nc";
        let ids: Vec<String> = extract_sections(text).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["notes", "notes-2", "notes-2-2"]);
    }

    #[test]
    fn test_duplicate_keep_first() {
        let sections = extract_sections_with("## A\n1\n## a\n2", DuplicateIdPolicy::KeepFirst);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content, vec!["1"]);
    }

    #[test]
    fn test_duplicate_merge() {
        let sections = extract_sections_with("## A\n1\n## B\nx\n## a\n2", DuplicateIdPolicy::Merge);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "A");
        assert_eq!(sections[0].content, vec!["1", "2"]);
    }

    #[test]
    fn test_section_type_detected() {
        let sections = extract_sections("## Growth Opportunities\nx");
        assert_eq!(sections[0].section_type, Some(SectionType::GrowthOpportunities));
    }
}
