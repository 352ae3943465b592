//! Lesson file loading
//!
//! Lessons are TOML files:
//!
//! ```text
//! title = "القلب السليم"
//!
//! [[sections]]
//! id = "intro"
//! title = "مقدمة"
//!
//! [[sections.blocks]]
//! kind = "ayah"
//! text = "يَوْمَ لَا يَنفَعُ مَالٌ وَلَا بَنُونَ"
//! source = "الشعراء: 88"
//!
//! [[sections.blocks]]
//! runs = ["The ", { strong = "sound" }, " heart"]
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{ContentTree, Element, ElementKind};
use crate::error::{Result, ViewerError};

#[derive(Debug, Deserialize)]
struct LessonFile {
    #[serde(default)]
    title: String,
    #[serde(default)]
    sections: Vec<SectionSpec>,
}

#[derive(Debug, Deserialize)]
struct SectionSpec {
    id: Option<String>,
    title: Option<String>,
    #[serde(default)]
    blocks: Vec<BlockSpec>,
}

#[derive(Debug, Deserialize)]
struct BlockSpec {
    kind: Option<String>,
    id: Option<String>,
    text: Option<String>,
    runs: Option<Vec<RunSpec>>,
    items: Option<Vec<String>>,
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RunSpec {
    Plain(String),
    Strong { strong: String },
}

/// Load a lesson from a file
pub fn load(path: &Path) -> Result<ContentTree> {
    let contents = fs::read_to_string(path)?;
    let tree = parse(&contents)?;
    tracing::info!(
        path = %path.display(),
        sections = tree.section_count(),
        "lesson loaded"
    );
    Ok(tree)
}

/// Parse lesson file contents
pub fn parse(contents: &str) -> Result<ContentTree> {
    let file: LessonFile = toml::from_str(contents)?;
    let mut tree = ContentTree::new(file.title);

    for (idx, spec) in file.sections.into_iter().enumerate() {
        let id = spec.id.unwrap_or_else(|| format!("section-{}", idx + 1));
        let mut section = Element::new(ElementKind::Section).with_id(id.clone());

        if let Some(title) = spec.title {
            section = section.with_child(Element::new(ElementKind::Heading).with_text(title));
        }

        for (block_idx, block) in spec.blocks.into_iter().enumerate() {
            section = section.with_child(build_block(&id, block_idx, block)?);
        }

        tree = tree.with_section(section);
    }

    Ok(tree)
}

fn build_block(section: &str, index: usize, spec: BlockSpec) -> Result<Element> {
    let kind_name = spec.kind.as_deref().unwrap_or("paragraph");
    let kind = ElementKind::from_block_name(kind_name).ok_or_else(|| {
        ViewerError::UnknownBlockKind {
            section: section.to_string(),
            kind: kind_name.to_string(),
        }
    })?;

    let mut block = Element::new(kind);
    block.id = spec.id;

    if kind == ElementKind::List {
        let items = spec.items.ok_or_else(|| ViewerError::MissingBlockText {
            section: section.to_string(),
            index,
        })?;
        for item in items {
            block = block.with_child(Element::new(ElementKind::Item).with_text(item));
        }
        return Ok(block);
    }

    match (spec.text, spec.runs) {
        (Some(text), None) => block.push_text(text),
        (None, Some(runs)) => {
            for run in runs {
                match run {
                    RunSpec::Plain(text) => block.push_text(text),
                    RunSpec::Strong { strong } => {
                        block = block.with_child(Element::new(ElementKind::Strong).with_text(strong));
                    }
                }
            }
        }
        (Some(text), Some(_)) => {
            tracing::warn!(section, index, "block has both text and runs; using text");
            block.push_text(text);
        }
        (None, None) => {
            return Err(ViewerError::MissingBlockText {
                section: section.to_string(),
                index,
            });
        }
    }

    if let Some(source) = spec.source {
        block = block.with_child(Element::new(ElementKind::Source).with_text(source));
    }

    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Node, TextTree};

    const LESSON: &str = r#"
title = "القلب السليم"

[[sections]]
id = "intro"
title = "مقدمة"

[[sections.blocks]]
kind = "ayah"
text = "يَوْمَ لَا يَنفَعُ مَالٌ وَلَا بَنُونَ"
source = "الشعراء: 88"

[[sections.blocks]]
runs = ["The ", { strong = "sound" }, " heart"]

[[sections]]
title = "Signs"

[[sections.blocks]]
kind = "list"
items = ["first", "second"]
"#;

    #[test]
    fn test_parse_lesson() {
        let tree = parse(LESSON).unwrap();
        assert_eq!(tree.title, "القلب السليم");
        assert_eq!(tree.section_count(), 2);
        assert_eq!(tree.section_id(0), "intro");
        assert_eq!(tree.section_id(1), "section-2");
        assert_eq!(tree.section_title(1).as_deref(), Some("Signs"));

        let ayah = match &tree.sections[0].children[1] {
            Node::Element(el) => el,
            other => panic!("expected element, got {:?}", other),
        };
        assert_eq!(ayah.kind, ElementKind::Ayah);
        assert_eq!(ayah.text_content(), "يَوْمَ لَا يَنفَعُ مَالٌ وَلَا بَنُونَالشعراء: 88");

        assert_eq!(tree.sections[1].text_content(), "Signsfirstsecond");
    }

    #[test]
    fn test_runs_produce_inline_containers() {
        let tree = parse(LESSON).unwrap();
        let para = match &tree.sections[0].children[2] {
            Node::Element(el) => el,
            other => panic!("expected element, got {:?}", other),
        };
        assert_eq!(para.kind, ElementKind::Paragraph);
        assert_eq!(para.children.len(), 3);
        assert!(matches!(&para.children[1], Node::Element(el) if el.kind == ElementKind::Strong));
    }

    #[test]
    fn test_unknown_kind_is_error() {
        let err = parse("[[sections]]\n[[sections.blocks]]\nkind = \"table\"\ntext = \"x\"\n")
            .unwrap_err();
        assert!(matches!(err, ViewerError::UnknownBlockKind { ref kind, .. } if kind == "table"));
    }

    #[test]
    fn test_block_without_text_is_error() {
        let err = parse("[[sections]]\nid = \"a\"\n[[sections.blocks]]\nkind = \"hadith\"\n")
            .unwrap_err();
        assert!(matches!(err, ViewerError::MissingBlockText { index: 0, .. }));
    }

    #[test]
    fn test_empty_lesson_is_valid() {
        let tree = parse("").unwrap();
        assert_eq!(tree.section_count(), 0);
        assert_eq!(tree.text_content(), "");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        assert!(matches!(parse("title = "), Err(ViewerError::Parse(_))));
    }
}
