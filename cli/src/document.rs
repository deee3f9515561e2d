//! Countdown blocks embedded in a markdown document

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

/// Fence languages that mark a countdown block. `progressbar` is the legacy tag.
pub const BLOCK_LANGUAGES: [&str; 2] = ["countdown-to", "progressbar"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// 1-based line of the opening fence
    pub line: usize,
    pub language: String,
    pub source: String,
}

fn block_language(info: &str) -> Option<&str> {
    let lang = info.split_whitespace().next()?;
    BLOCK_LANGUAGES.iter().copied().find(|l| *l == lang)
}

/// Every fenced countdown block in document order
pub fn extract_blocks(markdown: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<CodeBlock> = None;

    for (event, range) in Parser::new(markdown).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                current = block_language(&info).map(|language| CodeBlock {
                    line: markdown[..range.start].matches('\n').count() + 1,
                    language: language.to_string(),
                    source: String::new(),
                });
            }
            Event::Text(text) => {
                if let Some(block) = current.as_mut() {
                    block.source.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
            }
            _ => {}
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Plans\n\
                       \n\
                       ```countdown-to\n\
                       title: Launch\n\
                       startDate: 2025-01-01\n\
                       endDate: 2025-01-02\n\
                       ```\n\
                       \n\
                       ```rust\n\
                       fn main() {}\n\
                       ```\n\
                       \n\
                       ```progressbar\n\
                       startTime: 09:00\n\
                       endTime: 17:00\n\
                       ```\n";

    #[test]
    fn test_extracts_tagged_blocks_only() {
        let blocks = extract_blocks(DOC);
        assert_eq!(blocks.len(), 2);

        assert_eq!(blocks[0].language, "countdown-to");
        assert_eq!(blocks[0].line, 3);
        assert_eq!(
            blocks[0].source,
            "title: Launch\nstartDate: 2025-01-01\nendDate: 2025-01-02\n"
        );

        assert_eq!(blocks[1].language, "progressbar");
        assert_eq!(blocks[1].line, 13);
        assert_eq!(blocks[1].source, "startTime: 09:00\nendTime: 17:00\n");
    }

    #[test]
    fn test_info_string_attributes_ignored() {
        let blocks = extract_blocks("```countdown-to {.wide}\nendDate: 2030-01-01\n```\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].source, "endDate: 2030-01-01\n");
    }

    #[test]
    fn test_indented_blocks_ignored() {
        assert!(extract_blocks("    countdown-to\n    startDate: 2025-01-01\n").is_empty());
        assert!(extract_blocks("no code here").is_empty());
    }

    #[test]
    fn test_empty_block() {
        let blocks = extract_blocks("```countdown-to\n```\n");
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].source.is_empty());
    }
}
