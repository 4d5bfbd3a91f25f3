use crate::content::ContentSection;
use crate::rich_text::as_text;

pub const WORDS_PER_MINUTE: usize = 200;

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimated reading time in whole minutes, rounded up.
pub fn estimate_minutes(content: &[ContentSection]) -> u32 {
    let words: usize = content.iter()
        .map(|section| word_count(&section.heading) + word_count(&as_text(&section.body)))
        .sum();

    words.div_ceil(WORDS_PER_MINUTE) as u32
}

#[cfg(test)]
mod tests {
    use crate::rich_text::RichTextBlock;

    use super::*;

    fn section_with_words(heading_words: usize, body_words: usize) -> ContentSection {
        ContentSection {
            heading: vec!["word"; heading_words].join(" "),
            body: vec![RichTextBlock::paragraph(&vec!["lorem"; body_words].join(" "))],
        }
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(estimate_minutes(&[]), 0);
        assert_eq!(estimate_minutes(&[section_with_words(0, 0)]), 0);
    }

    #[test]
    fn test_rounds_up() {
        assert_eq!(estimate_minutes(&[section_with_words(0, 1)]), 1);
        assert_eq!(estimate_minutes(&[section_with_words(0, 200)]), 1);
        assert_eq!(estimate_minutes(&[section_with_words(0, 201)]), 2);
        assert_eq!(estimate_minutes(&[section_with_words(1, 200)]), 2);
    }

    #[test]
    fn test_counts_every_section() {
        let content = vec![section_with_words(3, 150), section_with_words(2, 245)];
        assert_eq!(estimate_minutes(&content), 2);
        let content = vec![section_with_words(5, 150), section_with_words(5, 245)];
        assert_eq!(estimate_minutes(&content), 3);
    }

    #[test]
    fn test_irregular_whitespace() {
        let content = vec![ContentSection {
            heading: "  Proin   et varius ".to_string(),
            body: vec![
                RichTextBlock::paragraph("Lorem\nipsum\tdolor  "),
                RichTextBlock::paragraph(""),
                RichTextBlock::paragraph("sit amet"),
            ],
        }];
        // 3 + 5 words
        assert_eq!(estimate_minutes(&content), 1);
        assert_eq!(word_count("  Proin   et varius "), 3);
        assert_eq!(word_count(&as_text(&content[0].body)), 5);
    }
}
