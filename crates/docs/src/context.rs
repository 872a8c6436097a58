//! Keyword-overlap context selection.
//!
//! Every document gets the same share of the context: its best one or two
//! chunks are kept no matter how large or small the document is. Scoring
//! is a bag-of-words overlap with the question; there is no index and no
//! stemming.

use std::collections::HashSet;

/// Tuning knobs for context selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Window size, in characters, for documents without enough paragraphs
    pub window_chars: usize,

    /// Fewer paragraphs than this switches to fixed windows
    pub min_paragraphs: usize,

    /// Chunks kept per document
    pub picks_per_document: usize,

    /// Hard character budget of the final context
    pub max_chars: usize,

    /// Question words must be longer than this many characters to count
    pub min_word_chars: usize,

    /// Placed between kept chunks
    pub delimiter: String,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            window_chars: 1000,
            min_paragraphs: 3,
            picks_per_document: 2,
            max_chars: 10_000,
            min_word_chars: 3,
            delimiter: "\n---\n".to_string(),
        }
    }
}

/// A chunk with its relevance score and original position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredChunk<'a> {
    pub score: usize,
    pub position: usize,
    pub text: &'a str,
}

/// A chunk chosen for the context, tagged with its source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedChunk<'a> {
    pub document: usize,
    pub score: usize,
    pub text: &'a str,
}

/// Lowercased, whitespace-separated distinct words of the question.
pub fn question_words(question: &str) -> HashSet<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Split a document into paragraphs, or fixed windows when it has too few.
///
/// An empty document yields no chunks.
pub fn split_chunks<'a>(text: &'a str, options: &ContextOptions) -> Vec<&'a str> {
    let paragraphs: Vec<&str> = text.split("\n\n").collect();
    if paragraphs.len() >= options.min_paragraphs {
        return paragraphs;
    }

    char_windows(text, options.window_chars)
}

/// Non-overlapping windows of `size` characters; the last may be shorter.
fn char_windows(text: &str, size: usize) -> Vec<&str> {
    let size = size.max(1);
    let mut windows = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == size {
            windows.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        windows.push(&text[start..]);
    }

    windows
}

/// Number of distinct qualifying words found anywhere in the chunk.
pub fn score_chunk(chunk: &str, words: &HashSet<String>, options: &ContextOptions) -> usize {
    let lower = chunk.to_lowercase();
    words
        .iter()
        .filter(|word| word.chars().count() > options.min_word_chars)
        .filter(|word| lower.contains(word.as_str()))
        .count()
}

/// Score every chunk of a document and order them best first.
///
/// The sort is stable, so equal scores keep their document order.
pub fn rank_chunks<'a>(
    text: &'a str,
    words: &HashSet<String>,
    options: &ContextOptions,
) -> Vec<ScoredChunk<'a>> {
    let mut scored: Vec<ScoredChunk<'a>> = split_chunks(text, options)
        .into_iter()
        .enumerate()
        .map(|(position, chunk)| ScoredChunk {
            score: score_chunk(chunk, words, options),
            position,
            text: chunk,
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// The chunks kept from each document, in document order.
pub fn selected_chunks<'a, S: AsRef<str>>(
    documents: &'a [S],
    question: &str,
    options: &ContextOptions,
) -> Vec<SelectedChunk<'a>> {
    let words = question_words(question);

    documents
        .iter()
        .enumerate()
        .flat_map(|(document, text)| {
            rank_chunks(text.as_ref(), &words, options)
                .into_iter()
                .take(options.picks_per_document)
                .map(move |chunk| SelectedChunk {
                    document,
                    score: chunk.score,
                    text: chunk.text,
                })
        })
        .collect()
}

/// Build the context for `question` from the documents' texts.
pub fn select_context<S: AsRef<str>>(documents: &[S], question: &str) -> String {
    select_context_with(documents, question, &ContextOptions::default())
}

/// [`select_context`] with explicit options.
pub fn select_context_with<S: AsRef<str>>(
    documents: &[S],
    question: &str,
    options: &ContextOptions,
) -> String {
    let chunks = selected_chunks(documents, question, options);

    for chunk in &chunks {
        tracing::debug!(
            "Selected chunk from document {} (score {}, {} chars)",
            chunk.document,
            chunk.score,
            chunk.text.chars().count()
        );
    }

    let mut context = chunks
        .iter()
        .map(|chunk| chunk.text)
        .collect::<Vec<_>>()
        .join(&options.delimiter);

    truncate_chars(&mut context, options.max_chars);
    context
}

/// Cut `text` to at most `max_chars` characters, on a char boundary.
fn truncate_chars(text: &mut String, max_chars: usize) {
    if let Some((idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(question: &str) -> HashSet<String> {
        question_words(question)
    }

    #[test]
    fn test_question_words_lowercase_set() {
        let words = words("Where  does the CAT\tsit? where");
        assert_eq!(words.len(), 5);
        assert!(words.contains("where"));
        assert!(words.contains("cat"));
        assert!(words.contains("sit?"));
    }

    #[test]
    fn test_split_paragraphs() {
        let options = ContextOptions::default();
        let chunks = split_chunks("one\n\ntwo\n\nthree", &options);
        assert_eq!(chunks, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_split_falls_back_to_windows() {
        let options = ContextOptions::default();
        let text = format!("{}\n\n{}", "a".repeat(1200), "b".repeat(300));
        let chunks = split_chunks(&text, &options);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 1000);
        assert_eq!(chunks[1].chars().count(), 502);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_windows_count_characters_not_bytes() {
        let options = ContextOptions {
            window_chars: 3,
            ..ContextOptions::default()
        };
        let chunks = split_chunks("héllo wörld", &options);
        assert_eq!(chunks, vec!["hél", "lo ", "wör", "ld"]);
    }

    #[test]
    fn test_empty_document_has_no_chunks() {
        assert!(split_chunks("", &ContextOptions::default()).is_empty());
    }

    #[test]
    fn test_score_counts_distinct_long_words() {
        let options = ContextOptions::default();
        let chunk = "The Quarterly revenue report shows revenue growth.";

        assert_eq!(score_chunk(chunk, &words("revenue growth"), &options), 2);
        // Repeated question words only count once
        assert_eq!(score_chunk(chunk, &words("revenue revenue"), &options), 1);
        // Words of three characters or fewer never count
        assert_eq!(score_chunk(chunk, &words("the shows"), &options), 1);
        // Substring matching, case-insensitive
        assert_eq!(score_chunk(chunk, &words("QUARTER"), &options), 1);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let options = ContextOptions::default();
        let ranked = rank_chunks("alpha\n\nbeta gamma\n\ngamma\n\ndelta", &words("gamma"), &options);

        let order: Vec<usize> = ranked.iter().map(|c| c.position).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
        assert_eq!(ranked[0].score, 1);
        assert_eq!(ranked[2].score, 0);
    }

    #[test]
    fn test_select_context_picks_best_two() {
        let doc = "intro text\n\npricing details here\n\nshipping and pricing policy\n\nfooter";
        let context = select_context(&[doc], "What is the pricing policy");
        assert_eq!(
            context,
            "shipping and pricing policy\n---\npricing details here"
        );
    }

    #[test]
    fn test_single_chunk_document() {
        let context = select_context(&["short note"], "anything relevant");
        assert_eq!(context, "short note");
    }

    #[test]
    fn test_empty_inputs() {
        let none: [&str; 0] = [];
        assert_eq!(select_context(&none, "question"), "");
        assert_eq!(select_context(&["", ""], "question"), "");
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let docs: Vec<String> = (0..12).map(|_| "é".repeat(1000)).collect();
        let context = select_context(&docs[..], "q");
        assert_eq!(context.chars().count(), 10_000);
        assert!(context.starts_with('é'));
    }

    #[test]
    fn test_custom_options() {
        let options = ContextOptions {
            picks_per_document: 1,
            max_chars: 4,
            ..ContextOptions::default()
        };
        let context = select_context_with(&["aaaa\n\nbbbb cccc\n\ndddd"], "cccc", &options);
        assert_eq!(context, "bbbb");
    }
}
