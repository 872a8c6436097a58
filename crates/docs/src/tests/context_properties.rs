//! Behavioral properties of context selection.

use crate::context::{select_context, split_chunks, ContextOptions};

const DELIMITER: &str = "\n---\n";

/// Deterministic pseudo-random documents of varied shapes.
fn sample_documents() -> Vec<String> {
    let words = ["ledger", "invoice", "cat", "a", "supply", "chain", "é", "margin"];
    let mut seed = 7u64;
    let mut next = move || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (seed >> 33) as usize
    };

    (0..40)
        .map(|_| {
            let paragraphs = next() % 8;
            (0..=paragraphs)
                .map(|_| {
                    let len = next() % 900;
                    (0..len)
                        .map(|_| words[next() % words.len()])
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        })
        .collect()
}

#[test]
fn context_never_exceeds_budget() {
    let documents = sample_documents();
    for question in ["", "invoice margin", "supply chain ledger invoice", "a cat"] {
        for take in [1, 5, 40] {
            let context = select_context(&documents[..take], question);
            assert!(
                context.chars().count() <= 10_000,
                "context of {} chars for {:?}",
                context.chars().count(),
                question
            );
        }
    }
}

#[test]
fn no_qualifying_words_keeps_first_two_chunks() {
    let doc = "first part\n\nsecond part\n\nthird part has invoice\n\nfourth";
    // Every word is three characters or fewer
    let context = select_context(&[doc], "why is the sky red ?");
    assert_eq!(context, "first part\n---\nsecond part");

    let context = select_context(&[doc], "");
    assert_eq!(context, "first part\n---\nsecond part");
}

#[test]
fn best_chunk_is_selected_first() {
    let doc = "invoice totals\n\nnothing here\n\ninvoice margin supply totals\n\nmargin only";
    let context = select_context(&[doc], "invoice margin supply");
    let first = context.split(DELIMITER).next().unwrap();
    assert_eq!(first, "invoice margin supply totals");
}

#[test]
fn documents_keep_input_order() {
    let docs = ["alpha notes", "beta notes", "gamma notes"];
    let context = select_context(&docs, "notes");
    assert_eq!(context, "alpha notes\n---\nbeta notes\n---\ngamma notes");
    // One chunk per document: one delimiter between each pair
    assert_eq!(context.matches(DELIMITER).count(), docs.len() - 1);
}

#[test]
fn empty_documents_add_no_delimiters() {
    let docs = ["alpha notes", "", "gamma notes"];
    let context = select_context(&docs, "notes");
    assert_eq!(context, "alpha notes\n---\ngamma notes");
    assert_eq!(context.matches(DELIMITER).count(), 1);
}

#[test]
fn delimiter_separates_every_kept_chunk() {
    let options = ContextOptions::default();
    let docs = [
        "one\n\ntwo\n\nthree",
        "short",
        "x\n\ny\n\nz\n\nw",
    ];
    let kept: usize = docs
        .iter()
        .map(|doc| split_chunks(doc, &options).len().min(2))
        .sum();

    let context = select_context(&docs, "nothing matches");
    assert_eq!(kept, 5);
    assert_eq!(context.matches(DELIMITER).count(), kept - 1);
}

#[test]
fn short_document_is_a_single_window() {
    let doc = "The cat sat on the mat.\n\nDogs bark loudly at night.";
    let context = select_context(&[doc], "Where does the cat sit?");
    assert_eq!(context, doc);
}

#[test]
fn small_document_is_not_starved_by_large_one() {
    let large = (0..50)
        .map(|i| format!("invoice section {} with margin figures", i))
        .collect::<Vec<_>>()
        .join("\n\n");
    let small = "the supply note";

    let context = select_context(&[large.as_str(), small], "invoice margin supply");
    assert!(context.ends_with("\n---\nthe supply note"));
}

#[test]
fn selection_is_idempotent() {
    let documents = sample_documents();
    let question = "supply chain margin";
    assert_eq!(
        select_context(&documents[..], question),
        select_context(&documents[..], question)
    );
}
