//! Search keyword extraction
//!
//! Words are uppercased runs of letters and digits, allowing inner apostrophes, hyphens and
//! underscores. Stop-words and single characters are dropped, and a word that is a prefix of
//! another kept word is dropped too, since a prefix search for the longer word finds it.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::Node;

/// English stop-words, as used by Lucene's `StandardAnalyzer`.
const STOP_WORDS: [&str; 33] = [
    "A", "AN", "AND", "ARE", "AS", "AT", "BE", "BUT", "BY", "FOR", "IF", "IN", "INTO", "IS",
    "IT", "NO", "NOT", "OF", "ON", "OR", "SUCH", "THAT", "THE", "THEIR", "THEN", "THERE",
    "THESE", "THEY", "THIS", "TO", "WAS", "WILL", "WITH",
];

const MIN_WORD_CHARS: usize = 2;

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| {
        Regex::new(r"[\p{L}\p{N}]+(?:['’_-][\p{L}\p{N}]+)*").expect("word pattern is valid")
    })
}

/// Split text into its set of uppercased words.
pub fn parse_words(text: &str) -> BTreeSet<String> {
    word_regex()
        .find_iter(text)
        .map(|word| word.as_str().to_uppercase())
        .collect()
}

/// Keywords for search: every word of the tree, filtered and reduced to maximal words.
pub fn extract_keywords(nodes: &[Node]) -> Vec<String> {
    let mut blocks = Vec::new();
    collect_block_text(nodes, &mut blocks);
    let words: BTreeSet<String> = blocks
        .iter()
        .flat_map(|text| parse_words(text))
        .filter(|word| word.chars().count() >= MIN_WORD_CHARS)
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .collect();
    maximal_words(&words)
}

/// Text is gathered per block so that words split across differently marked leaves stay whole.
fn collect_block_text(nodes: &[Node], out: &mut Vec<String>) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push(text.text.clone()),
            Node::Element(element) if element.children.iter().all(Node::is_inline) => {
                out.push(node.text_content())
            }
            Node::Element(element) => collect_block_text(&element.children, out),
        }
    }
}

/// In sorted order, any word extending `w` directly follows `w`.
fn maximal_words(words: &BTreeSet<String>) -> Vec<String> {
    let sorted: Vec<&String> = words.iter().collect();
    sorted
        .iter()
        .enumerate()
        .filter(|(i, word)| {
            sorted
                .get(i + 1)
                .map_or(true, |next| !next.starts_with(word.as_str()))
        })
        .map(|(_, word)| (*word).clone())
        .collect()
}
