use super::*;

fn set_of(words: &[&str]) -> WordSet {
    words.iter().map(|w| w.as_bytes()).collect()
}

fn contents(set: &WordSet) -> Vec<String> {
    let mut v: Vec<String> = set
        .iter()
        .map(|w| String::from_utf8(w.to_vec()).unwrap())
        .collect();
    v.sort();
    v
}

// ──────────────────────────────────────────────────
// WordSet basics
// ──────────────────────────────────────────────────

#[test]
fn test_insert_and_contains() {
    let mut set = WordSet::new();
    assert!(set.insert(b"ala"));
    assert!(set.contains(b"ala"));
    assert!(!set.contains(b"ma"));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_insert_duplicate_rejected() {
    let mut set = WordSet::new();
    assert!(set.insert(b"kot"));
    assert!(!set.insert(b"kot"));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_clear() {
    let mut set = set_of(&["a", "b"]);
    set.clear();
    assert!(set.is_empty());
}

#[test]
fn test_take_empties_source() {
    let mut set = set_of(&["a", "b"]);
    let taken = set.take();
    assert!(set.is_empty());
    assert_eq!(taken.len(), 2);
}

// ──────────────────────────────────────────────────
// merge
// ──────────────────────────────────────────────────

#[test]
fn test_merge_moves_and_empties_source() {
    let mut a = set_of(&["ala", "ma"]);
    let mut b = set_of(&["kota", "ma"]);
    a.merge(&mut b);
    assert!(b.is_empty());
    assert_eq!(contents(&a), vec!["ala", "kota", "ma"]);
}

#[test]
fn test_merge_empty_source_leaves_target_unchanged() {
    let mut a = set_of(&["x", "y"]);
    let mut b = WordSet::new();
    a.merge(&mut b);
    assert_eq!(contents(&a), vec!["x", "y"]);
    assert!(b.is_empty());
}

#[test]
fn test_merge_into_empty_target_swaps() {
    let mut a = WordSet::new();
    let mut b = set_of(&["x", "y"]);
    a.merge(&mut b);
    assert_eq!(contents(&a), vec!["x", "y"]);
    assert!(b.is_empty());
}

#[test]
fn test_merge_chain() {
    let mut acc = WordSet::new();
    for part in [set_of(&["a", "b"]), set_of(&["b", "c"]), set_of(&["d"])] {
        let mut part = part;
        acc.merge(&mut part);
    }
    assert_eq!(contents(&acc), vec!["a", "b", "c", "d"]);
}

// ──────────────────────────────────────────────────
// Tokenizer
// ──────────────────────────────────────────────────

#[test]
fn test_tokenize_space_separated() {
    let mut out = WordSet::new();
    let total = tokenize_into(b"ala ma kota", None, &mut out);
    assert_eq!(total, 3);
    assert_eq!(contents(&out), vec!["ala", "kota", "ma"]);
}

#[test]
fn test_tokenize_counts_duplicates_once_in_set() {
    let mut out = WordSet::new();
    let total = tokenize_into(b"ma ma ma", None, &mut out);
    assert_eq!(total, 3);
    assert_eq!(out.len(), 1);
}

#[test]
fn test_tokenize_mixed_whitespace() {
    let mut out = WordSet::new();
    tokenize_into(b"a\tb\nc d", None, &mut out);
    assert_eq!(contents(&out), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_tokenize_runs_of_separators() {
    let mut out = WordSet::new();
    let total = tokenize_into(b"  a \t\t b \n\n ", None, &mut out);
    assert_eq!(total, 2);
    assert_eq!(contents(&out), vec!["a", "b"]);
}

#[test]
fn test_tokenize_punctuation_stays_attached() {
    let mut out = WordSet::new();
    tokenize_into(b"ale. ale", None, &mut out);
    assert_eq!(contents(&out), vec!["ale", "ale."]);
}

#[test]
fn test_tokenize_carriage_return_is_content() {
    let mut out = WordSet::new();
    let total = tokenize_into(b"a\rb c", None, &mut out);
    assert_eq!(total, 2);
    assert!(out.contains(b"a\rb"));
}

#[test]
fn test_tokenize_empty_and_separator_only_input() {
    let mut out = WordSet::new();
    assert_eq!(tokenize_into(b"", None, &mut out), 0);
    assert_eq!(tokenize_into(b" \t\n ", None, &mut out), 0);
    assert!(out.is_empty());
}

#[test]
fn test_tokenize_skips_excluded_words() {
    let known = set_of(&["ma", "a"]);
    let mut out = WordSet::new();
    let total = tokenize_into(b"ala ma kota a kot", Some(&known), &mut out);
    // excluded words still count toward the total, they are just not stored
    assert_eq!(total, 5);
    assert_eq!(contents(&out), vec!["ala", "kot", "kota"]);
}

#[test]
fn test_tokenize_trailing_word_without_separator() {
    let mut out = WordSet::new();
    tokenize_into(b"one two", None, &mut out);
    assert!(out.contains(b"two"));
}
