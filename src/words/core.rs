use memchr::memchr3;
use rustc_hash::FxHashSet;

/// Deduplicated collection of tokens.
///
/// Backed by an `FxHashSet` — word insertion is the hot path of the whole
/// engine and FxHash beats SipHash by a wide margin on short keys. A set is
/// only ever touched by one thread at a time; ownership of "who may mutate"
/// moves between coordinator and workers through the engine protocol, never
/// through locking inside the set itself.
#[derive(Debug, Default)]
pub struct WordSet {
    words: FxHashSet<Box<[u8]>>,
}

impl WordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a token, allocating only when it is not already present.
    /// Returns true if the set grew.
    pub fn insert(&mut self, word: &[u8]) -> bool {
        if self.words.contains(word) {
            return false;
        }
        self.words.insert(word.into())
    }

    pub fn contains(&self, word: &[u8]) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Take the whole set, leaving this one empty.
    pub fn take(&mut self) -> WordSet {
        WordSet {
            words: std::mem::take(&mut self.words),
        }
    }

    /// Move every word of `other` into `self`, leaving `other` empty.
    ///
    /// When `self` holds nothing yet the backing storage is swapped instead
    /// of rehashing every entry, which makes folding into a fresh final set
    /// as cheap as a move.
    pub fn merge(&mut self, other: &mut WordSet) {
        if self.words.is_empty() {
            std::mem::swap(&mut self.words, &mut other.words);
            return;
        }
        self.words.extend(other.words.drain());
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.words.iter().map(|w| w.as_ref())
    }
}

impl<'a> FromIterator<&'a [u8]> for WordSet {
    fn from_iter<I: IntoIterator<Item = &'a [u8]>>(iter: I) -> Self {
        let mut set = WordSet::new();
        for word in iter {
            set.insert(word);
        }
        set
    }
}

/// True for the three byte classes the tokenizer treats as word separators.
/// CR, form feed and vertical tab are token content here (unlike `wc`).
#[inline]
pub fn is_word_separator(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n')
}

/// Scan `data` for maximal runs of non-separator bytes and insert each run
/// into `out`, skipping words already present in the optional shared
/// `exclude` set. Returns the number of tokens seen, duplicates included.
pub fn tokenize_into(data: &[u8], exclude: Option<&WordSet>, out: &mut WordSet) -> u64 {
    let mut total = 0u64;
    let mut pos = 0;
    while pos < data.len() {
        if is_word_separator(data[pos]) {
            pos += 1;
            continue;
        }
        let end = match memchr3(b' ', b'\t', b'\n', &data[pos..]) {
            Some(offset) => pos + offset,
            None => data.len(),
        };
        let word = &data[pos..end];
        total += 1;
        if !exclude.is_some_and(|known| known.contains(word)) {
            out.insert(word);
        }
        pos = end;
    }
    total
}
