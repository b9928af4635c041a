use std::collections::{BTreeMap, HashMap, HashSet};

use bulletin_core::Corpus;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

mod stop_words;

pub use stop_words::ENGLISH_STOP_WORDS;

const MIN_TOKEN_CHARS: usize = 2;

/// Fitted vocabulary and inverse document frequencies. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSpace {
    terms: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl VectorSpace {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self, column: usize) -> Option<f64> {
        self.idf.get(column).copied()
    }
}

/// Sparse, L2-normalised term weights. Entries are sorted by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentVector {
    entries: Vec<(usize, f64)>,
}

impl DocumentVector {
    fn from_counts(counts: BTreeMap<usize, usize>, space: &VectorSpace) -> Self {
        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(column, count)| (column, count as f64 * space.idf[column]))
            .collect();

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in entries.iter_mut() {
                *weight /= norm;
            }
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn weight(&self, column: usize) -> f64 {
        self.entries
            .binary_search_by_key(&column, |(c, _)| *c)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, w)| *w == 0.0)
    }

    pub fn dot(&self, other: &DocumentVector) -> f64 {
        let (mut i, mut j, mut sum) = (0, 0, 0.0);
        while i < self.entries.len() && j < other.entries.len() {
            let (a, wa) = self.entries[i];
            let (b, wb) = other.entries[j];
            match a.cmp(&b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Per-article weights in compressed sparse row layout, one row per article
/// in corpus order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermMatrix {
    columns: usize,
    row_offsets: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl TermMatrix {
    fn from_rows(rows: Vec<DocumentVector>, columns: usize) -> Self {
        let mut matrix = Self {
            columns,
            row_offsets: vec![0],
            indices: Vec::new(),
            values: Vec::new(),
        };
        for row in rows {
            for (column, weight) in row.entries {
                matrix.indices.push(column);
                matrix.values.push(weight);
            }
            matrix.row_offsets.push(matrix.indices.len());
        }
        matrix
    }

    pub fn rows(&self) -> usize {
        self.row_offsets.len() - 1
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row(&self, position: usize) -> Option<DocumentVector> {
        let start = *self.row_offsets.get(position)?;
        let end = *self.row_offsets.get(position + 1)?;
        let entries = self.indices[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter().copied())
            .collect();
        Some(DocumentVector { entries })
    }

    /// Euclidean norm of every row, in row order.
    pub fn row_norms(&self) -> Vec<f64> {
        self.row_offsets
            .windows(2)
            .map(|w| self.values[w[0]..w[1]].iter().map(|v| v * v).sum::<f64>().sqrt())
            .collect()
    }

    /// Matrix-vector product: entry `i` is the dot product of row `i` with `vector`.
    pub fn dot(&self, vector: &DocumentVector) -> Vec<f64> {
        let mut dense = vec![0.0; self.columns];
        for &(column, weight) in vector.entries() {
            if column < self.columns {
                dense[column] = weight;
            }
        }

        self.row_offsets
            .windows(2)
            .map(|w| {
                (w[0]..w[1])
                    .map(|k| self.values[k] * dense[self.indices[k]])
                    .sum()
            })
            .collect()
    }
}

/// Unigram tf-idf vectorizer with English stop-word removal.
#[derive(Debug, Clone)]
pub struct TextVectorizer {
    stop_words: HashSet<&'static str>,
}

impl Default for TextVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextVectorizer {
    pub fn new() -> Self {
        Self {
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Lowercased word tokens of two or more characters, stop words removed.
    ///
    /// Words are found on Unicode word boundaries, then split again on anything
    /// that is not alphanumeric or `_`, so "don't" yields "don" and "t".
    pub fn tokenize<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        text.unicode_words()
            .flat_map(|word| word.split(|c: char| !(c.is_alphanumeric() || c == '_')))
            .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
            .map(str::to_lowercase)
            .filter(move |token| !self.stop_words.contains(token.as_str()))
    }

    /// Build the vector space from `documents` and weight each of them in it.
    pub fn fit<'a, I>(&self, documents: I) -> (VectorSpace, TermMatrix)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let tokenized: Vec<Vec<String>> = documents
            .into_iter()
            .map(|doc| self.tokenize(doc).collect())
            .collect();

        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenized {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *document_frequency.entry(term).or_default() += 1;
            }
        }

        let n = tokenized.len() as f64;
        let mut terms = Vec::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (term, df) in &document_frequency {
            terms.push(term.to_string());
            idf.push(((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0);
        }
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();

        let space = VectorSpace { terms, index, idf };
        let rows = tokenized
            .iter()
            .map(|tokens| self.weigh(&space, tokens.iter().map(String::as_str)))
            .collect();
        let matrix = TermMatrix::from_rows(rows, space.len());

        debug!(
            "Fitted vector space with {} terms over {} documents",
            space.len(),
            matrix.rows()
        );
        (space, matrix)
    }

    pub fn fit_corpus(&self, corpus: &Corpus) -> (VectorSpace, TermMatrix) {
        self.fit(corpus.combined_texts())
    }

    /// Project `text` into an already fitted space. Unknown terms are dropped.
    pub fn transform(&self, space: &VectorSpace, text: &str) -> DocumentVector {
        let tokens: Vec<String> = self.tokenize(text).collect();
        self.weigh(space, tokens.iter().map(String::as_str))
    }

    /// One vector for the whole reading history, built from every article's
    /// combined text joined in corpus order.
    pub fn transform_profile(&self, space: &VectorSpace, history: &Corpus) -> DocumentVector {
        self.transform(space, &history.profile_text())
    }

    fn weigh<'a>(&self, space: &VectorSpace, tokens: impl Iterator<Item = &'a str>) -> DocumentVector {
        let mut counts = BTreeMap::new();
        for token in tokens {
            if let Some(column) = space.term_index(token) {
                *counts.entry(column).or_insert(0usize) += 1;
            }
        }
        DocumentVector::from_counts(counts, space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCS: [&str; 3] = [
        "Cats are great. They purr.",
        "Dogs are loyal. They bark.",
        "Stocks rose today. Markets are up.",
    ];

    #[test]
    fn test_tokenize_drops_stop_words_and_short_tokens() {
        let vectorizer = TextVectorizer::new();
        let tokens: Vec<String> = vectorizer.tokenize("I love THE cats, a 2x_b go!").collect();
        assert_eq!(tokens, vec!["love", "cats", "2x_b"]);
    }

    #[test]
    fn test_tokenize_splits_on_word_boundaries() {
        let vectorizer = TextVectorizer::new();
        let tokens: Vec<String> = vectorizer
            .tokenize("Café owners' \"protest\" didn't stop—prices rose 3.5%")
            .collect();
        assert_eq!(tokens, vec!["café", "owners", "protest", "didn", "stop", "prices", "rose"]);
    }

    #[test]
    fn test_fit_vocabulary_is_sorted() {
        let (space, matrix) = TextVectorizer::new().fit(DOCS);
        assert_eq!(
            space.terms(),
            &["bark", "cats", "dogs", "great", "loyal", "markets", "purr", "rose", "stocks", "today"]
        );
        assert_eq!(matrix.rows(), 3);
        assert_eq!(matrix.columns(), 10);
    }

    #[test]
    fn test_idf_is_smoothed() {
        let (space, _) = TextVectorizer::new().fit(["apple pear", "apple"]);
        let apple = space.term_index("apple").unwrap();
        let pear = space.term_index("pear").unwrap();
        assert!((space.idf(apple).unwrap() - 1.0).abs() < 1e-12);
        assert!((space.idf(pear).unwrap() - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_normalised() {
        let (_, matrix) = TextVectorizer::new().fit(DOCS);
        for norm in matrix.row_norms() {
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_transform_ignores_unknown_terms() {
        let vectorizer = TextVectorizer::new();
        let (space, _) = vectorizer.fit(DOCS);
        let vector = vectorizer.transform(&space, "I love cats and their purring");
        assert_eq!(vector.entries().len(), 1);
        assert!(vector.weight(space.term_index("cats").unwrap()) > 0.0);
        assert_eq!(space.len(), 10);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let vectorizer = TextVectorizer::new();
        let (space, _) = vectorizer.fit(DOCS);
        let a = vectorizer.transform(&space, "dogs bark at cats");
        let b = vectorizer.transform(&space, "dogs bark at cats");
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_and_stop_word_text_is_zero_vector() {
        let vectorizer = TextVectorizer::new();
        let (space, _) = vectorizer.fit(DOCS);
        assert!(vectorizer.transform(&space, "").is_zero());
        assert!(vectorizer.transform(&space, "they are the ones").is_zero());
    }

    #[test]
    fn test_matrix_dot_matches_row_dot() {
        let vectorizer = TextVectorizer::new();
        let (space, matrix) = vectorizer.fit(DOCS);
        let query = vectorizer.transform(&space, "cats dogs markets");
        let batched = matrix.dot(&query);
        for (position, score) in batched.iter().enumerate() {
            let row = matrix.row(position).unwrap();
            assert!((row.dot(&query) - score).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fitting_empty_corpus() {
        let (space, matrix) = TextVectorizer::new().fit(Vec::<&str>::new());
        assert!(space.is_empty());
        assert_eq!(matrix.rows(), 0);
        assert!(matrix.dot(&DocumentVector::default()).is_empty());
    }
}
