//! TF-IDF weighting over free text.
//!
//! Tokens are lowercased runs of at least two word characters. Weights are
//! raw counts times the smoothed inverse document frequency
//! `ln((1 + n) / (1 + df)) + 1`, and every row is L2-normalized.

use super::sparse::CsrMatrix;
use super::stopwords::is_stop_word;
use std::collections::{BTreeMap, HashMap};

pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    stop_words: bool,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self { stop_words: true }
    }
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stop_words(mut self, enabled: bool) -> Self {
        self.stop_words = enabled;
        self
    }

    fn terms(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .into_iter()
            .filter(|token| !(self.stop_words && is_stop_word(token)))
            .collect()
    }

    /// Learns the vocabulary and IDF weights from `documents`.
    pub fn fit<S: AsRef<str>>(&self, documents: &[S]) -> FittedTfidf {
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let mut terms = self.terms(doc.as_ref());
            terms.sort();
            terms.dedup();
            for term in terms {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let n_docs = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(doc_freq.len());
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (column, (term, df)) in doc_freq.into_iter().enumerate() {
            idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, column);
        }

        FittedTfidf {
            vectorizer: self.clone(),
            vocabulary,
            idf,
        }
    }

    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> (FittedTfidf, CsrMatrix) {
        let fitted = self.fit(documents);
        let matrix = fitted.transform(documents);
        (fitted, matrix)
    }
}

/// Frozen vocabulary and IDF weights.
#[derive(Debug, Clone)]
pub struct FittedTfidf {
    vectorizer: TfidfVectorizer,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl FittedTfidf {
    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    pub fn column_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.column_of(term).map(|column| self.idf[column])
    }

    /// Terms outside the fitted vocabulary are ignored.
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> CsrMatrix {
        let rows = documents
            .iter()
            .map(|doc| self.transform_one(doc.as_ref()))
            .collect();
        CsrMatrix::from_rows(rows, self.vocabulary_size())
    }

    fn transform_one(&self, document: &str) -> Vec<(usize, f64)> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.vectorizer.terms(document) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut row: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(column, tf)| (column, tf * self.idf[column]))
            .collect();
        let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut row {
                *w /= norm;
            }
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("A hero's fall, in 3D!"), vec!["hero", "fall", "in", "3d"]);
        assert_eq!(tokenize("snake_case x"), vec!["snake_case"]);
    }

    #[test]
    fn test_vocabulary_is_sorted_without_stop_words() {
        let fitted = TfidfVectorizer::new().fit(&["the zebra and the apple", "mango"]);
        assert_eq!(fitted.vocabulary_size(), 3);
        assert_eq!(fitted.column_of("apple"), Some(0));
        assert_eq!(fitted.column_of("mango"), Some(1));
        assert_eq!(fitted.column_of("zebra"), Some(2));
        assert_eq!(fitted.column_of("the"), None);
    }

    #[test]
    fn test_smoothed_idf() {
        let fitted = TfidfVectorizer::new().fit(&["hero falls", "hero rises", "clown falls"]);
        let expected_shared = (4.0f64 / 3.0).ln() + 1.0;
        let expected_unique = 2.0f64.ln() + 1.0;
        assert!((fitted.idf("hero").unwrap() - expected_shared).abs() < 1e-12);
        assert!((fitted.idf("rises").unwrap() - expected_unique).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_l2_normalized() {
        let docs = ["hero falls", "hero rises hero", ""];
        let (_, matrix) = TfidfVectorizer::new().fit_transform(&docs);
        for i in 0..2 {
            let norm: f64 = matrix.row(i).map(|(_, v)| v * v).sum();
            assert!((norm - 1.0).abs() < 1e-12);
        }
        assert_eq!(matrix.row(2).count(), 0);
    }

    #[test]
    fn test_unknown_terms_are_ignored() {
        let fitted = TfidfVectorizer::new().fit(&["hero falls"]);
        let matrix = fitted.transform(&["villain"]);
        assert_eq!(matrix.shape(), (1, 2));
        assert_eq!(matrix.nnz(), 0);
    }
}
