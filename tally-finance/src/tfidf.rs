//! TF-IDF vectorizer for transaction descriptions.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Sparse feature vector: `(feature index, weight)` sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

/// Fitted vocabulary and inverse document frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    /// Token -> feature index. Indices follow sorted token order.
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    /// Fit vocabulary and IDF weights over a corpus.
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let n_documents = documents.len() as f64;
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let unique: BTreeSet<String> = tokenize(doc.as_ref()).into_iter().collect();
            for token in unique {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        let mut tokens: Vec<_> = document_frequency.into_iter().collect();
        tokens.sort_by(|a, b| a.0.cmp(&b.0));

        let mut vocabulary = HashMap::with_capacity(tokens.len());
        let mut idf = Vec::with_capacity(tokens.len());
        for (idx, (token, df)) in tokens.into_iter().enumerate() {
            // Smoothed: ln((1 + n) / (1 + df)) + 1
            idf.push(((1.0 + n_documents) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(token, idx);
        }

        Self { vocabulary, idf }
    }

    /// Raw term counts weighted by IDF, then scaled to unit L2 norm.
    /// Tokens outside the vocabulary are ignored.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokenize(document) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut features: SparseVector = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();
        features.sort_by_key(|&(idx, _)| idx);

        let norm = features.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut features {
                *w /= norm;
            }
        }
        features
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    /// Vocabulary indices must be exactly `0..idf.len()`.
    pub(crate) fn is_consistent(&self) -> bool {
        self.vocabulary.len() == self.idf.len()
            && self.vocabulary.values().all(|&idx| idx < self.idf.len())
    }
}

/// Lower-cased runs of two or more word characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}
