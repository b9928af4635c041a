use bulletin_core::{Corpus, RankedRecommendation};
use tracing::debug;

use crate::vectorizer::{DocumentVector, TermMatrix};

/// How many ranked articles are kept for script generation.
pub const MAX_RECOMMENDATIONS: usize = 100;

/// How many ranked articles are shown on the console.
pub const DISPLAY_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct SimilarityRanker {
    limit: usize,
}

impl Default for SimilarityRanker {
    fn default() -> Self {
        Self {
            limit: MAX_RECOMMENDATIONS,
        }
    }
}

impl SimilarityRanker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Cosine similarity of `user` with every row of `matrix`, in row order.
    pub fn scores(&self, user: &DocumentVector, matrix: &TermMatrix) -> Vec<f64> {
        let user_norm = user.norm();
        matrix
            .dot(user)
            .into_iter()
            .zip(matrix.row_norms())
            .map(|(dot, row_norm)| {
                if user_norm == 0.0 || row_norm == 0.0 {
                    0.0
                } else {
                    (dot / (user_norm * row_norm)).clamp(0.0, 1.0)
                }
            })
            .collect()
    }

    /// Positions and scores, best first. Equal scores keep corpus order.
    pub fn rank(&self, user: &DocumentVector, matrix: &TermMatrix) -> Vec<(usize, f64)> {
        let mut ranked: Vec<(usize, f64)> = self.scores(user, matrix).into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(self.limit);
        ranked
    }

    /// Rank `matrix` against `user` and attach the matching articles from `pool`,
    /// which must be the corpus the matrix was fitted on.
    pub fn recommend(
        &self,
        user: &DocumentVector,
        matrix: &TermMatrix,
        pool: &Corpus,
    ) -> Recommendations {
        let items: Vec<RankedRecommendation> = self
            .rank(user, matrix)
            .into_iter()
            .filter_map(|(position, score)| {
                pool.get(position).map(|article| RankedRecommendation {
                    position,
                    id: article.id().to_string(),
                    title: article.title().to_string(),
                    body: article.body().to_string(),
                    score,
                })
            })
            .collect();

        debug!("Ranked {} of {} articles", items.len(), pool.len());
        Recommendations { items }
    }
}

/// Ranked articles, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    items: Vec<RankedRecommendation>,
}

impl Recommendations {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[RankedRecommendation] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedRecommendation> {
        self.items.iter()
    }

    /// The first `n` entries, for display.
    pub fn top(&self, n: usize) -> &[RankedRecommendation] {
        &self.items[..n.min(self.items.len())]
    }

    pub fn best_score(&self) -> Option<f64> {
        self.items.first().map(|item| item.score)
    }
}

impl From<Vec<RankedRecommendation>> for Recommendations {
    fn from(items: Vec<RankedRecommendation>) -> Self {
        Self { items }
    }
}
