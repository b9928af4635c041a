pub mod ranking;
pub mod script;
pub mod vectorizer;

pub use ranking::{Recommendations, SimilarityRanker, DISPLAY_LIMIT, MAX_RECOMMENDATIONS};
pub use script::ScriptComposer;
pub use vectorizer::{DocumentVector, TermMatrix, TextVectorizer, VectorSpace};

use bulletin_core::Corpus;
use tracing::info;

/// Fit on `pool`, fold `history` into one profile vector and rank the pool against it.
pub fn recommend(pool: &Corpus, history: &Corpus) -> Recommendations {
    let vectorizer = TextVectorizer::new();
    let (space, matrix) = vectorizer.fit_corpus(pool);
    info!("🔤 Vocabulary has {} terms", space.len());
    let profile = vectorizer.transform_profile(&space, history);
    SimilarityRanker::new().recommend(&profile, &matrix, pool)
}

pub mod prelude {
    pub use super::{recommend, Recommendations, ScriptComposer, SimilarityRanker, TextVectorizer};
    pub use bulletin_core::{Corpus, Error, RankedRecommendation, Result, Script, ScriptMode};
}
