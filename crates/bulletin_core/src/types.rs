use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single news article, normalised at load time.
///
/// The derived `lead` and `combined_text` fields are computed once in
/// [`ArticleRecord::new`] and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    id: String,
    title: String,
    body: String,
    sections: [String; 3],
    published_at: Option<DateTime<Utc>>,
    lead: String,
    combined_text: String,
}

impl ArticleRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        sections: [String; 3],
        published_at: Option<DateTime<Utc>>,
    ) -> Self {
        let id = id.into();
        let title = title.into();
        let body = body.into();
        let lead = first_paragraph(&body).to_string();
        let combined_text = sections
            .iter()
            .map(String::as_str)
            .chain([title.as_str(), lead.as_str()])
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            id,
            title,
            body,
            sections,
            published_at,
            lead,
            combined_text,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn sections(&self) -> &[String; 3] {
        &self.sections
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    /// First non-empty paragraph of the body, or an empty string.
    pub fn lead(&self) -> &str {
        &self.lead
    }

    /// Sections, title and lead joined by single spaces; the text that gets vectorized.
    pub fn combined_text(&self) -> &str {
        &self.combined_text
    }
}

fn first_paragraph(body: &str) -> &str {
    body.lines().find(|line| !line.is_empty()).unwrap_or("")
}

/// Ordered collection of articles from one source. Positions are the join key
/// between vectorizer rows, ranking output and the records themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    articles: Vec<ArticleRecord>,
}

impl Corpus {
    pub fn new(articles: Vec<ArticleRecord>) -> Self {
        Self { articles }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&ArticleRecord> {
        self.articles.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArticleRecord> {
        self.articles.iter()
    }

    pub fn combined_texts(&self) -> impl Iterator<Item = &str> {
        self.articles.iter().map(ArticleRecord::combined_text)
    }

    /// Every article's combined text joined into one space-separated string,
    /// in corpus order. An empty corpus yields an empty string.
    pub fn profile_text(&self) -> String {
        self.combined_texts().collect::<Vec<_>>().join(" ")
    }
}

impl From<Vec<ArticleRecord>> for Corpus {
    fn from(articles: Vec<ArticleRecord>) -> Self {
        Self::new(articles)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRecommendation {
    /// Position of the article in the pool it was ranked from.
    pub position: usize,
    pub id: String,
    pub title: String,
    pub body: String,
    pub score: f64,
}

/// Whether a script is plain narration or wrapped in speech markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScriptMode {
    #[default]
    Plain,
    Markup,
}

/// Ordered narration segments, plain text or speech markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    segments: Vec<String>,
}

impl Script {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The text handed to a synthesizer: all segments joined by one space.
    pub fn join(&self) -> String {
        self.segments.join(" ")
    }
}
