use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{ArticleRecord, Corpus};

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "id", "title", "body", "section1", "section2", "section3", "pubdate",
];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Deserialize)]
struct ArticleRow {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    section1: String,
    #[serde(default)]
    section2: String,
    #[serde(default)]
    section3: String,
    #[serde(default)]
    pubdate: String,
}

/// Load a corpus from a CSV file with a header row.
pub fn read_articles(path: impl AsRef<Path>) -> Result<Corpus> {
    let path = path.as_ref();
    let reader = reader_builder().from_path(path)?;
    let corpus = read_corpus(reader)?;
    debug!("Loaded {} articles from {}", corpus.len(), path.display());
    Ok(corpus)
}

pub fn read_articles_from_reader<R: Read>(source: R) -> Result<Corpus> {
    read_corpus(reader_builder().from_reader(source))
}

/// Header names are trimmed so the column check and field mapping agree, and
/// short rows are accepted with their missing trailing cells left empty.
fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.trim(csv::Trim::Headers).flexible(true);
    builder
}

fn read_corpus<R: Read>(mut reader: csv::Reader<R>) -> Result<Corpus> {
    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::InvalidInput(format!("missing column '{}'", column)));
        }
    }

    let mut articles = Vec::new();
    for (index, row) in reader.deserialize::<ArticleRow>().enumerate() {
        let row = row?;
        // Header is line 1, so data rows start at 2.
        let published_at = parse_pubdate(&row.pubdate).map_err(|e| {
            Error::InvalidInput(format!("row {}: {}", index + 2, e))
        })?;
        articles.push(ArticleRecord::new(
            row.id,
            row.title,
            row.body,
            [row.section1, row.section2, row.section3],
            published_at,
        ));
    }

    Ok(Corpus::new(articles))
}

/// Parse a publication timestamp. Empty values mean "unknown".
pub fn parse_pubdate(value: &str) -> std::result::Result<Option<DateTime<Utc>>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Some(parsed.and_utc()));
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Some(midnight.and_utc()));
    }

    Err(format!("unparseable pubdate '{}'", value))
}
