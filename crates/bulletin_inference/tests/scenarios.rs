use bulletin_core::{ArticleRecord, Corpus, ScriptMode};
use bulletin_inference::prelude::*;
use bulletin_inference::script::{PAUSE, SPEAK_CLOSE, SPEAK_OPEN};

fn article(id: &str, body: &str) -> ArticleRecord {
    ArticleRecord::new(id, "", body, Default::default(), None)
}

fn pool() -> Corpus {
    Corpus::new(vec![
        article("cats", "Cats are great. They purr."),
        article("dogs", "Dogs are loyal. They bark."),
        article("stocks", "Stocks rose today. Markets are up."),
    ])
}

#[test]
fn scenario_a_cat_reader_gets_cat_article_first() {
    let history = Corpus::new(vec![article("h1", "I love cats and their purring.")]);
    let recommendations = recommend(&pool(), &history);

    let ids: Vec<&str> = recommendations.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["cats", "dogs", "stocks"]);

    let scores: Vec<f64> = recommendations.iter().map(|r| r.score).collect();
    assert!(scores[0] > scores[1]);
    assert!(scores[1] >= scores[2]);
    assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
}

#[test]
fn scenario_b_empty_history_keeps_corpus_order() {
    let recommendations = recommend(&pool(), &Corpus::default());
    let positions: Vec<usize> = recommendations.iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
    assert!(recommendations.iter().all(|r| r.score == 0.0));
}

#[test]
fn scenario_c_single_paragraph_falls_back() {
    let paragraph = "x".repeat(50);
    let pool = Corpus::new(vec![article("1", &paragraph)]);
    let recommendations = recommend(&pool, &Corpus::default());

    let script = ScriptComposer::new(ScriptMode::Plain).compose(recommendations.as_slice(), 5);
    assert_eq!(script.segments(), &[paragraph]);
}

#[test]
fn scenario_d_short_lead_only_gets_a_pause() {
    let pool = Corpus::new(vec![article("1", &format!("{}\nsecond paragraph", "y".repeat(20)))]);
    let recommendations = recommend(&pool, &Corpus::default());

    let plain = ScriptComposer::new(ScriptMode::Plain).compose(recommendations.as_slice(), 5);
    assert!(plain.is_empty());

    let markup = ScriptComposer::new(ScriptMode::Markup).compose(recommendations.as_slice(), 5);
    assert_eq!(markup.segments(), &[SPEAK_OPEN, PAUSE, SPEAK_CLOSE]);
}

#[test]
fn scenario_e_number_of_items_caps_narration() {
    let articles = (0..5)
        .map(|i| article(&i.to_string(), &format!("Story {} {}", i, "z".repeat(250))))
        .collect();
    let recommendations = recommend(&Corpus::new(articles), &Corpus::default());
    assert_eq!(recommendations.len(), 5);

    let plain = ScriptComposer::new(ScriptMode::Plain).compose(recommendations.as_slice(), 2);
    assert_eq!(plain.len(), 2);
    assert!(plain.segments()[1].starts_with("Story 1"));

    let markup = ScriptComposer::new(ScriptMode::Markup).compose(recommendations.as_slice(), 2);
    assert_eq!(markup.segments().iter().filter(|s| s.as_str() == PAUSE).count(), 2);
    assert_eq!(markup.len(), 6);
}

#[test]
fn ranking_is_repeatable() {
    let history = Corpus::new(vec![
        article("h1", "Dogs bark at night."),
        article("h2", "Markets are volatile."),
    ]);
    assert_eq!(recommend(&pool(), &history), recommend(&pool(), &history));
}
