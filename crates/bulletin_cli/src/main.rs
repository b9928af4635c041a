use std::path::PathBuf;

use anyhow::Context;
use bulletin_core::{read_articles, RankedRecommendation, Settings};
use bulletin_inference::{recommend, ScriptComposer, DISPLAY_LIMIT};
use bulletin_speech::{create_synthesizer, SpeechBackend};
use clap::Parser;
use tracing::{error, info};

mod logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recommend news from your reading history and read it aloud", long_about = None)]
pub struct Cli {
    /// Synthesize with the Watson Text to Speech service instead of the local engine
    #[arg(short = 'w', long = "watson", alias = "Watson")]
    watson: bool,
    /// Settings file
    #[arg(long, default_value = "settings.toml")]
    config: PathBuf,
    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn backend(&self) -> SpeechBackend {
        if self.watson {
            SpeechBackend::Watson
        } else {
            SpeechBackend::Local
        }
    }
}

fn render_top(recommendations: &[RankedRecommendation]) -> String {
    let rule = "=====================================";
    let mut lines = vec![rule.to_string(), "Top 10 recommended articles for user".to_string()];
    for (rank, item) in recommendations.iter().enumerate() {
        lines.push(format!("{}. {}  Score : {}", rank + 1, item.title, item.score));
    }
    lines.push(rule.to_string());
    lines.join("\n")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let settings = Settings::from_file(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;
    let synthesizer = create_synthesizer(cli.backend(), &settings)?;
    info!("🎙️ Using {} speech backend", synthesizer.name());

    let history = read_articles(&settings.csvfiles.user_article_corpus_csv)
        .context("loading user history")?;
    let pool = read_articles(&settings.csvfiles.article_corpus_csv)
        .context("loading article pool")?;
    info!("📚 Loaded {} pool articles and {} history articles", pool.len(), history.len());

    let recommendations = recommend(&pool, &history);
    if let Some(best) = recommendations.best_score() {
        info!("🏆 Best match scored {:.4}", best);
    }
    println!("{}", render_top(recommendations.top(DISPLAY_LIMIT)));

    let script = ScriptComposer::new(synthesizer.script_mode())
        .compose(recommendations.as_slice(), settings.settings.number_of_items);
    info!("🧾 Script has {} segments", script.len());
    for segment in script.segments() {
        tracing::debug!("segment: {}", segment);
    }

    match synthesizer.synthesize(&script).await {
        Ok(path) => println!("\nNews bulletin created with filename {}", path.display()),
        Err(e) => error!("❌ {}", e),
    }

    Ok(())
}
