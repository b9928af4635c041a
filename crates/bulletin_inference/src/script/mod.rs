use bulletin_core::{RankedRecommendation, Script, ScriptMode};
use tracing::{debug, warn};

pub const SPEAK_OPEN: &str =
    "<speak version='1.0' xmlns='https://www.w3.org/2001/10/synthesis' xml:lang='en-US'>";
pub const SPEAK_CLOSE: &str = "</speak>";
pub const PAUSE: &str = "<break time='1s'/>";

/// Leads up to this many characters are skipped.
pub const MIN_LEAD_CHARS: usize = 30;
/// Leads shorter than this are narrated together with the next paragraph.
pub const SHORT_LEAD_CHARS: usize = 200;

/// Turns ranked articles into narration segments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptComposer {
    mode: ScriptMode,
}

impl ScriptComposer {
    pub fn new(mode: ScriptMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ScriptMode {
        self.mode
    }

    /// Build the script from the first `number_of_items` recommendations.
    ///
    /// In markup mode every processed article is followed by a pause, even
    /// when its lead was too short to narrate.
    pub fn compose(&self, recommendations: &[RankedRecommendation], number_of_items: usize) -> Script {
        let markup = self.mode == ScriptMode::Markup;
        let mut script = Script::default();

        if markup {
            script.push(SPEAK_OPEN);
        }

        for item in recommendations.iter().take(number_of_items) {
            if let Some(text) = narration(item) {
                script.push(if markup { escape_markup(&text) } else { text });
            }
            if markup {
                script.push(PAUSE);
            }
        }

        if markup {
            script.push(SPEAK_CLOSE);
        }

        debug!("Composed script with {} segments", script.len());
        script
    }
}

fn narration(item: &RankedRecommendation) -> Option<String> {
    let mut paragraphs = item.body.lines().filter(|p| !p.is_empty());
    let first = paragraphs.next()?;
    let length = first.chars().count();

    if length <= MIN_LEAD_CHARS {
        debug!("Skipping '{}': lead is only {} characters", item.title, length);
        return None;
    }

    if length > SHORT_LEAD_CHARS {
        return Some(first.to_string());
    }

    match paragraphs.next() {
        Some(second) => Some(format!("{} {}", first, second)),
        None => {
            warn!("'{}' has a single short paragraph, narrating it alone", item.title);
            Some(first.to_string())
        }
    }
}

fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
