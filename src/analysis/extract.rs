//! Answer extraction heuristics
//!
//! Pulls the likely idiom out of a verbose model response. Strategies form
//! an ordered table tried in sequence; the first one whose predicate passes
//! and whose extractor yields a candidate wins, and the whole pipeline
//! degrades to the trimmed original string when nothing fires.

use regex::Regex;

/// A named extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Text inside the `{{{...}}}` final-answer delimiter from the prompt
    /// contract; the first delimited span wins.
    BraceDelimited,
    /// Last quoted or bold span after a final-answer cue keyword.
    CuedSpan,
    /// Best quoted or bold span anywhere in the response.
    QuotedSpan,
    /// Unquoted text following the last cue keyword.
    CueRemainder,
    /// No heuristic fired; the response itself is the answer.
    Identity,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::BraceDelimited => "braces",
            Strategy::CuedSpan => "cued-span",
            Strategy::QuotedSpan => "quoted-span",
            Strategy::CueRemainder => "cue-remainder",
            Strategy::Identity => "identity",
        }
    }

    /// Cheap guard checked before running the extractor.
    fn applies(self, response: &str) -> bool {
        match self {
            Strategy::BraceDelimited => response.contains("{{{"),
            Strategy::CuedSpan | Strategy::CueRemainder => last_cue_end(response).is_some(),
            Strategy::QuotedSpan => {
                response.contains('"') || response.contains("**") || response.contains('\u{201c}')
            }
            Strategy::Identity => true,
        }
    }

    /// Run the extractor; `None` hands over to the next strategy.
    fn extract(self, response: &str) -> Option<String> {
        match self {
            Strategy::BraceDelimited => brace_delimited(response),
            Strategy::CuedSpan => cued_span(response),
            Strategy::QuotedSpan => best_span(response),
            Strategy::CueRemainder => cue_remainder(response),
            Strategy::Identity => Some(response.trim().to_string()),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Heuristic rows in priority order; identity is the guaranteed floor below
/// them, so extraction never fails.
const STRATEGY_ORDER: [Strategy; 4] = [
    Strategy::BraceDelimited,
    Strategy::CuedSpan,
    Strategy::QuotedSpan,
    Strategy::CueRemainder,
];

/// Result of running the extraction table on one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    pub strategy: Strategy,
}

/// Extract the most likely intended answer from a raw model response.
///
/// Total on any input, including the empty string: when no heuristic fires
/// the trimmed original comes back under [`Strategy::Identity`].
pub fn extract_answer(response: &str) -> Extraction {
    for strategy in STRATEGY_ORDER {
        if !strategy.applies(response) {
            continue;
        }
        if let Some(text) = strategy.extract(response) {
            return Extraction { text, strategy };
        }
    }

    Extraction {
        text: response.trim().to_string(),
        strategy: Strategy::Identity,
    }
}

// ── Strategy internals ────────────────────────────────────────────────────

/// A candidate span located in the response.
#[derive(Debug, Clone)]
struct Span {
    start: usize,
    text: String,
}

/// Phrases that mark a span as describing the puzzle rather than answering
/// it.
const STOP_PHRASES: &[&str] = &[
    "the idiom is",
    "this represents",
    "looking at the image",
    "the image shows",
    "rebus puzzle",
    "this suggests",
    "the answer is",
];

fn brace_delimited(response: &str) -> Option<String> {
    let re = Regex::new(r"(?s)\{\{\{(.*?)\}\}\}").unwrap();
    let caps = re.captures(response)?;
    clean_candidate(caps.get(1)?.as_str())
}

fn cued_span(response: &str) -> Option<String> {
    let cue_end = last_cue_end(response)?;
    let spans = find_spans(response);
    let chosen = spans.iter().filter(|s| s.start >= cue_end).last()?;
    clean_candidate(&chosen.text)
}

fn best_span(response: &str) -> Option<String> {
    let spans = find_spans(response);
    let survivors: Vec<&Span> = spans.iter().filter(|s| !is_description(&s.text)).collect();

    // Idioms are short phrases, not full sentences: prefer the shortest
    // span of more than two words, falling back to the last survivor.
    let chosen = survivors
        .iter()
        .filter(|s| word_count(&s.text) > 2)
        .min_by_key(|s| word_count(&s.text))
        .copied()
        .or_else(|| survivors.last().copied())?;

    clean_candidate(&chosen.text)
}

fn cue_remainder(response: &str) -> Option<String> {
    let cue_end = last_cue_end(response)?;
    let mut rest = response[cue_end..]
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | '-'));

    // Skip filler between the cue and the answer ("the answer is likely X").
    loop {
        let word = rest.split_whitespace().next()?;
        if matches!(
            word.to_lowercase().as_str(),
            "is" | "was" | "are" | "be" | "likely" | "probably" | "simply" | "that"
        ) {
            rest = rest[word.len()..].trim_start_matches(|c: char| c.is_whitespace() || c == ':');
        } else {
            break;
        }
    }

    // Answers do not run past the end of their sentence.
    let cut = rest
        .find(|c: char| matches!(c, '.' | '!' | '?' | '\n'))
        .unwrap_or(rest.len());
    clean_candidate(&rest[..cut])
}

/// Byte offset just past the last final-answer cue keyword, if any.
fn last_cue_end(response: &str) -> Option<usize> {
    let re = Regex::new(
        r"(?i)\b(?:idiom|answer|solution|suggests?|represents?|rebus(?:\s+puzzle)?|puzzle|therefore)\b",
    )
    .unwrap();
    re.find_iter(response).last().map(|m| m.end())
}

/// Collect quoted and markdown-bold spans in source order.
fn find_spans(response: &str) -> Vec<Span> {
    let re = Regex::new(
        r#"\*\*"([^"\n]+)"\*\*|\*\*([^*\n]+)\*\*|"([^"\n]+)"|\u{201c}([^\u{201d}\n]+)\u{201d}"#,
    )
    .unwrap();

    let mut spans = Vec::new();
    for caps in re.captures_iter(response) {
        let group = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4));
        if let Some(g) = group {
            spans.push(Span {
                start: g.start(),
                text: g.as_str().to_string(),
            });
        }
    }
    spans
}

/// Spans that describe the puzzle instead of answering it: stop-phrase
/// content, a lone all-caps token quoting literal image text, or
/// sentence-length prose.
fn is_description(text: &str) -> bool {
    let lower = text.to_lowercase();
    if STOP_PHRASES.iter().any(|p| lower.contains(p)) {
        return true;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() == 1 && words[0].len() >= 2 && words[0].chars().all(|c| c.is_ascii_uppercase()) {
        return true;
    }

    words.len() > 8
}

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Tidy a raw candidate: unwrap bold markers and quotes, drop leading list
/// bullets and stray delimiters, strip trailing sentence punctuation, and
/// collapse whitespace. Empty results are `None` so the caller can move on
/// to the next strategy.
fn clean_candidate(text: &str) -> Option<String> {
    let mut s = text.trim();

    loop {
        let before = s;
        if s.len() >= 4 && s.starts_with("**") && s.ends_with("**") {
            s = s[2..s.len() - 2].trim();
        }
        for (open, close) in [('"', '"'), ('\u{201c}', '\u{201d}'), ('\'', '\'')] {
            if s.len() >= 2 && s.starts_with(open) && s.ends_with(close) {
                s = s[open.len_utf8()..s.len() - close.len_utf8()].trim();
            }
        }
        if s == before {
            break;
        }
    }

    let s = s.trim_start_matches(|c: char| {
        c.is_whitespace() || matches!(c, '*' | '-' | '\u{2022}' | ':' | '>' | '{')
    });
    let s = s.trim_end_matches(|c: char| {
        c.is_whitespace() || matches!(c, '.' | '!' | '?' | ',' | ';' | ':' | '}')
    });

    let cleaned = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
