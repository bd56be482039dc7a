//! Rule-based in-process tagger.
//!
//! [`HeuristicTagger`] needs no model download and no network. It looks for
//! capitalised token runs, product-like tokens (`iPhone`, `GPT-4`, `WPA2`),
//! suffix cues (`Inc`, `Airport`, `Conference`), honorifics (`Dr.`), quoted
//! titles and an optional gazetteer of known terms. It is good enough for
//! development and for deployments whose jargon lives mostly in the gazetteer.

use async_trait::async_trait;

use crate::error::Result;
use crate::tagger::{EntityTagger, TaggedSpan};

const HONORIFICS: &[&str] = &["Mr", "Mrs", "Ms", "Dr", "Prof", "Sir", "Madam", "Mx"];

const ORG_SUFFIXES: &[&str] = &[
    "Inc", "Corp", "Corporation", "Ltd", "LLC", "GmbH", "Foundation", "University", "Institute",
    "Company", "Co", "Group", "Labs", "Agency", "Association", "Bank", "Society", "Council",
];

const FACILITY_SUFFIXES: &[&str] = &[
    "Airport", "Bridge", "Station", "Stadium", "Tower", "Hospital", "Museum", "Library",
    "Center", "Centre", "Building", "Hall", "Arena", "Highway", "Port",
];

const EVENT_SUFFIXES: &[&str] = &[
    "Conference", "Summit", "War", "Olympics", "Festival", "Championship", "Cup", "Expo",
    "Games", "Revolution", "Hackathon", "Marathon",
];

/// Capitalised words that open sentences without naming anything.
const SENTENCE_OPENERS: &[&str] = &[
    "The", "A", "An", "This", "That", "These", "Those", "It", "Its", "We", "I", "You", "He",
    "She", "They", "Our", "My", "Your", "Their", "His", "Her", "In", "On", "At", "For", "From",
    "By", "With", "As", "If", "When", "While", "But", "And", "Or", "So", "Just", "Hey", "Hi",
    "Dear", "Please", "Let", "There", "Here", "What", "Which", "Who", "How", "Why", "Where",
    "Subject", "After", "Before", "Once", "Until", "Today", "Yesterday", "Tomorrow", "Stay",
    "Recommend", "Some", "All",
];

/// Lowercase words allowed inside a name (`Bank of America`).
const CONNECTORS: &[&str] = &["of", "&", "de", "von", "van", "for"];

#[derive(Debug, Clone)]
struct Token {
    text: String,
    start: usize,
    stop: usize,
    sentence_start: bool,
    opens_phrase: bool,
    closes_phrase: bool,
}

impl Token {
    fn is_title(&self) -> bool {
        self.text.chars().next().is_some_and(char::is_uppercase)
    }

    fn is_acronym(&self) -> bool {
        let letters: Vec<char> = self.text.chars().filter(|c| c.is_alphabetic()).collect();
        letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase())
    }

    /// Tokens mixing digits and letters or with inner capitals (`iPhone`, `GPT-4`).
    fn is_product_like(&self) -> bool {
        let has_alpha = self.text.chars().any(char::is_alphabetic);
        let has_digit = self.text.chars().any(|c| c.is_ascii_digit());
        if has_alpha && has_digit {
            return true;
        }
        let chars: Vec<char> = self.text.chars().collect();
        chars.windows(2).any(|w| w[0].is_lowercase() && w[1].is_uppercase())
    }

    fn is_name_like(&self) -> bool {
        self.is_title() || self.is_product_like()
    }

    fn is_honorific(&self) -> bool {
        HONORIFICS.contains(&self.text.as_str())
    }

    fn normalized(&self) -> String {
        strip_possessive(&self.text).to_lowercase()
    }
}

fn strip_possessive(text: &str) -> &str {
    text.strip_suffix("'s").or_else(|| text.strip_suffix("\u{2019}s")).unwrap_or(text)
}

fn is_word_tail(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}

fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\u{201c}' | '\u{201d}')
}

fn tokenize(chars: &[char]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut sentence_start = true;
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        let raw_start = i;
        while i < chars.len() && !chars[i].is_whitespace() {
            i += 1;
        }
        let raw_stop = i;

        let mut start = raw_start;
        let mut stop = raw_stop;
        while start < stop && !chars[start].is_alphanumeric() {
            start += 1;
        }
        while stop > start && !is_word_tail(chars[stop - 1]) {
            stop -= 1;
        }

        let trailing = &chars[stop..raw_stop];
        let ends_sentence = trailing.iter().any(|c| matches!(c, '.' | '!' | '?'));

        if start == stop {
            sentence_start |= ends_sentence;
            continue;
        }

        let text: String = chars[start..stop].iter().collect();
        let abbreviation = HONORIFICS.contains(&text.as_str());
        tokens.push(Token {
            text,
            start,
            stop,
            sentence_start,
            opens_phrase: start > raw_start,
            closes_phrase: !trailing.is_empty() && !abbreviation,
        });
        sentence_start = ends_sentence && !abbreviation;
    }

    tokens
}

/// A rule-based [`EntityTagger`] with an optional gazetteer.
///
/// Offsets are character offsets into the tagged text.
///
/// # Example
///
/// ```rust,ignore
/// use jargone_ner::HeuristicTagger;
///
/// let tagger = HeuristicTagger::new().with_terms([("baobab", "PRODUCT")]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeuristicTagger {
    /// Gazetteer terms split into lowercase words, longest first.
    terms: Vec<(Vec<String>, String)>,
}

impl HeuristicTagger {
    /// Create a tagger with an empty gazetteer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add gazetteer terms matched case-insensitively anywhere in the text.
    pub fn with_terms<I, T, L>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = (T, L)>,
        T: AsRef<str>,
        L: Into<String>,
    {
        for (term, label) in terms {
            let words: Vec<String> =
                term.as_ref().split_whitespace().map(str::to_lowercase).collect();
            if !words.is_empty() {
                self.terms.push((words, label.into()));
            }
        }
        self.terms.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        self
    }

    /// Number of gazetteer terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    fn tag_sync(&self, text: &str) -> Vec<TaggedSpan> {
        let chars: Vec<char> = text.chars().collect();
        let tokens = tokenize(&chars);
        let mut covered = vec![false; tokens.len()];
        let mut spans = Vec::new();

        self.tag_quoted(&chars, &tokens, &mut covered, &mut spans);
        self.tag_gazetteer(&chars, &tokens, &mut covered, &mut spans);
        tag_name_runs(&chars, &tokens, &mut covered, &mut spans);

        spans.sort_by_key(|s| s.start);
        spans
    }

    fn tag_quoted(
        &self,
        chars: &[char],
        tokens: &[Token],
        covered: &mut [bool],
        spans: &mut Vec<TaggedSpan>,
    ) {
        let mut i = 0;
        while i < chars.len() {
            if !is_quote(chars[i]) {
                i += 1;
                continue;
            }
            let open = i;
            let Some(offset) = chars[open + 1..].iter().position(|c| is_quote(*c)) else {
                break;
            };
            let close = open + 1 + offset;
            i = close + 1;

            let inner: Vec<usize> = tokens
                .iter()
                .enumerate()
                .filter(|(_, t)| t.start > open && t.stop <= close)
                .map(|(idx, _)| idx)
                .collect();
            let (Some(&first), Some(&last)) = (inner.first(), inner.last()) else {
                continue;
            };
            if inner.len() > 8 || !tokens[first].is_title() {
                continue;
            }
            let surface: String = chars[tokens[first].start..tokens[last].stop].iter().collect();
            spans.push(TaggedSpan {
                lemma: Some(surface.clone()),
                text: surface,
                label: "WORK_OF_ART".into(),
                start: tokens[first].start,
                stop: tokens[last].stop,
            });
            for idx in inner {
                covered[idx] = true;
            }
        }
    }

    fn tag_gazetteer(
        &self,
        chars: &[char],
        tokens: &[Token],
        covered: &mut [bool],
        spans: &mut Vec<TaggedSpan>,
    ) {
        if self.terms.is_empty() {
            return;
        }
        let normalized: Vec<String> = tokens.iter().map(Token::normalized).collect();

        let mut i = 0;
        while i < tokens.len() {
            let matched = self.terms.iter().find(|(words, _)| {
                let end = i + words.len();
                end <= tokens.len()
                    && !covered[i..end].iter().any(|c| *c)
                    && !tokens[i..end - 1].iter().any(|t| t.closes_phrase)
                    && normalized[i..end] == words[..]
            });
            let Some((words, label)) = matched else {
                i += 1;
                continue;
            };
            let end = i + words.len();
            let first = &tokens[i];
            let last = &tokens[end - 1];
            let surface: String = chars[first.start..last.stop].iter().collect();
            spans.push(TaggedSpan {
                lemma: Some(strip_possessive(&surface).to_string()),
                text: surface,
                label: label.clone(),
                start: first.start,
                stop: last.stop,
            });
            covered[i..end].iter_mut().for_each(|c| *c = true);
            i = end;
        }
    }
}

fn tag_name_runs(
    chars: &[char],
    tokens: &[Token],
    covered: &mut [bool],
    spans: &mut Vec<TaggedSpan>,
) {
    let mut i = 0;
    while i < tokens.len() {
        if covered[i] || !(tokens[i].is_name_like() || tokens[i].is_acronym()) {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < tokens.len() && !covered[j] && !tokens[j - 1].closes_phrase {
            let token = &tokens[j];
            if token.opens_phrase {
                break;
            }
            if token.is_name_like() {
                j += 1;
            } else if CONNECTORS.contains(&token.text.as_str())
                && !token.closes_phrase
                && tokens.get(j + 1).is_some_and(|next| next.is_title() && !covered[j + 1])
            {
                j += 2;
            } else {
                break;
            }
        }

        let mut run = &tokens[i..j];
        let mut person = false;
        loop {
            match run.first() {
                Some(first) if first.is_honorific() => {
                    person = true;
                    run = &run[1..];
                }
                Some(first)
                    if first.sentence_start
                        && SENTENCE_OPENERS.contains(&first.text.as_str()) =>
                {
                    run = &run[1..];
                }
                _ => break,
            }
        }
        while run.last().is_some_and(|t| CONNECTORS.contains(&t.text.as_str())) {
            run = &run[..run.len() - 1];
        }

        let keep = match run {
            [] => false,
            [only] if only.sentence_start && !person => {
                only.is_product_like() || only.is_acronym()
            }
            _ => true,
        };

        if keep {
            let first = &run[0];
            let last = &run[run.len() - 1];
            let surface: String = chars[first.start..last.stop].iter().collect();
            spans.push(TaggedSpan {
                lemma: Some(strip_possessive(&surface).to_string()),
                text: surface,
                label: classify(run, person).into(),
                start: first.start,
                stop: last.stop,
            });
        }
        covered[i..j].iter_mut().for_each(|c| *c = true);
        i = j;
    }
}

fn classify(run: &[Token], person: bool) -> &'static str {
    let last = strip_possessive(&run[run.len() - 1].text);
    if person {
        "PERSON"
    } else if ORG_SUFFIXES.contains(&last) {
        "ORG"
    } else if FACILITY_SUFFIXES.contains(&last) {
        "FAC"
    } else if EVENT_SUFFIXES.contains(&last) {
        "EVENT"
    } else if run.iter().any(Token::is_product_like) {
        "PRODUCT"
    } else if run.len() == 1 {
        "ORG"
    } else if run.len() <= 3 && run.iter().all(|t| t.is_title() && !t.is_acronym()) {
        "PERSON"
    } else {
        "ORG"
    }
}

#[async_trait]
impl EntityTagger for HeuristicTagger {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn tag(&self, text: &str) -> Result<Vec<TaggedSpan>> {
        Ok(self.tag_sync(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(text: &str) -> Vec<(String, String)> {
        HeuristicTagger::new().tag_sync(text).into_iter().map(|s| (s.text, s.label)).collect()
    }

    #[test]
    fn tags_people_and_organisations() {
        let spans = labels("Yesterday Albert Einstein visited Microsoft Corporation in person.");
        assert!(spans.contains(&("Albert Einstein".into(), "PERSON".into())));
        assert!(spans.contains(&("Microsoft Corporation".into(), "ORG".into())));
    }

    #[test]
    fn tags_products_by_shape() {
        let spans = labels("We switched to the new iPhone and tuned WPA2 settings.");
        assert!(spans.contains(&("iPhone".into(), "PRODUCT".into())));
        assert!(spans.contains(&("WPA2".into(), "PRODUCT".into())));
    }

    #[test]
    fn honorific_marks_a_person() {
        let spans = labels("The lab is run by Dr. Rivera today.");
        assert_eq!(spans, vec![("Rivera".to_string(), "PERSON".to_string())]);
    }

    #[test]
    fn skips_plain_sentence_openers() {
        assert!(labels("The tree grows slowly. It needs water.").is_empty());
    }

    #[test]
    fn tags_events_and_facilities() {
        let spans = labels("They met at Heathrow Airport before the Paris Olympics began.");
        assert!(spans.contains(&("Heathrow Airport".into(), "FAC".into())));
        assert!(spans.contains(&("Paris Olympics".into(), "EVENT".into())));
    }

    #[test]
    fn quoted_titles_are_works_of_art() {
        let spans = labels("she loved \"The Old Man and the Sea\" as a child");
        assert_eq!(spans, vec![("The Old Man and the Sea".to_string(), "WORK_OF_ART".to_string())]);
    }

    #[test]
    fn gazetteer_terms_match_case_insensitively() {
        let tagger = HeuristicTagger::new().with_terms([("vector database", "PRODUCT")]);
        let spans = tagger.tag_sync("we store vectors in a Vector Database now");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Vector Database");
        assert_eq!(spans[0].label, "PRODUCT");
    }

    #[test]
    fn offsets_are_character_based() {
        let text = "café owner met Zoë Kravitz.";
        let spans = HeuristicTagger::new().tag_sync(text);
        assert_eq!(spans.len(), 1);
        let span = &spans[0];
        let extracted: String = text.chars().skip(span.start).take(span.stop - span.start).collect();
        assert_eq!(extracted, "Zoë Kravitz");
        assert_eq!(span.start, 15);
    }

    #[test]
    fn possessive_is_stripped_from_lemma() {
        let spans = HeuristicTagger::new().tag_sync("we read about Google's search.");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Google's");
        assert_eq!(spans[0].lemma.as_deref(), Some("Google"));
    }

    #[test]
    fn empty_text_has_no_spans() {
        assert!(HeuristicTagger::new().tag_sync("").is_empty());
    }
}
