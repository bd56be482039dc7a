//! Edit-distance matching shared by every lexicon store.

use crate::entry::LexiconEntry;

/// Largest Levenshtein distance still accepted as a match.
pub const MAX_EDIT_DISTANCE: usize = 1;

/// Pick the entry whose lowercased name is closest to `word`.
///
/// Entries must be supplied in ascending id order: the first entry at the
/// smallest distance wins ties. Only distances `<= MAX_EDIT_DISTANCE` match.
pub fn best_match<'a, I>(word: &str, entries: I) -> Option<&'a LexiconEntry>
where
    I: IntoIterator<Item = &'a LexiconEntry>,
{
    let word = word.to_lowercase();
    let mut best: Option<(usize, &LexiconEntry)> = None;

    for entry in entries {
        let distance = strsim::levenshtein(&word, &entry.name.to_lowercase());
        if distance > MAX_EDIT_DISTANCE {
            continue;
        }
        if best.is_none_or(|(current, _)| distance < current) {
            best = Some((distance, entry));
            if distance == 0 {
                break;
            }
        }
    }

    best.map(|(_, entry)| entry)
}

/// Inclusive bounds on the lowercased char length of any name that can match
/// `word`.
///
/// Edit distance is at least the length gap, so stores can shortlist
/// candidates by length before calling [`best_match`].
pub fn length_window(word: &str) -> (usize, usize) {
    let len = word.to_lowercase().chars().count();
    (len.saturating_sub(MAX_EDIT_DISTANCE), len + MAX_EDIT_DISTANCE)
}

/// Whether two names collide under the case-insensitive uniqueness rule.
pub fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn entry(id: i64, name: &str) -> LexiconEntry {
        let now = Utc::now();
        LexiconEntry {
            id,
            name: name.into(),
            definition: format!("definition of {name}"),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        let entries = vec![entry(1, "Kubernetes")];
        assert_eq!(best_match("KUBERNETES", &entries).map(|e| e.id), Some(1));
    }

    #[test]
    fn single_typo_matches() {
        let entries = vec![entry(1, "baobab")];
        assert_eq!(best_match("baoba", &entries).map(|e| e.id), Some(1));
        assert_eq!(best_match("baobabs", &entries).map(|e| e.id), Some(1));
        assert_eq!(best_match("boabab", &entries).map(|e| e.id), None);
    }

    #[test]
    fn two_edits_do_not_match() {
        let entries = vec![entry(1, "address")];
        assert!(best_match("adres", &entries).is_none());
    }

    #[test]
    fn closest_entry_wins() {
        let entries = vec![entry(1, "cat"), entry(2, "cap")];
        assert_eq!(best_match("cap", &entries).map(|e| e.id), Some(2));
    }

    #[test]
    fn ties_go_to_the_lowest_id() {
        let entries = vec![entry(1, "bat"), entry(2, "cat")];
        assert_eq!(best_match("hat", &entries).map(|e| e.id), Some(1));
    }

    #[test]
    fn length_window_spans_one_edit_either_way() {
        assert_eq!(length_window("baoba"), (4, 6));
        assert_eq!(length_window(""), (0, 1));
        // 'İ' lowercases to two chars, so the window follows the folded form.
        assert_eq!(length_window("İ"), (1, 3));
    }

    #[test]
    fn empty_lexicon_matches_nothing() {
        let entries: Vec<LexiconEntry> = Vec::new();
        assert!(best_match("anything", &entries).is_none());
    }
}
