//! Weighted fuzzy search over launcher entries.
//!
//! Each lowercased field is scored with the skim algorithm, normalized against the query's score
//! on itself, and with normalized Damerau-Levenshtein similarity so transposed or mistyped letters
//! still match. The better of the two is the field's quality in `0.0..=1.0`; its distance is
//! `1 - quality`. Fields whose distance exceeds the threshold contribute nothing, and an entry
//! matches when any field does.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::launcher::AppEntry;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Maximum accepted distance per field.
    pub threshold: f64,
    pub name_weight: f64,
    pub description_weight: f64,
    pub category_weight: f64,
    /// Cap applied to filtered (non-empty query) results.
    pub result_limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.4,
            name_weight: 2.0,
            description_weight: 1.0,
            category_weight: 0.5,
            result_limit: 50,
        }
    }
}

struct FieldScorer {
    matcher: SkimMatcherV2,
    pattern: String,
    self_score: f64,
}

impl FieldScorer {
    fn new(query: &str) -> Option<Self> {
        let pattern = query.trim().to_lowercase();
        if pattern.is_empty() {
            return None;
        }
        let matcher = SkimMatcherV2::default().ignore_case();
        let self_score = matcher.fuzzy_match(&pattern, &pattern)? as f64;
        (self_score > 0.0).then_some(Self {
            matcher,
            pattern,
            self_score,
        })
    }

    fn quality(&self, text: &str) -> f64 {
        let text = text.to_lowercase();
        let subsequence = self
            .matcher
            .fuzzy_match(&text, &self.pattern)
            .map(|score| (score as f64 / self.self_score).clamp(0.0, 1.0))
            .unwrap_or(0.0);
        let edit = strsim::normalized_damerau_levenshtein(&text, &self.pattern);
        subsequence.max(edit)
    }
}

/// Ranks `entries` against a non-empty query and returns `(index, relevance)` pairs, best first.
///
/// Ties keep list order. Blank queries yield no ranking; see [`filter_apps`].
pub fn rank_entries(
    entries: &[AppEntry],
    query: &str,
    options: &SearchOptions,
) -> Vec<(usize, f64)> {
    let Some(scorer) = FieldScorer::new(query) else {
        return Vec::new();
    };
    let hit = |quality: f64| 1.0 - quality <= options.threshold;
    let weighted = |quality: f64, weight: f64| if hit(quality) { quality * weight } else { 0.0 };

    let mut ranked: Vec<(usize, f64, bool)> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let name = scorer.quality(&entry.name);
            let description = scorer.quality(&entry.description);
            let category = entry
                .categories
                .iter()
                .map(|c| scorer.quality(c))
                .fold(0.0, f64::max);
            let matched = hit(name) || hit(description) || hit(category);
            let relevance = weighted(name, options.name_weight)
                + weighted(description, options.description_weight)
                + weighted(category, options.category_weight);
            (index, relevance, matched)
        })
        .filter(|(_, _, matched)| *matched)
        .collect();

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .map(|(index, relevance, _)| (index, relevance))
        .collect()
}

/// Filters and orders a launcher tab's entries for display.
///
/// A blank query keeps every entry whose name contains it (all of them) without a cap. Otherwise
/// the fuzzy ranking is truncated to `result_limit`. In both cases entries whose name matches an
/// open window title (`running_titles`, lowercased) are then stably moved to the front.
pub fn filter_apps(
    entries: &[AppEntry],
    query: &str,
    running_titles: &[String],
    options: &SearchOptions,
) -> Vec<AppEntry> {
    let trimmed = query.trim();
    let mut results: Vec<AppEntry> = if trimmed.is_empty() {
        let needle = trimmed.to_lowercase();
        entries
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    } else {
        rank_entries(entries, trimmed, options)
            .into_iter()
            .take(options.result_limit)
            .map(|(index, _)| entries[index].clone())
            .collect()
    };

    results.sort_by_key(|entry| !is_running(entry, running_titles));
    results
}

pub fn is_running(entry: &AppEntry, running_titles: &[String]) -> bool {
    let name = entry.name.to_lowercase();
    running_titles.iter().any(|title| *title == name)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(name: &str, description: &str, categories: &[&str]) -> AppEntry {
        AppEntry::new(name, description, categories.iter().map(|c| c.to_string()).collect())
    }

    fn catalog() -> Vec<AppEntry> {
        vec![
            entry("Calculator", "Basic arithmetic", &["utility"]),
            entry("Firefox", "Web browser", &["network", "web"]),
            entry("Terminal", "Command line shell", &["system"]),
            entry("Firewall", "Packet rules", &["network", "security"]),
            entry("Notes", "Plain text notebook", &["office"]),
        ]
    }

    fn names(entries: &[AppEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn fire_ranks_firefox_above_unrelated_apps() {
        let mut apps = catalog();
        apps.push(entry("Logs", "Firewall event history", &["system"]));
        let results = filter_apps(&apps, "fire", &[], &SearchOptions::default());
        assert_eq!(names(&results), vec!["Firefox", "Firewall", "Logs"]);
    }

    #[test]
    fn name_case_does_not_change_relevance() {
        let apps = vec![
            entry("Firefox", "Web browser", &[]),
            entry("firefox", "Web browser", &[]),
        ];
        let ranked = rank_entries(&apps, "FireFox", &SearchOptions::default());
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].1, ranked[1].1);
        assert_eq!(ranked[0].1, 2.0);
    }

    #[test]
    fn transposed_letters_still_find_the_app() {
        let results = filter_apps(&catalog(), "fierfox", &[], &SearchOptions::default());
        assert_eq!(names(&results), vec!["Firefox"]);
    }

    #[test]
    fn distant_typos_stay_below_the_threshold() {
        let results = filter_apps(&catalog(), "xylophone", &[], &SearchOptions::default());
        assert!(results.is_empty());
    }

    #[test]
    fn exact_name_match_scores_full_name_weight() {
        let ranked = rank_entries(&catalog(), "notes", &SearchOptions::default());
        let notes = ranked
            .iter()
            .find(|(index, _)| *index == 4)
            .map(|(_, relevance)| *relevance);
        assert!(notes.is_some_and(|r| r >= 2.0));
    }

    #[test]
    fn search_is_idempotent() {
        let apps = catalog();
        let options = SearchOptions::default();
        let first = filter_apps(&apps, "net", &[], &options);
        let second = filter_apps(&apps, "net", &[], &options);
        assert_eq!(first, second);
    }

    #[test]
    fn blank_query_returns_the_whole_list_uncapped() {
        let apps: Vec<AppEntry> = (0..120)
            .map(|i| entry(&format!("App {i}"), "", &[]))
            .collect();
        let results = filter_apps(&apps, "   ", &[], &SearchOptions::default());
        assert_eq!(results.len(), 120);
    }

    #[test]
    fn filtered_results_never_exceed_the_limit() {
        let apps: Vec<AppEntry> = (0..500)
            .map(|i| entry(&format!("App {i}"), "generated", &["bulk"]))
            .collect();
        let results = filter_apps(&apps, "a", &[], &SearchOptions::default());
        assert!(!results.is_empty());
        assert!(results.len() <= 50);
    }

    #[test]
    fn running_apps_move_first_without_reordering_the_rest() {
        let running = vec!["notes".to_string()];
        let results = filter_apps(&catalog(), "", &running, &SearchOptions::default());
        assert_eq!(
            names(&results),
            vec!["Notes", "Calculator", "Firefox", "Terminal", "Firewall"]
        );
    }

    #[test]
    fn category_only_matches_are_found() {
        let results = filter_apps(&catalog(), "security", &[], &SearchOptions::default());
        assert_eq!(names(&results), vec!["Firewall"]);
    }
}
