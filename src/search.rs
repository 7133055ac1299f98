//! Ranked move lookup for the in-app search box.

use crate::document::MoveRecord;
use crate::localize::Lang;
use crate::normalize::Category;

const NAME_WEIGHT: usize = 5;
const ALT_NAME_WEIGHT: usize = 4;
const INPUT_WEIGHT: usize = 3;
const HIT_TYPE_WEIGHT: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Language of the primary name.
    pub lang: Lang,
    pub category: Option<Category>,
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> SearchOptions {
        SearchOptions {
            lang: Lang::default(),
            category: None,
            max_results: 50,
        }
    }
}

/// Up to two points for short primary names.
fn short_name_bonus(name: &str) -> usize {
    2 - (name.chars().count() / 20).min(2)
}

/// `None` if any token is missing from every field.
fn score(m: &MoveRecord, tokens: &[String], lang: Lang) -> Option<usize> {
    let name = m.name(lang).to_lowercase();
    let alt_name = m.alt_name(lang).to_lowercase();
    let input = m.input().to_lowercase();
    let hit_type = m.get("hitType").unwrap_or_default().to_lowercase();

    let mut total = 0;
    for token in tokens {
        let token = token.as_str();
        let points: usize = [
            (&name, NAME_WEIGHT),
            (&alt_name, ALT_NAME_WEIGHT),
            (&input, INPUT_WEIGHT),
            (&hit_type, HIT_TYPE_WEIGHT),
        ]
        .into_iter()
        .filter(|(field, _)| field.contains(token))
        .map(|(_, weight)| weight)
        .sum();
        if points == 0 {
            return None;
        }
        total += points;
    }
    Some(total + short_name_bonus(m.name(lang)))
}

/// Filters by category, then ranks by how well every whitespace-separated
/// token of `query` matches. Ties keep document order. An empty query lists
/// the first `max_results` moves of the category.
pub fn search<'a>(
    moves: &'a [MoveRecord],
    query: &str,
    opts: &SearchOptions,
) -> Vec<&'a MoveRecord> {
    let candidates = moves
        .iter()
        .filter(|m| opts.category.map_or(true, |c| m.category() == c));

    let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if tokens.is_empty() {
        return candidates.take(opts.max_results).collect();
    }

    let mut scored: Vec<(usize, &MoveRecord)> = candidates
        .filter_map(|m| score(m, &tokens, opts.lang).map(|s| (s, m)))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(opts.max_results)
        .map(|(_, m)| m)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        id: &str,
        category: &str,
        name_cn: &str,
        name_en: &str,
        input: &str,
        hit_type: &str,
    ) -> MoveRecord {
        [
            ("id", id),
            ("category", category),
            ("nameCN", name_cn),
            ("nameEN", name_en),
            ("input", input),
            ("hitType", hit_type),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn moves() -> Vec<MoveRecord> {
        vec![
            record("st_lp", "normal", "站轻拳", "Standing Light Punch", "5lp", "High"),
            record("cr_lp", "normals", "下轻拳", "Crouching Light Punch", "2lp", "Low"),
            record("hadoken", "special", "波动拳", "Hadoken", "236p", "High"),
            record("combo_lp", "targetcombo", "", "Light Punch Combo Starter", "5lp>5lp", "High"),
            record("shinku", "super", "真空波动拳", "Shinku Hadoken", "236236p", "High"),
        ]
    }

    fn ids(results: Vec<&MoveRecord>) -> Vec<&str> {
        results.into_iter().map(MoveRecord::id).collect()
    }

    #[test]
    fn tokens_are_anded() {
        let moves = moves();
        let opts = SearchOptions { lang: Lang::En, ..Default::default() };
        assert_eq!(ids(search(&moves, "lp combo", &opts)), vec!["combo_lp"]);
        assert!(search(&moves, "lp fireball", &opts).is_empty());
    }

    #[test]
    fn name_outranks_input() {
        let moves = vec![
            record("a", "special", "", "Shoryuken", "623p", "High"),
            record("b", "special", "", "Dp Shortcut", "623p", "High"),
            record("c", "special", "", "Very Long Dp Named Move Here", "623p", "High"),
        ];
        let opts = SearchOptions { lang: Lang::En, ..Default::default() };
        assert_eq!(ids(search(&moves, "dp", &opts)), vec!["b", "c"]);
        assert_eq!(ids(search(&moves, "623", &opts)), vec!["a", "b", "c"]);
        assert_eq!(ids(search(&moves, "p", &opts)), vec!["b", "c", "a"]);
    }

    #[test]
    fn ties_keep_document_order() {
        let moves = moves();
        let opts = SearchOptions { lang: Lang::Zh, ..Default::default() };
        assert_eq!(ids(search(&moves, "波动", &opts)), vec!["hadoken", "shinku"]);
        assert_eq!(ids(search(&moves, "HADOKEN", &opts)), vec!["hadoken", "shinku"]);
        let by_input = ids(search(&moves, "236", &opts));
        assert_eq!(by_input, vec!["hadoken", "shinku"]);
    }

    #[test]
    fn category_filter_accepts_legacy_spellings() {
        let moves = moves();
        let opts = SearchOptions {
            lang: Lang::En,
            category: Some(Category::Normal),
            ..Default::default()
        };
        assert_eq!(ids(search(&moves, "light", &opts)), vec!["st_lp", "cr_lp"]);
        assert_eq!(ids(search(&moves, "", &opts)), vec!["st_lp", "cr_lp"]);
    }

    #[test]
    fn empty_query_and_limit() {
        let moves = moves();
        let opts = SearchOptions { max_results: 2, ..Default::default() };
        assert_eq!(ids(search(&moves, "   ", &opts)), vec!["st_lp", "cr_lp"]);
        assert_eq!(ids(search(&moves, "high", &opts)).len(), 2);
    }

    #[test]
    fn hit_type_matches_count() {
        let moves = moves();
        let opts = SearchOptions { lang: Lang::En, ..Default::default() };
        assert_eq!(ids(search(&moves, "low", &opts)), vec!["cr_lp"]);
    }
}
