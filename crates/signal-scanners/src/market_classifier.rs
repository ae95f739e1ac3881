//! Regex-driven market categorization and the per-wallet category-mix
//! rollup used by the index builder's sectoral eligibility filter.

use regex::Regex;
use smart_money_core::types::{MarketCategory, MarketClassification};
use std::collections::HashMap;

struct CategoryPatterns {
    category: MarketCategory,
    patterns: Vec<Regex>,
}

fn build_patterns(category: MarketCategory, raw: &[&str]) -> CategoryPatterns {
    CategoryPatterns {
        category,
        patterns: raw.iter().map(|p| Regex::new(p).expect("static regex pattern is valid")).collect(),
    }
}

fn category_rules() -> Vec<CategoryPatterns> {
    vec![
        build_patterns(
            MarketCategory::Crypto,
            &[r"(?i)bitcoin|btc", r"(?i)ethereum|eth\b", r"(?i)\bcrypto", r"(?i)\b(sol|doge|xrp)\b"],
        ),
        build_patterns(
            MarketCategory::Politics,
            &[r"(?i)election", r"(?i)president", r"(?i)senate|congress", r"(?i)\bvote\b|\bballot\b"],
        ),
        build_patterns(
            MarketCategory::Sports,
            &[r"(?i)\bnfl\b|\bnba\b|\bmlb\b|\bnhl\b", r"(?i)championship|playoff", r"(?i)\bvs\.?\b", r"(?i)world cup"],
        ),
        build_patterns(
            MarketCategory::News,
            &[r"(?i)breaking", r"(?i)announce", r"(?i)headline"],
        ),
        build_patterns(
            MarketCategory::Entertainment,
            &[r"(?i)movie|film", r"(?i)oscar|grammy|emmy", r"(?i)celebrity"],
        ),
        build_patterns(
            MarketCategory::Economics,
            &[r"(?i)\bfed\b|federal reserve", r"(?i)inflation|\bcpi\b", r"(?i)gdp|recession", r"(?i)interest rate"],
        ),
        build_patterns(
            MarketCategory::Science,
            &[r"(?i)\bnasa\b|spacex", r"(?i)vaccine|clinical trial", r"(?i)climate"],
        ),
    ]
}

/// Classifies on market title + slug. Category is whichever rule set has the
/// most regex matches; `OTHER` when nothing matches at all.
pub fn classify_market(market_slug: &str, title: &str) -> MarketClassification {
    let haystack = format!("{title} {market_slug}");
    let rules = category_rules();

    let mut best: Option<(MarketCategory, Vec<String>)> = None;
    for rule in &rules {
        let matched: Vec<String> = rule
            .patterns
            .iter()
            .filter(|p| p.is_match(&haystack))
            .map(|p| p.as_str().to_string())
            .collect();
        if matched.is_empty() {
            continue;
        }
        if best.as_ref().map(|(_, m)| matched.len() > m.len()).unwrap_or(true) {
            best = Some((rule.category, matched));
        }
    }

    match best {
        Some((category, matched)) => MarketClassification {
            market_slug: market_slug.to_string(),
            category,
            confidence: (matched.len() as f64 * 0.25).min(1.0),
            matched_patterns: matched,
        },
        None => MarketClassification {
            market_slug: market_slug.to_string(),
            category: MarketCategory::Other,
            confidence: 0.0,
            matched_patterns: Vec::new(),
        },
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TradeVolumeByMarket<'a> {
    pub market_slug: &'a str,
    pub volume: f64,
}

/// Volume fraction per category for one wallet's trades, preferring a
/// caller-supplied classification lookup (the precomputed table) and
/// falling back to on-the-fly classification for markets it doesn't cover.
pub fn category_volume_fractions(
    trades: &[TradeVolumeByMarket],
    precomputed: &HashMap<String, MarketCategory>,
    titles: &HashMap<String, String>,
) -> HashMap<MarketCategory, f64> {
    let mut by_category: HashMap<MarketCategory, f64> = HashMap::new();
    let total: f64 = trades.iter().map(|t| t.volume).sum();
    if total <= 0.0 {
        return by_category;
    }

    for trade in trades {
        let category = precomputed.get(trade.market_slug).copied().unwrap_or_else(|| {
            let title = titles.get(trade.market_slug).map(|s| s.as_str()).unwrap_or("");
            classify_market(trade.market_slug, title).category
        });
        *by_category.entry(category).or_insert(0.0) += trade.volume / total;
    }

    by_category
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_crypto_markets() {
        let result = classify_market("will-bitcoin-hit-100k", "Will Bitcoin hit $100k by EOY?");
        assert_eq!(result.category, MarketCategory::Crypto);
        assert!(result.confidence > 0.0);
    }

    #[test]
    fn unmatched_markets_fall_back_to_other() {
        let result = classify_market("random-slug-123", "Something with no keywords at all");
        assert_eq!(result.category, MarketCategory::Other);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn confidence_caps_at_one() {
        let result = classify_market("us-presidential-election-vote-senate-congress", "Election vote ballot senate congress president");
        assert!(result.confidence <= 1.0);
    }

    #[test]
    fn precomputed_classifications_take_priority_over_on_the_fly() {
        let trades = vec![TradeVolumeByMarket { market_slug: "mystery-slug", volume: 100.0 }];
        let mut precomputed = HashMap::new();
        precomputed.insert("mystery-slug".to_string(), MarketCategory::Sports);
        let fractions = category_volume_fractions(&trades, &precomputed, &HashMap::new());
        assert_eq!(fractions.get(&MarketCategory::Sports), Some(&1.0));
    }
}
