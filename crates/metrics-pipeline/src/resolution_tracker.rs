//! Polls the external market-metadata API for newly resolved markets and
//! persists them to the store.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use smart_money_core::types::MarketResolution;
use smart_money_core::Result;
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

const GAMMA_API_BASE: &str = "https://gamma-api.polymarket.com";
const PAGE_SIZE: i64 = 100;
const MAX_PAGES: u32 = 50;
const RATE_LIMIT_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Deserialize)]
struct RawMarket {
    #[serde(rename = "conditionId")]
    condition_id: String,
    slug: Option<String>,
    question: Option<String>,
    #[serde(default)]
    closed: bool,
    #[serde(rename = "outcomePrices")]
    outcome_prices: Option<serde_json::Value>,
    outcomes: Option<serde_json::Value>,
    #[serde(rename = "endDate")]
    end_date: Option<serde_json::Value>,
}

pub struct ResolutionTracker {
    http: reqwest::Client,
    pool: PgPool,
    base_url: String,
}

impl ResolutionTracker {
    pub fn new(pool: PgPool) -> Self {
        Self {
            http: reqwest::Client::new(),
            pool,
            base_url: GAMMA_API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(pool: PgPool, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            pool,
            base_url,
        }
    }

    /// Full resolution pass: find traded-but-unresolved condition ids, fetch
    /// them from the metadata API, and upsert any that have since resolved.
    pub async fn run(&self) -> Result<Vec<MarketResolution>> {
        let wanted = self.traded_condition_ids_missing_resolution().await?;
        if wanted.is_empty() {
            info!("no unresolved condition ids pending lookup");
            return Ok(vec![]);
        }

        let found = self.fetch_resolved_markets(&wanted).await?;
        if !found.is_empty() {
            self.store_resolutions(&found).await?;
        }
        info!(wanted = wanted.len(), found = found.len(), "resolution pass complete");
        Ok(found)
    }

    async fn traded_condition_ids_missing_resolution(&self) -> Result<HashSet<String>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT t.condition_id
            FROM trades t
            LEFT JOIN market_resolutions r ON r.condition_id = t.condition_id
            WHERE r.condition_id IS NULL OR r.is_resolved = false
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<String, _>("condition_id"))
            .collect())
    }

    async fn fetch_resolved_markets(&self, wanted: &HashSet<String>) -> Result<Vec<MarketResolution>> {
        let mut found = Vec::new();
        let mut remaining: HashSet<&str> = wanted.iter().map(String::as_str).collect();

        for page in 0..MAX_PAGES {
            if remaining.is_empty() {
                break;
            }

            let offset = page as i64 * PAGE_SIZE;
            let url = format!(
                "{}/markets?closed=true&limit={}&offset={}&order=closedTime&ascending=false",
                self.base_url, PAGE_SIZE, offset
            );

            let response = match self.http.get(&url).send().await {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, page, "resolution fetch page failed, skipping");
                    continue;
                }
            };

            let markets: Vec<RawMarket> = match response.json().await {
                Ok(m) => m,
                Err(e) => {
                    warn!(error = %e, page, "resolution page decode failed, skipping");
                    continue;
                }
            };

            if markets.is_empty() {
                break;
            }

            for raw in &markets {
                if remaining.remove(raw.condition_id.as_str()) {
                    if let Some(resolution) = parse_market(raw) {
                        found.push(resolution);
                    }
                }
            }

            tokio::time::sleep(RATE_LIMIT_DELAY).await;
        }

        Ok(found)
    }

    async fn store_resolutions(&self, resolutions: &[MarketResolution]) -> Result<()> {
        for r in resolutions {
            let prices_json = serde_json::to_value(&r.outcome_prices)?;
            let outcomes_json = serde_json::to_value(&r.outcomes)?;

            sqlx::query(
                r#"
                INSERT INTO market_resolutions (
                    condition_id, market_slug, title, is_resolved,
                    winning_outcome_label, winning_outcome_index,
                    outcome_prices, outcomes, end_time, resolution_time
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (condition_id) DO UPDATE SET
                    market_slug = EXCLUDED.market_slug,
                    title = EXCLUDED.title,
                    is_resolved = EXCLUDED.is_resolved,
                    winning_outcome_label = EXCLUDED.winning_outcome_label,
                    winning_outcome_index = EXCLUDED.winning_outcome_index,
                    outcome_prices = EXCLUDED.outcome_prices,
                    outcomes = EXCLUDED.outcomes,
                    end_time = EXCLUDED.end_time,
                    resolution_time = EXCLUDED.resolution_time
                "#,
            )
            .bind(&r.condition_id)
            .bind(&r.market_slug)
            .bind(&r.title)
            .bind(r.is_resolved)
            .bind(&r.winning_outcome_label)
            .bind(r.winning_outcome_index)
            .bind(prices_json)
            .bind(outcomes_json)
            .bind(r.end_time)
            .bind(r.resolution_time)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}

/// Parse a raw market payload into a resolution record. `outcomePrices` and
/// `outcomes` may arrive either as a native JSON array or as a JSON-encoded
/// string containing one — handle both.
fn parse_market(raw: &RawMarket) -> Option<MarketResolution> {
    let prices = parse_number_array(raw.outcome_prices.as_ref())?;
    let outcomes = parse_string_array(raw.outcomes.as_ref()).unwrap_or_default();
    let winning_index = MarketResolution::winning_index(&prices);

    Some(MarketResolution {
        condition_id: raw.condition_id.clone(),
        market_slug: raw.slug.clone().unwrap_or_default(),
        title: raw.question.clone().unwrap_or_default(),
        is_resolved: raw.closed && winning_index.is_some(),
        winning_outcome_label: winning_index.and_then(|i| outcomes.get(i).cloned()),
        winning_outcome_index: winning_index.map(|i| i as i32),
        outcome_prices: prices,
        outcomes,
        end_time: raw.end_date.as_ref().and_then(parse_timestamp),
        resolution_time: if raw.closed { Some(Utc::now()) } else { None },
    })
}

fn parse_number_array(value: Option<&serde_json::Value>) -> Option<Vec<f64>> {
    let value = value?;
    match value {
        serde_json::Value::Array(arr) => Some(
            arr.iter()
                .filter_map(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
                .collect(),
        ),
        serde_json::Value::String(s) => {
            let parsed: Vec<serde_json::Value> = serde_json::from_str(s).ok()?;
            Some(
                parsed
                    .iter()
                    .filter_map(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
                    .collect(),
            )
        }
        _ => None,
    }
}

fn parse_string_array(value: Option<&serde_json::Value>) -> Option<Vec<String>> {
    let value = value?;
    match value {
        serde_json::Value::Array(arr) => {
            Some(arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        }
        serde_json::Value::String(s) => {
            let parsed: Vec<String> = serde_json::from_str(s).ok()?;
            Some(parsed)
        }
        _ => None,
    }
}

fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    if let Some(s) = value.as_str() {
        return DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc));
    }
    if let Some(ms) = value.as_i64() {
        return DateTime::from_timestamp_millis(ms);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_market(prices: serde_json::Value, outcomes: serde_json::Value, closed: bool) -> RawMarket {
        RawMarket {
            condition_id: "0xabc".to_string(),
            slug: Some("will-x-happen".to_string()),
            question: Some("Will X happen?".to_string()),
            closed,
            outcome_prices: Some(prices),
            outcomes: Some(outcomes),
            end_date: None,
        }
    }

    #[test]
    fn parse_market_handles_native_array_prices() {
        let raw = raw_market(
            serde_json::json!([1.0, 0.0]),
            serde_json::json!(["Yes", "No"]),
            true,
        );
        let resolution = parse_market(&raw).unwrap();
        assert_eq!(resolution.winning_outcome_index, Some(0));
        assert_eq!(resolution.winning_outcome_label.as_deref(), Some("Yes"));
        assert!(resolution.is_resolved);
    }

    #[test]
    fn parse_market_handles_json_string_encoded_prices() {
        let raw = raw_market(
            serde_json::json!("[0.0, 1.0]"),
            serde_json::json!("[\"Yes\", \"No\"]"),
            true,
        );
        let resolution = parse_market(&raw).unwrap();
        assert_eq!(resolution.winning_outcome_index, Some(1));
        assert_eq!(resolution.winning_outcome_label.as_deref(), Some("No"));
    }

    #[test]
    fn parse_market_leaves_unresolved_markets_without_a_winner() {
        let raw = raw_market(serde_json::json!([0.5, 0.5]), serde_json::json!(["Yes", "No"]), false);
        let resolution = parse_market(&raw).unwrap();
        assert_eq!(resolution.winning_outcome_index, None);
        assert!(!resolution.is_resolved);
    }
}
