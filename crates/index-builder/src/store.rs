//! Loading wallet candidates and persisting built indices.

use crate::eligibility::WalletCandidate;
use smart_money_core::types::{MarketCategory, StrategyType};
use smart_money_core::Result;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tracing::info;

fn strategy_type_from_str(s: &str) -> StrategyType {
    match s {
        "arbitrageur" => StrategyType::Arbitrageur,
        "market_maker" => StrategyType::MarketMaker,
        "directional_momentum" => StrategyType::DirectionalMomentum,
        "scalper" => StrategyType::Scalper,
        "hybrid" => StrategyType::Hybrid,
        _ => StrategyType::Unknown,
    }
}

fn category_from_str(s: &str) -> Option<MarketCategory> {
    match s {
        "crypto" => Some(MarketCategory::Crypto),
        "politics" => Some(MarketCategory::Politics),
        "sports" => Some(MarketCategory::Sports),
        "news" => Some(MarketCategory::News),
        "entertainment" => Some(MarketCategory::Entertainment),
        "economics" => Some(MarketCategory::Economics),
        "science" => Some(MarketCategory::Science),
        _ => None,
    }
}

pub async fn load_candidates(pool: &PgPool) -> Result<Vec<WalletCandidate>> {
    let rows = sqlx::query(
        r#"
        SELECT
            s.wallet_id, s.total_score, s.strategy_type,
            COALESCE(sh.sharpe_capped, 0) AS sharpe,
            COALESCE(p.total_volume, 0) AS volume,
            COALESCE(p.days_active, 0) AS days_active,
            COALESCE(p.total_trades, 0) AS trades
        FROM smart_money_scores s
        LEFT JOIN trader_sharpe sh ON sh.wallet_id = s.wallet_id
        LEFT JOIN trader_profiles p ON p.wallet_id = s.wallet_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut candidates = Vec::with_capacity(rows.len());
    for row in rows {
        let wallet_id: String = row.try_get("wallet_id")?;
        let category_rows = sqlx::query(
            "SELECT category, volume_fraction FROM wallet_category_mix WHERE wallet_id = $1",
        )
        .bind(&wallet_id)
        .fetch_all(pool)
        .await?;

        let mut category_volume_fractions = HashMap::new();
        for category_row in category_rows {
            let category_str: String = category_row.try_get("category")?;
            if let Some(category) = category_from_str(&category_str) {
                category_volume_fractions.insert(category, category_row.try_get::<f64, _>("volume_fraction")?);
            }
        }

        let strategy_str: String = row.try_get("strategy_type")?;
        candidates.push(WalletCandidate {
            wallet_id,
            total_score: row.try_get("total_score")?,
            sharpe: row.try_get("sharpe")?,
            volume: row.try_get("volume")?,
            days_active: row.try_get("days_active")?,
            trades: row.try_get("trades")?,
            strategy_type: strategy_type_from_str(&strategy_str),
            category_volume_fractions,
        });
    }

    info!(candidate_count = candidates.len(), "loaded index candidates");
    Ok(candidates)
}

pub async fn load_previous_index(pool: &PgPool, index_id: &str) -> Result<Option<smart_money_core::types::Index>> {
    let index_row = sqlx::query(
        "SELECT created_at, last_rebalanced, cumulative_return FROM indices WHERE index_id = $1",
    )
    .bind(index_id)
    .fetch_optional(pool)
    .await?;

    let Some(index_row) = index_row else {
        return Ok(None);
    };

    let constituent_rows = sqlx::query(
        "SELECT wallet_id, weight, score_at_inclusion, sharpe_at_inclusion, strategy_type, added_at \
         FROM index_constituents WHERE index_id = $1",
    )
    .bind(index_id)
    .fetch_all(pool)
    .await?;

    let mut constituents = Vec::with_capacity(constituent_rows.len());
    for row in constituent_rows {
        let strategy_str: String = row.try_get("strategy_type")?;
        constituents.push(smart_money_core::types::IndexConstituent {
            wallet_id: row.try_get("wallet_id")?,
            weight: row.try_get("weight")?,
            score_at_inclusion: row.try_get("score_at_inclusion")?,
            sharpe_at_inclusion: row.try_get("sharpe_at_inclusion")?,
            strategy_type: strategy_type_from_str(&strategy_str),
            added_at: row.try_get("added_at")?,
        });
    }

    Ok(Some(smart_money_core::types::Index {
        index_id: index_id.to_string(),
        constituents,
        created_at: index_row.try_get("created_at")?,
        last_rebalanced: index_row.try_get("last_rebalanced")?,
        cumulative_return: index_row.try_get("cumulative_return")?,
    }))
}

pub async fn store_index(pool: &PgPool, index: &smart_money_core::types::Index) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO indices (index_id, created_at, last_rebalanced, cumulative_return)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (index_id) DO UPDATE SET
            last_rebalanced = EXCLUDED.last_rebalanced,
            cumulative_return = EXCLUDED.cumulative_return
        "#,
    )
    .bind(&index.index_id)
    .bind(index.created_at)
    .bind(index.last_rebalanced)
    .bind(index.cumulative_return)
    .execute(pool)
    .await?;

    sqlx::query("DELETE FROM index_constituents WHERE index_id = $1")
        .bind(&index.index_id)
        .execute(pool)
        .await?;

    for constituent in &index.constituents {
        sqlx::query(
            r#"
            INSERT INTO index_constituents
                (index_id, wallet_id, weight, score_at_inclusion, sharpe_at_inclusion, strategy_type, added_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&index.index_id)
        .bind(&constituent.wallet_id)
        .bind(constituent.weight)
        .bind(constituent.score_at_inclusion)
        .bind(constituent.sharpe_at_inclusion)
        .bind(format!("{:?}", constituent.strategy_type))
        .bind(constituent.added_at)
        .execute(pool)
        .await?;
    }

    info!(index_id = %index.index_id, constituent_count = index.constituents.len(), "persisted index");
    Ok(())
}
