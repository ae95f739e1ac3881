//! Discord-style rich-embed webhook sink.

use crate::sink::NotificationSink;
use async_trait::async_trait;
use smart_money_core::types::{Alert, AlertType, Severity};
use smart_money_core::Result;

fn color_for(severity: Severity) -> u32 {
    match severity {
        Severity::Critical => 0xFF0000,
        Severity::High => 0xFFA500,
        Severity::Medium => 0xFFFF00,
        Severity::Low => 0x00FF00,
    }
}

/// Category label shown above the embed title, grouped the way the signal
/// catalog presents them rather than by raw `AlertType` name.
fn category_for(alert_type: AlertType) -> &'static str {
    match alert_type {
        AlertType::ConsensusSignal => "Consensus",
        AlertType::EdgeDecay => "Edge Decay",
        AlertType::WinRateAnomaly
        | AlertType::TimingPattern
        | AlertType::VolumeConcentration
        | AlertType::ImpossibleSharpe
        | AlertType::ConsecutiveWins => "Anomaly",
        AlertType::NewAccountWhale
        | AlertType::VolumeSpike
        | AlertType::SmartMoneyDivergence
        | AlertType::WhaleAnomaly
        | AlertType::CoordinatedEntry
        | AlertType::LateEntryConviction => "Insider Signal",
        AlertType::HiddenGem | AlertType::RisingStar => "Discovery",
    }
}

pub struct ChatWebhookSink {
    http: reqwest::Client,
    webhook_url: String,
}

impl ChatWebhookSink {
    pub fn new(webhook_url: String) -> Self {
        Self { http: reqwest::Client::new(), webhook_url }
    }

    fn embed(&self, alert: &Alert) -> serde_json::Value {
        let mut fields = Vec::new();
        if let Some(market_id) = &alert.market_id {
            fields.push(serde_json::json!({ "name": "Market", "value": market_id, "inline": true }));
        }
        if let Some(direction) = &alert.direction {
            fields.push(serde_json::json!({ "name": "Direction", "value": direction, "inline": true }));
        }
        if let Some(volume) = alert.volume {
            fields.push(serde_json::json!({ "name": "Volume", "value": format!("${volume:.0}"), "inline": true }));
        }
        if let Some(wallet_id) = &alert.wallet_id {
            fields.push(serde_json::json!({ "name": "Trader", "value": wallet_id, "inline": true }));
        }

        serde_json::json!({
            "embeds": [{
                "title": alert.title,
                "description": alert.message,
                "color": color_for(alert.severity),
                "fields": fields,
                "footer": { "text": "Smart Money Engine" },
                "timestamp": alert.created_at.to_rfc3339(),
            }]
        })
    }

    /// Builds the same embed as [`Self::send`] but with fields tailored to
    /// the alert's type: a category label up front, plus whatever the
    /// detector stashed in `data` (confidence, condition id, integrity
    /// impact) that's relevant to that category.
    fn formatted_embed(&self, alert: &Alert) -> serde_json::Value {
        let mut embed = self.embed(alert);
        let fields = embed["embeds"][0]["fields"].as_array_mut().expect("embed always sets fields");

        fields.insert(0, serde_json::json!({ "name": "Category", "value": category_for(alert.alert_type), "inline": true }));

        if let Some(confidence) = alert.data.get("confidence").and_then(|v| v.as_f64()) {
            fields.push(serde_json::json!({ "name": "Confidence", "value": format!("{:.0}%", confidence * 100.0), "inline": true }));
        }
        if let Some(condition_id) = alert.data.get("condition_id").and_then(|v| v.as_str()) {
            fields.push(serde_json::json!({ "name": "Condition", "value": condition_id, "inline": true }));
        }
        if let Some(impact) = alert.data.get("integrity_impact").and_then(|v| v.as_f64()) {
            fields.push(serde_json::json!({ "name": "Integrity impact", "value": format!("-{impact:.0} pts"), "inline": true }));
        }

        embed
    }

    pub async fn send_formatted(&self, alert: &Alert) -> Result<bool> {
        let response = self.http.post(&self.webhook_url).json(&self.formatted_embed(alert)).send().await?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl NotificationSink for ChatWebhookSink {
    fn name(&self) -> &str {
        "chat_webhook"
    }

    async fn send(&self, alert: &Alert) -> Result<bool> {
        let response = self.http.post(&self.webhook_url).json(&self.embed(alert)).send().await?;
        Ok(response.status().is_success())
    }
}
