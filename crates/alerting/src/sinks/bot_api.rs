//! Telegram-style bot-API sink: HTML-markup message with an emoji prefix,
//! optional thread routing, and a silent-delivery mode.

use crate::sink::NotificationSink;
use async_trait::async_trait;
use smart_money_core::types::{Alert, Severity};
use smart_money_core::Result;

fn emoji_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🚨",
        Severity::High => "⚠️",
        Severity::Medium => "🔶",
        Severity::Low => "ℹ️",
    }
}

pub struct BotApiSink {
    http: reqwest::Client,
    bot_token: String,
    chat_id: String,
    thread_id: Option<String>,
    silent: bool,
}

impl BotApiSink {
    pub fn new(bot_token: String, chat_id: String, thread_id: Option<String>, silent: bool) -> Self {
        Self { http: reqwest::Client::new(), bot_token, chat_id, thread_id, silent }
    }

    fn html_text(&self, alert: &Alert) -> String {
        let mut text = format!("{} <b>{}</b>\n{}", emoji_for(alert.severity), alert.title, alert.message);
        if let Some(market_id) = &alert.market_id {
            text.push_str(&format!("\n<i>Market:</i> {market_id}"));
        }
        if let Some(wallet_id) = &alert.wallet_id {
            text.push_str(&format!("\n<i>Wallet:</i> {wallet_id}"));
        }
        text
    }

    pub async fn send_formatted(&self, alert: &Alert) -> Result<bool> {
        self.send(alert).await
    }
}

#[async_trait]
impl NotificationSink for BotApiSink {
    fn name(&self) -> &str {
        "bot_api"
    }

    async fn send(&self, alert: &Alert) -> Result<bool> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let mut body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": self.html_text(alert),
            "parse_mode": "HTML",
            "disable_notification": self.silent,
        });
        if let Some(thread_id) = &self.thread_id {
            body["message_thread_id"] = serde_json::Value::from(thread_id.clone());
        }

        let response = self.http.post(&url).json(&body).send().await?;
        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use smart_money_core::types::AlertType;

    fn sample_alert() -> Alert {
        Alert {
            alert_id: "a1".to_string(),
            alert_type: AlertType::EdgeDecay,
            severity: Severity::Critical,
            title: "Decay".to_string(),
            message: "body".to_string(),
            wallet_id: Some("w1".to_string()),
            market_id: None,
            direction: None,
            volume: None,
            data: serde_json::json!({}),
            created_at: Utc::now(),
            delivered_at: None,
        }
    }

    #[test]
    fn critical_alerts_get_a_siren_prefix() {
        let sink = BotApiSink::new("token".to_string(), "chat".to_string(), None, false);
        let text = sink.html_text(&sample_alert());
        assert!(text.starts_with("🚨"));
        assert!(text.contains("<b>Decay</b>"));
    }
}
