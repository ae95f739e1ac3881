use async_trait::async_trait;
use smart_money_core::types::Alert;
use smart_money_core::Result;

#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &str;
    async fn send(&self, alert: &Alert) -> Result<bool>;
}

pub fn event_type_for(alert: &Alert) -> &'static str {
    use smart_money_core::types::AlertType::*;
    match alert.alert_type {
        NewAccountWhale | VolumeSpike | SmartMoneyDivergence | WhaleAnomaly | CoordinatedEntry | LateEntryConviction => {
            "insider_alert"
        }
        ConsensusSignal => "consensus_signal",
        EdgeDecay => "edge_decay_alert",
        HiddenGem | RisingStar => "hidden_gem_alert",
        WinRateAnomaly | TimingPattern | VolumeConcentration | ImpossibleSharpe | ConsecutiveWins => "general_alert",
    }
}
