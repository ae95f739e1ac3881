//! Per-wallet integrity roll-up from triggered anomaly/insider findings.

use crate::anomaly::AnomalyFinding;
use smart_money_core::types::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityStatus {
    Trusted,
    Flagged,
    Suspended,
    Blacklisted,
}

#[derive(Debug, Clone)]
pub struct IntegrityScore {
    pub score: u8,
    pub status: IntegrityStatus,
}

pub fn roll_up(findings: &[AnomalyFinding]) -> IntegrityScore {
    let deduction: u32 = findings.iter().map(|f| f.integrity_impact as u32).sum();
    let score = (100u32.saturating_sub(deduction)).min(100) as u8;

    let has_critical = findings.iter().any(|f| f.severity == Severity::Critical);
    let high_count = findings.iter().filter(|f| f.severity == Severity::High).count();

    let status = if has_critical {
        IntegrityStatus::Blacklisted
    } else if high_count >= 2 {
        IntegrityStatus::Suspended
    } else if !findings.is_empty() {
        IntegrityStatus::Flagged
    } else {
        IntegrityStatus::Trusted
    };

    IntegrityScore { score, status }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smart_money_core::types::AlertType;

    fn finding(severity: Severity, impact: u8) -> AnomalyFinding {
        AnomalyFinding {
            alert_type: AlertType::WinRateAnomaly,
            severity,
            confidence: 0.8,
            integrity_impact: impact,
            message: String::new(),
        }
    }

    #[test]
    fn clean_wallet_is_trusted_at_full_score() {
        let result = roll_up(&[]);
        assert_eq!(result.score, 100);
        assert_eq!(result.status, IntegrityStatus::Trusted);
    }

    #[test]
    fn single_alert_flags_without_suspending() {
        let result = roll_up(&[finding(Severity::Low, 5)]);
        assert_eq!(result.score, 95);
        assert_eq!(result.status, IntegrityStatus::Flagged);
    }

    #[test]
    fn two_high_severity_alerts_suspend() {
        let result = roll_up(&[finding(Severity::High, 25), finding(Severity::High, 25)]);
        assert_eq!(result.status, IntegrityStatus::Suspended);
    }

    #[test]
    fn any_critical_blacklists_regardless_of_other_findings() {
        let result = roll_up(&[finding(Severity::Low, 5), finding(Severity::Critical, 30)]);
        assert_eq!(result.status, IntegrityStatus::Blacklisted);
    }

    #[test]
    fn score_never_goes_below_zero() {
        let findings: Vec<AnomalyFinding> = (0..10).map(|_| finding(Severity::Critical, 30)).collect();
        let result = roll_up(&findings);
        assert_eq!(result.score, 0);
    }
}
