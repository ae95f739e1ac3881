//! Smart-money consensus: do enough high-scoring wallets agree on a
//! market's direction to be worth surfacing?

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusStrength {
    None,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl ConsensusStrength {
    pub fn from_agreement_pct(pct: f64) -> Self {
        if pct >= 0.85 {
            ConsensusStrength::VeryStrong
        } else if pct >= 0.75 {
            ConsensusStrength::Strong
        } else if pct >= 0.65 {
            ConsensusStrength::Moderate
        } else if pct >= 0.55 {
            ConsensusStrength::Weak
        } else {
            ConsensusStrength::None
        }
    }
}

pub const MIN_TRADERS: usize = 3;
pub const MIN_VOLUME: f64 = 5_000.0;
pub const MIN_TOTAL_SCORE: f64 = 60.0;

#[derive(Debug, Clone, Copy)]
pub struct WalletVote {
    pub direction: Option<Direction>,
    pub volume: f64,
    pub total_score: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ConsensusSignal {
    pub direction: Direction,
    pub agreement_pct: f64,
    pub strength: ConsensusStrength,
    pub confidence: f64,
    pub participant_count: usize,
}

/// `votes` should already be restricted to wallets meeting `MIN_TOTAL_SCORE`;
/// this function only handles direction aggregation, strength, and confidence.
pub fn evaluate_market(votes: &[WalletVote]) -> Option<ConsensusSignal> {
    let directional: Vec<&WalletVote> = votes.iter().filter(|v| v.direction.is_some()).collect();
    if directional.len() < MIN_TRADERS {
        return None;
    }

    let total_volume: f64 = directional.iter().map(|v| v.volume).sum();
    if total_volume < MIN_VOLUME {
        return None;
    }

    let yes: Vec<&&WalletVote> = directional.iter().filter(|v| v.direction == Some(Direction::Yes)).collect();
    let no: Vec<&&WalletVote> = directional.iter().filter(|v| v.direction == Some(Direction::No)).collect();

    let (majority, majority_direction) = if yes.len() >= no.len() {
        (&yes, Direction::Yes)
    } else {
        (&no, Direction::No)
    };

    let agreement_pct = majority.len() as f64 / directional.len() as f64;
    let strength = ConsensusStrength::from_agreement_pct(agreement_pct);
    if strength == ConsensusStrength::None {
        return None;
    }

    let n = directional.len();
    let trader_factor = (((n + 1) as f64).ln() / 21f64.ln()).min(1.0);

    let majority_volume: f64 = majority.iter().map(|v| v.volume).sum();
    let volume_factor = if total_volume > 0.0 { majority_volume / total_volume } else { 0.0 };

    let majority_scores: Vec<f64> = majority.iter().map(|v| v.total_score).collect();
    let quality_factor = if majority_scores.is_empty() {
        0.0
    } else {
        (majority_scores.iter().sum::<f64>() / majority_scores.len() as f64) / 100.0
    };

    let confidence = 0.30 * trader_factor + 0.40 * volume_factor + 0.30 * quality_factor;

    Some(ConsensusSignal {
        direction: majority_direction,
        agreement_pct,
        strength,
        confidence,
        participant_count: n,
    })
}
