//! Risk tier classification and follow-up actions for a verdict

use fraudlens_client::{RiskAssessmentResult, ScoringRequest};
use serde::Serialize;

/// Scores at or above this are High
pub const HIGH_RISK_THRESHOLD: f64 = 0.8;
/// Scores at or above this (and below High) are Medium
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Low => write!(f, "Low"),
            RiskTier::Medium => write!(f, "Medium"),
            RiskTier::High => write!(f, "High"),
        }
    }
}

/// Tier plus a presentation color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskLevel {
    pub tier: RiskTier,
    pub color_hint: &'static str,
}

/// Bucket a fraud score into a risk tier
pub fn classify_risk(score: f64) -> RiskLevel {
    if score >= HIGH_RISK_THRESHOLD {
        RiskLevel { tier: RiskTier::High, color_hint: "#ef4444" }
    } else if score >= MEDIUM_RISK_THRESHOLD {
        RiskLevel { tier: RiskTier::Medium, color_hint: "#f59e0b" }
    } else {
        RiskLevel { tier: RiskTier::Low, color_hint: "#10b981" }
    }
}

/// What the reviewer can do after a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SuggestedAction {
    CancelTransaction,
    ProceedAnyway,
    ProceedWithPayment,
    NewCheck,
}

impl SuggestedAction {
    pub fn label(&self) -> &'static str {
        match self {
            SuggestedAction::CancelTransaction => "Cancel Transaction",
            SuggestedAction::ProceedAnyway => "Proceed Anyway (Risky)",
            SuggestedAction::ProceedWithPayment => "Proceed with Payment",
            SuggestedAction::NewCheck => "New Check",
        }
    }
}

/// A verdict together with the transaction that was scored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessedTransaction {
    pub request: ScoringRequest,
    pub verdict: RiskAssessmentResult,
    pub risk: RiskLevel,
}

impl AssessedTransaction {
    pub fn new(request: ScoringRequest, verdict: RiskAssessmentResult) -> Self {
        let risk = classify_risk(verdict.fraud_score);
        Self { request, verdict, risk }
    }

    pub fn tier(&self) -> RiskTier {
        self.risk.tier
    }

    /// Score as a percentage for the risk meter
    pub fn risk_percent(&self) -> f64 {
        self.verdict.fraud_score * 100.0
    }

    pub fn headline(&self) -> &'static str {
        if self.verdict.is_fraud {
            "Potentially Fraudulent Transaction"
        } else {
            "Transaction Appears Legitimate"
        }
    }

    pub fn suggested_actions(&self) -> Vec<SuggestedAction> {
        if self.verdict.is_fraud {
            vec![
                SuggestedAction::CancelTransaction,
                SuggestedAction::ProceedAnyway,
                SuggestedAction::NewCheck,
            ]
        } else {
            vec![SuggestedAction::ProceedWithPayment, SuggestedAction::NewCheck]
        }
    }
}
