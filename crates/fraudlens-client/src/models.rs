//! Wire models exchanged with the history and scoring collaborators

use serde::{Deserialize, Serialize};

/// Transaction category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Category {
    Personal,
    Shopping,
    Bills,
    Food,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Personal,
        Category::Shopping,
        Category::Bills,
        Category::Food,
        Category::Other,
    ];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Personal => "personal",
            Category::Shopping => "shopping",
            Category::Bills => "bills",
            Category::Food => "food",
            Category::Other => "other",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Personal => "Personal",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills & Utilities",
            Category::Food => "Food & Dining",
            Category::Other => "Other",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Personal
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "personal" => Ok(Category::Personal),
            "shopping" => Ok(Category::Shopping),
            "bills" => Ok(Category::Bills),
            "food" => Ok(Category::Food),
            "other" => Ok(Category::Other),
            _ => Err(format!("Invalid category: {}", s)),
        }
    }
}

// Categories the client does not know about are kept as `Other` so one odd
// record cannot fail a whole history load.
impl From<String> for Category {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(Category::Other)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A historical transaction as served by the history collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub amount: f64,
    /// Sender UPI identifier (`name@bank`)
    pub sender: String,
    /// Receiver UPI identifier
    pub receiver: String,
    /// ISO-8601 instant
    pub timestamp: String,
    pub is_fraud: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl TransactionRecord {
    /// Decimal string form of the amount, as used by free-text search
    pub fn amount_text(&self) -> String {
        self.amount.to_string()
    }

    /// Fraud status label
    pub fn status_label(&self) -> &'static str {
        if self.is_fraud {
            "Fraud"
        } else {
            "Legit"
        }
    }

    /// Check the record invariants: positive amount, `@`-separated parties
    pub fn is_well_formed(&self) -> bool {
        self.amount > 0.0
            && !self.sender.is_empty()
            && self.sender.contains('@')
            && !self.receiver.is_empty()
            && self.receiver.contains('@')
    }
}

/// Body of a scoring request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRequest {
    pub amount: f64,
    pub sender: String,
    pub receiver: String,
    /// ISO-8601 instant
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Verdict returned by the scoring collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessmentResult {
    pub is_fraud: bool,
    /// Confidence in `[0.0, 1.0]`; 1.0 means certainly fraudulent
    pub fraud_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_factors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl RiskAssessmentResult {
    /// Risk factors in the order the collaborator sent them
    pub fn risk_factors(&self) -> &[String] {
        self.risk_factors.as_deref().unwrap_or(&[])
    }

    /// Check the score invariant
    pub fn validate(&self) -> Result<(), String> {
        if self.fraud_score.is_finite() && (0.0..=1.0).contains(&self.fraud_score) {
            Ok(())
        } else {
            Err(format!("fraud_score {} is outside [0, 1]", self.fraud_score))
        }
    }
}
