//! View-model state types

use fraudlens_client::Category;
use serde::{Deserialize, Serialize};

// ==================== History ====================

/// Column the history is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Amount,
    Sender,
    Receiver,
    Timestamp,
    IsFraud,
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey::Timestamp
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "amount" => Ok(SortKey::Amount),
            "sender" => Ok(SortKey::Sender),
            "receiver" => Ok(SortKey::Receiver),
            "timestamp" => Ok(SortKey::Timestamp),
            "is_fraud" => Ok(SortKey::IsFraud),
            _ => Err(format!("Invalid sort key: {}", s)),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Amount => write!(f, "amount"),
            SortKey::Sender => write!(f, "sender"),
            SortKey::Receiver => write!(f, "receiver"),
            SortKey::Timestamp => write!(f, "timestamp"),
            SortKey::IsFraud => write!(f, "is_fraud"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Descending
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "ascending"),
            SortDirection::Descending => write!(f, "descending"),
        }
    }
}

/// Fetch lifecycle of the history record set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum LoadStatus {
    Idle,
    Loading,
    Success,
    Error(String),
}

impl Default for LoadStatus {
    fn default() -> Self {
        LoadStatus::Idle
    }
}

/// Counts over the filtered record set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total_count: usize,
    pub fraud_count: usize,
    pub legit_count: usize,
}

// ==================== Assessment form ====================

/// Editable field of the assessment form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Amount,
    Sender,
    Receiver,
    Timestamp,
    Description,
    Category,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Amount => "amount",
            FormField::Sender => "sender",
            FormField::Receiver => "receiver",
            FormField::Timestamp => "timestamp",
            FormField::Description => "description",
            FormField::Category => "category",
        }
    }
}

impl std::str::FromStr for FormField {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "amount" => Ok(FormField::Amount),
            "sender" => Ok(FormField::Sender),
            "receiver" => Ok(FormField::Receiver),
            "timestamp" => Ok(FormField::Timestamp),
            "description" => Ok(FormField::Description),
            "category" => Ok(FormField::Category),
            _ => Err(format!("Unknown form field: {}", s)),
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Draft of a prospective transaction, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    pub amount: String,
    pub sender: String,
    pub receiver: String,
    /// Either an ISO-8601 instant or a local `YYYY-MM-DDTHH:MM`
    pub timestamp: String,
    pub description: Option<String>,
    pub category: Category,
}

impl FormState {
    /// Current text of a field
    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Amount => self.amount.clone(),
            FormField::Sender => self.sender.clone(),
            FormField::Receiver => self.receiver.clone(),
            FormField::Timestamp => self.timestamp.clone(),
            FormField::Description => self.description.clone().unwrap_or_default(),
            FormField::Category => self.category.as_str().to_string(),
        }
    }
}
