//! Shared domain types
//!
//! Stage labels, roles, per-session scoreboards and catalog records. These are
//! plain data types with no I/O so both the engine and its tests can use them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Conversation stage a single chat turn is attributed to
///
/// The declaration order is the canonical order used for scoreboard output.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Opening,
    Discovery,
    Presentation,
    ObjectionHandling,
    Closing,
    FollowUp,
    #[default]
    General,
}

impl Stage {
    /// All stages in canonical order
    pub const ALL: [Stage; 7] = [
        Stage::Opening,
        Stage::Discovery,
        Stage::Presentation,
        Stage::ObjectionHandling,
        Stage::Closing,
        Stage::FollowUp,
        Stage::General,
    ];

    /// Label used on the wire and in prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Opening => "opening",
            Stage::Discovery => "discovery",
            Stage::Presentation => "presentation",
            Stage::ObjectionHandling => "objection_handling",
            Stage::Closing => "closing",
            Stage::FollowUp => "follow_up",
            Stage::General => "general",
        }
    }

    /// Normalize free text (trim, lowercase) and match it against the labels
    pub fn parse_label(text: &str) -> Option<Stage> {
        let normalized = text.trim().to_lowercase();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
    }

    /// Comma separated list of every label, as offered to the classifier
    pub fn options() -> String {
        Stage::ALL
            .iter()
            .map(Stage::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::parse_label(s).ok_or_else(|| format!("unknown stage '{}'", s))
    }
}

/// Side of the sales conversation the user is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Seller,
    Buyer,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Seller, Role::Buyer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Seller => "seller",
            Role::Buyer => "buyer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage requested by a chat turn
///
/// `"auto"` asks the engine to classify the prompt. Any other text is taken
/// literally; a label outside the seven known stages still shapes the prompt
/// but does not move any counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StageRequest {
    #[default]
    Auto,
    Label(String),
}

impl StageRequest {
    pub const AUTO: &'static str = "auto";
}

impl From<String> for StageRequest {
    fn from(value: String) -> Self {
        if value == Self::AUTO {
            StageRequest::Auto
        } else {
            StageRequest::Label(value)
        }
    }
}

impl From<&str> for StageRequest {
    fn from(value: &str) -> Self {
        StageRequest::from(value.to_string())
    }
}

impl From<Stage> for StageRequest {
    fn from(stage: Stage) -> Self {
        StageRequest::Label(stage.as_str().to_string())
    }
}

impl From<StageRequest> for String {
    fn from(value: StageRequest) -> Self {
        match value {
            StageRequest::Auto => StageRequest::AUTO.to_string(),
            StageRequest::Label(label) => label,
        }
    }
}

/// Per-session histogram of turns by stage
///
/// All seven stages are always present. Deserializing a partial map fills the
/// missing stages with zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Stage, u64>", into = "BTreeMap<Stage, u64>")]
pub struct StageScoreboard {
    counts: BTreeMap<Stage, u64>,
}

impl StageScoreboard {
    /// Create a scoreboard with every stage at zero
    pub fn new() -> Self {
        Self {
            counts: Stage::ALL.into_iter().map(|stage| (stage, 0)).collect(),
        }
    }

    pub fn increment(&mut self, stage: Stage) {
        *self.counts.entry(stage).or_insert(0) += 1;
    }

    pub fn get(&self, stage: Stage) -> u64 {
        self.counts.get(&stage).copied().unwrap_or(0)
    }

    /// Sum of all counters
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Iterate in canonical stage order
    pub fn iter(&self) -> impl Iterator<Item = (Stage, u64)> + '_ {
        self.counts.iter().map(|(stage, count)| (*stage, *count))
    }
}

impl Default for StageScoreboard {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BTreeMap<Stage, u64>> for StageScoreboard {
    fn from(map: BTreeMap<Stage, u64>) -> Self {
        let mut board = StageScoreboard::new();
        board.counts.extend(map);
        board
    }
}

impl From<StageScoreboard> for BTreeMap<Stage, u64> {
    fn from(board: StageScoreboard) -> Self {
        board.counts
    }
}

/// Product price as found in the catalog source
///
/// Kept in its original form; no currency or range validation is done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Number(n) => write!(f, "{}", n),
            Price::Text(t) => f.write_str(t),
        }
    }
}

/// One catalog entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub price: Option<Price>,

    #[serde(default)]
    pub description: Option<String>,
}

impl ProductRecord {
    /// Render as a prompt bullet: `- name ($price)` then the indented description
    ///
    /// Absent and `null` fields render the same way.
    pub fn render(&self) -> String {
        let price = self
            .price
            .as_ref()
            .map(Price::to_string)
            .unwrap_or_else(|| "N/A".to_string());
        format!(
            "- {} (${})\n  {}",
            self.name.as_deref().unwrap_or("Unknown"),
            price,
            self.description.as_deref().unwrap_or("")
        )
    }
}

/// Ordered script lines for one role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleScript {
    pub lines: Vec<String>,
}

impl RoleScript {
    /// Build from raw file contents, trimmed and then split on `\n`
    ///
    /// A blank file still yields one empty line; only an absent file has none.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.trim().split('\n').map(String::from).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
