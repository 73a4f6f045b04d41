use serde::{Deserialize, Serialize};

// ============================================================
// Shared enums
// ============================================================

/// Ordinal severity classification reported by the detection service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    /// HIGH and CRITICAL drive the under-attack indicator.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        Self::Low
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================
// Stream status
// ============================================================

/// One alert occurrence. `(account_id, timestamp)` identifies it uniquely;
/// the same account may reappear with later timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlaggedTransaction {
    pub account_id: String,
    pub amount: f64,
    pub timestamp: String,
    pub risk_score: f64,
    pub reason: String,
    pub status: String,
}

impl FlaggedTransaction {
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.account_id, &self.timestamp)
    }

    /// First semicolon-delimited clause of `reason`, used as the one-line summary.
    pub fn summary(&self) -> &str {
        self.reason.split(';').next().unwrap_or("").trim()
    }

    pub fn is_blocked(&self) -> bool {
        self.status.eq_ignore_ascii_case("BLOCKED")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimelinePoint {
    pub time: String,
    pub threats: u64,
    pub total: u64,
}

/// Full status snapshot, replaced wholesale on each successful poll.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamStatus {
    pub active_threats: u64,
    pub blocked_today: u64,
    pub transactions_per_second: f64,
    pub risk_level: RiskLevel,
    pub recent_alerts: Vec<FlaggedTransaction>,
    pub threat_timeline: Vec<TimelinePoint>,
    #[serde(default)]
    pub total_processed: u64,
}

// ============================================================
// Phishing analysis
// ============================================================

#[derive(Debug, Clone, Deserialize)]
pub struct PhishingAnalysis {
    pub is_phishing: bool,
    pub confidence: f64,
    pub risk_label: RiskLevel,
    pub markers: Vec<String>,
    pub explanation: String,
    pub recommendation: String,
}

// ============================================================
// Attack simulation
// ============================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateAttackOutcome {
    pub message: String,
    pub injected_count: u64,
    pub flagged: Vec<FlaggedTransaction>,
}

// ============================================================
// Batch transaction analysis
// ============================================================

/// Raw transaction submitted for batch analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub account_id: String,
    pub amount: f64,
    pub timestamp: String,
    pub tx_count_last_5s: u32,
    pub time_delta_ms: f64,
    pub hour_of_day: u8,
    pub unique_recipients_last_10tx: u32,
    pub recipient_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchAnalysis {
    pub flagged: Vec<FlaggedTransaction>,
    pub total_analyzed: u64,
    pub total_flagged: u64,
}

// ============================================================
// Single-transaction scoring
// ============================================================

/// Feature object for single-transaction scoring.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionFeatures {
    pub account_id: String,
    pub amount: f64,
    pub transaction_type: String,
    pub recipient_bank: String,
    pub sender_city: String,
    pub recipient_city: String,
    pub tx_count_last_5s: u32,
    pub time_delta_ms: f64,
    pub hour_of_day: u8,
    pub unique_recipients_last_10tx: u32,
    pub is_new_device: bool,
    pub location_change: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelBreakdown {
    pub isolation_forest: f64,
    pub xgboost: Option<f64>,
    pub ensemble: f64,
}

/// Per-feature suspicion weight for display.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureWeight {
    pub label: String,
    pub score: f64,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FraudVerdict {
    pub account_id: String,
    pub amount: f64,
    pub transaction_type: String,
    pub is_fraud: bool,
    pub fraud_probability: f64,
    pub risk_label: RiskLevel,
    pub attack_type: Option<String>,
    pub reason: String,
    pub recommendation: String,
    pub model_breakdown: ModelBreakdown,
    pub feature_importance: Vec<FeatureWeight>,
}

// ============================================================
// Agent message screening
// ============================================================

#[derive(Debug, Clone, Deserialize)]
pub struct InjectionVerdict {
    pub is_injection: bool,
    pub confidence: f64,
    pub attack_type: String,
    pub severity: String,
    #[serde(default)]
    pub injected_instructions: Vec<String>,
    pub explanation: String,
    #[serde(default)]
    pub safe_response: Option<String>,
}

// ============================================================
// Chat
// ============================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_wire_format() {
        let level: RiskLevel = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(level, RiskLevel::Critical);
        assert!(level.is_elevated());
        assert!(!RiskLevel::Medium.is_elevated());
        assert!(RiskLevel::Low < RiskLevel::Critical);
    }

    #[test]
    fn test_stream_status_total_processed_defaults() {
        let json = r#"{
            "active_threats": 2,
            "blocked_today": 127,
            "transactions_per_second": 14.5,
            "risk_level": "MEDIUM",
            "recent_alerts": [],
            "threat_timeline": [{"time": "14:02", "threats": 1, "total": 40}]
        }"#;
        let status: StreamStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.total_processed, 0);
        assert_eq!(status.threat_timeline[0].total, 40);
    }

    #[test]
    fn test_alert_summary_takes_first_clause() {
        let alert = FlaggedTransaction {
            account_id: "ACC-0042".to_string(),
            amount: 50_000.0,
            timestamp: "2026-08-07T09:00:00Z".to_string(),
            risk_score: 0.91,
            reason: "Bot-like velocity; 12 tx in 5s; sub-200ms gaps".to_string(),
            status: "BLOCKED".to_string(),
        };
        assert_eq!(alert.summary(), "Bot-like velocity");
        assert!(alert.is_blocked());
    }

    #[test]
    fn test_injection_verdict_optional_fields() {
        let json = r#"{
            "is_injection": false,
            "confidence": 0.0,
            "attack_type": "Safe",
            "severity": "LOW",
            "explanation": "No prompt injection patterns detected."
        }"#;
        let verdict: InjectionVerdict = serde_json::from_str(json).unwrap();
        assert!(verdict.injected_instructions.is_empty());
        assert!(verdict.safe_response.is_none());
    }
}
