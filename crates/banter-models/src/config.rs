//! Job configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commentary tone for the generated conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommentaryStyle {
    #[default]
    Roast,
    Praise,
    Cerebral,
}

impl CommentaryStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentaryStyle::Roast => "roast",
            CommentaryStyle::Praise => "praise",
            CommentaryStyle::Cerebral => "cerebral",
        }
    }
}

/// Pacing of the generated conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConversationSpeed {
    Rapid,
    #[default]
    Medium,
    Slow,
}

impl ConversationSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationSpeed::Rapid => "rapid",
            ConversationSpeed::Medium => "medium",
            ConversationSpeed::Slow => "slow",
        }
    }
}

/// Validation errors for a job configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobConfigError {
    #[error("numAgents must be at least 2, got {0}")]
    TooFewAgents(u32),

    #[error("expected {expected} personalities, got {actual}")]
    PersonalityCountMismatch { expected: u32, actual: usize },

    #[error("clipInterval must be positive, got {0}")]
    NonPositiveClipInterval(f64),

    #[error("targetLength must be positive, got {0}")]
    NonPositiveTargetLength(f64),
}

/// Configuration for one commentary video generation job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    /// Number of conversational agents (>= 2)
    pub num_agents: u32,

    /// Personality descriptor per agent, in speaker order
    pub personalities: Vec<String>,

    /// Commentary tone
    pub commentary_style: CommentaryStyle,

    /// Length of each sampled clip in seconds (> 0)
    pub clip_interval: f64,

    /// Conversation pacing
    pub conversation_speed: ConversationSpeed,

    /// Desired output length in seconds (> 0)
    pub target_length: f64,
}

impl JobConfig {
    /// Validate the configuration invariants.
    pub fn validate(&self) -> Result<(), JobConfigError> {
        if self.num_agents < 2 {
            return Err(JobConfigError::TooFewAgents(self.num_agents));
        }
        if self.personalities.len() != self.num_agents as usize {
            return Err(JobConfigError::PersonalityCountMismatch {
                expected: self.num_agents,
                actual: self.personalities.len(),
            });
        }
        if !(self.clip_interval > 0.0) {
            return Err(JobConfigError::NonPositiveClipInterval(self.clip_interval));
        }
        if !(self.target_length > 0.0) {
            return Err(JobConfigError::NonPositiveTargetLength(self.target_length));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JobConfig {
        JobConfig {
            num_agents: 2,
            personalities: vec!["Sassy".to_string(), "Deadpan".to_string()],
            commentary_style: CommentaryStyle::Roast,
            clip_interval: 1.5,
            conversation_speed: ConversationSpeed::Medium,
            target_length: 15.0,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_too_few_agents() {
        let mut cfg = config();
        cfg.num_agents = 1;
        cfg.personalities = vec!["Sassy".to_string()];
        assert_eq!(cfg.validate(), Err(JobConfigError::TooFewAgents(1)));
    }

    #[test]
    fn test_personality_count_mismatch() {
        let mut cfg = config();
        cfg.personalities.push("Chaotic".to_string());
        assert_eq!(
            cfg.validate(),
            Err(JobConfigError::PersonalityCountMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_non_positive_intervals() {
        let mut cfg = config();
        cfg.clip_interval = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(JobConfigError::NonPositiveClipInterval(_))
        ));

        let mut cfg = config();
        cfg.target_length = -1.0;
        assert!(matches!(
            cfg.validate(),
            Err(JobConfigError::NonPositiveTargetLength(_))
        ));
    }

    #[test]
    fn test_serde_round_trip_uses_camel_case() {
        let json = serde_json::to_value(config()).unwrap();
        assert!(json.get("numAgents").is_some());
        assert!(json.get("commentaryStyle").is_some());
        assert_eq!(json["commentaryStyle"], "roast");
        assert_eq!(json["conversationSpeed"], "medium");
    }
}
