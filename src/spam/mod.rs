pub mod rules;

use crate::error::Result;
use crate::message::NewThreadMessage;
use serde::{Deserialize, Serialize};

pub use rules::{
    BlockedSenderRule, ContentPatternRule, RecipientFloodRule, RuleScore, RuleSpamDetector,
    SpamAnalysis, SpamRule,
};

/// Tells whether a new thread message looks like spam.
pub trait SpamDetector: Send + Sync {
    fn is_spam(&self, message: &NewThreadMessage) -> bool;
}

/// Accepts everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSpamDetector;

impl SpamDetector for NoopSpamDetector {
    fn is_spam(&self, _message: &NewThreadMessage) -> bool {
        false
    }
}

impl<D: SpamDetector + ?Sized> SpamDetector for Box<D> {
    fn is_spam(&self, message: &NewThreadMessage) -> bool {
        (**self).is_spam(message)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPattern {
    pub pattern: String,
    pub score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpamDetectorConfig {
    Noop,
    Rules {
        threshold: i32,
        #[serde(default)]
        blocked_senders: Vec<String>,
        #[serde(default)]
        content_patterns: Vec<ContentPattern>,
        max_recipients: Option<usize>,
        /// Score added when `max_recipients` is exceeded; defaults to the threshold.
        flood_score: Option<i32>,
    },
}

impl Default for SpamDetectorConfig {
    fn default() -> Self {
        SpamDetectorConfig::Rules {
            threshold: 100,
            blocked_senders: Vec::new(),
            content_patterns: vec![
                ContentPattern {
                    pattern: r"\b(viagra|cialis|casino)\b".to_string(),
                    score: 100,
                },
                ContentPattern {
                    pattern: r"\b(free money|act now|click here)\b".to_string(),
                    score: 50,
                },
                ContentPattern {
                    pattern: r"https?://\S+\.(xyz|top|click)\b".to_string(),
                    score: 50,
                },
            ],
            max_recipients: Some(20),
            flood_score: None,
        }
    }
}

/// Builds the detector strategy named by the configuration.
pub fn build_detector(config: &SpamDetectorConfig) -> Result<Box<dyn SpamDetector>> {
    match config {
        SpamDetectorConfig::Noop => {
            log::info!("Spam detection disabled (noop detector)");
            Ok(Box::new(NoopSpamDetector))
        }
        SpamDetectorConfig::Rules {
            threshold,
            blocked_senders,
            content_patterns,
            max_recipients,
            flood_score,
        } => {
            let mut rules: Vec<Box<dyn SpamRule>> = Vec::new();
            if !blocked_senders.is_empty() {
                rules.push(Box::new(BlockedSenderRule::new(blocked_senders)));
            }
            if !content_patterns.is_empty() {
                rules.push(Box::new(ContentPatternRule::from_config(content_patterns)?));
            }
            if let Some(max) = max_recipients {
                let score = flood_score.unwrap_or(*threshold);
                rules.push(Box::new(RecipientFloodRule::new(*max, score)));
            }
            log::info!(
                "Rule-based spam detection with {} rules, threshold {}",
                rules.len(),
                threshold
            );
            Ok(Box::new(RuleSpamDetector::new(rules, *threshold)))
        }
    }
}
