//! Score-based spam detection over pluggable rules.

use super::{ContentPattern, SpamDetector};
use crate::error::Result;
use crate::message::NewThreadMessage;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleScore {
    pub rule_name: String,
    pub score: i32,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamAnalysis {
    pub scores: Vec<RuleScore>,
    pub total_score: i32,
    pub threshold: i32,
    pub is_spam: bool,
}

pub trait SpamRule: Send + Sync {
    fn evaluate(&self, message: &NewThreadMessage) -> RuleScore;
    fn name(&self) -> &str;
}

/// Flags drafts whose rule scores add up to the threshold.
pub struct RuleSpamDetector {
    rules: Vec<Box<dyn SpamRule>>,
    threshold: i32,
}

impl RuleSpamDetector {
    pub fn new(rules: Vec<Box<dyn SpamRule>>, threshold: i32) -> Self {
        Self { rules, threshold }
    }

    pub fn analyze(&self, message: &NewThreadMessage) -> SpamAnalysis {
        let mut scores = Vec::new();
        let mut total_score: i32 = 0;

        for rule in &self.rules {
            let score = rule.evaluate(message);
            if score.score != 0 {
                log::debug!(
                    "Rule {} scored {}: {}",
                    rule.name(),
                    score.score,
                    score.evidence.join("; ")
                );
            }
            total_score = total_score.saturating_add(score.score);
            scores.push(score);
        }

        SpamAnalysis {
            scores,
            total_score,
            threshold: self.threshold,
            is_spam: total_score >= self.threshold,
        }
    }
}

impl SpamDetector for RuleSpamDetector {
    fn is_spam(&self, message: &NewThreadMessage) -> bool {
        self.analyze(message).is_spam
    }
}

pub struct BlockedSenderRule {
    blocked: HashSet<String>,
}

impl BlockedSenderRule {
    pub fn new(usernames: &[String]) -> Self {
        Self {
            blocked: usernames.iter().map(|u| u.to_lowercase()).collect(),
        }
    }
}

impl SpamRule for BlockedSenderRule {
    fn evaluate(&self, message: &NewThreadMessage) -> RuleScore {
        let mut score = 0;
        let mut evidence = Vec::new();

        if self.blocked.contains(&message.sender.username.to_lowercase()) {
            // Blocked senders are spam regardless of content
            score = i32::MAX / 2;
            evidence.push(format!("Sender {} is blocked", message.sender.username));
        }

        RuleScore {
            rule_name: self.name().to_string(),
            score,
            evidence,
        }
    }

    fn name(&self) -> &str {
        "blocked_sender"
    }
}

pub struct ContentPatternRule {
    patterns: Vec<(Regex, i32)>,
}

impl ContentPatternRule {
    pub fn from_config(patterns: &[ContentPattern]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| -> Result<(Regex, i32)> {
                let regex = RegexBuilder::new(&p.pattern)
                    .case_insensitive(true)
                    .build()?;
                Ok((regex, p.score))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }
}

impl SpamRule for ContentPatternRule {
    fn evaluate(&self, message: &NewThreadMessage) -> RuleScore {
        let text = message.searchable_text();
        let mut score: i32 = 0;
        let mut evidence = Vec::new();

        for (regex, weight) in &self.patterns {
            if let Some(found) = regex.find(&text) {
                score = score.saturating_add(*weight);
                evidence.push(format!(
                    "Content matches '{}': {}",
                    regex.as_str(),
                    found.as_str()
                ));
            }
        }

        RuleScore {
            rule_name: self.name().to_string(),
            score,
            evidence,
        }
    }

    fn name(&self) -> &str {
        "content_pattern"
    }
}

pub struct RecipientFloodRule {
    max_recipients: usize,
    score: i32,
}

impl RecipientFloodRule {
    pub fn new(max_recipients: usize, score: i32) -> Self {
        Self {
            max_recipients,
            score,
        }
    }
}

impl SpamRule for RecipientFloodRule {
    fn evaluate(&self, message: &NewThreadMessage) -> RuleScore {
        let count = message.recipients.len();
        let (score, evidence) = if count > self.max_recipients {
            (
                self.score,
                vec![format!(
                    "{} recipients exceeds limit of {}",
                    count, self.max_recipients
                )],
            )
        } else {
            (0, Vec::new())
        };

        RuleScore {
            rule_name: self.name().to_string(),
            score,
            evidence,
        }
    }

    fn name(&self) -> &str {
        "recipient_flood"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{RecipientSet, UserIdentity};

    fn draft(sender: &str, recipients: usize, body: &str) -> NewThreadMessage {
        let recipients: RecipientSet = (0..recipients)
            .map(|i| UserIdentity::new(100 + i as u64, &format!("user{}", i)))
            .collect();
        NewThreadMessage {
            sender: UserIdentity::new(1, sender),
            recipients,
            subject: "Greetings".to_string(),
            body: body.to_string(),
        }
    }

    fn patterns() -> Vec<ContentPattern> {
        vec![
            ContentPattern {
                pattern: r"\bcasino\b".to_string(),
                score: 60,
            },
            ContentPattern {
                pattern: r"\bbonus\b".to_string(),
                score: 40,
            },
        ]
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let detector = RuleSpamDetector::new(
            vec![Box::new(ContentPatternRule::from_config(&patterns()).unwrap())],
            100,
        );

        let analysis = detector.analyze(&draft("alice", 1, "Casino BONUS inside"));
        assert_eq!(analysis.total_score, 100);
        assert!(analysis.is_spam);
        assert_eq!(analysis.scores[0].evidence.len(), 2);

        let analysis = detector.analyze(&draft("alice", 1, "casino night at the office"));
        assert_eq!(analysis.total_score, 60);
        assert!(!analysis.is_spam);
    }

    #[test]
    fn test_large_weights_saturate() {
        let patterns = vec![ContentPattern {
            pattern: "hi".to_string(),
            score: 1_100_000_000,
        }];
        let detector = RuleSpamDetector::new(
            vec![
                Box::new(BlockedSenderRule::new(&["eve".to_string()])),
                Box::new(ContentPatternRule::from_config(&patterns).unwrap()),
            ],
            100,
        );

        let analysis = detector.analyze(&draft("eve", 1, "hi"));
        assert_eq!(analysis.total_score, i32::MAX);
        assert!(analysis.is_spam);

        let rule = ContentPatternRule::from_config(&[
            ContentPattern {
                pattern: "hi".to_string(),
                score: i32::MAX,
            },
            ContentPattern {
                pattern: "there".to_string(),
                score: i32::MAX,
            },
        ])
        .unwrap();
        assert_eq!(rule.evaluate(&draft("alice", 1, "hi there")).score, i32::MAX);
    }

    #[test]
    fn test_patterns_ignore_case() {
        let rule = ContentPatternRule::from_config(&[ContentPattern {
            pattern: "FREE".to_string(),
            score: 100,
        }])
        .unwrap();
        let mut message = draft("alice", 1, "FREE FREE");
        message.subject = "FREE".to_string();
        let score = rule.evaluate(&message);
        assert_eq!(score.score, 100);
        assert_eq!(score.evidence, vec!["Content matches 'FREE': free"]);
    }

    #[test]
    fn test_blocked_sender() {
        let rule = BlockedSenderRule::new(&["Spammer".to_string()]);
        let score = rule.evaluate(&draft("spammer", 1, "hi"));
        assert!(score.score > 0);
        assert_eq!(score.evidence, vec!["Sender spammer is blocked"]);
        assert_eq!(rule.evaluate(&draft("alice", 1, "hi")).score, 0);
    }

    #[test]
    fn test_recipient_flood() {
        let rule = RecipientFloodRule::new(3, 100);
        assert_eq!(rule.evaluate(&draft("alice", 3, "hi")).score, 0);
        let score = rule.evaluate(&draft("alice", 4, "hi"));
        assert_eq!(score.score, 100);
        assert_eq!(score.evidence, vec!["4 recipients exceeds limit of 3"]);
    }

    #[test]
    fn test_detector_does_not_touch_message() {
        let detector = RuleSpamDetector::new(
            vec![
                Box::new(BlockedSenderRule::new(&["eve".to_string()])),
                Box::new(RecipientFloodRule::new(1, 100)),
            ],
            100,
        );
        let message = draft("eve", 2, "body");
        let before = serde_json::to_string(&message).unwrap();
        assert!(detector.is_spam(&message));
        assert_eq!(serde_json::to_string(&message).unwrap(), before);
    }
}
