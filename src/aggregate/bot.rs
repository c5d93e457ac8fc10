//! Bot classification of user agents.
//!
//! # Design Decisions
//! - Classification is optional: without a detector no bot flag is logged at
//!   all, rather than logging every client as "not a bot"
//! - Keyword matching is case-insensitive substring matching, no regex

use crate::config::BotDetectionConfig;

/// Decides whether a user agent belongs to an automated client.
pub trait BotDetector: Send + Sync + std::fmt::Debug {
    /// Returns true if the user agent looks like a bot.
    fn is_bot(&self, user_agent: &str) -> bool;
}

/// Outcome of classifying one user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BotVerdict {
    /// No detector configured.
    #[default]
    Disabled,
    Human,
    Bot,
}

impl BotVerdict {
    /// Classify `user_agent` with the optional detector.
    pub fn classify(detector: Option<&dyn BotDetector>, user_agent: &str) -> Self {
        match detector {
            None => BotVerdict::Disabled,
            Some(d) if d.is_bot(user_agent) => BotVerdict::Bot,
            Some(_) => BotVerdict::Human,
        }
    }

    pub fn detector_enabled(&self) -> bool {
        !matches!(self, BotVerdict::Disabled)
    }

    /// Log flag: `Some(1)` for bots, `Some(0)` for humans, `None` when disabled.
    pub fn flag(&self) -> Option<u8> {
        match self {
            BotVerdict::Disabled => None,
            BotVerdict::Human => Some(0),
            BotVerdict::Bot => Some(1),
        }
    }
}

/// Flags user agents containing any of a list of keywords.
#[derive(Debug, Clone)]
pub struct KeywordBotDetector {
    patterns: Vec<String>,
}

impl KeywordBotDetector {
    /// Create a detector. Patterns are normalized to lowercase.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.into().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &BotDetectionConfig) -> Self {
        Self::new(config.patterns.iter().cloned())
    }
}

impl BotDetector for KeywordBotDetector {
    fn is_bot(&self, user_agent: &str) -> bool {
        let ua = user_agent.to_lowercase();
        self.patterns.iter().any(|p| ua.contains(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_detector_is_case_insensitive() {
        let detector = KeywordBotDetector::new(["Googlebot", "crawler"]);

        assert!(detector.is_bot("Mozilla/5.0 (compatible; googlebot/2.1)"));
        assert!(detector.is_bot("Some-CRAWLER/1.0"));
        assert!(!detector.is_bot("Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0"));
    }

    #[test]
    fn test_empty_patterns_are_ignored() {
        let detector = KeywordBotDetector::new(["", "spider"]);
        assert!(!detector.is_bot("Mozilla/5.0"));
        assert!(detector.is_bot("baiduspider"));
    }

    #[test]
    fn test_verdict_without_detector() {
        let verdict = BotVerdict::classify(None, "Googlebot");
        assert_eq!(verdict, BotVerdict::Disabled);
        assert!(!verdict.detector_enabled());
        assert_eq!(verdict.flag(), None);
    }

    #[test]
    fn test_verdict_with_detector() {
        let detector = KeywordBotDetector::new(["bot"]);

        let bot = BotVerdict::classify(Some(&detector), "Googlebot");
        assert_eq!(bot, BotVerdict::Bot);
        assert_eq!(bot.flag(), Some(1));

        let human = BotVerdict::classify(Some(&detector), "Mozilla/5.0");
        assert_eq!(human, BotVerdict::Human);
        assert!(human.detector_enabled());
        assert_eq!(human.flag(), Some(0));
    }

    #[test]
    fn test_from_config_defaults() {
        let detector = KeywordBotDetector::from_config(&BotDetectionConfig::default());
        assert!(detector.is_bot("curl/8.4.0"));
        assert!(!detector.is_bot("Mozilla/5.0 (Macintosh) Safari/605.1.15"));
    }
}
