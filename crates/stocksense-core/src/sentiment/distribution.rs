use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentiment category, declared in tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentCategory {
    Positive,
    Negative,
    Neutral,
}

impl SentimentCategory {
    pub const ALL: [SentimentCategory; 3] = [
        SentimentCategory::Positive,
        SentimentCategory::Negative,
        SentimentCategory::Neutral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentCategory::Positive => "Positive",
            SentimentCategory::Negative => "Negative",
            SentimentCategory::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Counts per sentiment category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

impl SentimentDistribution {
    pub fn new(positive: u32, negative: u32, neutral: u32) -> Self {
        Self {
            positive,
            negative,
            neutral,
        }
    }

    pub fn get(&self, category: SentimentCategory) -> u32 {
        match category {
            SentimentCategory::Positive => self.positive,
            SentimentCategory::Negative => self.negative,
            SentimentCategory::Neutral => self.neutral,
        }
    }

    pub fn increment(&mut self, category: SentimentCategory, by: u32) {
        let slot = match category {
            SentimentCategory::Positive => &mut self.positive,
            SentimentCategory::Negative => &mut self.negative,
            SentimentCategory::Neutral => &mut self.neutral,
        };
        *slot = slot.saturating_add(by);
    }

    pub fn total(&self) -> u32 {
        self.positive
            .saturating_add(self.negative)
            .saturating_add(self.neutral)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn max_count(&self) -> u32 {
        self.positive.max(self.negative).max(self.neutral)
    }

    /// Clamp every category to `limit`, but only when the largest count
    /// exceeds it
    pub(crate) fn clamp_if_max_exceeds(&mut self, limit: u32) {
        if self.max_count() > limit {
            self.positive = self.positive.min(limit);
            self.negative = self.negative.min(limit);
            self.neutral = self.neutral.min(limit);
        }
    }

    /// Category with the highest count; ties go to the earlier category in
    /// Positive, Negative, Neutral order
    pub fn dominant(&self) -> SentimentCategory {
        let mut best = SentimentCategory::Positive;
        for category in SentimentCategory::ALL {
            if self.get(category) > self.get(best) {
                best = category;
            }
        }
        best
    }

    /// (category, count) pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (SentimentCategory, u32)> + '_ {
        SentimentCategory::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}
