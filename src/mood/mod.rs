//! Mood bucketing for the YouTube aggregation flow.
//!
//! Every liked video is scored with the AFINN lexicon and assigned exactly
//! one of four moods by a priority-ordered rule table. The rules are an
//! explicit, ordered list of predicate/label pairs so the priority order
//! is inspectable and testable rather than buried in branching.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Score thresholds for the mood rules. Tuning either one is a product
/// decision, not a refactor.
pub const NEGATIVE_SCORE_THRESHOLD: f32 = -2.0;
pub const POSITIVE_SCORE_THRESHOLD: f32 = 2.0;

/// YouTube category ids treated as energetic: Film, Sports, Gaming,
/// Comedy, Entertainment.
const ENERGETIC_CATEGORIES: [&str; 5] = ["1", "17", "20", "23", "24"];
/// YouTube category ids treated as calm: Music, Pets, Travel, Education.
const CALM_CATEGORIES: [&str; 4] = ["10", "15", "19", "27"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Sad,
    Happy,
    Energetic,
    Calm,
}

/// One entry in the bucketing table: first predicate that matches wins.
pub struct MoodRule {
    pub name: &'static str,
    pub applies: fn(score: f32, category_id: Option<&str>) -> bool,
    pub mood: Mood,
}

/// The bucketing table, in priority order. Score-based rules outrank the
/// category rules; the trailing pair makes the table total.
pub const MOOD_RULES: &[MoodRule] = &[
    MoodRule {
        name: "strong-negative-sentiment",
        applies: |score, _| score < NEGATIVE_SCORE_THRESHOLD,
        mood: Mood::Sad,
    },
    MoodRule {
        name: "strong-positive-sentiment",
        applies: |score, _| score > POSITIVE_SCORE_THRESHOLD,
        mood: Mood::Happy,
    },
    MoodRule {
        name: "energetic-category",
        applies: |_, category| {
            category.is_some_and(|id| ENERGETIC_CATEGORIES.contains(&id))
        },
        mood: Mood::Energetic,
    },
    MoodRule {
        name: "calm-category",
        applies: |_, category| category.is_some_and(|id| CALM_CATEGORIES.contains(&id)),
        mood: Mood::Calm,
    },
    MoodRule {
        name: "mild-positive-sentiment",
        applies: |score, _| score >= 0.0,
        mood: Mood::Happy,
    },
    MoodRule {
        name: "mild-negative-sentiment",
        applies: |_, _| true,
        mood: Mood::Sad,
    },
];

/// Assign exactly one mood to a (sentiment score, category id) pair.
pub fn bucket(score: f32, category_id: Option<&str>) -> Mood {
    MOOD_RULES
        .iter()
        .find(|rule| (rule.applies)(score, category_id))
        .map(|rule| rule.mood)
        .unwrap_or(Mood::Sad)
}

/// Lexicon sentiment score for one video's combined text.
pub fn score_text(text: &str) -> f32 {
    sentiment::analyze(text.to_string()).score
}

/// One analyzed liked video, in the wire shape the frontend consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMood {
    pub video_id: String,
    pub title: String,
    pub sentiment_score: f32,
    pub emotional_category: Mood,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySentiment {
    pub date: String,
    pub score: f64,
}

/// Aggregated metrics over one user's analyzed videos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodMetrics {
    pub sad_count: usize,
    pub happy_count: usize,
    pub energetic_count: usize,
    pub calm_count: usize,
    pub total_videos: usize,
    pub average_sentiment_score: f64,
    pub sentiment_over_time: Vec<DailySentiment>,
    pub videos: Vec<VideoMood>,
}

/// Bucket counts, average score, and daily sentiment averages.
pub fn compute_metrics(videos: Vec<VideoMood>) -> MoodMetrics {
    let count_of = |mood: Mood| {
        videos
            .iter()
            .filter(|v| v.emotional_category == mood)
            .count()
    };

    let total_videos = videos.len();
    let average_sentiment_score = if total_videos > 0 {
        videos.iter().map(|v| v.sentiment_score as f64).sum::<f64>() / total_videos as f64
    } else {
        0.0
    };

    // Daily averages, ordered by date.
    let mut daily: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for video in &videos {
        let day = video.published_at.format("%Y-%m-%d").to_string();
        let entry = daily.entry(day).or_insert((0.0, 0));
        entry.0 += video.sentiment_score as f64;
        entry.1 += 1;
    }
    let sentiment_over_time = daily
        .into_iter()
        .map(|(date, (total, count))| DailySentiment {
            date,
            score: total / count as f64,
        })
        .collect();

    MoodMetrics {
        sad_count: count_of(Mood::Sad),
        happy_count: count_of(Mood::Happy),
        energetic_count: count_of(Mood::Energetic),
        calm_count: count_of(Mood::Calm),
        total_videos,
        average_sentiment_score,
        sentiment_over_time,
        videos,
    }
}
