//! Core data structures: the student and score tables plus the cluster-label map.
//!
//! The central type is [`EduContext`], which holds every row the API can serve.
//! It is built once at startup by [`crate::storage::load_context`] and then
//! shared immutably as `Arc<EduContext>` across async handlers. There is no
//! mutation API: a future hot-reload would build a fresh context and swap the
//! `Arc`, never patch rows in place.

use std::collections::HashMap;

use serde::Deserialize;

/// One row per student from the user-level features dataset.
///
/// Field names map onto the raw CSV headers (`userid`, `cluster`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "userid")]
    pub user_id: i64,
    pub engagement_score: i64,
    /// "Low" marks an at-risk student; any other value counts as safe.
    pub performance_category: String,
    #[serde(rename = "cluster")]
    pub cluster_id: i64,
    /// Mean score percentage over all the student's activity; may be absent.
    pub mean_score_pct: Option<f64>,
}

/// One row per (student, quiz) attempt from the merged score dataset.
///
/// The same logical quiz can appear multiple times per student (retakes,
/// remedials); the query layer collapses those, not the loader.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRecord {
    #[serde(rename = "userid")]
    pub user_id: i64,
    #[serde(rename = "courseshortname")]
    pub course_short_name: String,
    #[serde(rename = "coursefullname")]
    pub course_full_name: String,
    #[serde(rename = "quizid")]
    pub quiz_id: i64,
    #[serde(rename = "quizname")]
    pub quiz_name: String,
    pub final_quiz_grade: Option<f64>,
}

impl ScoreRecord {
    /// Grade with missing values normalized: an empty cell and a literal NaN
    /// both come back as `None`.
    pub fn grade(&self) -> Option<f64> {
        self.final_quiz_grade.filter(|g| !g.is_nan())
    }
}

/// Persisted recommendation-model payload. Only the cluster-label map is
/// consumed at serving time.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationModel {
    pub cluster_labels: HashMap<i64, String>,
}

/// The in-process table store: every dataset the endpoints read.
///
/// `Default` is the degraded empty mode — all queries still answer, with
/// empty lists and not-found lookups.
#[derive(Debug, Default)]
pub struct EduContext {
    pub students: Vec<StudentRecord>,
    pub scores: Vec<ScoreRecord>,
    pub cluster_labels: HashMap<i64, String>,
}

impl EduContext {
    pub fn find_student(&self, user_id: i64) -> Option<&StudentRecord> {
        self.students.iter().find(|s| s.user_id == user_id)
    }

    /// Human label for a cluster id, `"Unknown"` when unmapped.
    pub fn cluster_label(&self, cluster_id: i64) -> &str {
        self.cluster_labels
            .get(&cluster_id)
            .map(String::as_str)
            .unwrap_or("Unknown")
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty() && self.scores.is_empty()
    }
}
