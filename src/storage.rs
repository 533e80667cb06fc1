//! Startup table loading: two CSV datasets plus the JSON cluster-label map.
//!
//! Loading happens exactly once, before the server binds. Any failure —
//! missing directory, unreadable file, malformed row — yields the empty
//! context so the process still starts and serves empty results (degraded
//! mode); the failure is logged, never fatal. There is no partial load: one
//! bad file discards everything.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use anyhow::Context as _;
use tracing::{info, warn};

use crate::types::{EduContext, RecommendationModel, ScoreRecord, StudentRecord};

pub const STUDENT_FEATURES_FILE: &str = "user_level_features.csv";
pub const SCORE_ROWS_FILE: &str = "merged_scores.csv";
pub const RECOMMENDATION_MODEL_FILE: &str = "recommendation_model.json";

/// Load all tables from `data_dir`, falling back to the empty context on any
/// failure.
pub fn load_context(data_dir: &Path) -> EduContext {
    match try_load_context(data_dir) {
        Ok(ctx) => {
            info!(
                students = ctx.students.len(),
                scores = ctx.scores.len(),
                clusters = ctx.cluster_labels.len(),
                "loaded dashboard tables"
            );
            ctx
        }
        Err(err) => {
            warn!(error = %err, dir = %data_dir.display(), "table load failed, serving empty tables");
            EduContext::default()
        }
    }
}

fn try_load_context(data_dir: &Path) -> anyhow::Result<EduContext> {
    let students: Vec<StudentRecord> = read_csv(&data_dir.join(STUDENT_FEATURES_FILE))?;
    let mut scores: Vec<ScoreRecord> = read_csv(&data_dir.join(SCORE_ROWS_FILE))?;
    // Upstream exports pad the short name with whitespace; trim once at load
    // so every query compares against the canonical form.
    for rec in &mut scores {
        rec.course_short_name = rec.course_short_name.trim().to_string();
    }
    let cluster_labels = read_cluster_labels(&data_dir.join(RECOMMENDATION_MODEL_FILE))?;
    Ok(EduContext {
        students,
        scores,
        cluster_labels,
    })
}

fn read_csv<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("open {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record.with_context(|| format!("parse {}", path.display()))?);
    }
    Ok(rows)
}

fn read_cluster_labels(path: &Path) -> anyhow::Result<HashMap<i64, String>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let model: RecommendationModel =
        serde_json::from_reader(file).with_context(|| format!("parse {}", path.display()))?;
    Ok(model.cluster_labels)
}
