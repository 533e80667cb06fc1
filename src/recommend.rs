//! Recommendation rules engine: a fixed decision table over cluster labels.
//!
//! Tier selection is an ordered substring match on the student's cluster
//! label, kept as data so rules can be added or reordered without touching
//! control flow. A second pass stamps every material with a learning-style
//! suffix. Same inputs always produce the same output.

use serde::Serialize;

use crate::types::EduContext;

/// Status served when the user id has no student record at all.
pub const AT_RISK_STATUS: &str = "At Risk / Passive";

struct TierRule {
    /// Substring matched against the cluster label.
    pattern: &'static str,
    match_percentage: u8,
    strategy: &'static str,
    tips: &'static str,
    /// `{interest}` is replaced with the caller-supplied interest.
    materials: [&'static str; 2],
}

/// Checked top to bottom; first match wins.
const TIER_RULES: &[TierRule] = &[
    TierRule {
        pattern: "High Performer",
        match_percentage: 95,
        strategy: "Pengayaan",
        tips: "Fokus portofolio.",
        materials: ["Proyek: {interest}", "LeetCode Hard"],
    },
    TierRule {
        pattern: "Active",
        match_percentage: 88,
        strategy: "Konsistensi",
        tips: "Pertahankan.",
        materials: ["Studi Kasus: {interest}", "Konsep Lanjut"],
    },
    TierRule {
        pattern: "Balanced",
        match_percentage: 75,
        strategy: "Intensitas",
        tips: "Latihan soal.",
        materials: ["Kursus: {interest}", "Latihan Medium"],
    },
];

/// At-risk tier for labels no rule matches.
const FALLBACK_TIER: TierRule = TierRule {
    pattern: "",
    match_percentage: 60,
    strategy: "Intervensi",
    tips: "Kejar materi.",
    materials: ["Video Ringkasan", "Manajemen Waktu"],
};

#[derive(Debug, Serialize)]
pub struct Recommendation {
    pub status: String,
    pub match_percentage: u8,
    pub strategy: String,
    pub materials: Vec<String>,
    pub tips: String,
}

fn style_suffix(learning_style: &str) -> &'static str {
    match learning_style.to_lowercase().as_str() {
        "visual" => "(Video)",
        "auditory" => "(Podcast)",
        _ => "(Praktik)",
    }
}

/// Build the recommendation payload for one student.
///
/// An unknown `user_id` resolves to the at-risk status rather than erroring;
/// a known student with an unmapped cluster id gets the `"Unknown"` label,
/// which also lands in the fallback tier.
pub fn recommend(
    ctx: &EduContext,
    user_id: i64,
    learning_style: &str,
    interest: &str,
) -> Recommendation {
    let status = match ctx.find_student(user_id) {
        Some(student) => ctx.cluster_label(student.cluster_id).to_string(),
        None => AT_RISK_STATUS.to_string(),
    };

    let rule = TIER_RULES
        .iter()
        .find(|rule| status.contains(rule.pattern))
        .unwrap_or(&FALLBACK_TIER);

    let suffix = style_suffix(learning_style);
    let materials = rule
        .materials
        .iter()
        .map(|template| format!("{} {suffix}", template.replace("{interest}", interest)))
        .collect();

    Recommendation {
        status,
        match_percentage: rule.match_percentage,
        strategy: rule.strategy.to_string(),
        materials,
        tips: rule.tips.to_string(),
    }
}
