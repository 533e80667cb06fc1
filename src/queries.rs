//! Per-endpoint filter/group/aggregate/sort logic over the loaded tables.
//!
//! Every function here is a pure read over [`EduContext`]: filter rows, group
//! by a key, aggregate, sort, shape the response rows. Aggregation follows
//! the upstream dataset conventions — means and maxes skip missing grades,
//! and a group whose grades are all missing still shows up with score 0.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::normalize::{clean_course_name, fix_grade_value, quiz_sort_key, simplify_quiz_name};
use crate::types::EduContext;

fn round1(val: f64) -> f64 {
    (val * 10.0).round() / 10.0
}

fn round2(val: f64) -> f64 {
    (val * 100.0).round() / 100.0
}

// ── Response rows ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct QuizDetail {
    pub quiz_name: String,
    pub full_name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoursePerformance {
    pub class_id: String,
    pub subject: String,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct StudentDashboard {
    pub user_id: i64,
    pub gpa: f64,
    pub average_score: f64,
    pub semester: i64,
    pub engagement_score: i64,
    pub performance_category: String,
    pub courses: Vec<CoursePerformance>,
    pub cluster_id: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminSummary {
    pub total_students: usize,
    pub avg_gpa: f64,
    pub at_risk_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ClassStats {
    pub class_id: String,
    pub class_name: String,
    pub student_count: usize,
    pub avg_score: f64,
}

#[derive(Debug, Serialize)]
pub struct ClassStudent {
    pub id: i64,
    pub cluster: String,
    pub status: String,
    pub score: f64,
    pub activities: usize,
}

// ── Quiz detail ─────────────────────────────────────────────────────

/// Per-quiz scores for one (student, class) pair.
///
/// Duplicate rows for the same logical quiz (retakes, remedials) collapse to
/// the maximum grade regardless of chronological order. Groups are sorted by
/// [`quiz_sort_key`]; the sort is stable, so same-bucket groups keep their
/// first-seen order. No match yields an empty list, not an error.
pub fn quiz_detail(ctx: &EduContext, user_id: i64, class_id: &str) -> Vec<QuizDetail> {
    let class_id = class_id.trim();

    let mut order: Vec<String> = Vec::new();
    let mut best: HashMap<String, Option<f64>> = HashMap::new();
    for rec in ctx
        .scores
        .iter()
        .filter(|r| r.user_id == user_id && r.course_short_name == class_id)
    {
        let clean = simplify_quiz_name(&rec.quiz_name);
        let entry = best.entry(clean.clone()).or_insert_with(|| {
            order.push(clean);
            None
        });
        *entry = match (*entry, rec.grade()) {
            (Some(seen), Some(new)) => Some(seen.max(new)),
            (seen, new) => seen.or(new),
        };
    }

    let mut rows: Vec<QuizDetail> = order
        .into_iter()
        .map(|name| {
            let score = fix_grade_value(best[&name]);
            QuizDetail {
                quiz_name: name.clone(),
                full_name: name,
                score,
            }
        })
        .collect();
    rows.sort_by_key(|row| quiz_sort_key(&row.quiz_name));
    rows
}

// ── Student dashboard ───────────────────────────────────────────────

/// Dashboard aggregate for one student; `None` when the id is unknown.
///
/// Unlike quiz detail, this uses the mean grade per course, and the overall
/// average is the unweighted mean of those per-course scores — a student with
/// many attempts in one course does not drag the overall number.
pub fn student_dashboard(ctx: &EduContext, user_id: i64) -> Option<StudentDashboard> {
    let student = ctx.find_student(user_id)?;

    let mut groups: BTreeMap<(String, String), (f64, usize)> = BTreeMap::new();
    for rec in ctx.scores.iter().filter(|r| r.user_id == user_id) {
        let entry = groups
            .entry((rec.course_short_name.clone(), rec.course_full_name.clone()))
            .or_insert((0.0, 0));
        if let Some(grade) = rec.grade() {
            entry.0 += grade;
            entry.1 += 1;
        }
    }

    let mut courses = Vec::with_capacity(groups.len());
    let mut total = 0.0;
    for ((short_name, full_name), (sum, count)) in groups {
        let mean = (count > 0).then(|| sum / count as f64);
        let score = fix_grade_value(mean);
        total += score;
        courses.push(CoursePerformance {
            class_id: short_name,
            subject: clean_course_name(&full_name),
            score,
        });
    }

    let average_score = if courses.is_empty() {
        0.0
    } else {
        round1(total / courses.len() as f64)
    };

    Some(StudentDashboard {
        user_id: student.user_id,
        gpa: round2(average_score / 25.0),
        average_score,
        semester: 4,
        engagement_score: student.engagement_score,
        performance_category: student.performance_category.clone(),
        courses,
        cluster_id: student.cluster_id,
    })
}

// ── Admin rollups ───────────────────────────────────────────────────

pub fn admin_summary(ctx: &EduContext) -> AdminSummary {
    let (sum, count) = ctx
        .students
        .iter()
        .filter_map(|s| s.mean_score_pct.filter(|v| !v.is_nan()))
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    let avg_gpa = if count > 0 {
        round2(sum / count as f64 / 25.0)
    } else {
        0.0
    };

    AdminSummary {
        total_students: ctx.students.len(),
        avg_gpa,
        at_risk_count: ctx
            .students
            .iter()
            .filter(|s| s.performance_category == "Low")
            .count(),
    }
}

/// Per-class student counts and averages.
///
/// Two-stage groupby: first the mean grade per (class, student), then the
/// mean of those per-student means. A flat mean over raw rows would weight
/// toward students with more recorded attempts.
pub fn class_list(ctx: &EduContext) -> Vec<ClassStats> {
    let mut per_student: BTreeMap<(String, String, i64), (f64, usize)> = BTreeMap::new();
    for rec in &ctx.scores {
        let entry = per_student
            .entry((
                rec.course_short_name.clone(),
                rec.course_full_name.clone(),
                rec.user_id,
            ))
            .or_insert((0.0, 0));
        if let Some(grade) = rec.grade() {
            entry.0 += grade;
            entry.1 += 1;
        }
    }

    // (student count, sum of per-student means, students with any grade)
    let mut per_class: BTreeMap<(String, String), (usize, f64, usize)> = BTreeMap::new();
    for ((short_name, full_name, _user_id), (sum, count)) in per_student {
        let entry = per_class.entry((short_name, full_name)).or_insert((0, 0.0, 0));
        entry.0 += 1;
        if count > 0 {
            entry.1 += sum / count as f64;
            entry.2 += 1;
        }
    }

    per_class
        .into_iter()
        .map(|((short_name, full_name), (students, mean_sum, graded))| ClassStats {
            class_id: short_name,
            class_name: clean_course_name(&full_name),
            student_count: students,
            avg_score: fix_grade_value((graded > 0).then(|| mean_sum / graded as f64)),
        })
        .collect()
}

/// Per-student stats within one class, score descending.
///
/// Score rows whose user id has no student record are dropped (inner join);
/// the sort is stable, so equal scores keep student-table order.
pub fn students_by_class(ctx: &EduContext, class_id: &str) -> Vec<ClassStudent> {
    // (grade sum, graded rows, attempts)
    let mut stats: HashMap<i64, (f64, usize, usize)> = HashMap::new();
    for rec in ctx.scores.iter().filter(|r| r.course_short_name == class_id) {
        let entry = stats.entry(rec.user_id).or_insert((0.0, 0, 0));
        if let Some(grade) = rec.grade() {
            entry.0 += grade;
            entry.1 += 1;
        }
        entry.2 += 1;
    }

    let mut rows: Vec<ClassStudent> = ctx
        .students
        .iter()
        .filter_map(|student| {
            let (sum, graded, attempts) = stats.get(&student.user_id)?;
            let mean = (*graded > 0).then(|| sum / *graded as f64);
            Some(ClassStudent {
                id: student.user_id,
                cluster: ctx.cluster_label(student.cluster_id).to_string(),
                status: if student.performance_category == "Low" {
                    "Berisiko"
                } else {
                    "Aman"
                }
                .to_string(),
                score: fix_grade_value(mean),
                activities: *attempts,
            })
        })
        .collect();
    rows.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ScoreRecord, StudentRecord};

    fn student(user_id: i64, category: &str, cluster_id: i64, mean_pct: Option<f64>) -> StudentRecord {
        StudentRecord {
            user_id,
            engagement_score: 70,
            performance_category: category.to_string(),
            cluster_id,
            mean_score_pct: mean_pct,
        }
    }

    fn score(user_id: i64, class_id: &str, quiz_name: &str, grade: Option<f64>) -> ScoreRecord {
        ScoreRecord {
            user_id,
            course_short_name: class_id.to_string(),
            course_full_name: format!("{class_id} full IF-2024 [{class_id}]"),
            quiz_id: 1,
            quiz_name: quiz_name.to_string(),
            final_quiz_grade: grade,
        }
    }

    fn ctx(students: Vec<StudentRecord>, scores: Vec<ScoreRecord>) -> EduContext {
        let mut ctx = EduContext {
            students,
            scores,
            cluster_labels: Default::default(),
        };
        ctx.cluster_labels.insert(0, "High Performer".to_string());
        ctx.cluster_labels.insert(1, "At Risk / Passive".to_string());
        ctx
    }

    // ── quiz_detail ─────────────────────────────────────────────────

    #[test]
    fn quiz_detail_retake_collapses_to_max() {
        let ctx = ctx(
            vec![],
            vec![
                score(7, "IF101", "Online Quiz 1: Chapter 2", Some(80.0)),
                score(7, "IF101", "Online Quiz 1: Remedial", Some(0.0)),
            ],
        );
        let rows = quiz_detail(&ctx, 7, "IF101");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quiz_name, "Online Quiz 1");
        assert_eq!(rows[0].score, 80.0);
    }

    #[test]
    fn quiz_detail_orders_quizzes_then_exams() {
        let ctx = ctx(
            vec![],
            vec![
                score(7, "IF101", "Final Exam 2024", Some(70.0)),
                score(7, "IF101", "Online Quiz 2: Loops", Some(90.0)),
                score(7, "IF101", "Midterm Exam - Week 8", Some(60.0)),
                score(7, "IF101", "Online Quiz 10: Graphs", Some(85.0)),
            ],
        );
        let names: Vec<_> = quiz_detail(&ctx, 7, "IF101")
            .into_iter()
            .map(|r| r.quiz_name)
            .collect();
        assert_eq!(names, vec!["Online Quiz 2", "Online Quiz 10", "UTS", "UAS"]);
    }

    #[test]
    fn quiz_detail_trims_class_id() {
        let ctx = ctx(vec![], vec![score(7, "IF101", "Online Quiz 1", Some(55.0))]);
        assert_eq!(quiz_detail(&ctx, 7, "  IF101  ").len(), 1);
    }

    #[test]
    fn quiz_detail_no_match_is_empty() {
        let ctx = ctx(vec![], vec![score(7, "IF101", "Online Quiz 1", Some(55.0))]);
        assert!(quiz_detail(&ctx, 8, "IF101").is_empty());
        assert!(quiz_detail(&ctx, 7, "IF999").is_empty());
    }

    #[test]
    fn quiz_detail_all_missing_group_scores_zero() {
        let ctx = ctx(
            vec![],
            vec![
                score(7, "IF101", "Online Quiz 1", None),
                score(7, "IF101", "Online Quiz 1", Some(f64::NAN)),
            ],
        );
        let rows = quiz_detail(&ctx, 7, "IF101");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score, 0.0);
    }

    #[test]
    fn quiz_detail_missing_never_beats_present() {
        let ctx = ctx(
            vec![],
            vec![
                score(7, "IF101", "Online Quiz 1", Some(42.0)),
                score(7, "IF101", "Online Quiz 1", None),
            ],
        );
        assert_eq!(quiz_detail(&ctx, 7, "IF101")[0].score, 42.0);
    }

    // ── student_dashboard ───────────────────────────────────────────

    #[test]
    fn dashboard_unknown_user_is_none() {
        let ctx = ctx(vec![student(1, "High", 0, Some(80.0))], vec![]);
        assert!(student_dashboard(&ctx, 99).is_none());
    }

    #[test]
    fn dashboard_mean_per_course_then_mean_of_means() {
        let ctx = ctx(
            vec![student(7, "High", 0, Some(80.0))],
            vec![
                score(7, "IF101", "Online Quiz 1", Some(80.0)),
                score(7, "IF101", "Online Quiz 2", Some(60.0)),
                score(7, "IF202", "Online Quiz 1", Some(100.0)),
            ],
        );
        let dash = student_dashboard(&ctx, 7).unwrap();
        assert_eq!(dash.courses.len(), 2);
        // IF101 mean 70, IF202 mean 100 → overall (70+100)/2 = 85
        assert_eq!(dash.average_score, 85.0);
        assert_eq!(dash.gpa, 3.4);
        assert_eq!(dash.semester, 4);
    }

    #[test]
    fn dashboard_without_scores_has_zero_average() {
        let ctx = ctx(vec![student(7, "High", 0, Some(80.0))], vec![]);
        let dash = student_dashboard(&ctx, 7).unwrap();
        assert!(dash.courses.is_empty());
        assert_eq!(dash.average_score, 0.0);
        assert_eq!(dash.gpa, 0.0);
    }

    #[test]
    fn dashboard_courses_use_cleaned_subject() {
        let ctx = ctx(
            vec![student(7, "High", 0, None)],
            vec![score(7, "IF101", "Online Quiz 1", Some(50.0))],
        );
        let dash = student_dashboard(&ctx, 7).unwrap();
        // full name "IF101 full IF-2024 [IF101]" → subject before marker, code kept
        assert_eq!(dash.courses[0].subject, "If101 Full [IF101]");
    }

    // ── admin rollups ───────────────────────────────────────────────

    #[test]
    fn summary_counts_and_average() {
        let ctx = ctx(
            vec![
                student(1, "Low", 0, Some(50.0)),
                student(2, "High", 0, Some(90.0)),
                student(3, "Low", 1, None),
            ],
            vec![],
        );
        let summary = admin_summary(&ctx);
        assert_eq!(summary.total_students, 3);
        assert_eq!(summary.at_risk_count, 2);
        // mean of (50, 90) = 70 → 70/25 = 2.8
        assert_eq!(summary.avg_gpa, 2.8);
    }

    #[test]
    fn summary_on_empty_tables() {
        let summary = admin_summary(&EduContext::default());
        assert_eq!(summary.total_students, 0);
        assert_eq!(summary.avg_gpa, 0.0);
        assert_eq!(summary.at_risk_count, 0);
    }

    #[test]
    fn class_average_is_mean_of_student_means() {
        // One student with a single 100, another with ten zeros: the class
        // average must be 50, not the row-weighted ≈9.1.
        let mut scores = vec![score(1, "IF101", "Online Quiz 1", Some(100.0))];
        for _ in 0..10 {
            scores.push(score(2, "IF101", "Online Quiz 1", Some(0.0)));
        }
        let ctx = ctx(vec![], scores);
        let classes = class_list(&ctx);
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].student_count, 2);
        assert_eq!(classes[0].avg_score, 50.0);
    }

    #[test]
    fn class_list_counts_ungraded_students() {
        let ctx = ctx(
            vec![],
            vec![
                score(1, "IF101", "Online Quiz 1", Some(80.0)),
                score(2, "IF101", "Online Quiz 1", None),
            ],
        );
        let classes = class_list(&ctx);
        assert_eq!(classes[0].student_count, 2);
        // only the graded student contributes to the average
        assert_eq!(classes[0].avg_score, 80.0);
    }

    // ── students_by_class ───────────────────────────────────────────

    #[test]
    fn students_by_class_sorted_descending_with_status() {
        let ctx = ctx(
            vec![student(1, "Low", 1, None), student(2, "High", 0, None)],
            vec![
                score(1, "IF101", "Online Quiz 1", Some(40.0)),
                score(2, "IF101", "Online Quiz 1", Some(90.0)),
                score(2, "IF101", "Online Quiz 2", Some(70.0)),
            ],
        );
        let rows = students_by_class(&ctx, "IF101");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 2);
        assert_eq!(rows[0].score, 80.0);
        assert_eq!(rows[0].status, "Aman");
        assert_eq!(rows[0].cluster, "High Performer");
        assert_eq!(rows[0].activities, 2);
        assert_eq!(rows[1].id, 1);
        assert_eq!(rows[1].status, "Berisiko");
    }

    #[test]
    fn students_by_class_drops_unknown_users() {
        // Score rows with no matching student record are tolerated.
        let ctx = ctx(vec![], vec![score(42, "IF101", "Online Quiz 1", Some(90.0))]);
        assert!(students_by_class(&ctx, "IF101").is_empty());
    }
}
