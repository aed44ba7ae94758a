//! Problem model

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::codeforces::{CfProblem, CfProblemStatistics};

/// Problem embedded in a stored contest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub contest_id: i64,
    pub index: String,
    pub name: String,
    #[serde(rename = "type")]
    pub problem_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solved_count: Option<i64>,
}

impl Problem {
    /// Build from an upstream problem; `contest_id` fills in when the upstream omits it
    pub fn from_upstream(problem: CfProblem, contest_id: i64) -> Self {
        Self {
            contest_id: problem.contest_id.unwrap_or(contest_id),
            index: problem.index,
            name: problem.name,
            problem_type: problem.problem_type,
            rating: problem.rating,
            tags: problem.tags,
            points: problem.points,
            solved_count: None,
        }
    }
}

/// Sort problems by index (A, B, C1, C2, ...)
pub fn sort_by_index(problems: &mut [Problem]) {
    problems.sort_by(|a, b| a.index.cmp(&b.index));
}

/// Problemset entry joined with its statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedProblem {
    pub contest_id: Option<i64>,
    pub index: String,
    pub name: String,
    #[serde(rename = "type")]
    pub problem_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub solved_count: i64,
    pub attempt_count: i64,
    pub acceptance: i64,
    pub acceptance_percent: Option<i64>,
}

impl MergedProblem {
    /// Key used to join problems, statistics and solved sets
    pub fn key(&self) -> Option<SolvedKey> {
        self.contest_id.map(|contest_id| SolvedKey::new(contest_id, &self.index))
    }

    pub fn is_rated(&self) -> bool {
        self.rating.is_some()
    }
}

/// Join problems with statistics on `(contestId, index)`
///
/// Missing statistics count as zero; the acceptance percentage is `None`
/// when nothing was attempted.
pub fn merge_with_stats(problems: Vec<CfProblem>, stats: &[CfProblemStatistics]) -> Vec<MergedProblem> {
    let lookup: HashMap<(i64, &str), &CfProblemStatistics> = stats
        .iter()
        .filter_map(|s| s.contest_id.map(|id| ((id, s.index.as_str()), s)))
        .collect();

    problems
        .into_iter()
        .map(|p| {
            let stat = p
                .contest_id
                .and_then(|id| lookup.get(&(id, p.index.as_str())).copied());
            let solved_count = stat.map(|s| s.solved_count).unwrap_or(0);
            let attempt_count = stat.and_then(|s| s.attempt_count).unwrap_or(0);

            MergedProblem {
                contest_id: p.contest_id,
                index: p.index,
                name: p.name,
                problem_type: p.problem_type,
                points: p.points,
                rating: p.rating,
                tags: p.tags,
                solved_count,
                attempt_count,
                acceptance: solved_count,
                acceptance_percent: acceptance_percent(solved_count, attempt_count),
            }
        })
        .collect()
}

fn acceptance_percent(solved: i64, attempts: i64) -> Option<i64> {
    if attempts > 0 {
        Some(((solved as f64 / attempts as f64) * 100.0).round() as i64)
    } else {
        None
    }
}

/// Tag -> number of problems carrying it
pub fn tag_counts<'a>(problems: impl IntoIterator<Item = &'a MergedProblem>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for problem in problems {
        for tag in &problem.tags {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// `"<contestId>-<index>"`, the key of a solved problem
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SolvedKey(String);

impl SolvedKey {
    pub fn new(contest_id: i64, index: &str) -> Self {
        Self(format!("{}-{}", contest_id, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SolvedKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for SolvedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SolvedKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
