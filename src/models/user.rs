//! User progress model

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::problem::SolvedKey;
use crate::codeforces::{CfSubmission, CfUser};
use crate::constants::VERDICT_ACCEPTED;

/// Public profile snapshot kept alongside the solved set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub handle: String,
    pub rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub rank: Option<String>,
    pub title_photo: Option<String>,
}

impl From<CfUser> for UserInfo {
    fn from(user: CfUser) -> Self {
        Self {
            handle: user.handle,
            rating: user.rating,
            max_rating: user.max_rating,
            rank: user.rank,
            title_photo: user.title_photo,
        }
    }
}

/// Keys of every accepted submission
pub fn accepted_keys(submissions: &[CfSubmission]) -> BTreeSet<SolvedKey> {
    submissions
        .iter()
        .filter(|s| s.verdict.as_deref() == Some(VERDICT_ACCEPTED))
        .filter_map(|s| {
            s.problem
                .contest_id
                .or(s.contest_id)
                .map(|contest_id| SolvedKey::new(contest_id, &s.problem.index))
        })
        .collect()
}

/// A problem with submissions but no accepted one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptedProblem {
    pub contest_id: i64,
    pub index: String,
    pub name: String,
    pub rating: Option<i32>,
    /// Epoch seconds of the latest submission
    pub last_time: i64,
}

impl AttemptedProblem {
    pub fn key(&self) -> SolvedKey {
        SolvedKey::new(self.contest_id, &self.index)
    }
}

/// Problems attempted but not in `solved`, newest attempt first, at most `limit`
///
/// Only regular contest problems are kept: a positive contest id and an
/// index of uppercase letters and digits.
pub fn attempted_unsolved(
    submissions: &[CfSubmission],
    solved: &BTreeSet<SolvedKey>,
    limit: usize,
) -> Vec<AttemptedProblem> {
    let mut latest: HashMap<SolvedKey, AttemptedProblem> = HashMap::new();

    for s in submissions {
        if s.verdict.as_deref() == Some(VERDICT_ACCEPTED) {
            continue;
        }
        let Some(contest_id) = s.problem.contest_id.or(s.contest_id).filter(|id| *id > 0) else {
            continue;
        };
        let index = &s.problem.index;
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) {
            continue;
        }

        let key = SolvedKey::new(contest_id, index);
        if solved.contains(&key) {
            continue;
        }

        let entry = latest.entry(key).or_insert_with(|| AttemptedProblem {
            contest_id,
            index: index.clone(),
            name: s.problem.name.clone(),
            rating: s.problem.rating,
            last_time: s.creation_time_seconds,
        });
        entry.last_time = entry.last_time.max(s.creation_time_seconds);
    }

    let mut attempted: Vec<AttemptedProblem> = latest.into_values().collect();
    attempted.sort_by(|a, b| {
        b.last_time
            .cmp(&a.last_time)
            .then_with(|| a.contest_id.cmp(&b.contest_id))
            .then_with(|| a.index.cmp(&b.index))
    });
    attempted.truncate(limit);
    attempted
}

/// Union of the stored and freshly fetched solved sets
///
/// Never drops a stored key, even when the new fetch no longer reports it.
pub fn merge_solved(stored: &BTreeSet<SolvedKey>, fetched: BTreeSet<SolvedKey>) -> BTreeSet<SolvedKey> {
    let mut merged = fetched;
    merged.extend(stored.iter().cloned());
    merged
}
