//! Database repositories
//!
//! Repositories handle all direct store interactions.

pub mod contest_repo;
pub mod progress_repo;

pub use contest_repo::{ContestRepository, ProblemSearch, UpsertedContest};
pub use progress_repo::ProgressRepository;
