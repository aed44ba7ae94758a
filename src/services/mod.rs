//! Business logic services

pub mod contest_service;
pub mod ladder_service;
pub mod problem_service;
pub mod progress_service;
pub mod sync_service;

pub use contest_service::ContestService;
pub use ladder_service::LadderService;
pub use problem_service::ProblemService;
pub use progress_service::ProgressService;
pub use sync_service::SyncService;
