//! Persistence adapters. Implement ReviewRepo.

pub mod sqlite_repo;

pub use sqlite_repo::SqliteReviewRepo;
