//! Shared test utilities for the repo-tree workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`git`]: git repository fixtures at three realism levels
//! - [`repo`]: [`TestRepo`] builder for working files, tracked outputs and subprojects

pub mod git;
pub mod repo;

pub use repo::TestRepo;
