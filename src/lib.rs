//! TeamUp Match - partner matching and recommendations for sports meetups
//!
//! This library scores how well two player profiles fit together and keeps
//! a per-user list of recommended partners up to date.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_match_score, parse_sports, BatchSummary, RecommendError, Recommender};
pub use models::{MatchExplanation, MatchScore, Profile, Recommendation, SportsField};
pub use services::{MemoryStore, PostgresStore, ProfileStore, RecommendationStore, StoreError};
