//! # EduPulse — education-analytics dashboard API
//!
//! Read-mostly HTTP endpoints joining two tabular datasets (per-student
//! aggregate features and per-quiz score rows) with a precomputed
//! cluster-label lookup, answering dashboard queries for an
//! education-analytics front end.
//!
//! All tables load once at startup into an immutable [`types::EduContext`]
//! shared across handlers; every endpoint is a stateless
//! filter/group/aggregate pass over those rows. There is no write path.
//!
//! | Concern | Module |
//! |---------|--------|
//! | Table store | [`types`] |
//! | Name/grade normalization | [`normalize`] |
//! | Query layer | [`queries`] |
//! | Recommendation rules | [`recommend`] |
//! | Startup loading | [`storage`] |
//! | HTTP surface | [`server`] |
//! | Environment config | [`env_config`] |

pub mod env_config;
pub mod normalize;
pub mod queries;
pub mod recommend;
pub mod server;
pub mod storage;
pub mod types;
