//! # Compass Core
//!
//! Career counseling pipeline: six LLM-backed stages turn a user profile
//! into ranked career recommendations and a formatted report.
//!
//! ## Architecture
//!
//! - `state/` - Profile input, stage records and the write-once Context
//! - `stages/` - The six stages, prompt templates and response parsing
//! - `orchestrator/` - Stage order, coordinator, events and fallback
//! - `llm` - Reasoning service trait, HTTP adapter and test double
//! - `models` - LLM provider configuration
//! - `config` - Counselor configuration file and overrides
//!
//! ## Usage
//!
//! ```rust,ignore
//! use compass_core::config::CounselorConfig;
//! use compass_core::orchestrator::Coordinator;
//! use compass_core::state::UserProfileInput;
//!
//! let config = CounselorConfig::load().await?;
//! let coordinator = Coordinator::new(&config)?;
//! let context = coordinator
//!     .process_input(UserProfileInput::new("Ada", "Bachelor's Degree"))
//!     .await;
//! ```

pub mod config;
pub mod llm;
pub mod models;
pub mod orchestrator;
pub mod stages;
pub mod state;
