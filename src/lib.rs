//! Parlance: generation request/response pipeline for LLM chat clients.
//!
//! Turns provider model metadata into capability descriptors, resolves
//! layered generation settings, adapts reasoning preferences to what a model
//! accepts, and parses and aggregates the streamed response.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use parlance::prelude::*;
//!
//! # async fn example(records: Vec<serde_json::Value>) -> parlance::error::Result<()> {
//! let registry = CapabilityRegistry::from_records(&records);
//! let provider = OpenRouterProvider::new(ProviderSettings::load()?)?;
//! let pipeline = Pipeline::new(registry, GenerationConfigStore::new(), Arc::new(provider));
//!
//! let request = GenerationRequest::builder()
//!     .model_id("anthropic/claude-sonnet-4")
//!     .messages(vec![ModelMessage::user("Hello!")])
//!     .build();
//! let result = pipeline
//!     .run(&request, CancellationToken::new(), |chunk| println!("{chunk:?}"))
//!     .await?;
//! println!("{}", result.text);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod generation;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod reasoning;
pub mod stream;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
