//! Core types shared across the pipeline.

pub mod message;
pub mod reasoning;
pub mod results;
pub mod stream;
pub mod usage;

pub use message::*;
pub use reasoning::*;
pub use results::*;
pub use stream::*;
pub use usage::*;
