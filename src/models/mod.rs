//! Model capability descriptors and the store that holds them.

pub mod builder;
pub mod capabilities;
pub mod family;
pub mod registry;

pub use builder::{build_capabilities, build_capability, RawModelRecord, ReasoningEvidence};
pub use capabilities::{
    MaxTokensPolicy, ModelGenerationCapability, ParameterSupport, ReasoningCapability,
    ReasoningClass, ReasoningTextEmission,
};
pub use family::{detect_family, ModelFamily};
pub use registry::CapabilityRegistry;
