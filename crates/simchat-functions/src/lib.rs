//! The fixed set of blockchain-data functions the language model may call.
//!
//! [`FunctionRegistry`] validates model-supplied arguments against each
//! function's [`ParameterSchema`], dispatches to the Sim fetchers, and turns
//! every outcome into a JSON string the model can read.

pub mod registry;
pub mod schema;

pub use registry::{FunctionDescriptor, FunctionKind, FunctionRegistry, FunctionSpec};
pub use schema::{ParamSpec, ParamType, ParameterSchema};
