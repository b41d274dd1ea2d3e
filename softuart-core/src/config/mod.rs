//! Port configuration
//!
//! Raw setup options, the validated frame format, and the registry that
//! keeps both per port.

pub mod frame;
pub mod options;
pub mod registry;

pub use frame::*;
pub use options::*;
pub use registry::*;
