//! Backend abstraction layer
//!
//! Provides the device-queue trait the pipeline records into, the shared
//! types, and a headless implementation.

pub mod headless;
pub mod traits;
pub mod types;

pub use headless::*;
pub use traits::*;
pub use types::*;
