//! Data preprocessing module
//!
//! Provides the leakage-safe pieces of the evaluation pipeline:
//! - Standard scaling fit on training partitions only
//! - Explicit categorical / continuous column roles

mod scaler;
pub mod roles;

pub use roles::{ColumnRoles, ContinuousColumns, ResolvedRoles};
pub use scaler::{ScalingTransform, StandardScaler};
