//! plasma-api-core: the value cell carried by animation tracks and the
//! blend operations defined for each value kind.

pub mod blend;
pub mod value;

pub use blend::{lerp_values, slerp_unnormalized, WeightedSum};
pub use value::{Value, ValueKind};
