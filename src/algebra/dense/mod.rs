mod core;
pub use self::core::*;
mod matrix_math;
