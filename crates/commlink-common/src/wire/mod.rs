pub mod marshal;

pub use marshal::{marshal_list, marshal_scalar, unmarshal, ElementType, TypedBuffer};
