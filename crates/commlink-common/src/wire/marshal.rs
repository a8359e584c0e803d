//! Dynamic value <-> typed buffer conversions
//!
//! This module is the single conversion boundary between the dynamic
//! values the host environment supplies and the fixed-width homogeneous
//! buffers the messaging backend transmits. No other module performs
//! numeric conversion.
//!
//! # Type Mapping
//!
//! | Keyword | Element type | Dynamic representation |
//! |---------|--------------|------------------------|
//! | `integer` | 32-bit signed integer | JSON number with an exact `i64` value in `i32` range |
//! | `double` | 64-bit float | any JSON number |
//!
//! # Conversion Rules
//!
//! - Integer conversion is exact: `3` converts, `3.5` does not, and
//!   neither does a number outside `i32` range.
//! - Float conversion accepts any numeric representation, including
//!   integers.
//! - Non-numeric values (strings, nested arrays, booleans, null) never
//!   convert; the error reports the first offending element's index.
//!
//! Buffers are request-scoped: a `TypedBuffer` is built immediately
//! before a backend call and dropped when the invocation returns.

use crate::protocol::error::{CommlinkError, Result};
use serde_json::Value;

/// Element type of a typed buffer.
///
/// Selected explicitly by the caller through the `-type` keyword; never
/// inferred from the payload's runtime shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Int32,
    Float64,
}

impl ElementType {
    /// The `-type` keywords, in the order they are documented.
    pub const KEYWORDS: [&'static str; 2] = ["integer", "double"];

    /// Resolves a `-type` keyword to an element type.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "integer" => Some(ElementType::Int32),
            "double" => Some(ElementType::Float64),
            _ => None,
        }
    }

    /// Human-readable name used in conversion errors.
    pub fn describe(&self) -> &'static str {
        match self {
            ElementType::Int32 => "32-bit integer",
            ElementType::Float64 => "64-bit float",
        }
    }
}

/// A contiguous, homogeneously-typed array with explicit length.
///
/// The element type is carried by the variant, so a buffer is always
/// self-consistent: length and type never disagree with the contents.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedBuffer {
    Int32(Vec<i32>),
    Float64(Vec<f64>),
}

impl TypedBuffer {
    pub fn element_type(&self) -> ElementType {
        match self {
            TypedBuffer::Int32(_) => ElementType::Int32,
            TypedBuffer::Float64(_) => ElementType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TypedBuffer::Int32(v) => v.len(),
            TypedBuffer::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn int32_element(value: &Value, index: usize) -> Result<i32> {
    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or(CommlinkError::TypeMismatch {
            index,
            expected: ElementType::Int32.describe(),
        })
}

fn float64_element(value: &Value, index: usize) -> Result<f64> {
    value.as_f64().ok_or(CommlinkError::TypeMismatch {
        index,
        expected: ElementType::Float64.describe(),
    })
}

/// Converts an ordered sequence of dynamic values into a typed buffer.
///
/// Conversion is element-wise and checked; it fails with
/// `TypeMismatch` at the first element that cannot convert, reporting
/// that element's index. An empty sequence yields a zero-length buffer.
pub fn marshal_list(values: &[Value], ty: ElementType) -> Result<TypedBuffer> {
    match ty {
        ElementType::Int32 => {
            let mut out = Vec::with_capacity(values.len());
            for (index, value) in values.iter().enumerate() {
                out.push(int32_element(value, index)?);
            }
            Ok(TypedBuffer::Int32(out))
        }
        ElementType::Float64 => {
            let mut out = Vec::with_capacity(values.len());
            for (index, value) in values.iter().enumerate() {
                out.push(float64_element(value, index)?);
            }
            Ok(TypedBuffer::Float64(out))
        }
    }
}

/// Converts a single scalar into a typed buffer of length 1.
///
/// This is the non-list path; a conversion failure reports index 0.
pub fn marshal_scalar(value: &Value, ty: ElementType) -> Result<TypedBuffer> {
    match ty {
        ElementType::Int32 => Ok(TypedBuffer::Int32(vec![int32_element(value, 0)?])),
        ElementType::Float64 => Ok(TypedBuffer::Float64(vec![float64_element(value, 0)?])),
    }
}

/// Converts a received buffer back into a dynamic value.
///
/// The shape follows the caller's declared mode, never the buffer's
/// length: a list-mode request yields an ordered array even for a single
/// element, while a scalar-mode request with one element yields a bare
/// scalar.
pub fn unmarshal(buffer: &TypedBuffer, list_mode: bool) -> Value {
    match buffer {
        TypedBuffer::Int32(values) => {
            if !list_mode && values.len() == 1 {
                Value::from(values[0])
            } else {
                Value::from(values.clone())
            }
        }
        TypedBuffer::Float64(values) => {
            if !list_mode && values.len() == 1 {
                Value::from(values[0])
            } else {
                Value::from(values.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyword_resolution() {
        assert_eq!(ElementType::from_keyword("integer"), Some(ElementType::Int32));
        assert_eq!(ElementType::from_keyword("double"), Some(ElementType::Float64));
        assert_eq!(ElementType::from_keyword("word"), None);
        assert_eq!(ElementType::from_keyword("Integer"), None);
    }

    #[test]
    fn test_marshal_integer_scalar() {
        let buf = marshal_scalar(&json!(42), ElementType::Int32).unwrap();
        assert_eq!(buf, TypedBuffer::Int32(vec![42]));
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.element_type(), ElementType::Int32);
    }

    #[test]
    fn test_marshal_integer_requires_exact_value() {
        let err = marshal_scalar(&json!(3.5), ElementType::Int32).unwrap_err();
        assert_eq!(
            err,
            CommlinkError::TypeMismatch {
                index: 0,
                expected: "32-bit integer"
            }
        );
    }

    #[test]
    fn test_marshal_integer_rejects_out_of_range() {
        let too_big = i64::from(i32::MAX) + 1;
        assert!(marshal_scalar(&json!(too_big), ElementType::Int32).is_err());
        let too_small = i64::from(i32::MIN) - 1;
        assert!(marshal_scalar(&json!(too_small), ElementType::Int32).is_err());
        assert!(marshal_scalar(&json!(i32::MAX), ElementType::Int32).is_ok());
        assert!(marshal_scalar(&json!(i32::MIN), ElementType::Int32).is_ok());
    }

    #[test]
    fn test_marshal_float_accepts_any_numeric() {
        assert_eq!(
            marshal_scalar(&json!(2.5), ElementType::Float64).unwrap(),
            TypedBuffer::Float64(vec![2.5])
        );
        // integers convert to floats without loss of meaning
        assert_eq!(
            marshal_scalar(&json!(7), ElementType::Float64).unwrap(),
            TypedBuffer::Float64(vec![7.0])
        );
    }

    #[test]
    fn test_marshal_rejects_non_numeric() {
        assert!(marshal_scalar(&json!("3"), ElementType::Int32).is_err());
        assert!(marshal_scalar(&json!(true), ElementType::Float64).is_err());
        assert!(marshal_scalar(&json!(null), ElementType::Int32).is_err());
        assert!(marshal_scalar(&json!([1, 2]), ElementType::Int32).is_err());
    }

    #[test]
    fn test_marshal_list_preserves_order() {
        let values = vec![json!(3), json!(1), json!(2)];
        let buf = marshal_list(&values, ElementType::Int32).unwrap();
        assert_eq!(buf, TypedBuffer::Int32(vec![3, 1, 2]));
    }

    #[test]
    fn test_marshal_list_reports_first_offending_index() {
        let values = vec![json!(1), json!(2), json!("x"), json!(4.5)];
        let err = marshal_list(&values, ElementType::Int32).unwrap_err();
        assert_eq!(
            err,
            CommlinkError::TypeMismatch {
                index: 2,
                expected: "32-bit integer"
            }
        );
    }

    #[test]
    fn test_marshal_empty_list_yields_zero_length_buffer() {
        let buf = marshal_list(&[], ElementType::Float64).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.element_type(), ElementType::Float64);
    }

    #[test]
    fn test_unmarshal_scalar_mode_yields_bare_scalar() {
        let buf = TypedBuffer::Int32(vec![9]);
        assert_eq!(unmarshal(&buf, false), json!(9));

        let buf = TypedBuffer::Float64(vec![1.25]);
        assert_eq!(unmarshal(&buf, false), json!(1.25));
    }

    #[test]
    fn test_unmarshal_list_mode_single_element_stays_a_list() {
        // The shape follows the caller's declared mode, not the length.
        let buf = TypedBuffer::Int32(vec![5]);
        assert_eq!(unmarshal(&buf, true), json!([5]));
    }

    #[test]
    fn test_unmarshal_list_mode_preserves_index_order() {
        let buf = TypedBuffer::Float64(vec![0.5, 1.5, 2.5]);
        assert_eq!(unmarshal(&buf, true), json!([0.5, 1.5, 2.5]));
    }
}
