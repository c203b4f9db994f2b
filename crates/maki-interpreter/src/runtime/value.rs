//! Script value representation.

use std::fmt;

use super::heap::ObjectRef;
use crate::registry::ValueType;

/// A value flowing through variables, the operand stack and native calls.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value (result of functions declared without a return type).
    #[default]
    Void,
    /// Null object reference.
    Null,
    /// Boolean.
    Boolean(bool),
    /// 32-bit signed integer.
    Int(i32),
    /// Float or double.
    Float(f64),
    /// String.
    String(String),
    /// Reference to an instance. May dangle once the instance is destroyed.
    Object(ObjectRef),
}

impl Value {
    /// Returns true if this value is void.
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Returns true for null and void.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Void | Value::Null)
    }

    /// Returns true for int, float and boolean values.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Boolean(_))
    }

    /// Name of the value's kind, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Object(_) => "object",
        }
    }

    /// Loose truthiness: zero, empty strings, null and void are false.
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Void | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => !n.is_nan() && *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// Numeric view of int, float and boolean values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(f64::from(*n)),
            Value::Float(n) => Some(*n),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Integer view of numeric values; floats truncate toward zero.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(n) => Some(*n as i32),
            Value::Boolean(b) => Some(i32::from(*b)),
            _ => None,
        }
    }

    /// String contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Object reference, if this is one.
    pub fn as_object(&self) -> Option<ObjectRef> {
        match self {
            Value::Object(r) => Some(*r),
            _ => None,
        }
    }

    /// The value a function of the given return type yields when it has
    /// nothing better to say.
    pub fn default_for(ty: Option<ValueType>) -> Value {
        match ty {
            None => Value::Void,
            Some(ValueType::Int) => Value::Int(0),
            Some(ValueType::Float | ValueType::Double) => Value::Float(0.0),
            Some(ValueType::Boolean) => Value::Boolean(false),
            Some(ValueType::String) => Value::String(String::new()),
            Some(ValueType::Any | ValueType::Object(_)) => Value::Null,
        }
    }

    /// Converts within the numeric family to match `ty`; other values are
    /// returned unchanged except void, which becomes the type's default.
    pub fn coerce(self, ty: Option<ValueType>) -> Value {
        let Some(target) = ty else {
            return self;
        };
        if self.is_void() {
            return Value::default_for(ty);
        }
        match target {
            ValueType::Int if self.is_numeric() => Value::Int(self.as_i32().unwrap_or(0)),
            ValueType::Float | ValueType::Double if self.is_numeric() => {
                Value::Float(self.as_f64().unwrap_or(0.0))
            }
            ValueType::Boolean if self.is_numeric() => Value::Boolean(self.to_boolean()),
            _ => self,
        }
    }

    /// Parses a numeric string the way lenient natives do.
    pub fn parse_number(s: &str) -> Option<f64> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => Ok(()),
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", i32::from(*b)),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(r) => write!(f, "object{}", r),
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(r: ObjectRef) -> Self {
        Value::Object(r)
    }
}

impl From<Option<ObjectRef>> for Value {
    fn from(r: Option<ObjectRef>) -> Self {
        r.map_or(Value::Null, Value::Object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Void.to_boolean());
        assert!(!Value::Null.to_boolean());
        assert!(!Value::Int(0).to_boolean());
        assert!(Value::Int(-3).to_boolean());
        assert!(!Value::Float(f64::NAN).to_boolean());
        assert!(Value::String("x".into()).to_boolean());
    }

    #[test]
    fn test_coerce_numeric_family() {
        assert_eq!(Value::Float(2.9).coerce(Some(ValueType::Int)), Value::Int(2));
        assert_eq!(Value::Int(2).coerce(Some(ValueType::Double)), Value::Float(2.0));
        assert_eq!(Value::Int(5).coerce(Some(ValueType::Boolean)), Value::Boolean(true));
        assert_eq!(Value::Void.coerce(Some(ValueType::String)), Value::String(String::new()));
        assert_eq!(
            Value::String("7".into()).coerce(Some(ValueType::Int)),
            Value::String("7".into())
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Value::default_for(None), Value::Void);
        assert_eq!(Value::default_for(Some(ValueType::Int)), Value::Int(0));
        assert_eq!(Value::default_for(Some(ValueType::Object("Layout"))), Value::Null);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Boolean(true).to_string(), "1");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Void.to_string(), "");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(Value::parse_number(" 12 "), Some(12.0));
        assert_eq!(Value::parse_number("1.25"), Some(1.25));
        assert_eq!(Value::parse_number(""), None);
        assert_eq!(Value::parse_number("abc"), None);
    }
}
