use std::fmt;
use std::rc::Rc;

use crate::callable::Callable;

/// Every runtime value the interpreter can produce.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    Nil,
    Callable(Rc<dyn Callable>),
}

impl Value {
    /// Only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    /// Name of the value's runtime type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Nil => "nil",
            Value::Callable(_) => "function",
        }
    }
}

/// Values of different types are never equal; callables compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Callable(a), Value::Callable(b)) => {
                std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => format_number(f, *n),

            Value::String(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Nil => write!(f, "nil"),

            Value::Callable(c) => write!(f, "{}", c),
        }
    }
}

/// Plain decimal for magnitudes in `[1e-3, 1e7)` (integral ones without a
/// trailing ".0"), otherwise scientific notation such as `1.0E21` or
/// `2.5E-4`.
fn format_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        return write!(f, "NaN");
    }
    if n.is_infinite() {
        return write!(f, "{}Infinity", if n < 0.0 { "-" } else { "" });
    }

    let magnitude: f64 = n.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return if n.fract() == 0.0 {
            write!(f, "{:.0}", n)
        } else {
            write!(f, "{}", n)
        };
    }

    let scientific: String = format!("{:e}", n);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));

    if mantissa.contains('.') {
        write!(f, "{}E{}", mantissa, exponent)
    } else {
        write!(f, "{}.0E{}", mantissa, exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_drop_fraction() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-7.0).to_string(), "-7");
        assert_eq!(Value::Number(9999999.0).to_string(), "9999999");
        assert_eq!(Value::Number(0.001).to_string(), "0.001");
        assert_eq!(Value::Number(0.0).to_string(), "0");
    }

    #[test]
    fn large_and_tiny_numbers_use_exponent_form() {
        assert_eq!(Value::Number(1e21).to_string(), "1.0E21");
        assert_eq!(Value::Number(1e7).to_string(), "1.0E7");
        assert_eq!(Value::Number(12345678.0).to_string(), "1.2345678E7");
        assert_eq!(Value::Number(-2.5e-4).to_string(), "-2.5E-4");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "Infinity");
    }

    #[test]
    fn truthiness() {
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
    }

    #[test]
    fn cross_type_equality_is_false() {
        assert_ne!(Value::Number(0.0), Value::Bool(false));
        assert_ne!(Value::Nil, Value::Bool(false));
        assert_ne!(Value::String("1".to_string()), Value::Number(1.0));
        assert_eq!(Value::Nil, Value::Nil);
    }
}
