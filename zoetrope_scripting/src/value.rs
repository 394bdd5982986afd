use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::env::Scope;
use crate::error::ScriptError;
use crate::eval::Interp;

/// Opaque handle the interpreter carries for a bridged host value. The
/// interpreter never looks inside; the last clone dropping runs disposal
/// exactly once.
pub type ForeignHandle = Rc<RefCell<dyn Any>>;

pub type NativeFn = Rc<dyn Fn(&mut Interp, Vec<Value>) -> Result<Value, ScriptError>>;

pub struct Closure {
    pub params: Vec<Rc<str>>,
    pub body: Vec<Value>,
    pub env: Rc<RefCell<Scope>>,
    pub is_macro: bool,
}

#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Symbol(Rc<str>),
    List(Rc<Vec<Value>>),
    Closure(Rc<Closure>),
    Native(NativeFn),
    Foreign(ForeignHandle),
}

impl Value {
    /// nil and false are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Closure(_) | Value::Native(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Closure(c) if c.is_macro => "macro",
            Value::Closure(_) => "function",
            Value::Native(_) => "native function",
            Value::Foreign(_) => "foreign value",
        }
    }

    pub fn as_number(&self) -> Result<f64, ScriptError> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(ScriptError::type_error("number", other.type_name())),
        }
    }

    pub fn as_symbol(&self) -> Result<&Rc<str>, ScriptError> {
        match self {
            Value::Symbol(s) => Ok(s),
            other => Err(ScriptError::type_error("symbol", other.type_name())),
        }
    }

    pub fn as_str(&self) -> Result<&Rc<str>, ScriptError> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(ScriptError::type_error("string", other.type_name())),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Foreign(a), Value::Foreign(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Canonical number text: whole values print without a fraction.
pub fn write_number(out: &mut impl fmt::Write, n: f64) -> fmt::Result {
    if n.is_finite() && n == n.trunc() && n.abs() < 1e15 {
        write!(out, "{}", n as i64)
    } else {
        write!(out, "{n}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil | Value::Bool(false) => write!(f, "nil"),
            Value::Bool(true) => write!(f, "t"),
            Value::Number(n) => write_number(f, *n),
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ")")
            }
            Value::Closure(c) if c.is_macro => write!(f, "<macro>"),
            Value::Closure(_) => write!(f, "<fn>"),
            Value::Native(_) => write!(f, "<native>"),
            Value::Foreign(_) => write!(f, "<foreign>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_text_is_canonical() {
        assert_eq!(Value::Number(2.0).to_string(), "2");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-0.25).to_string(), "-0.25");
    }

    #[test]
    fn list_display_round_trips_structure() {
        let v = Value::List(Rc::new(vec![
            Value::Symbol("vec3".into()),
            Value::Number(1.0),
            Value::Str("red".into()),
        ]));
        assert_eq!(v.to_string(), "(vec3 1 \"red\")");
    }

    #[test]
    fn truthiness_matches_nil_rules() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::Str("".into()).is_truthy());
    }
}
