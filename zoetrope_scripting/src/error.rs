use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed source text that could not be read into forms.
    Parse,
    /// Wrong kind of value passed where another was required.
    Type,
    /// A `require`d file was missing or unreadable.
    Resolution,
    /// Nesting or call depth limit exceeded.
    Depth,
    /// Any other evaluation failure.
    Eval,
}

/// A scripting error carrying the call-stack symbols, innermost first.
#[derive(Debug, Clone, Error)]
#[error("{message}{}", trace_suffix(.trace))]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub message: String,
    pub trace: Vec<String>,
}

fn trace_suffix(trace: &[String]) -> String {
    let mut out = String::new();
    for sym in trace {
        out.push_str("\n=> ");
        out.push_str(sym);
    }
    out
}

impl ScriptError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            trace: Vec::new(),
        }
    }

    pub fn eval(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Eval, message)
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        Self::new(ErrorKind::Type, format!("expect {expected}, got {got}"))
    }

    /// Record `sym` as the next-outer frame of the failing call.
    pub fn pushed(mut self, sym: &str) -> Self {
        self.trace.push(sym.to_string());
        self
    }
}
