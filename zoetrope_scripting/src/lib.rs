pub mod env;
pub mod error;
pub mod eval;
pub mod syntax;
pub mod value;

pub use env::Scope;
pub use error::{ErrorKind, ScriptError};
pub use eval::{Interp, lower};
pub use syntax::{Form, parse_forms, parse_top_forms};
pub use value::{Closure, ForeignHandle, NativeFn, Value};
