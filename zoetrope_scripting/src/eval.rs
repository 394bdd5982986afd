use std::cell::RefCell;
use std::rc::Rc;

use crate::env::Scope;
use crate::error::{ErrorKind, ScriptError};
use crate::syntax::{Form, parse_forms};
use crate::value::{Closure, NativeFn, Value};

/// Closure/native call depth bound.
pub const MAX_CALL_DEPTH: usize = 200;

/// Lower a parsed form into a code-as-data value. Comments lower to `None`
/// and disappear from evaluation.
pub fn lower(form: &Form) -> Option<Value> {
    match form {
        Form::Number(n) => Some(Value::Number(*n)),
        Form::Symbol(s) => Some(Value::Symbol(Rc::from(s.as_str()))),
        Form::Str(s) => Some(Value::Str(Rc::from(s.as_str()))),
        Form::List(items) => Some(Value::List(Rc::new(
            items.iter().filter_map(lower).collect(),
        ))),
        Form::Comment(_) => None,
    }
}

/// The embedded interpreter. The bridge layer consumes this API; nothing
/// in here knows about scenes or host values.
pub struct Interp {
    globals: Rc<RefCell<Scope>>,
    depth: usize,
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}

impl Interp {
    pub fn new() -> Self {
        let mut interp = Interp {
            globals: Scope::root(),
            depth: 0,
        };
        interp.set_global("t", Value::Bool(true));
        interp.set_global("nil", Value::Nil);
        for (name, f) in CORE_BUILTINS {
            interp.register_native(name, Rc::new(*f));
        }
        interp
    }

    pub fn globals(&self) -> &Rc<RefCell<Scope>> {
        &self.globals
    }

    pub fn register_native(&mut self, name: &str, f: NativeFn) {
        self.set_global(name, Value::Native(f));
    }

    pub fn set_global(&mut self, name: &str, value: Value) {
        Scope::define(&self.globals, Rc::from(name), value);
    }

    pub fn get_global(&self, name: &str) -> Option<Value> {
        Scope::lookup(&self.globals, name)
    }

    /// Evaluate source text form by form in the global scope, returning the
    /// last form's value.
    pub fn eval_source(&mut self, src: &str) -> Result<Value, ScriptError> {
        let forms = parse_forms(src)?;
        let scope = Rc::clone(&self.globals);
        let mut last = Value::Nil;
        for form in &forms {
            if let Some(v) = lower(form) {
                last = self.eval(&v, &scope)?;
            }
        }
        Ok(last)
    }

    /// Host entry point for invoking a callable (tick drivers).
    pub fn call(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, ScriptError> {
        self.apply(callee, args)
    }

    pub fn eval(
        &mut self,
        value: &Value,
        scope: &Rc<RefCell<Scope>>,
    ) -> Result<Value, ScriptError> {
        match value {
            Value::Symbol(name) => Scope::lookup(scope, name)
                .ok_or_else(|| ScriptError::eval(format!("undefined symbol `{name}`"))),
            Value::List(items) => self.eval_list(items, scope),
            other => Ok(other.clone()),
        }
    }

    fn eval_list(
        &mut self,
        items: &[Value],
        scope: &Rc<RefCell<Scope>>,
    ) -> Result<Value, ScriptError> {
        let Some(head) = items.first() else {
            return Ok(Value::Nil);
        };

        if let Value::Symbol(name) = head {
            match name.as_ref() {
                "quote" => {
                    return Ok(items.get(1).cloned().unwrap_or(Value::Nil));
                }
                "=" | "let" => {
                    let sym = items
                        .get(1)
                        .ok_or_else(|| ScriptError::eval(format!("`{name}` needs a symbol")))?
                        .as_symbol()?
                        .clone();
                    let val = match items.get(2) {
                        Some(v) => self.eval(v, scope)?,
                        None => Value::Nil,
                    };
                    if name.as_ref() == "=" {
                        Scope::define_global(scope, sym, val.clone());
                    } else {
                        Scope::define(scope, sym, val.clone());
                    }
                    return Ok(val);
                }
                "fn" | "mac" => {
                    let params = match items.get(1) {
                        Some(Value::List(ps)) => ps
                            .iter()
                            .map(|p| p.as_symbol().cloned())
                            .collect::<Result<Vec<_>, _>>()?,
                        Some(Value::Nil) | None => Vec::new(),
                        Some(other) => {
                            return Err(ScriptError::type_error(
                                "parameter list",
                                other.type_name(),
                            ));
                        }
                    };
                    return Ok(Value::Closure(Rc::new(Closure {
                        params,
                        body: items[2..].to_vec(),
                        env: Rc::clone(scope),
                        is_macro: name.as_ref() == "mac",
                    })));
                }
                "if" => {
                    let mut i = 1;
                    while i + 1 < items.len() {
                        if self.eval(&items[i], scope)?.is_truthy() {
                            return self.eval(&items[i + 1], scope);
                        }
                        i += 2;
                    }
                    return match items.get(i) {
                        Some(alt) => self.eval(alt, scope),
                        None => Ok(Value::Nil),
                    };
                }
                "do" => {
                    let mut last = Value::Nil;
                    for item in &items[1..] {
                        last = self.eval(item, scope)?;
                    }
                    return Ok(last);
                }
                "while" => {
                    let cond = items
                        .get(1)
                        .ok_or_else(|| ScriptError::eval("`while` needs a condition"))?;
                    while self.eval(cond, scope)?.is_truthy() {
                        for item in &items[2..] {
                            self.eval(item, scope)?;
                        }
                    }
                    return Ok(Value::Nil);
                }
                "and" => {
                    let mut last = Value::Bool(true);
                    for item in &items[1..] {
                        last = self.eval(item, scope)?;
                        if !last.is_truthy() {
                            return Ok(last);
                        }
                    }
                    return Ok(last);
                }
                "or" => {
                    for item in &items[1..] {
                        let v = self.eval(item, scope)?;
                        if v.is_truthy() {
                            return Ok(v);
                        }
                    }
                    return Ok(Value::Nil);
                }
                _ => {}
            }
        }

        let callee = self.eval(head, scope)?;
        let result = if let Value::Closure(c) = &callee {
            if c.is_macro {
                // Macros receive the argument forms unevaluated; the
                // expansion is then evaluated in the caller's scope.
                let expansion = self.apply(&callee, items[1..].to_vec())?;
                self.eval(&expansion, scope)
            } else {
                let args = self.eval_args(&items[1..], scope)?;
                self.apply(&callee, args)
            }
        } else {
            let args = self.eval_args(&items[1..], scope)?;
            self.apply(&callee, args)
        };

        match head {
            Value::Symbol(name) => result.map_err(|e| e.pushed(name)),
            _ => result,
        }
    }

    fn eval_args(
        &mut self,
        items: &[Value],
        scope: &Rc<RefCell<Scope>>,
    ) -> Result<Vec<Value>, ScriptError> {
        items.iter().map(|v| self.eval(v, scope)).collect()
    }

    fn apply(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, ScriptError> {
        match callee {
            Value::Native(f) => {
                let f = Rc::clone(f);
                f(self, args)
            }
            Value::Closure(c) => {
                self.depth += 1;
                let result = if self.depth > MAX_CALL_DEPTH {
                    Err(ScriptError::new(
                        ErrorKind::Depth,
                        format!("call depth deeper than {MAX_CALL_DEPTH}"),
                    ))
                } else {
                    self.run_closure(c, args)
                };
                self.depth -= 1;
                result
            }
            other => Err(ScriptError::type_error("function", other.type_name())),
        }
    }

    fn run_closure(&mut self, c: &Closure, args: Vec<Value>) -> Result<Value, ScriptError> {
        if args.len() != c.params.len() {
            return Err(ScriptError::eval(format!(
                "expected {} arguments, got {}",
                c.params.len(),
                args.len()
            )));
        }
        let scope = Scope::child(&c.env);
        for (param, arg) in c.params.iter().zip(args) {
            Scope::define(&scope, param.clone(), arg);
        }
        let mut last = Value::Nil;
        for item in &c.body {
            last = self.eval(item, &scope)?;
        }
        Ok(last)
    }
}

type Builtin = fn(&mut Interp, Vec<Value>) -> Result<Value, ScriptError>;

const CORE_BUILTINS: &[(&str, Builtin)] = &[
    ("+", b_add),
    ("-", b_sub),
    ("*", b_mul),
    ("/", b_div),
    ("<", b_lt),
    ("<=", b_le),
    ("is", b_is),
    ("not", b_not),
    ("atom", b_atom),
    ("car", b_car),
    ("cdr", b_cdr),
    ("cons", b_cons),
    ("list", b_list),
    ("print", b_print),
];

fn expect_arity(args: &[Value], n: usize) -> Result<(), ScriptError> {
    if args.len() != n {
        return Err(ScriptError::eval(format!(
            "expected {n} arguments, got {}",
            args.len()
        )));
    }
    Ok(())
}

fn b_add(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let mut sum = 0.0;
    for a in &args {
        sum += a.as_number()?;
    }
    Ok(Value::Number(sum))
}

fn b_sub(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let mut it = args.iter();
    let first = it
        .next()
        .ok_or_else(|| ScriptError::eval("`-` expects at least 1 argument"))?
        .as_number()?;
    if args.len() == 1 {
        return Ok(Value::Number(-first));
    }
    let mut acc = first;
    for a in it {
        acc -= a.as_number()?;
    }
    Ok(Value::Number(acc))
}

fn b_mul(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let mut product = 1.0;
    for a in &args {
        product *= a.as_number()?;
    }
    Ok(Value::Number(product))
}

fn b_div(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let mut it = args.iter();
    let mut acc = it
        .next()
        .ok_or_else(|| ScriptError::eval("`/` expects at least 1 argument"))?
        .as_number()?;
    for a in it {
        acc /= a.as_number()?;
    }
    Ok(Value::Number(acc))
}

fn chain_compare(args: &[Value], ok: fn(f64, f64) -> bool) -> Result<Value, ScriptError> {
    for pair in args.windows(2) {
        if !ok(pair[0].as_number()?, pair[1].as_number()?) {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn b_lt(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    chain_compare(&args, |a, b| a < b)
}

fn b_le(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    chain_compare(&args, |a, b| a <= b)
}

fn b_is(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    expect_arity(&args, 2)?;
    Ok(Value::Bool(args[0] == args[1]))
}

fn b_not(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    expect_arity(&args, 1)?;
    Ok(Value::Bool(!args[0].is_truthy()))
}

fn b_atom(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    expect_arity(&args, 1)?;
    Ok(Value::Bool(!matches!(args[0], Value::List(_))))
}

fn b_car(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    expect_arity(&args, 1)?;
    match &args[0] {
        Value::List(items) => Ok(items.first().cloned().unwrap_or(Value::Nil)),
        Value::Nil => Ok(Value::Nil),
        other => Err(ScriptError::type_error("list", other.type_name())),
    }
}

fn b_cdr(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    expect_arity(&args, 1)?;
    match &args[0] {
        Value::List(items) if items.len() > 1 => {
            Ok(Value::List(Rc::new(items[1..].to_vec())))
        }
        Value::List(_) | Value::Nil => Ok(Value::Nil),
        other => Err(ScriptError::type_error("list", other.type_name())),
    }
}

fn b_cons(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    expect_arity(&args, 2)?;
    let mut items = vec![args[0].clone()];
    match &args[1] {
        Value::List(rest) => items.extend(rest.iter().cloned()),
        Value::Nil => {}
        other => items.push(other.clone()),
    }
    Ok(Value::List(Rc::new(items)))
}

fn b_list(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    Ok(Value::List(Rc::new(args)))
}

fn b_print(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let text: Vec<String> = args.iter().map(ToString::to_string).collect();
    println!("{}", text.join(" "));
    Ok(Value::Nil)
}
