use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::value::Value;

/// One lexical scope. Scopes chain towards the globals at the root;
/// closures keep their defining scope alive through the `Rc`.
pub struct Scope {
    vars: FxHashMap<Rc<str>, Value>,
    parent: Option<Rc<RefCell<Scope>>>,
}

impl Scope {
    pub fn root() -> Rc<RefCell<Scope>> {
        Rc::new(RefCell::new(Scope {
            vars: FxHashMap::default(),
            parent: None,
        }))
    }

    pub fn child(parent: &Rc<RefCell<Scope>>) -> Rc<RefCell<Scope>> {
        Rc::new(RefCell::new(Scope {
            vars: FxHashMap::default(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    pub fn lookup(scope: &Rc<RefCell<Scope>>, name: &str) -> Option<Value> {
        let mut cur = Rc::clone(scope);
        loop {
            if let Some(v) = cur.borrow().vars.get(name) {
                return Some(v.clone());
            }
            let parent = cur.borrow().parent.clone();
            match parent {
                Some(p) => cur = p,
                None => return None,
            }
        }
    }

    /// Bind in this scope (used for `let` and closure parameters).
    pub fn define(scope: &Rc<RefCell<Scope>>, name: Rc<str>, value: Value) {
        scope.borrow_mut().vars.insert(name, value);
    }

    /// Bind at the chain root (the `=` form always assigns globally).
    pub fn define_global(scope: &Rc<RefCell<Scope>>, name: Rc<str>, value: Value) {
        let mut cur = Rc::clone(scope);
        loop {
            let parent = cur.borrow().parent.clone();
            match parent {
                Some(p) => cur = p,
                None => break,
            }
        }
        cur.borrow_mut().vars.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_falls_back_to_parent() {
        let root = Scope::root();
        Scope::define(&root, "a".into(), Value::Number(1.0));
        let inner = Scope::child(&root);
        Scope::define(&inner, "b".into(), Value::Number(2.0));

        assert_eq!(Scope::lookup(&inner, "a"), Some(Value::Number(1.0)));
        assert_eq!(Scope::lookup(&inner, "b"), Some(Value::Number(2.0)));
        assert_eq!(Scope::lookup(&root, "b"), None);
    }

    #[test]
    fn define_global_writes_to_root() {
        let root = Scope::root();
        let inner = Scope::child(&root);
        Scope::define_global(&inner, "x".into(), Value::Number(3.0));
        assert_eq!(Scope::lookup(&root, "x"), Some(Value::Number(3.0)));
    }
}
