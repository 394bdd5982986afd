use std::cell::RefCell;
use std::io;
use std::path::Path;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use zoetrope_scene::SceneHandler;
use zoetrope_scripting::{Form, Interp, ScriptError, Value, parse_top_forms};

use crate::binding::{Driver, run_driver};
use crate::builders;
use crate::session::SessionStore;

/// Global under which scripts reach the bridge state.
pub const HOST_GLOBAL: &str = "self";

/// File extension for script sources, without the dot.
pub const SCRIPT_EXTENSION: &str = "zt";

/// Everything the scene-construction natives mutate: the driver registry,
/// the session's file cache, the memo table for `require`, and the scene
/// sink itself.
pub struct BridgeState {
    pub drivers: Vec<Driver>,
    pub session: SessionStore,
    pub scene: Box<dyn SceneHandler>,
    pub required: FxHashMap<String, Value>,
}

/// Owns an interpreter wired to a scene handler. Evaluation rebuilds the
/// scene from the session's main file; ticking advances the registered
/// drivers.
pub struct Runtime {
    interp: Interp,
    state: Rc<RefCell<BridgeState>>,
}

impl Runtime {
    pub fn new(scene: Box<dyn SceneHandler>) -> Self {
        let state = Rc::new(RefCell::new(BridgeState {
            drivers: Vec::new(),
            session: SessionStore::default(),
            scene,
            required: FxHashMap::default(),
        }));
        let mut interp = Interp::new();
        builders::install(&mut interp, &state);
        Runtime { interp, state }
    }

    pub fn new_session(&mut self, main: &Path) {
        self.state.borrow_mut().session.new_session(main);
    }

    /// Re-evaluate the session's main file. The previous scene and driver
    /// registry are cleared first, so a failed run leaves whatever partial
    /// scene was built before the error.
    pub fn eval(&mut self) -> Result<String, ScriptError> {
        let main = self.state.borrow().session.main_file().to_string();
        let src = self.state.borrow_mut().session.code_of(&main)?;
        self.eval_source(&src)
    }

    /// Evaluate source text under the same discipline as `eval`.
    pub fn eval_source(&mut self, src: &str) -> Result<String, ScriptError> {
        {
            let mut state = self.state.borrow_mut();
            state.scene.clear_scene();
            state.drivers.clear();
            state.required.clear();
        }
        let last = self.interp.eval_source(src)?;
        Ok(last.to_string())
    }

    /// Advance all registered drivers to time `t` seconds. A driver whose
    /// script callable fails keeps its last written value.
    pub fn tick(&mut self, t: f32) {
        // Cloned so a callable that re-enters the natives can borrow state.
        let drivers = self.state.borrow().drivers.clone();
        for driver in &drivers {
            if let Err(e) = run_driver(&mut self.interp, driver, t) {
                log::warn!("tick driver failed, holding last value: {e}");
            }
        }
    }

    pub fn driver_count(&self) -> usize {
        self.state.borrow().drivers.len()
    }

    pub fn interp_mut(&mut self) -> &mut Interp {
        &mut self.interp
    }

    pub fn code_of(&mut self, file: &str) -> Result<String, ScriptError> {
        self.state.borrow_mut().session.code_of(file)
    }

    pub fn set_code_of(&mut self, file: &str, code: String) {
        self.state.borrow_mut().session.set_code_of(file, code);
    }

    pub fn save_files(&mut self) -> io::Result<()> {
        self.state.borrow_mut().session.save_files()
    }

    pub fn used_files(&self) -> Vec<String> {
        self.state.borrow().session.used_files()
    }

    pub fn has_changes(&self) -> bool {
        self.state.borrow().session.has_changes()
    }
}

/// Top-level `(= name ...)` forms of a source, with 1-based line numbers.
/// Editors use this for their definition outline.
pub fn definitions_in(src: &str) -> Result<Vec<(usize, String)>, ScriptError> {
    let mut defs = Vec::new();
    for (line, form) in parse_top_forms(src)? {
        if form.head_symbol() != Some("=") {
            continue;
        }
        let Form::List(items) = &form else { continue };
        if let Some(Form::Symbol(name)) = items.get(1) {
            defs.push((line, name.clone()));
        }
    }
    Ok(defs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_outline_names_and_lines() {
        let src = "(= size 3)\n\n; helper\n(= twice\n  (fn (n) (* n 2)))\n(print 1)\n";
        let defs = definitions_in(src).unwrap();
        assert_eq!(
            defs,
            vec![(1, "size".to_string()), (4, "twice".to_string())]
        );
    }

    #[test]
    fn definition_outline_skips_malformed() {
        let defs = definitions_in("(=)\n(= 12 3)\n(= ok 1)\n").unwrap();
        assert_eq!(defs, vec![(3, "ok".to_string())]);
    }
}
