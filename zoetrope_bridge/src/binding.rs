use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;

use glam::Vec3;

use zoetrope_scene::{SharedScalar, SharedVec3, shared_scalar};
use zoetrope_scripting::{Interp, ScriptError, Value};

use crate::host_value;
use crate::runtime::BridgeState;

/// One per-tick update. A driver owns a strong reference to its callable
/// and to the cell it writes; the cell outlives any interpreter handle the
/// authoring script held.
#[derive(Clone)]
pub enum Driver {
    Scalar {
        cell: SharedScalar,
        func: Value,
    },
    Vector {
        cell: SharedVec3,
        func: Value,
    },
    LfoScalar {
        cell: SharedScalar,
        center: f32,
        amp: f32,
        freq: f32,
    },
    LfoVector {
        cell: SharedVec3,
        center: Vec3,
        amp: Vec3,
        freq: f32,
    },
}

/// Turn a script argument into a scalar cell: an existing reactive scalar
/// is aliased, a number becomes a constant cell, a callable gets a driver
/// registered (its value becomes correct on the first tick).
pub fn bind_scalar(
    state: &Rc<RefCell<BridgeState>>,
    arg: &Value,
) -> Result<SharedScalar, ScriptError> {
    if let Some(cell) = host_value::scalar_cell(arg) {
        return Ok(cell);
    }
    if arg.is_callable() {
        let cell = shared_scalar(0.0);
        state.borrow_mut().drivers.push(Driver::Scalar {
            cell: cell.clone(),
            func: arg.clone(),
        });
        return Ok(cell);
    }
    match arg {
        Value::Number(n) => Ok(shared_scalar(*n as f32)),
        other => Err(ScriptError::type_error(
            "number",
            &host_value::described(other),
        )),
    }
}

/// Vector counterpart of [`bind_scalar`]. A callable driver overwrites all
/// three components from the vec3 it returns each tick.
pub fn bind_vector(
    state: &Rc<RefCell<BridgeState>>,
    arg: &Value,
) -> Result<SharedVec3, ScriptError> {
    if let Some(cell) = host_value::vector_cell(arg) {
        return Ok(cell);
    }
    if let Some(v) = host_value::static_vec3(arg) {
        return Ok(SharedVec3::constant(v));
    }
    if arg.is_callable() {
        let cell = SharedVec3::zeroed();
        state.borrow_mut().drivers.push(Driver::Vector {
            cell: cell.clone(),
            func: arg.clone(),
        });
        return Ok(cell);
    }
    Err(ScriptError::type_error("vec3", &host_value::described(arg)))
}

/// Evaluate one driver at time `t` and store the result into its cell.
pub fn run_driver(interp: &mut Interp, driver: &Driver, t: f32) -> Result<(), ScriptError> {
    match driver {
        Driver::Scalar { cell, func } => {
            let out = interp.call(func, vec![Value::Number(f64::from(t))])?;
            *cell.borrow_mut() = out.as_number()? as f32;
        }
        Driver::Vector { cell, func } => {
            let out = interp.call(func, vec![Value::Number(f64::from(t))])?;
            cell.set(host_value::sample_vec3(&out)?);
        }
        Driver::LfoScalar {
            cell,
            center,
            amp,
            freq,
        } => {
            *cell.borrow_mut() = center + amp * (TAU * freq * t).sin();
        }
        Driver::LfoVector {
            cell,
            center,
            amp,
            freq,
        } => {
            cell.set(*center + *amp * (TAU * freq * t).sin());
        }
    }
    Ok(())
}
