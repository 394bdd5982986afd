use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use zoetrope_scene::{Color, RenderNode, SharedScalar, SharedVec3};
use zoetrope_scripting::{ErrorKind, Interp, ScriptError, Value};

use crate::runtime::{BridgeState, HOST_GLOBAL};

/// The tagged union stored behind the interpreter's opaque handles. The
/// variant never changes after construction, with one exception: moving a
/// render node out transitions `Node` to `Consumed`, which makes adopting
/// the same node twice unrepresentable.
pub enum HostValue {
    Node(RenderNode),
    Consumed,
    Scalar(SharedScalar),
    Vector(SharedVec3),
    Vec3(Vec3),
    Color(Color),
    Host(Rc<RefCell<BridgeState>>),
}

impl HostValue {
    pub fn variant_name(&self) -> &'static str {
        match self {
            HostValue::Node(_) => "render node",
            HostValue::Consumed => "consumed render node",
            HostValue::Scalar(_) => "reactive number",
            HostValue::Vector(_) => "vec3",
            HostValue::Vec3(_) => "vec3",
            HostValue::Color(_) => "color",
            HostValue::Host(_) => "host reference",
        }
    }
}

/// Move a host value behind an interpreter handle; ownership transfers to
/// the handle, and the last clone dropping disposes it.
pub fn wrap(v: HostValue) -> Value {
    Value::Foreign(Rc::new(RefCell::new(v)))
}

/// Run `f` against the host value behind `v`, if there is one.
fn with_host<R>(v: &Value, f: impl FnOnce(&mut HostValue) -> R) -> Option<R> {
    match v {
        Value::Foreign(handle) => {
            let mut borrowed = handle.borrow_mut();
            borrowed.downcast_mut::<HostValue>().map(f)
        }
        _ => None,
    }
}

pub(crate) fn described(v: &Value) -> String {
    match v {
        Value::Foreign(_) => {
            with_host(v, |hv| hv.variant_name().to_string())
                .unwrap_or_else(|| "foreign value".to_string())
        }
        other => other.type_name().to_string(),
    }
}

/// Move the render node out of its handle. The handle's tag becomes
/// `Consumed`; a second extraction reports the double-adoption error.
pub fn take_node(v: &Value) -> Result<RenderNode, ScriptError> {
    with_host(v, |hv| match std::mem::replace(hv, HostValue::Consumed) {
        HostValue::Node(node) => Ok(node),
        HostValue::Consumed => Err(ScriptError::new(
            ErrorKind::Eval,
            "render node already adopted into a scene",
        )),
        other => {
            let name = other.variant_name();
            *hv = other;
            Err(ScriptError::type_error("render node", name))
        }
    })
    .unwrap_or_else(|| Err(ScriptError::type_error("render node", &described(v))))
}

/// Alias the reactive scalar cell behind `v`, if that is what it holds.
pub fn scalar_cell(v: &Value) -> Option<SharedScalar> {
    with_host(v, |hv| match hv {
        HostValue::Scalar(cell) => Some(cell.clone()),
        _ => None,
    })
    .flatten()
}

/// Alias the reactive vector cell behind `v`, if that is what it holds.
pub fn vector_cell(v: &Value) -> Option<SharedVec3> {
    with_host(v, |hv| match hv {
        HostValue::Vector(cell) => Some(cell.clone()),
        _ => None,
    })
    .flatten()
}

pub fn static_vec3(v: &Value) -> Option<Vec3> {
    with_host(v, |hv| match hv {
        HostValue::Vec3(vec) => Some(*vec),
        _ => None,
    })
    .flatten()
}

/// Current 3-component value of `v`, whether reactive or static.
pub fn sample_vec3(v: &Value) -> Result<Vec3, ScriptError> {
    if let Some(cell) = vector_cell(v) {
        return Ok(cell.get());
    }
    static_vec3(v).ok_or_else(|| ScriptError::type_error("vec3", &described(v)))
}

pub fn unwrap_color(v: &Value) -> Result<Color, ScriptError> {
    with_host(v, |hv| match hv {
        HostValue::Color(c) => Some(*c),
        _ => None,
    })
    .flatten()
    .ok_or_else(|| ScriptError::type_error("color", &described(v)))
}

/// Resolve the bridge state through the reserved host-reference global.
pub fn host_of(interp: &Interp) -> Result<Rc<RefCell<BridgeState>>, ScriptError> {
    let value = interp
        .get_global(HOST_GLOBAL)
        .ok_or_else(|| ScriptError::eval(format!("`{HOST_GLOBAL}` is not installed")))?;
    with_host(&value, |hv| match hv {
        HostValue::Host(state) => Some(Rc::clone(state)),
        _ => None,
    })
    .flatten()
    .ok_or_else(|| ScriptError::type_error("host reference", &described(&value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zoetrope_scene::cube_mesh;

    fn cube_value() -> Value {
        wrap(HostValue::Node(RenderNode::primitive(
            cube_mesh(),
            Color::default(),
            SharedVec3::splat(1.0),
        )))
    }

    #[test]
    fn take_node_consumes_the_handle() {
        let v = cube_value();
        assert!(take_node(&v).is_ok());
        let err = take_node(&v).unwrap_err();
        assert!(err.message.contains("already adopted"));
    }

    #[test]
    fn unwraps_check_the_variant() {
        let v = wrap(HostValue::Color(Color::rgb(1, 2, 3)));
        assert_eq!(unwrap_color(&v).unwrap(), Color::rgb(1, 2, 3));
        let err = take_node(&v).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
        assert!(err.message.contains("render node"));
    }

    #[test]
    fn static_vectors_sample_without_cells() {
        let v = wrap(HostValue::Vec3(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(static_vec3(&v), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(sample_vec3(&v).unwrap(), Vec3::new(1.0, 2.0, 3.0));
        assert!(vector_cell(&v).is_none());
    }

    #[test]
    fn vector_cells_alias_not_copy() {
        let cell = SharedVec3::splat(2.0);
        let v = wrap(HostValue::Vector(cell.clone()));
        let aliased = vector_cell(&v).unwrap();
        assert!(aliased.ptr_eq(&cell));
    }

    #[test]
    fn plain_values_are_not_host_values() {
        assert!(scalar_cell(&Value::Number(1.0)).is_none());
        let err = sample_vec3(&Value::Number(1.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }
}
