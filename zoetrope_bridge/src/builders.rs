use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use glam::Vec3;

use zoetrope_scene::{Animation, Color, RenderNode, SharedVec3, cube_mesh, shared_scalar};
use zoetrope_scripting::{Interp, NativeFn, ScriptError, Value};

use crate::binding::{Driver, bind_scalar, bind_vector};
use crate::host_value::{self, HostValue, wrap};
use crate::runtime::{BridgeState, HOST_GLOBAL, SCRIPT_EXTENSION};

/// Install the scene-construction vocabulary and the numeric helpers into
/// an interpreter, with `state` reachable through the reserved host global.
pub fn install(interp: &mut Interp, state: &Rc<RefCell<BridgeState>>) {
    interp.set_global(HOST_GLOBAL, wrap(HostValue::Host(Rc::clone(state))));
    interp.set_global("pi", Value::Number(PI));

    let natives: &[(&str, fn(&mut Interp, Vec<Value>) -> Result<Value, ScriptError>)] = &[
        ("vec3", n_vec3),
        ("color", n_color),
        ("cube", n_cube),
        ("group", n_group),
        // Edit-mode scenery; renders as a plain group here.
        ("helper", n_group),
        ("translate", n_translate),
        ("rotate", n_rotate),
        ("rotateX", n_rotate_x),
        ("rotateY", n_rotate_y),
        ("rotateZ", n_rotate_z),
        ("scale", n_scale),
        ("animation", n_animation),
        ("lfo", n_lfo),
        ("require", n_require),
        ("%", n_mod),
        ("min", n_min),
        ("max", n_max),
        ("rad", n_rad),
        ("deg", n_deg),
        ("fsin", n_fsin),
        ("fcos", n_fcos),
    ];
    for (name, f) in natives {
        interp.register_native(name, Rc::new(*f) as NativeFn);
    }

    let unary: &[(&str, fn(f64) -> f64)] = &[
        ("floor", f64::floor),
        ("ceil", f64::ceil),
        ("abs", f64::abs),
        ("sqrt", f64::sqrt),
        ("sin", f64::sin),
        ("cos", f64::cos),
        ("tan", f64::tan),
        ("acos", f64::acos),
        ("atan", f64::atan),
    ];
    for (name, f) in unary {
        let f = *f;
        interp.register_native(
            name,
            Rc::new(move |_: &mut Interp, args: Vec<Value>| {
                let n = required(&args, 0, "number")?.as_number()?;
                Ok(Value::Number(f(n)))
            }),
        );
    }
}

fn required<'a>(args: &'a [Value], i: usize, what: &str) -> Result<&'a Value, ScriptError> {
    args.get(i)
        .ok_or_else(|| ScriptError::eval(format!("missing {what} argument")))
}

fn take_children(args: &[Value]) -> Result<Vec<RenderNode>, ScriptError> {
    args.iter().map(host_value::take_node).collect()
}

fn n_vec3(interp: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    // All-literal arguments build a static vector; anything reactive or
    // callable falls through to the cell-backed form.
    let literals: Option<Vec<f32>> = args
        .iter()
        .map(|a| match a {
            Value::Number(n) => Some(*n as f32),
            _ => None,
        })
        .collect();
    if let Some(ns) = literals {
        let v = match ns.as_slice() {
            [x] => Vec3::splat(*x),
            [x, y, z] => Vec3::new(*x, *y, *z),
            _ => {
                return Err(ScriptError::eval(format!(
                    "vec3 expects 1 or 3 arguments, got {}",
                    ns.len()
                )));
            }
        };
        return Ok(wrap(HostValue::Vec3(v)));
    }

    let state = host_value::host_of(interp)?;
    let cell = match args.len() {
        // One argument broadcasts: all three components alias one cell.
        1 => {
            let x = bind_scalar(&state, &args[0])?;
            SharedVec3 {
                x: x.clone(),
                y: x.clone(),
                z: x,
            }
        }
        3 => SharedVec3 {
            x: bind_scalar(&state, &args[0])?,
            y: bind_scalar(&state, &args[1])?,
            z: bind_scalar(&state, &args[2])?,
        },
        n => {
            return Err(ScriptError::eval(format!(
                "vec3 expects 1 or 3 arguments, got {n}"
            )));
        }
    };
    Ok(wrap(HostValue::Vector(cell)))
}

fn n_color(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let first = required(&args, 0, "color")?;
    if let Value::Str(name) = first {
        let color = Color::from_name(name)
            .ok_or_else(|| ScriptError::eval(format!("unknown color \"{name}\"")))?;
        return Ok(wrap(HostValue::Color(color)));
    }

    let chan = |v: &Value| -> Result<u8, ScriptError> {
        Ok(v.as_number()?.clamp(0.0, 255.0) as u8)
    };
    let r = chan(first)?;
    let g = chan(required(&args, 1, "green channel")?)?;
    let b = chan(required(&args, 2, "blue channel")?)?;
    let a = match args.get(3) {
        Some(v) => chan(v)?,
        None => 255,
    };
    Ok(wrap(HostValue::Color(Color::rgba(r, g, b, a))))
}

fn n_cube(interp: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let state = host_value::host_of(interp)?;
    let scale = match args.first() {
        Some(v) => bind_vector(&state, v)?,
        None => SharedVec3::splat(1.0),
    };
    let color = match args.get(1) {
        Some(v) => host_value::unwrap_color(v)?,
        None => Color::default(),
    };
    Ok(wrap(HostValue::Node(RenderNode::primitive(
        cube_mesh(),
        color,
        scale,
    ))))
}

fn n_group(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    Ok(wrap(HostValue::Node(RenderNode::group(take_children(
        &args,
    )?))))
}

fn n_translate(interp: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let state = host_value::host_of(interp)?;
    let offset = bind_vector(&state, required(&args, 0, "offset")?)?;
    Ok(wrap(HostValue::Node(RenderNode::Translate {
        offset,
        children: take_children(&args[1..])?,
    })))
}

fn n_rotate(interp: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let state = host_value::host_of(interp)?;
    let angle = bind_scalar(&state, required(&args, 0, "angle")?)?;
    let axis = bind_vector(&state, required(&args, 1, "axis")?)?;
    Ok(wrap(HostValue::Node(RenderNode::Rotate {
        angle,
        axis,
        children: take_children(&args[2..])?,
    })))
}

fn rotate_fixed_axis(
    interp: &mut Interp,
    args: Vec<Value>,
    axis: Vec3,
) -> Result<Value, ScriptError> {
    let state = host_value::host_of(interp)?;
    let angle = bind_scalar(&state, required(&args, 0, "angle")?)?;
    Ok(wrap(HostValue::Node(RenderNode::Rotate {
        angle,
        axis: SharedVec3::constant(axis),
        children: take_children(&args[1..])?,
    })))
}

fn n_rotate_x(interp: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    rotate_fixed_axis(interp, args, Vec3::X)
}

fn n_rotate_y(interp: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    rotate_fixed_axis(interp, args, Vec3::Y)
}

fn n_rotate_z(interp: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    rotate_fixed_axis(interp, args, Vec3::Z)
}

fn n_scale(interp: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let state = host_value::host_of(interp)?;
    let first = required(&args, 0, "factor")?;
    let factor = match first {
        Value::Number(n) => SharedVec3::splat(*n as f32),
        other => bind_vector(&state, other)?,
    };
    Ok(wrap(HostValue::Node(RenderNode::Scale {
        factor,
        children: take_children(&args[1..])?,
    })))
}

fn n_animation(interp: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let state = host_value::host_of(interp)?;
    let name = required(&args, 0, "name")?.as_str()?.to_string();
    let length = required(&args, 1, "length")?.as_number()? as f32;
    // Light position is sampled once at registration time.
    let light_pos = bind_vector(&state, required(&args, 2, "light position")?)?.get();
    let root = host_value::take_node(required(&args, 3, "root node")?)?;
    state.borrow_mut().scene.add_animation(Animation {
        name,
        length,
        light_pos,
        root,
    });
    Ok(Value::Nil)
}

fn n_lfo(interp: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let state = host_value::host_of(interp)?;
    let first = required(&args, 0, "center")?;
    let amp_arg = required(&args, 1, "amplitude")?;
    let freq = required(&args, 2, "frequency")?.as_number()? as f32;

    // Scalar or vector oscillator, dispatched on the center argument.
    if host_value::vector_cell(first).is_some() || host_value::static_vec3(first).is_some() {
        let center = host_value::sample_vec3(first)?;
        let amp = host_value::sample_vec3(amp_arg)?;
        let cell = SharedVec3::constant(center);
        state.borrow_mut().drivers.push(Driver::LfoVector {
            cell: cell.clone(),
            center,
            amp,
            freq,
        });
        return Ok(wrap(HostValue::Vector(cell)));
    }

    let center = first.as_number()? as f32;
    let amp = amp_arg.as_number()? as f32;
    let cell = shared_scalar(center);
    state.borrow_mut().drivers.push(Driver::LfoScalar {
        cell: cell.clone(),
        center,
        amp,
        freq,
    });
    Ok(wrap(HostValue::Scalar(cell)))
}

fn n_require(interp: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let state = host_value::host_of(interp)?;
    let mut last = Value::Nil;
    for arg in &args {
        let dotted = arg.as_str()?;
        let rel = format!("{}.{SCRIPT_EXTENSION}", dotted.replace('.', "/"));

        let memoized = state.borrow().required.get(&rel).cloned();
        if let Some(v) = memoized {
            last = v;
            continue;
        }
        // Placeholder breaks require cycles within one evaluation pass.
        state
            .borrow_mut()
            .required
            .insert(rel.clone(), Value::Nil);
        let text = state.borrow_mut().session.code_of(&rel)?;
        last = interp.eval_source(&text)?;
        state.borrow_mut().required.insert(rel, last.clone());
    }
    Ok(last)
}

fn n_mod(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let mut a = required(&args, 0, "number")?.as_number()?;
    for b in &args[1..] {
        let b = b.as_number()?;
        a -= (a / b).floor() * b;
    }
    Ok(Value::Number(a))
}

fn n_min(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let mut a = required(&args, 0, "number")?.as_number()?;
    for b in &args[1..] {
        a = a.min(b.as_number()?);
    }
    Ok(Value::Number(a))
}

fn n_max(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let mut a = required(&args, 0, "number")?.as_number()?;
    for b in &args[1..] {
        a = a.max(b.as_number()?);
    }
    Ok(Value::Number(a))
}

fn n_rad(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let n = required(&args, 0, "degrees")?.as_number()?;
    Ok(Value::Number(PI * (n / 180.0)))
}

fn n_deg(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let n = required(&args, 0, "radians")?.as_number()?;
    Ok(Value::Number(180.0 * (n / PI)))
}

/// `(fsin n [f])` — sine of `n` turns, optionally frequency-scaled.
fn n_fsin(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let n = required(&args, 0, "number")?.as_number()?;
    let f = match args.get(1) {
        Some(v) => v.as_number()?,
        None => 1.0,
    };
    Ok(Value::Number((f * 2.0 * n * PI).sin()))
}

fn n_fcos(_: &mut Interp, args: Vec<Value>) -> Result<Value, ScriptError> {
    let n = required(&args, 0, "number")?.as_number()?;
    let f = match args.get(1) {
        Some(v) => v.as_number()?,
        None => 1.0,
    };
    Ok(Value::Number((f * 2.0 * n * PI).cos()))
}
