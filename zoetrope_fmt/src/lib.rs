//! Canonical pretty-printer for script sources. The editor runs every
//! buffer through [`format_source`] after a successful evaluation; the
//! output is stable, so formatting already-canonical text is a no-op.

use phf::phf_set;
use thiserror::Error;

use zoetrope_scripting::value::write_number;
use zoetrope_scripting::{Form, ScriptError, parse_top_forms};

/// Malformed text that cannot be canonicalized. Kept apart from
/// evaluation errors so a host can still show an evaluation result for
/// text it failed to reformat.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("format: {0}")]
    Parse(#[from] ScriptError),
}

/// Heads whose forms read naturally as one-line values. Anything else
/// starts a new line when it appears as an argument.
static INLINE_HEADS: phf::Set<&'static str> = phf_set! {
    "+", "-", "*", "/", "%", "<", "<=", "is", "not",
    "min", "max", "rad", "deg", "floor", "ceil", "abs", "sqrt",
    "sin", "cos", "tan", "acos", "atan", "fsin", "fcos",
    "vec3", "color", "lfo", "quote", "car", "cdr", "cons", "list",
};

const INDENT_STEP: usize = 2;

/// Definition heads whose first two arguments stay glued to the head
/// line: the name/parameter list never drops onto its own line.
fn glued_args(form: &Form) -> usize {
    match form.head_symbol() {
        Some("fn" | "mac" | "=") => 2,
        _ => 0,
    }
}

/// Reparse `src` and print it back in canonical layout: one blank line
/// between top-level forms, two-space indents, single trailing newline.
pub fn format_source(src: &str) -> Result<String, FormatError> {
    let forms = parse_top_forms(src)?;
    let mut out = String::new();
    for (i, (_, form)) in forms.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        write_form(&mut out, form, 0);
    }
    if !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

fn fits_inline(form: &Form) -> bool {
    match form {
        Form::Comment(_) => false,
        Form::List(items) => match items.split_first() {
            None => true,
            Some((Form::Symbol(head), rest)) => {
                INLINE_HEADS.contains(head.as_str()) && rest.iter().all(fits_inline)
            }
            // Data lists with no symbol head, like quoted number rows.
            Some(_) => items.iter().all(fits_inline),
        },
        _ => true,
    }
}

fn write_inline(out: &mut String, form: &Form) {
    match form {
        Form::Number(n) => {
            let _ = write_number(out, *n);
        }
        Form::Symbol(s) => out.push_str(s),
        Form::Str(s) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
        Form::Comment(text) => {
            out.push(';');
            if !text.is_empty() {
                out.push(' ');
                out.push_str(text);
            }
        }
        Form::List(items) => {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_inline(out, item);
            }
            out.push(')');
        }
    }
}

fn write_form(out: &mut String, form: &Form, indent: usize) {
    let Form::List(items) = form else {
        return write_inline(out, form);
    };
    if fits_inline(form) {
        return write_inline(out, form);
    }

    let mark = out.len();
    out.push('(');
    write_form(out, &items[0], indent);
    // A comment runs to end of line, so nothing may share its line.
    let head_is_comment = matches!(items[0], Form::Comment(_));

    let glue = glued_args(form);
    let mut idx = 1;
    while !head_is_comment
        && idx < items.len()
        && idx <= glue
        && !matches!(items[idx], Form::Comment(_))
    {
        out.push(' ');
        write_form(out, &items[idx], indent);
        idx += 1;
    }

    // Inline arguments continue the head line until something breaks it.
    while !head_is_comment
        && idx < items.len()
        && fits_inline(&items[idx])
        && !out[mark..].contains('\n')
    {
        out.push(' ');
        write_inline(out, &items[idx]);
        idx += 1;
    }

    for item in &items[idx..] {
        out.push('\n');
        for _ in 0..indent + INDENT_STEP {
            out.push(' ');
        }
        write_form(out, item, indent + INDENT_STEP);
    }
    if matches!(items.last(), Some(Form::Comment(_))) {
        out.push('\n');
        for _ in 0..indent {
            out.push(' ');
        }
    }
    out.push(')');
}
