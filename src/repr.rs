//! Textual representation of values.
//!
//! Rendering walks the value graph depth-first. A [`RecursionGuard`] owned by
//! the top-level call records the identities currently being rendered on this
//! path, so a value that reaches itself renders a placeholder instead of
//! recursing forever. The guard is passed down explicitly; concurrent renders
//! never share one.

use crate::types::FastHashSet;
use crate::value::Value;
use std::fmt::Write;

/// Identities of the shared values on the current traversal path.
#[derive(Debug, Default)]
pub struct RecursionGuard {
    active: FastHashSet<usize>,
}

impl RecursionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as in progress. Returns false if it already was.
    #[inline]
    pub fn enter(&mut self, id: usize) -> bool {
        self.active.insert(id)
    }

    #[inline]
    pub fn leave(&mut self, id: usize) {
        self.active.remove(&id);
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl Value {
    /// Render the value the way it would be written as a literal.
    pub fn repr(&self) -> String {
        let mut guard = RecursionGuard::new();
        let mut out = String::new();
        self.render(&mut guard, &mut out);
        out
    }

    pub fn render(&self, guard: &mut RecursionGuard, out: &mut String) {
        match self {
            Value::None => out.push_str("None"),
            Value::Bool(true) => out.push_str("True"),
            Value::Bool(false) => out.push_str("False"),
            Value::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Value::Float(f) => render_float(*f, out),
            Value::Str(s) => render_str(s, out),
            Value::Tuple(items) => {
                out.push('(');
                render_items(items, guard, out);
                if items.len() == 1 {
                    out.push(',');
                }
                out.push(')');
            }
            Value::List(items) => {
                let id = self.identity().unwrap_or_default();
                if !guard.enter(id) {
                    out.push_str("[...]");
                    return;
                }
                let items = items.read().clone();
                out.push('[');
                render_items(&items, guard, out);
                out.push(']');
                guard.leave(id);
            }
            Value::Set(items) => {
                let id = self.identity().unwrap_or_default();
                if !guard.enter(id) {
                    out.push_str("{...}");
                    return;
                }
                let items = items.read().clone();
                if items.is_empty() {
                    out.push_str("set()");
                } else {
                    out.push('{');
                    render_items(&items, guard, out);
                    out.push('}');
                }
                guard.leave(id);
            }
            Value::Dict(map) => {
                let id = self.identity().unwrap_or_default();
                if !guard.enter(id) {
                    out.push_str("{...}");
                    return;
                }
                let entries = map.read().clone();
                out.push('{');
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    render_str(key, out);
                    out.push_str(": ");
                    value.render(guard, out);
                }
                out.push('}');
                guard.leave(id);
            }
            Value::Record(inst) => inst.render(guard, out),
        }
    }
}

fn render_items(items: &[Value], guard: &mut RecursionGuard, out: &mut String) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.render(guard, out);
    }
}

fn render_float(f: f64, out: &mut String) {
    if f.is_nan() {
        out.push_str("nan");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "inf" } else { "-inf" });
    } else {
        let _ = write!(out, "{f:?}");
    }
}

/// Single quotes unless the text holds a single quote and no double quote.
pub(crate) fn render_str(s: &str, out: &mut String) {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueMap;
    use pretty_assertions::assert_eq;
    use smol_str::SmolStr;

    #[test]
    fn test_scalar_repr() {
        assert_eq!(Value::None.repr(), "None");
        assert_eq!(Value::Bool(true).repr(), "True");
        assert_eq!(Value::Int(-3).repr(), "-3");
        assert_eq!(Value::Float(5.0).repr(), "5.0");
        assert_eq!(Value::Float(0.25).repr(), "0.25");
        assert_eq!(Value::from("hello").repr(), "'hello'");
        assert_eq!(Value::from("it's").repr(), "\"it's\"");
    }

    #[test]
    fn test_container_repr() {
        assert_eq!(Value::tuple(vec![Value::Int(1)]).repr(), "(1,)");
        assert_eq!(Value::tuple(vec![]).repr(), "()");
        assert_eq!(Value::list(vec![Value::Int(1), "a".into()]).repr(), "[1, 'a']");
        assert_eq!(Value::set(vec![]).repr(), "set()");
        let mut map = ValueMap::new();
        map.insert(SmolStr::new("k"), Value::Int(2));
        assert_eq!(Value::dict(map).repr(), "{'k': 2}");
    }

    #[test]
    fn test_self_containing_list_renders_placeholder() {
        let list = Value::list(vec![Value::Int(1)]);
        list.push(list.clone());
        assert_eq!(list.repr(), "[1, [...]]");
    }

    #[test]
    fn test_shared_but_acyclic_values_render_fully() {
        let inner = Value::list(vec![Value::Int(1)]);
        let outer = Value::list(vec![inner.clone(), inner]);
        assert_eq!(outer.repr(), "[[1], [1]]");
    }
}
