//! Minimal block template language for document generation.
//!
//! Two constructs:
//!   - `{{name}}` substitutes a text value from the innermost scope that
//!     defines it.
//!   - `{{#name}}...{{/name}}` repeats its body once per item when `name`
//!     is a list, or once when `name` is a non-empty text value (an
//!     optional-block conditional). Anything else renders nothing.
//!
//! Scopes are `BTreeMap`s, so rendering never depends on hash iteration
//! order: identical input state produces byte-identical output.

use crate::errors::{Result, ToolboxError};
use std::collections::BTreeMap;

/// A value a placeholder can resolve to.
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    List(Vec<Scope>),
}

/// One level of placeholder bindings.
pub type Scope = BTreeMap<String, Value>;

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Var(String),
    Section(String, Vec<Node>),
}

/// A parsed template, ready to render any number of times.
#[derive(Debug, Clone)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template source into a node tree.
    pub fn parse(source: &str) -> Result<Self> {
        let mut stack: Vec<(String, Vec<Node>)> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                nodes.push(Node::Text(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| ToolboxError::template("unterminated '{{' tag"))?;
            let tag = after[..end].trim();

            if let Some(name) = tag.strip_prefix('#') {
                stack.push((name.trim().to_string(), std::mem::take(&mut nodes)));
            } else if let Some(name) = tag.strip_prefix('/') {
                let name = name.trim();
                let (open, parent) = stack.pop().ok_or_else(|| {
                    ToolboxError::template(format!("close tag '{name}' without an open section"))
                })?;
                if open != name {
                    return Err(ToolboxError::template(format!(
                        "section '{open}' closed by mismatched tag '{name}'"
                    )));
                }
                let children = std::mem::replace(&mut nodes, parent);
                nodes.push(Node::Section(open, children));
            } else if tag.is_empty() {
                return Err(ToolboxError::template("empty placeholder tag"));
            } else {
                nodes.push(Node::Var(tag.to_string()));
            }

            rest = &after[end + 2..];
        }
        if !rest.is_empty() {
            nodes.push(Node::Text(rest.to_string()));
        }
        if let Some((open, _)) = stack.last() {
            return Err(ToolboxError::template(format!(
                "section '{open}' is never closed"
            )));
        }

        Ok(Self { nodes })
    }

    /// Render against a root scope.
    pub fn render(&self, root: &Scope) -> String {
        let mut out = String::new();
        let mut stack = vec![root];
        render_nodes(&self.nodes, &mut stack, &mut out);
        out
    }
}

fn render_nodes<'s>(nodes: &[Node], stack: &mut Vec<&'s Scope>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(name) => {
                if let Some(Value::Text(value)) = lookup(stack, name) {
                    out.push_str(value);
                }
            }
            Node::Section(name, children) => match lookup(stack, name) {
                Some(Value::List(items)) => {
                    for item in items {
                        stack.push(item);
                        render_nodes(children, stack, out);
                        stack.pop();
                    }
                }
                Some(Value::Text(value)) if !value.is_empty() => {
                    render_nodes(children, stack, out);
                }
                _ => {}
            },
        }
    }
}

fn lookup<'a>(stack: &[&'a Scope], name: &str) -> Option<&'a Value> {
    stack.iter().rev().find_map(|scope| scope.get(name))
}
