//! XML to JSON conversion.
//!
//! Follows the usual attribute/text conventions: attributes become `@name`
//! keys, text next to attributes or child elements goes under `#text`,
//! repeated child elements collapse into an array and empty elements are
//! `null`. Element names keep their namespace prefix as written, and namespace
//! declarations appear as `@xmlns` / `@xmlns:prefix` on the declaring element.

use roxmltree::{Document, Namespace, Node};
use serde_json::{Map, Value};

pub fn xml_to_json(text: &str) -> Result<Value, roxmltree::Error> {
    let doc = Document::parse(text)?;
    let root = doc.root_element();

    let mut map = Map::new();
    map.insert(qualified_name(root), element_to_value(root));
    Ok(Value::Object(map))
}

fn qualified_name(node: Node) -> String {
    let tag = node.tag_name();
    match tag.namespace().and_then(|ns| node.lookup_prefix(ns)) {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, tag.name()),
        _ => tag.name().to_string(),
    }
}

// `namespaces()` lists every namespace in scope; keep the ones the parent
// element does not already have.
fn declared_namespaces<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = &'a Namespace<'input>> + 'a {
    let parent = node.parent_element();
    node.namespaces().filter(move |ns| match parent {
        Some(parent) => !parent
            .namespaces()
            .any(|p| p.name() == ns.name() && p.uri() == ns.uri()),
        None => true,
    })
}

fn element_to_value(node: Node) -> Value {
    let mut map = Map::new();

    for ns in declared_namespaces(node) {
        let name = match ns.name() {
            Some(prefix) => format!("@xmlns:{}", prefix),
            None => "@xmlns".to_string(),
        };
        map.insert(name, Value::String(ns.uri().to_string()));
    }

    for attr in node.attributes() {
        let name = match attr.namespace().and_then(|ns| node.lookup_prefix(ns)) {
            Some(prefix) if !prefix.is_empty() => format!("@{}:{}", prefix, attr.name()),
            _ => format!("@{}", attr.name()),
        };
        map.insert(name, Value::String(attr.value().to_string()));
    }

    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            let key = qualified_name(child);
            let value = element_to_value(child);
            match map.get_mut(&key) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(key, value);
                }
            }
        } else if child.is_text() {
            text.push_str(child.text().unwrap_or_default());
        }
    }

    let text = text.trim();
    if map.is_empty() {
        return if text.is_empty() {
            Value::Null
        } else {
            Value::String(text.to_string())
        };
    }
    if !text.is_empty() {
        map.insert("#text".to_string(), Value::String(text.to_string()));
    }
    Value::Object(map)
}
