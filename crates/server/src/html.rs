//! Minimal DOM query/mutate layer over `html5ever` + `markup5ever_rcdom`.
//!
//! Selectors cover what head rewriting needs: a tag name, `#id` and any number of
//! `[attr=value]` filters, e.g. `link[rel=icon]` or `script#preload-data`.
//! Combinators are not supported.

use html5ever::serialize::{SerializeOpts, serialize};
use html5ever::parse_document;
use html5ever::tendril::{StrTendril, TendrilSink};
use markup5ever::{Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Node, NodeData, RcDom, SerializableHandle};

pub use markup5ever_rcdom::Handle;
use std::cell::RefCell;
use std::rc::Rc;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    attrs: Vec<(String, String)>,
}

impl Selector {
    /// Parse `tag`, `tag#id`, `tag[attr=value]` and combinations of those.
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err("empty selector".into());
        }
        if input.contains(char::is_whitespace) && !input.contains('[') {
            return Err(format!("combinators are not supported: {input}"));
        }

        let tag_end = input.find(['#', '[']).unwrap_or(input.len());
        let tag = &input[..tag_end];
        let mut attrs = Vec::new();
        let mut rest = &input[tag_end..];

        while !rest.is_empty() {
            if let Some(after_hash) = rest.strip_prefix('#') {
                let end = after_hash.find(['#', '[']).unwrap_or(after_hash.len());
                if end == 0 {
                    return Err(format!("empty id in selector: {input}"));
                }
                attrs.push(("id".to_string(), after_hash[..end].to_string()));
                rest = &after_hash[end..];
            } else if let Some(after_bracket) = rest.strip_prefix('[') {
                let close = after_bracket
                    .find(']')
                    .ok_or_else(|| format!("unterminated attribute filter: {input}"))?;
                let (name, value) = after_bracket[..close]
                    .split_once('=')
                    .ok_or_else(|| format!("attribute filter needs a value: {input}"))?;
                let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                attrs.push((name.trim().to_string(), value.to_string()));
                rest = &after_bracket[close + 1..];
            } else {
                return Err(format!("unexpected selector syntax: {input}"));
            }
        }

        Ok(Self {
            tag: (!tag.is_empty()).then(|| tag.to_ascii_lowercase()),
            attrs,
        })
    }

    fn matches(&self, handle: &Handle) -> bool {
        let NodeData::Element { name, attrs, .. } = &handle.data else {
            return false;
        };
        if let Some(tag) = &self.tag
            && name.local.as_ref() != tag
        {
            return false;
        }
        let attrs = attrs.borrow();
        self.attrs.iter().all(|(key, value)| {
            attrs
                .iter()
                .any(|a| a.name.local.as_ref() == key && a.value.as_ref() == value)
        })
    }
}

/// A parsed HTML document.
pub struct Document {
    dom: RcDom,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        Self { dom }
    }

    /// All elements matching `selector`, in document order.
    pub fn select(&self, selector: &Selector) -> Vec<Handle> {
        let mut found = Vec::new();
        collect_matches(&self.dom.document, selector, &mut found);
        found
    }

    /// Shorthand for parsing a selector and selecting with it. Invalid selectors match nothing.
    pub fn select_str(&self, selector: &str) -> Vec<Handle> {
        match Selector::parse(selector) {
            Ok(sel) => self.select(&sel),
            Err(e) => {
                tracing::warn!(selector, error = %e, "invalid selector");
                Vec::new()
            }
        }
    }

    pub fn first(&self, selector: &str) -> Option<Handle> {
        self.select_str(selector).into_iter().next()
    }

    /// The `<head>` element. The HTML parser always synthesizes one.
    pub fn head(&self) -> Option<Handle> {
        self.first("head")
    }

    pub fn to_html(&self) -> std::io::Result<String> {
        let mut bytes = Vec::new();
        let document: SerializableHandle = self.dom.document.clone().into();
        serialize(&mut bytes, &document, SerializeOpts::default())?;
        String::from_utf8(bytes).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

fn collect_matches(handle: &Handle, selector: &Selector, found: &mut Vec<Handle>) {
    if selector.matches(handle) {
        found.push(handle.clone());
    }
    for child in handle.children.borrow().iter() {
        collect_matches(child, selector, found);
    }
}

/// Create a detached element in the HTML namespace.
pub fn element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
        attrs: RefCell::new(attrs.iter().map(|(k, v)| attribute(k, v)).collect()),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

pub fn text_node(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from(text)),
    })
}

fn attribute(name: &str, value: &str) -> Attribute {
    Attribute {
        name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
        value: StrTendril::from(value),
    }
}

pub fn get_attr(handle: &Handle, name: &str) -> Option<String> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| a.name.local.as_ref() == name)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Set or overwrite an attribute.
pub fn set_attr(handle: &Handle, name: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &handle.data {
        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|a| a.name.local.as_ref() == name) {
            Some(existing) => existing.value = StrTendril::from(value),
            None => attrs.push(attribute(name, value)),
        }
    }
}

pub fn remove_attr(handle: &Handle, name: &str) {
    if let NodeData::Element { attrs, .. } = &handle.data {
        attrs.borrow_mut().retain(|a| a.name.local.as_ref() != name);
    }
}

/// Concatenated text of all descendant text nodes.
pub fn text_content(handle: &Handle) -> String {
    let mut out = String::new();
    push_text(handle, &mut out);
    out
}

fn push_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        push_text(child, out);
    }
}

/// Replace all children with a single text node.
pub fn set_text(handle: &Handle, text: &str) {
    for child in handle.children.borrow_mut().drain(..) {
        child.parent.set(None);
    }
    append_child(handle, text_node(text));
}

pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Remove `handle` from its parent, if it has one.
pub fn detach(handle: &Handle) {
    let Some(weak) = handle.parent.take() else {
        return;
    };
    if let Some(parent) = weak.upgrade() {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, handle));
    }
}
