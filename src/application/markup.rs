//! String templates: render a tree to markup without a UI surface.

use generational_arena::Index;

use crate::application::render::{
    next_generation, node_shape, renders_children, CHECKBOX, CHILD_LIST, EXPANDER, LABEL,
};
use crate::domain::TreeArena;
use crate::infrastructure::traits::ElementKind;

/// Serialization of an element tree.
pub trait Template {
    fn open_element(
        &self,
        out: &mut String,
        tag: &str,
        classes: &[&str],
        attributes: &[(&str, &str)],
    );

    /// Element content; `is_markup` content is emitted verbatim.
    fn content(&self, out: &mut String, content: &str, is_markup: bool);

    fn close_element(&self, out: &mut String, tag: &str);
}

/// Plain HTML serialization. Fragments emit only their children.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlTemplate;

impl Template for HtmlTemplate {
    fn open_element(
        &self,
        out: &mut String,
        tag: &str,
        classes: &[&str],
        attributes: &[(&str, &str)],
    ) {
        if tag == ElementKind::Fragment.tag() {
            return;
        }
        out.push('<');
        out.push_str(tag);
        if !classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&escape_html(&classes.join(" ")));
            out.push('"');
        }
        for (name, value) in attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_html(value));
            out.push('"');
        }
        out.push('>');
    }

    fn content(&self, out: &mut String, content: &str, is_markup: bool) {
        if is_markup {
            out.push_str(content);
        } else {
            out.push_str(&escape_html(content));
        }
    }

    fn close_element(&self, out: &mut String, tag: &str) {
        if tag == ElementKind::Fragment.tag() {
            return;
        }
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Writes node subtrees the same way the live render creates elements.
pub(crate) struct MarkupWriter<'a> {
    pub tree: &'a TreeArena,
    pub template: &'a dyn Template,
    pub html_labels: bool,
}

impl MarkupWriter<'_> {
    pub fn write(&self, out: &mut String, idx: Index, remaining: Option<usize>) {
        let Some(node) = self.tree.get_node(idx) else {
            return;
        };
        let expanded = renders_children(remaining);
        let shape = node_shape(node, expanded);
        let tag = shape.kind.tag();
        let attributes: Vec<(&str, &str)> = shape
            .attributes
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();

        self.template
            .open_element(out, tag, &shape.classes, &attributes);
        self.empty_part(out, ElementKind::Span, EXPANDER);
        self.empty_part(out, ElementKind::Span, CHECKBOX);

        let label_tag = ElementKind::Label.tag();
        self.template.open_element(out, label_tag, &[LABEL], &[]);
        self.template.content(out, &node.label, self.html_labels);
        self.template.close_element(out, label_tag);

        if shape.is_branch {
            let list_tag = ElementKind::List.tag();
            self.template.open_element(out, list_tag, &[CHILD_LIST], &[]);
            if expanded {
                for &child in &node.children {
                    self.write(out, child, next_generation(remaining));
                }
            }
            self.template.close_element(out, list_tag);
        }
        self.template.close_element(out, tag);
    }

    fn empty_part(&self, out: &mut String, kind: ElementKind, class: &str) {
        self.template.open_element(out, kind.tag(), &[class], &[]);
        self.template.close_element(out, kind.tag());
    }
}
