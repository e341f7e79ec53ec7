//! In-memory retained element tree implementing [`UiSurface`].

use generational_arena::{Arena, Index};
use termtree::Tree;

use crate::application::markup::{HtmlTemplate, Template};
use crate::infrastructure::traits::{ElementId, ElementKind, UiSurface};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
    Text(String),
    Markup(String),
}

#[derive(Debug, Clone)]
struct Element {
    kind: ElementKind,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    content: Option<Content>,
    parent: Option<Index>,
    children: Vec<Index>,
}

impl Element {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            classes: Vec::new(),
            attributes: Vec::new(),
            content: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

fn to_index(el: ElementId) -> Index {
    let (slot, generation) = el.into_raw_parts();
    Index::from_raw_parts(slot, generation)
}

fn to_element_id(idx: Index) -> ElementId {
    let (slot, generation) = idx.into_raw_parts();
    ElementId::from_raw_parts(slot, generation)
}

/// Arena-backed DOM used by the CLI and tests.
#[derive(Debug, Default)]
pub struct MemoryDom {
    arena: Arena<Element>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    fn get(&self, el: ElementId) -> Option<&Element> {
        self.arena.get(to_index(el))
    }

    fn get_mut(&mut self, el: ElementId) -> Option<&mut Element> {
        self.arena.get_mut(to_index(el))
    }

    /// Serialize `el` and its subtree as HTML; empty for unknown handles.
    pub fn outer_html(&self, el: ElementId) -> String {
        let mut out = String::new();
        self.write_html(&mut out, to_index(el), &HtmlTemplate);
        out
    }

    fn write_html(&self, out: &mut String, idx: Index, template: &dyn Template) {
        let Some(element) = self.arena.get(idx) else {
            return;
        };
        let tag = element.kind.tag();
        let classes: Vec<&str> = element.classes.iter().map(String::as_str).collect();
        let attributes: Vec<(&str, &str)> = element
            .attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();

        template.open_element(out, tag, &classes, &attributes);
        match &element.content {
            Some(Content::Text(text)) => template.content(out, text, false),
            Some(Content::Markup(markup)) => template.content(out, markup, true),
            None => {}
        }
        for &child in &element.children {
            self.write_html(out, child, template);
        }
        template.close_element(out, tag);
    }

    /// Terminal tree of `el`: one line per element with tag, classes and content.
    pub fn to_tree(&self, el: ElementId) -> Tree<String> {
        let idx = to_index(el);
        let Some(element) = self.arena.get(idx) else {
            return Tree::new(String::new());
        };
        let mut line = element.kind.tag().to_string();
        for class in &element.classes {
            line.push('.');
            line.push_str(class);
        }
        match &element.content {
            Some(Content::Text(text)) | Some(Content::Markup(text)) if !text.is_empty() => {
                line.push_str(&format!(" {text:?}"));
            }
            _ => {}
        }
        let leaves: Vec<Tree<String>> = element
            .children
            .iter()
            .map(|&child| self.to_tree(to_element_id(child)))
            .collect();
        Tree::new(line).with_leaves(leaves)
    }

    fn detach(&mut self, idx: Index) {
        let Some(parent) = self.arena.get(idx).and_then(|e| e.parent) else {
            return;
        };
        if let Some(parent) = self.arena.get_mut(parent) {
            parent.children.retain(|&c| c != idx);
        }
        if let Some(element) = self.arena.get_mut(idx) {
            element.parent = None;
        }
    }
}

impl UiSurface for MemoryDom {
    fn create_element(&mut self, kind: ElementKind) -> ElementId {
        to_element_id(self.arena.insert(Element::new(kind)))
    }

    fn contains(&self, el: ElementId) -> bool {
        self.get(el).is_some()
    }

    fn kind(&self, el: ElementId) -> Option<ElementKind> {
        self.get(el).map(|e| e.kind)
    }

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) {
        let Some(element) = self.get_mut(el) else {
            return;
        };
        match element.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => element
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.get(el)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn add_class(&mut self, el: ElementId, class: &str) {
        if let Some(element) = self.get_mut(el) {
            if !element.classes.iter().any(|c| c == class) {
                element.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, el: ElementId, class: &str) {
        if let Some(element) = self.get_mut(el) {
            element.classes.retain(|c| c != class);
        }
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.get(el)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn classes(&self, el: ElementId) -> Vec<String> {
        self.get(el).map(|e| e.classes.clone()).unwrap_or_default()
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        let (parent_idx, child_idx) = (to_index(parent), to_index(child));
        if parent_idx == child_idx
            || !self.arena.contains(parent_idx)
            || !self.arena.contains(child_idx)
        {
            return;
        }
        self.detach(child_idx);
        if let Some(parent) = self.arena.get_mut(parent_idx) {
            parent.children.push(child_idx);
        }
        if let Some(child) = self.arena.get_mut(child_idx) {
            child.parent = Some(parent_idx);
        }
    }

    fn remove(&mut self, el: ElementId) {
        let idx = to_index(el);
        self.detach(idx);
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(element) = self.arena.remove(current) {
                stack.extend(element.children);
            }
        }
    }

    fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.get(el)
            .map(|e| e.children.iter().copied().map(to_element_id).collect())
            .unwrap_or_default()
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.get(el)?.parent.map(to_element_id)
    }

    fn set_text(&mut self, el: ElementId, text: &str) {
        if let Some(element) = self.get_mut(el) {
            element.content = Some(Content::Text(text.to_string()));
        }
    }

    fn set_markup(&mut self, el: ElementId, markup: &str) {
        if let Some(element) = self.get_mut(el) {
            element.content = Some(Content::Markup(markup.to_string()));
        }
    }

    fn text(&self, el: ElementId) -> Option<String> {
        match &self.get(el)?.content {
            Some(Content::Text(text)) | Some(Content::Markup(text)) => Some(text.clone()),
            None => None,
        }
    }

    fn query_by_class(&self, root: ElementId, class: &str) -> Vec<ElementId> {
        let mut found = Vec::new();
        let mut stack: Vec<Index> = self
            .get(root)
            .map(|e| e.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            let Some(element) = self.arena.get(current) else {
                continue;
            };
            if element.classes.iter().any(|c| c == class) {
                found.push(to_element_id(current));
            }
            stack.extend(element.children.iter().rev().copied());
        }
        found
    }
}
