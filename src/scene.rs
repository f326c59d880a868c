//! Owned scene graph: the drawing surface a render pass fills and exports
//! read from.

use crate::interaction::ViewTransform;
use crate::model::FamilyMember;
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<SceneNode>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl ToString) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn set_attr(&mut self, name: &'static str, value: impl ToString) {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(mut self, element: Element) -> Self {
        self.children.push(SceneNode::Element(element));
        self
    }

    pub fn push(&mut self, element: Element) {
        self.children.push(SceneNode::Element(element));
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(SceneNode::Text(text.into()));
        self
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            SceneNode::Element(element) => Some(element),
            SceneNode::Text(_) => None,
        })
    }

    /// Depth-first count of descendants (self included) matching `pred`.
    pub fn count_where(&self, pred: &impl Fn(&Element) -> bool) -> usize {
        let own = usize::from(pred(self));
        own + self
            .elements()
            .map(|child| child.count_where(pred))
            .sum::<usize>()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .map(|value| value.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn write_svg(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {name}=\"{}\"", escape_xml(value));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                SceneNode::Element(element) => element.write_svg(out),
                SceneNode::Text(text) => out.push_str(&escape_xml(text)),
            }
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Hit-test record for one drawn person, in layout coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeHandle {
    pub member: FamilyMember,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl NodeHandle {
    pub fn id(&self) -> &str {
        &self.member.id
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (dx, dy) = (x - self.x, y - self.y);
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// A fully rendered frame. The viewport group holds links and nodes and is
/// the only part touched by pan/zoom.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub background: Element,
    pub defs: Element,
    pub viewport: Element,
    pub handles: Vec<NodeHandle>,
}

impl Scene {
    pub fn empty(width: f32, height: f32, background: &str) -> Self {
        Self {
            width,
            height,
            background: background_rect(background),
            defs: Element::new("defs"),
            viewport: Element::new("g").attr("class", "viewport"),
            handles: Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.viewport.count_where(&|element: &Element| element.has_class("node"))
    }

    pub fn link_count(&self) -> usize {
        self.viewport.count_where(&|element: &Element| element.has_class("link"))
    }

    pub fn handle(&self, id: &str) -> Option<&NodeHandle> {
        self.handles.iter().find(|handle| handle.id() == id)
    }

    pub fn set_view_transform(&mut self, transform: &ViewTransform) {
        if transform.is_identity() {
            self.viewport.attrs.retain(|(name, _)| *name != "transform");
        } else {
            self.viewport.set_attr("transform", transform.to_svg());
        }
    }

    pub fn to_svg_string(&self) -> String {
        let mut svg = String::new();
        let (width, height) = (self.width, self.height);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" class=\"family-tree\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
        );
        self.background.write_svg(&mut svg);
        self.defs.write_svg(&mut svg);
        self.viewport.write_svg(&mut svg);
        svg.push_str("</svg>");
        svg
    }
}

fn background_rect(fill: &str) -> Element {
    Element::new("rect")
        .attr("class", "background")
        .attr("width", "100%")
        .attr("height", "100%")
        .attr("fill", fill)
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_nested_elements_with_escaping() {
        let element = Element::new("g")
            .attr("data-id", "a\"b")
            .child(Element::new("text").text("<Tom & Jerry>"));
        let mut out = String::new();
        element.write_svg(&mut out);
        assert_eq!(
            out,
            "<g data-id=\"a&quot;b\"><text>&lt;Tom &amp; Jerry&gt;</text></g>"
        );
    }

    #[test]
    fn set_attr_replaces_existing_value() {
        let mut element = Element::new("circle").attr("r", 0);
        element.set_attr("r", 30);
        assert_eq!(element.get_attr("r"), Some("30"));
        assert_eq!(element.attrs.len(), 1);
    }

    #[test]
    fn empty_scene_is_well_formed() {
        let svg = Scene::empty(100.0, 50.0, "#fff").to_svg_string();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("<g class=\"viewport\"/>"));
    }

    #[test]
    fn view_transform_only_touches_viewport() {
        let mut scene = Scene::empty(100.0, 50.0, "#fff");
        let transform = ViewTransform {
            k: 2.0,
            x: 10.0,
            y: -5.0,
        };
        scene.set_view_transform(&transform);
        assert_eq!(
            scene.viewport.get_attr("transform"),
            Some("translate(10.00,-5.00) scale(2.0000)")
        );
        scene.set_view_transform(&ViewTransform::identity());
        assert_eq!(scene.viewport.get_attr("transform"), None);
    }
}
