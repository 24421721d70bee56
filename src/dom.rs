//! Minimal retained SVG element tree and the provider's DOM resource lifecycle.
//!
//! Hosts hand the provider a drawing surface (the root `<svg>` element of a
//! rendering context). [`ConstantProvider::create_dom`] materializes the reusable
//! glow filters into it; [`ConstantProvider::dispose`] removes them again. The
//! element tree itself is a small single-threaded structure: shared handles with
//! interior mutability, serializable to SVG text.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::rc::{Rc, Weak};

use log::debug;

use crate::constants::ConstantProvider;

struct ElementData {
    tag: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Element>,
    parent: Weak<RefCell<ElementData>>,
}

/// A shared handle to one node of the SVG element tree.
///
/// Cloning the handle clones the reference, not the node, matching DOM semantics.
#[derive(Clone)]
pub struct Element {
    inner: Rc<RefCell<ElementData>>,
}

impl Element {
    /// Creates a detached element with the given tag.
    pub fn new(tag: &str) -> Self {
        Element {
            inner: Rc::new(RefCell::new(ElementData {
                tag: tag.to_string(),
                attributes: BTreeMap::new(),
                children: Vec::new(),
                parent: Weak::new(),
            })),
        }
    }

    /// The element's tag name.
    pub fn tag(&self) -> String {
        self.inner.borrow().tag.clone()
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attribute(&self, name: &str, value: &str) {
        self.inner
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    /// Reads an attribute, if set.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner.borrow().attributes.get(name).cloned()
    }

    /// Appends `child` as the last child of this element, detaching it from any
    /// previous parent first. Refuses appends that would make an element contain
    /// itself or one of its ancestors, leaving the tree unchanged.
    pub fn append_child(&self, child: &Element) {
        let mut ancestor = Some(self.inner.clone());
        while let Some(node) = ancestor {
            if Rc::ptr_eq(&node, &child.inner) {
                return;
            }
            ancestor = node.borrow().parent.upgrade();
        }
        child.remove();
        child.inner.borrow_mut().parent = Rc::downgrade(&self.inner);
        self.inner.borrow_mut().children.push(child.clone());
    }

    /// Detaches this element from its parent. A no-op for detached elements.
    pub fn remove(&self) {
        let parent = self.inner.borrow().parent.upgrade();
        if let Some(parent) = parent {
            parent
                .borrow_mut()
                .children
                .retain(|c| !Rc::ptr_eq(&c.inner, &self.inner));
            self.inner.borrow_mut().parent = Weak::new();
        }
    }

    /// Snapshot of the current child handles, in document order.
    pub fn children(&self) -> Vec<Element> {
        self.inner.borrow().children.clone()
    }

    /// Depth-first search for a descendant (or self) with the given `id`.
    pub fn find_by_id(&self, id: &str) -> Option<Element> {
        if self.attribute("id").as_deref() == Some(id) {
            return Some(self.clone());
        }
        for child in self.children() {
            if let Some(found) = child.find_by_id(id) {
                return Some(found);
            }
        }
        None
    }

    /// Serializes the subtree rooted at this element to SVG text.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::new();
        self.write_svg(&mut out);
        out
    }

    fn write_svg(&self, out: &mut String) {
        let data = self.inner.borrow();
        let _ = write!(out, "<{}", data.tag);
        for (name, value) in &data.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape_xml(value));
        }
        if data.children.is_empty() {
            let _ = write!(out, "/>");
        } else {
            let _ = write!(out, ">");
            for child in &data.children {
                child.write_svg(out);
            }
            let _ = write!(out, "</{}>", data.tag);
        }
    }
}

/// Creates an element with the given attributes and appends it to `parent`
/// when one is supplied.
pub fn create_svg_element(tag: &str, attributes: &[(&str, &str)], parent: Option<&Element>) -> Element {
    let element = Element::new(tag);
    for (name, value) in attributes {
        element.set_attribute(name, value);
    }
    if let Some(parent) = parent {
        parent.append_child(&element);
    }
    element
}

fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    s
}

// Blur pixels go fully opaque before the flood so the glow hugs the block outline
// instead of fading out. A dilate would distort the shape.
const ALPHA_TABLE_VALUES: &str = "0 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1";

impl ConstantProvider {
    /// Materializes the provider's reusable filter effects into the drawing
    /// surface: a `<defs>` region holding the selected-block glow and the
    /// replacement glow.
    ///
    /// Filter ids carry the provider's instance counter, so providers sharing a
    /// surface never collide. Calling this twice on the same surface appends a
    /// second set of filters; callers invoke it at most once per surface per
    /// provider instance.
    pub fn create_dom(&mut self, svg: &Element) {
        let defs = create_svg_element("defs", &[], Some(svg));

        let selected_id = format!("blockSelectedGlowFilter{}", self.identifier);
        let selected_filter = create_svg_element(
            "filter",
            &[
                ("id", selected_id.as_str()),
                ("height", "160%"),
                ("width", "180%"),
                ("y", "-30%"),
                ("x", "-40%"),
            ],
            Some(&defs),
        );
        create_svg_element(
            "feGaussianBlur",
            &[
                ("in", "SourceGraphic"),
                ("stdDeviation", &self.selected_glow_size.to_string()),
            ],
            Some(&selected_filter),
        );
        let transfer = create_svg_element(
            "feComponentTransfer",
            &[("result", "outBlur")],
            Some(&selected_filter),
        );
        create_svg_element(
            "feFuncA",
            &[("type", "table"), ("tableValues", ALPHA_TABLE_VALUES)],
            Some(&transfer),
        );
        create_svg_element(
            "feFlood",
            &[
                ("flood-color", self.selected_glow_colour.as_str()),
                ("flood-opacity", "1"),
                ("result", "outColor"),
            ],
            Some(&selected_filter),
        );
        create_svg_element(
            "feComposite",
            &[
                ("in", "outColor"),
                ("in2", "outBlur"),
                ("operator", "in"),
                ("result", "outGlow"),
            ],
            Some(&selected_filter),
        );
        self.selected_glow_filter_id = selected_id;
        self.selected_glow_filter = Some(selected_filter);

        let replacement_id = format!("blockReplacementGlowFilter{}", self.identifier);
        let replacement_filter = create_svg_element(
            "filter",
            &[
                ("id", replacement_id.as_str()),
                ("height", "160%"),
                ("width", "180%"),
                ("y", "-30%"),
                ("x", "-40%"),
            ],
            Some(&defs),
        );
        create_svg_element(
            "feGaussianBlur",
            &[
                ("in", "SourceGraphic"),
                ("stdDeviation", &self.replacement_glow_size.to_string()),
            ],
            Some(&replacement_filter),
        );
        let transfer = create_svg_element(
            "feComponentTransfer",
            &[("result", "outBlur")],
            Some(&replacement_filter),
        );
        create_svg_element(
            "feFuncA",
            &[("type", "table"), ("tableValues", ALPHA_TABLE_VALUES)],
            Some(&transfer),
        );
        create_svg_element(
            "feFlood",
            &[
                ("flood-color", self.replacement_glow_colour.as_str()),
                ("flood-opacity", "1"),
                ("result", "outColor"),
            ],
            Some(&replacement_filter),
        );
        create_svg_element(
            "feComposite",
            &[
                ("in", "outColor"),
                ("in2", "outBlur"),
                ("operator", "in"),
                ("result", "outGlow"),
            ],
            Some(&replacement_filter),
        );
        // The replacement glow renders around the original graphic, not instead
        // of it.
        create_svg_element(
            "feComposite",
            &[("in", "SourceGraphic"), ("in2", "outGlow"), ("operator", "over")],
            Some(&replacement_filter),
        );
        self.replacement_glow_filter_id = replacement_id;
        self.replacement_glow_filter = Some(replacement_filter);

        debug!(
            "created glow filters {} and {}",
            self.selected_glow_filter_id, self.replacement_glow_filter_id
        );
    }

    /// Removes the filter nodes created by [`create_dom`](Self::create_dom) from
    /// the surface. Safe to call when `create_dom` never ran, and idempotent.
    pub fn dispose(&mut self) {
        if let Some(filter) = self.selected_glow_filter.take() {
            filter.remove();
            debug!("removed glow filter {}", self.selected_glow_filter_id);
        }
        if let Some(filter) = self.replacement_glow_filter.take() {
            filter.remove();
            debug!("removed glow filter {}", self.replacement_glow_filter_id);
        }
    }
}
