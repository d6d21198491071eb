//! `DocumentHost` over the live browser DOM.

use crate::error::SidetocError;
use sidetoc_traits::{DocumentHost, NavigationSource};
use sidetoc_types::{ElementRect, Viewport};
use std::ops::RangeInclusive;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

#[derive(Debug, Clone)]
pub struct DomDocument {
    window: Window,
    document: Document,
}

impl DomDocument {
    /// Binds to the global window. Fails outside a browsing context
    /// (workers, Node.js).
    pub fn from_global() -> Result<Self, SidetocError> {
        let window =
            web_sys::window().ok_or_else(|| SidetocError::environment("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| SidetocError::environment("window has no document"))?;
        Ok(Self { window, document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl DocumentHost for DomDocument {
    type Element = Element;

    fn title(&self) -> String {
        self.document.title()
    }

    fn headings(&self, levels: RangeInclusive<u8>) -> Vec<(Element, u8)> {
        let selector = levels
            .clone()
            .map(|level| format!("h{}", level))
            .collect::<Vec<_>>()
            .join(",");
        if selector.is_empty() {
            return Vec::new();
        }
        let Ok(list) = self.document.query_selector_all(&selector) else {
            return Vec::new();
        };

        let mut found = Vec::with_capacity(list.length() as usize);
        for index in 0..list.length() {
            if let Some(node) = list.item(index)
                && let Ok(element) = node.dyn_into::<Element>()
                && let Some(level) = heading_level(&element.tag_name())
                && levels.contains(&level)
            {
                found.push((element, level));
            }
        }
        found
    }

    fn text_content(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn element_id(&self, element: &Element) -> Option<String> {
        let id = element.id();
        (!id.is_empty()).then_some(id)
    }

    fn set_element_id(&self, element: &Element, id: &str) {
        element.set_id(id);
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn is_connected(&self, element: &Element) -> bool {
        element.is_connected()
    }

    fn bounding_rect(&self, element: &Element) -> ElementRect {
        let rect = element.get_bounding_client_rect();
        ElementRect::new(rect.top() as f32, rect.bottom() as f32)
    }

    fn viewport(&self) -> Viewport {
        let height = self
            .window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or_default();
        Viewport::new(height as f32)
    }

    fn scroll_into_view(&self, element: &Element, smooth: bool) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(if smooth {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Auto
        });
        options.set_block(ScrollLogicalPosition::Start);
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }
}

impl NavigationSource for DomDocument {
    fn current_url(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }
}

/// `H2` -> 2. HTML documents report upper-case tag names, XHTML lower-case.
fn heading_level(tag: &str) -> Option<u8> {
    let digit = tag.strip_prefix('H').or_else(|| tag.strip_prefix('h'))?;
    digit.parse().ok().filter(|level| (1..=6).contains(level))
}
