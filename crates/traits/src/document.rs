//! DocumentHost trait for abstracting the live document.
//!
//! The extractor, tracker and page session read the document only through
//! this trait, so the same logic runs against a browser DOM, an in-memory
//! document in tests, or a parsed XHTML file.

use sidetoc_types::{ElementRect, Viewport};
use std::fmt::Debug;
use std::ops::RangeInclusive;

/// Read and minimal write access to the document attached to a page context.
///
/// Element handles are cheap to clone and compare by identity: two handles
/// are equal when they refer to the same node.
///
/// Methods take `&self` because hosts such as the DOM are mutated through
/// shared references; in-memory implementations use interior mutability.
pub trait DocumentHost {
    type Element: Clone + PartialEq + Debug;

    /// The document title, untrimmed.
    fn title(&self) -> String;

    /// Heading elements whose level lies in `levels`, in document order,
    /// paired with their level.
    fn headings(&self, levels: RangeInclusive<u8>) -> Vec<(Self::Element, u8)>;

    /// Raw text content of an element, untrimmed.
    fn text_content(&self, element: &Self::Element) -> String;

    /// The element's id attribute, if it has a non-empty one.
    fn element_id(&self, element: &Self::Element) -> Option<String>;

    /// Writes the element's id attribute.
    fn set_element_id(&self, element: &Self::Element, id: &str);

    /// The first attached element carrying `id`, whether or not it is a heading.
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// False once the element has been removed from the document.
    fn is_connected(&self, element: &Self::Element) -> bool;

    /// Viewport-relative bounding box.
    fn bounding_rect(&self, element: &Self::Element) -> ElementRect;

    fn viewport(&self) -> Viewport;

    /// Scrolls so the element's top edge aligns with the viewport top.
    fn scroll_into_view(&self, element: &Self::Element, smooth: bool);
}
