//! An in-memory document host.
//!
//! Nodes carry an absolute vertical position; bounding boxes are reported
//! relative to the current scroll offset, so scrolling and the active-section
//! tracker behave as they would against a laid-out page. Documents can be
//! built programmatically or loaded from well-formed XHTML, in which case a
//! simple block layout is synthesized.

use crate::error::DocumentError;
use log::debug;
use sidetoc_traits::{DocumentHost, NavigationSource};
use sidetoc_types::{ElementRect, Viewport};
use std::ops::RangeInclusive;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Height given to headings when the layout is synthesized.
pub const HEADING_HEIGHT: f32 = 40.0;
/// Height of one synthesized line of body text.
pub const LINE_HEIGHT: f32 = 24.0;
/// Characters per synthesized line of body text.
const CHARS_PER_LINE: usize = 80;
/// Vertical gap left by `append_heading` before the new heading.
pub const DEFAULT_SECTION_GAP: f32 = 300.0;

const TEXT_BLOCKS: &[&str] = &["p", "li", "pre", "blockquote", "dd", "dt", "td", "figcaption"];

/// Handle to a node of an [`InMemoryDocument`]. Handles stay valid after
/// the node is removed; the node then reports itself as detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(usize);

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    level: Option<u8>,
    id: Option<String>,
    text: String,
    top: f32,
    height: f32,
    connected: bool,
}

#[derive(Debug)]
struct DocState {
    title: String,
    url: String,
    nodes: Vec<Node>,
    /// Attached nodes in document order.
    order: Vec<usize>,
    scroll_y: f32,
    viewport: Viewport,
    last_scroll_smooth: Option<bool>,
}

impl DocState {
    fn content_bottom(&self) -> f32 {
        self.order
            .iter()
            .map(|&i| self.nodes[i].top + self.nodes[i].height)
            .fold(0.0, f32::max)
    }

    fn push(&mut self, node: Node, before: Option<usize>) -> NodeRef {
        let index = self.nodes.len();
        self.nodes.push(node);
        match before.and_then(|b| self.order.iter().position(|&i| i == b)) {
            Some(position) => self.order.insert(position, index),
            None => self.order.push(index),
        }
        NodeRef(index)
    }
}

#[derive(Debug)]
pub struct InMemoryDocument {
    state: RwLock<DocState>,
}

impl Default for InMemoryDocument {
    fn default() -> Self {
        Self::new("", "about:blank")
    }
}

impl InMemoryDocument {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(DocState {
                title: title.into(),
                url: url.into(),
                nodes: Vec::new(),
                order: Vec::new(),
                scroll_y: 0.0,
                viewport: Viewport::default(),
                last_scroll_smooth: None,
            }),
        }
    }

    /// Parses a well-formed XHTML document.
    ///
    /// Headings `h1`..`h6`, text blocks and every element with an `id`
    /// become nodes; everything else is flattened away.
    pub fn from_xhtml(source: &str, url: impl Into<String>) -> Result<Self, DocumentError> {
        let parsed = roxmltree::Document::parse(source)?;

        let title = parsed
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "title")
            .map(|n| collect_text(&n))
            .unwrap_or_default();
        let body = parsed
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "body")
            .ok_or(DocumentError::MissingBody)?;

        let document = Self::new(title.trim(), url);
        {
            let mut state = document.write();
            let mut cursor = 0.0;
            for node in body.descendants().filter(|n| n.is_element()) {
                let tag = node.tag_name().name().to_ascii_lowercase();
                let id = node.attribute("id").map(str::to_string);
                let level = heading_level(&tag);
                let is_text_block = TEXT_BLOCKS.contains(&tag.as_str());
                if level.is_none() && !is_text_block && id.is_none() {
                    continue;
                }

                let text = collect_text(&node);
                let height = match level {
                    Some(_) => HEADING_HEIGHT,
                    None if is_text_block => {
                        let lines = text.trim().chars().count().div_ceil(CHARS_PER_LINE).max(1);
                        lines as f32 * LINE_HEIGHT
                    }
                    None => 0.0,
                };
                state.push(
                    Node {
                        tag,
                        level,
                        id,
                        text,
                        top: cursor,
                        height,
                        connected: true,
                    },
                    None,
                );
                cursor += height;
            }
            debug!(
                "Loaded XHTML document '{}' with {} nodes ({:.0}px tall)",
                state.title,
                state.nodes.len(),
                cursor
            );
        }
        Ok(document)
    }

    fn read(&self) -> RwLockReadGuard<'_, DocState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DocState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a heading `DEFAULT_SECTION_GAP` below the current content.
    pub fn append_heading(&self, level: u8, text: &str) -> NodeRef {
        let top = {
            let state = self.read();
            if state.order.is_empty() {
                0.0
            } else {
                state.content_bottom() + DEFAULT_SECTION_GAP
            }
        };
        self.append_heading_at(level, text, top, HEADING_HEIGHT)
    }

    /// Appends a heading at an absolute position.
    pub fn append_heading_at(&self, level: u8, text: &str, top: f32, height: f32) -> NodeRef {
        self.write().push(
            Node {
                tag: format!("h{}", level),
                level: Some(level),
                id: None,
                text: text.to_string(),
                top,
                height,
                connected: true,
            },
            None,
        )
    }

    /// Inserts a heading immediately before `reference` in document order,
    /// sharing its position.
    pub fn insert_heading_before(&self, reference: NodeRef, level: u8, text: &str) -> NodeRef {
        let mut state = self.write();
        let top = state.nodes.get(reference.0).map(|n| n.top).unwrap_or(0.0);
        state.push(
            Node {
                tag: format!("h{}", level),
                level: Some(level),
                id: None,
                text: text.to_string(),
                top,
                height: HEADING_HEIGHT,
                connected: true,
            },
            Some(reference.0),
        )
    }

    /// Appends a non-heading element, e.g. to occupy an id.
    pub fn append_element(&self, tag: &str, id: Option<&str>, text: &str) -> NodeRef {
        let mut state = self.write();
        let top = state.content_bottom();
        state.push(
            Node {
                tag: tag.to_string(),
                level: None,
                id: id.map(str::to_string),
                text: text.to_string(),
                top,
                height: LINE_HEIGHT,
                connected: true,
            },
            None,
        )
    }

    /// Detaches a node. Its handle stays valid but reports disconnected.
    pub fn remove(&self, node: NodeRef) {
        let mut state = self.write();
        if let Some(n) = state.nodes.get_mut(node.0) {
            n.connected = false;
        }
        state.order.retain(|&i| i != node.0);
    }

    pub fn set_text(&self, node: NodeRef, text: &str) {
        if let Some(n) = self.write().nodes.get_mut(node.0) {
            n.text = text.to_string();
        }
    }

    pub fn set_title(&self, title: &str) {
        self.write().title = title.to_string();
    }

    pub fn set_url(&self, url: &str) {
        self.write().url = url.to_string();
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.write().viewport = viewport;
    }

    pub fn set_geometry(&self, node: NodeRef, top: f32, height: f32) {
        if let Some(n) = self.write().nodes.get_mut(node.0) {
            n.top = top;
            n.height = height;
        }
    }

    pub fn scroll_to(&self, y: f32) {
        self.write().scroll_y = y.max(0.0);
    }

    pub fn scroll_y(&self) -> f32 {
        self.read().scroll_y
    }

    /// Whether the last `scroll_into_view` asked for smooth scrolling.
    pub fn last_scroll_smooth(&self) -> Option<bool> {
        self.read().last_scroll_smooth
    }

    /// The id attribute currently stored on a node.
    pub fn id_of(&self, node: NodeRef) -> Option<String> {
        self.read().nodes.get(node.0).and_then(|n| n.id.clone())
    }

    pub fn tag_of(&self, node: NodeRef) -> Option<String> {
        self.read().nodes.get(node.0).map(|n| n.tag.clone())
    }
}

impl DocumentHost for InMemoryDocument {
    type Element = NodeRef;

    fn title(&self) -> String {
        self.read().title.clone()
    }

    fn headings(&self, levels: RangeInclusive<u8>) -> Vec<(NodeRef, u8)> {
        let state = self.read();
        state
            .order
            .iter()
            .filter_map(|&i| {
                let level = state.nodes[i].level?;
                levels.contains(&level).then_some((NodeRef(i), level))
            })
            .collect()
    }

    fn text_content(&self, element: &NodeRef) -> String {
        self.read()
            .nodes
            .get(element.0)
            .map(|n| n.text.clone())
            .unwrap_or_default()
    }

    fn element_id(&self, element: &NodeRef) -> Option<String> {
        self.id_of(*element).filter(|id| !id.is_empty())
    }

    fn set_element_id(&self, element: &NodeRef, id: &str) {
        if let Some(n) = self.write().nodes.get_mut(element.0) {
            n.id = Some(id.to_string());
        }
    }

    fn element_by_id(&self, id: &str) -> Option<NodeRef> {
        let state = self.read();
        state
            .order
            .iter()
            .find(|&&i| state.nodes[i].id.as_deref() == Some(id))
            .map(|&i| NodeRef(i))
    }

    fn is_connected(&self, element: &NodeRef) -> bool {
        self.read()
            .nodes
            .get(element.0)
            .is_some_and(|n| n.connected)
    }

    fn bounding_rect(&self, element: &NodeRef) -> ElementRect {
        let state = self.read();
        match state.nodes.get(element.0) {
            Some(n) if n.connected => ElementRect::from_top(n.top - state.scroll_y, n.height),
            _ => ElementRect::default(),
        }
    }

    fn viewport(&self) -> Viewport {
        self.read().viewport
    }

    fn scroll_into_view(&self, element: &NodeRef, smooth: bool) {
        let mut state = self.write();
        let Some(top) = state.nodes.get(element.0).filter(|n| n.connected).map(|n| n.top) else {
            return;
        };
        state.scroll_y = top.max(0.0);
        state.last_scroll_smooth = Some(smooth);
    }
}

impl NavigationSource for InMemoryDocument {
    fn current_url(&self) -> String {
        self.read().url.clone()
    }
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn collect_text(node: &roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
