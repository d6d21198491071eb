//! Active-section detection from viewport geometry.
//!
//! Runs on every scroll and resize frame, so it only reads geometry and
//! never re-extracts.

use crate::extract::TrackedHeading;
use sidetoc_traits::DocumentHost;

/// Returns the id of the heading the reader is currently in.
///
/// Headings whose element left the document are skipped. The first heading
/// (in document order) with any part on screen wins, which keeps a section
/// active while any of it is visible. If none is on screen, the last heading
/// whose top edge is at or above `reading_line` wins (ties go to the later
/// heading in document order); failing that, the first heading. Empty when
/// there are no headings.
pub fn find_active_heading<D: DocumentHost>(
    document: &D,
    headings: &[TrackedHeading<D::Element>],
    reading_line: f32,
) -> String {
    let viewport = document.viewport();
    let attached: Vec<_> = headings
        .iter()
        .filter(|h| document.is_connected(&h.element))
        .map(|h| (h, document.bounding_rect(&h.element)))
        .collect();

    if let Some((heading, _)) = attached.iter().find(|(_, rect)| rect.intersects(viewport)) {
        return heading.id.to_string();
    }

    attached
        .iter()
        .filter(|(_, rect)| rect.top <= reading_line)
        .last()
        .or_else(|| attached.first())
        .map(|(heading, _)| heading.id.to_string())
        .unwrap_or_default()
}
