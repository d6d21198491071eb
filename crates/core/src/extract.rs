//! Heading extraction with stable, unique ids.
//!
//! Ids are written back onto the heading elements, so an unchanged heading
//! finds its own id on the next pass and keeps it. Within one pass an id is
//! never handed out twice: an element's existing id is only reused if no
//! earlier heading claimed it, and derived ids get a numeric suffix until
//! they clash with neither this pass nor an unrelated element.

use crate::config::SyncConfig;
use crate::slug::slugify;
use crate::tree::build_tree;
use log::trace;
use sidetoc_traits::DocumentHost;
use sidetoc_types::{FlatHeading, HeadingId, PageInfo, Settings};
use std::collections::HashSet;

/// A heading id paired with the element that carries it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedHeading<E> {
    pub id: HeadingId,
    pub element: E,
}

/// The result of one extraction pass.
#[derive(Debug, Clone)]
pub struct Extraction<E> {
    pub title: String,
    pub headings: Vec<FlatHeading>,
    pub tracked: Vec<TrackedHeading<E>>,
}

impl<E> Extraction<E> {
    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    pub fn page_info(&self) -> PageInfo {
        PageInfo {
            title: self.title.clone(),
            nested_headings: build_tree(&self.headings),
        }
    }
}

/// Scans a document for headings in the configured depth range.
#[derive(Debug, Clone)]
pub struct HeadingExtractor<'a> {
    settings: Settings,
    config: &'a SyncConfig,
}

impl<'a> HeadingExtractor<'a> {
    pub fn new(settings: Settings, config: &'a SyncConfig) -> Self {
        Self {
            settings: settings.normalized(),
            config,
        }
    }

    pub fn extract<D: DocumentHost>(&self, document: &D) -> Extraction<D::Element> {
        let levels = self.settings.level_range();
        let mut used: HashSet<String> = HashSet::new();
        let mut headings = Vec::new();
        let mut tracked = Vec::new();

        for (element, level) in document.headings(levels) {
            let text = normalize_text(&document.text_content(&element))
                .unwrap_or_else(|| self.config.untitled_heading.clone());

            let existing = document.element_id(&element);
            let id = match existing.as_deref() {
                Some(current) if !used.contains(current) => current.to_string(),
                _ => unique_id(document, &element, &slugify(&text), &used),
            };
            if existing.as_deref() != Some(id.as_str()) {
                document.set_element_id(&element, &id);
            }
            used.insert(id.clone());

            let id = HeadingId::from(id);
            headings.push(FlatHeading {
                id: id.clone(),
                text,
                level,
            });
            tracked.push(TrackedHeading { id, element });
        }

        trace!(
            "Extracted {} headings (levels {}..={})",
            headings.len(),
            self.settings.min_level(),
            self.settings.max_depth
        );

        Extraction {
            title: document.title().trim().to_string(),
            headings,
            tracked,
        }
    }
}

/// Trims and collapses whitespace; `None` when nothing is left.
fn normalize_text(raw: &str) -> Option<String> {
    let mut text = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(word);
    }
    (!text.is_empty()).then_some(text)
}

fn unique_id<D: DocumentHost>(
    document: &D,
    element: &D::Element,
    base: &str,
    used: &HashSet<String>,
) -> String {
    let is_free = |candidate: &str| {
        !used.contains(candidate)
            && document
                .element_by_id(candidate)
                .is_none_or(|owner| owner == *element)
    };

    if is_free(base) {
        return base.to_string();
    }
    let mut suffix = 1u32;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if is_free(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}
