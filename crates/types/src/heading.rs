use crate::ids::HeadingId;
use serde::{Deserialize, Serialize};

/// One heading as found in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatHeading {
    pub id: HeadingId,
    pub text: String,
    /// Heading depth, 1 for `h1` through 6 for `h6`.
    pub level: u8,
}

impl FlatHeading {
    pub fn new(id: impl Into<HeadingId>, text: impl Into<String>, level: u8) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            level,
        }
    }
}

/// A heading together with the headings nested beneath it.
///
/// The children field keeps its capitalized wire name so existing panel
/// consumers can read the payload unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedHeading {
    pub id: HeadingId,
    pub text: String,
    pub level: u8,
    #[serde(rename = "Children", default)]
    pub children: Vec<NestedHeading>,
}

impl NestedHeading {
    pub fn leaf(heading: FlatHeading) -> Self {
        Self {
            id: heading.id,
            text: heading.text,
            level: heading.level,
            children: Vec::new(),
        }
    }

    /// The heading without its children.
    pub fn to_flat(&self) -> FlatHeading {
        FlatHeading {
            id: self.id.clone(),
            text: self.text.clone(),
            level: self.level,
        }
    }

    /// Number of headings in this subtree, including this one.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(NestedHeading::len).sum::<usize>()
    }
}

/// The externally visible snapshot of one extraction pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub title: String,
    pub nested_headings: Vec<NestedHeading>,
}

impl PageInfo {
    pub fn heading_count(&self) -> usize {
        self.nested_headings.iter().map(NestedHeading::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nested_headings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_info_wire_shape() {
        let mut setup = NestedHeading::leaf(FlatHeading::new("setup", "Setup", 2));
        setup
            .children
            .push(NestedHeading::leaf(FlatHeading::new("install", "Install", 3)));
        let info = PageInfo {
            title: "Guide".to_string(),
            nested_headings: vec![setup],
        };

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Guide",
                "nestedHeadings": [{
                    "id": "setup",
                    "text": "Setup",
                    "level": 2,
                    "Children": [{ "id": "install", "text": "Install", "level": 3, "Children": [] }]
                }]
            })
        );
        assert_eq!(info.heading_count(), 2);
    }

    #[test]
    fn test_missing_children_defaults_to_empty() {
        let heading: NestedHeading =
            serde_json::from_value(json!({ "id": "a", "text": "A", "level": 2 })).unwrap();
        assert!(heading.children.is_empty());
    }
}
