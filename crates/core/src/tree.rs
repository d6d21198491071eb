//! Level-based nesting of the flat heading list.

use sidetoc_types::{FlatHeading, NestedHeading};

/// Nests headings by level.
///
/// Keeps a stack of open ancestors on top of a synthetic level-0 root. Each
/// heading closes every open node whose level is not lower than its own,
/// then becomes the last child of whatever remains on top. Linear time and
/// order preserving. A first heading deeper than level 1 stays top-level; no
/// ancestors are invented.
pub fn build_tree(headings: &[FlatHeading]) -> Vec<NestedHeading> {
    // Stack entries are (level, node). Index 0 is the synthetic root.
    let mut stack: Vec<(u8, NestedHeading)> = Vec::with_capacity(8);
    stack.push((0, root()));

    for heading in headings {
        while stack.len() > 1 && stack.last().is_some_and(|(level, _)| *level >= heading.level) {
            close_top(&mut stack);
        }
        stack.push((heading.level, NestedHeading::leaf(heading.clone())));
    }
    while stack.len() > 1 {
        close_top(&mut stack);
    }

    stack
        .pop()
        .map(|(_, root)| root.children)
        .unwrap_or_default()
}

/// Pops the top node and attaches it to its parent.
fn close_top(stack: &mut Vec<(u8, NestedHeading)>) {
    if let Some((_, node)) = stack.pop()
        && let Some((_, parent)) = stack.last_mut()
    {
        parent.children.push(node);
    }
}

fn root() -> NestedHeading {
    NestedHeading {
        id: "".into(),
        text: String::new(),
        level: 0,
        children: Vec::new(),
    }
}

/// Pre-order walk; the inverse of [`build_tree`].
pub fn flatten(forest: &[NestedHeading]) -> Vec<FlatHeading> {
    fn walk(nodes: &[NestedHeading], out: &mut Vec<FlatHeading>) {
        for node in nodes {
            out.push(node.to_flat());
            walk(&node.children, out);
        }
    }

    let mut out = Vec::new();
    walk(forest, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(id: &str, level: u8) -> FlatHeading {
        FlatHeading::new(id, id.to_uppercase(), level)
    }

    fn shape(forest: &[NestedHeading]) -> String {
        forest
            .iter()
            .map(|n| {
                if n.children.is_empty() {
                    n.id.to_string()
                } else {
                    format!("{}[{}]", n.id, shape(&n.children))
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn assert_nesting(forest: &[NestedHeading]) {
        for node in forest {
            for child in &node.children {
                assert!(child.level > node.level, "{} under {}", child.id, node.id);
            }
            assert_nesting(&node.children);
        }
    }

    #[test]
    fn test_setup_usage_example() {
        let flat = vec![heading("setup", 2), heading("install", 3), heading("usage", 2)];
        let tree = build_tree(&flat);
        assert_eq!(shape(&tree), "setup[install],usage");
    }

    #[test]
    fn test_deep_first_heading_stays_top_level() {
        let flat = vec![heading("a", 4), heading("b", 2), heading("c", 3)];
        assert_eq!(shape(&build_tree(&flat)), "a,b[c]");
    }

    #[test]
    fn test_level_jumps_and_returns() {
        let flat = vec![
            heading("a", 1),
            heading("b", 3),
            heading("c", 2),
            heading("d", 6),
            heading("e", 4),
            heading("f", 1),
        ];
        let tree = build_tree(&flat);
        assert_eq!(shape(&tree), "a[b,c[d,e]],f");
        assert_nesting(&tree);
    }

    #[test]
    fn test_equal_levels_are_siblings() {
        let flat = vec![heading("a", 3), heading("b", 3), heading("c", 3)];
        assert_eq!(shape(&build_tree(&flat)), "a,b,c");
    }

    #[test]
    fn test_empty_input() {
        assert!(build_tree(&[]).is_empty());
        assert!(flatten(&[]).is_empty());
    }

    #[test]
    fn test_round_trip_and_nesting_over_many_sequences() {
        // Deterministic pseudo-random level sequences.
        let mut seed: u32 = 0x2545_f491;
        for len in 0..60 {
            let flat: Vec<FlatHeading> = (0..len)
                .map(|i| {
                    seed ^= seed << 13;
                    seed ^= seed >> 17;
                    seed ^= seed << 5;
                    heading(&format!("h{}", i), (seed % 6) as u8 + 1)
                })
                .collect();
            let tree = build_tree(&flat);
            assert_eq!(flatten(&tree), flat);
            assert_nesting(&tree);
        }
    }
}
