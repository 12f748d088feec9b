//! Navigation forest built from the flat page collection.
//!
//! Pages are indexed by id and grouped by parent in a single pass, then the
//! forest is materialized with one visit per page. The build is total:
//! dangling or self parent references promote a page to root, and a page that
//! would become its own descendant is cut from that branch instead.

use std::collections::{HashMap, HashSet};

use crate::model::{Page, PageTreeNode};

pub const UNTITLED: &str = "Untitled";

/// Purely local expand/collapse state, keyed by page id. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpandState {
    expanded: HashSet<String>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, page_id: &str) {
        if !self.expanded.remove(page_id) {
            self.expanded.insert(page_id.to_string());
        }
    }

    pub fn is_expanded(&self, page_id: &str) -> bool {
        self.expanded.contains(page_id)
    }
}

pub fn build(pages: &[Page]) -> Vec<PageTreeNode> {
    build_with(pages, &ExpandState::default())
}

pub fn build_with(pages: &[Page], expand: &ExpandState) -> Vec<PageTreeNode> {
    let index = PageIndex::new(pages);
    let mut placed: HashSet<&str> = HashSet::with_capacity(index.order.len());
    let mut forest = Vec::new();

    for &id in &index.roots {
        let mut branch = HashSet::new();
        forest.push(index.materialize(id, expand, &mut branch, &mut placed));
    }

    // Whatever is left hangs off a parent cycle with no root above it. Promote
    // the first such page so the cycle is cut where it points back.
    for &id in &index.order {
        if placed.contains(id) {
            continue;
        }
        let mut branch = HashSet::new();
        forest.push(index.materialize(id, expand, &mut branch, &mut placed));
    }

    forest
}

/// Keep the roots whose title contains `query`, case-insensitively.
pub fn filter_roots(forest: &[PageTreeNode], query: &str) -> Vec<PageTreeNode> {
    let q = query.trim().to_lowercase();
    forest
        .iter()
        .filter(|node| q.is_empty() || node.title.to_lowercase().contains(&q))
        .cloned()
        .collect()
}

/// Depth-first walk yielding `(depth, node)`, descending only into expanded
/// nodes. This is the row order a sidebar renders.
pub fn visible_rows(forest: &[PageTreeNode]) -> Vec<(usize, &PageTreeNode)> {
    let mut rows = Vec::new();
    collect_rows(forest, 0, &mut rows);
    rows
}

fn collect_rows<'a>(
    nodes: &'a [PageTreeNode],
    depth: usize,
    rows: &mut Vec<(usize, &'a PageTreeNode)>,
) {
    for node in nodes {
        rows.push((depth, node));
        if node.is_expanded {
            collect_rows(&node.children, depth + 1, rows);
        }
    }
}

struct PageIndex<'a> {
    pages: HashMap<&'a str, &'a Page>,
    children: HashMap<&'a str, Vec<&'a str>>,
    roots: Vec<&'a str>,
    order: Vec<&'a str>,
}

impl<'a> PageIndex<'a> {
    fn new(pages: &'a [Page]) -> Self {
        let mut by_id: HashMap<&str, &Page> = HashMap::with_capacity(pages.len());
        let mut order = Vec::with_capacity(pages.len());
        for page in pages {
            // First occurrence of a duplicated id wins.
            if !by_id.contains_key(page.id.as_str()) {
                by_id.insert(page.id.as_str(), page);
                order.push(page.id.as_str());
            }
        }

        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut roots = Vec::new();
        for &id in &order {
            match by_id[id].parent_id.as_deref() {
                Some(parent) if parent != id && by_id.contains_key(parent) => {
                    children.entry(parent).or_default().push(id);
                }
                _ => roots.push(id),
            }
        }

        Self {
            pages: by_id,
            children,
            roots,
            order,
        }
    }

    fn materialize(
        &self,
        id: &'a str,
        expand: &ExpandState,
        branch: &mut HashSet<&'a str>,
        placed: &mut HashSet<&'a str>,
    ) -> PageTreeNode {
        let page = self.pages[id];
        branch.insert(id);
        placed.insert(id);

        let pending: Vec<&'a str> = self
            .children
            .get(id)
            .into_iter()
            .flatten()
            .filter(|&&child| !branch.contains(child) && !placed.contains(child))
            .copied()
            .collect();
        let children: Vec<PageTreeNode> = pending
            .into_iter()
            .map(|child| self.materialize(child, expand, branch, placed))
            .collect();

        branch.remove(id);

        PageTreeNode {
            id: page.id.clone(),
            title: if page.title.is_empty() {
                UNTITLED.to_string()
            } else {
                page.title.clone()
            },
            icon: page.icon.clone(),
            has_children: !children.is_empty(),
            is_expanded: expand.is_expanded(&page.id),
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_page;

    fn ids(nodes: &[PageTreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    fn total(forest: &[PageTreeNode]) -> usize {
        forest.iter().map(PageTreeNode::len).sum()
    }

    #[test]
    fn builds_nested_tree_in_collection_order() {
        let pages = vec![
            make_page("a", None),
            make_page("a1", Some("a")),
            make_page("b", None),
            make_page("a2", Some("a")),
            make_page("a1x", Some("a1")),
        ];
        let forest = build(&pages);

        assert_eq!(ids(&forest), vec!["a", "b"]);
        assert_eq!(ids(&forest[0].children), vec!["a1", "a2"]);
        assert_eq!(ids(&forest[0].children[0].children), vec!["a1x"]);
        assert!(forest[0].has_children);
        assert!(!forest[1].has_children);
        assert!(!forest[0].is_expanded);
    }

    #[test]
    fn orphan_is_promoted_to_root() {
        let pages = vec![make_page("a", None), make_page("lost", Some("deleted"))];
        let forest = build(&pages);
        assert_eq!(ids(&forest), vec!["a", "lost"]);
    }

    #[test]
    fn self_parent_is_promoted_to_root() {
        let pages = vec![make_page("loop", Some("loop"))];
        let forest = build(&pages);
        assert_eq!(ids(&forest), vec!["loop"]);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn two_page_cycle_yields_finite_forest_without_duplicates() {
        let pages = vec![
            make_page("root", None),
            make_page("a", Some("b")),
            make_page("b", Some("a")),
        ];
        let forest = build(&pages);

        assert_eq!(total(&forest), 3);
        assert_eq!(ids(&forest), vec!["root", "a"]);
        assert_eq!(ids(&forest[1].children), vec!["b"]);
        assert!(forest[1].children[0].children.is_empty());
    }

    #[test]
    fn long_cycle_with_hanging_child_is_placed_once() {
        let pages = vec![
            make_page("x", Some("z")),
            make_page("y", Some("x")),
            make_page("z", Some("y")),
            make_page("leaf", Some("y")),
        ];
        let forest = build(&pages);
        assert_eq!(total(&forest), 4);
        assert_eq!(ids(&forest), vec!["x"]);
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let mut second = make_page("a", None);
        second.title = "Second".into();
        let pages = vec![make_page("a", None), second];
        let forest = build(&pages);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].title, "Page a");
    }

    #[test]
    fn empty_title_renders_untitled() {
        let mut page = make_page("a", None);
        page.title.clear();
        assert_eq!(build(&[page])[0].title, UNTITLED);
    }

    #[test]
    fn expand_state_flows_into_nodes_and_rows() {
        let pages = vec![
            make_page("a", None),
            make_page("a1", Some("a")),
            make_page("b", None),
            make_page("b1", Some("b")),
        ];
        let mut expand = ExpandState::new();
        expand.toggle("a");
        let forest = build_with(&pages, &expand);
        assert!(forest[0].is_expanded);
        assert!(!forest[1].is_expanded);

        let rows: Vec<(usize, &str)> = visible_rows(&forest)
            .into_iter()
            .map(|(d, n)| (d, n.id.as_str()))
            .collect();
        assert_eq!(rows, vec![(0, "a"), (1, "a1"), (0, "b")]);

        expand.toggle("a");
        assert!(!expand.is_expanded("a"));
    }

    #[test]
    fn filter_roots_matches_title_case_insensitively() {
        let mut meeting = make_page("m", None);
        meeting.title = "Weekly Meeting".into();
        let pages = vec![make_page("a", None), meeting];
        let forest = build(&pages);

        assert_eq!(ids(&filter_roots(&forest, "MEET")), vec!["m"]);
        assert_eq!(filter_roots(&forest, "").len(), 2);
    }
}
