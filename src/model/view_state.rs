use std::collections::HashSet;

use crate::model::tree::{find_by_id, Node};

/// Selection and expand/collapse state for one open course. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub selected_id: Option<String>,
    pub expanded_ids: HashSet<String>,
    loaded: bool,
}

/// What the detail pane shows.
#[derive(Debug)]
pub enum DetailView<'a> {
    Placeholder,
    Folder(FolderDetail<'a>),
}

#[derive(Debug)]
pub struct FolderDetail<'a> {
    pub node: &'a Node,
    pub folders: Vec<&'a Node>,
    pub segments: Vec<&'a Node>,
    pub show_upload: bool,
    pub can_add_subfolder: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip expansion of `id`; returns the new state.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded_ids.remove(id) {
            false
        } else {
            self.expanded_ids.insert(id.to_string());
            true
        }
    }

    pub fn expand(&mut self, id: &str) {
        self.expanded_ids.insert(id.to_string());
    }

    pub fn collapse(&mut self, id: &str) {
        self.expanded_ids.remove(id);
    }

    #[cfg(test)]
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded_ids.contains(id)
    }

    pub fn select(&mut self, id: &str) {
        self.selected_id = Some(id.to_string());
    }

    /// Call after every successful fetch. The first one pre-expands the root;
    /// later ones drop expanded ids that vanished. The selection is kept even
    /// when stale so the detail pane falls back to its placeholder.
    pub fn on_tree_loaded(&mut self, tree: &Node) {
        if !self.loaded {
            self.loaded = true;
            self.expanded_ids.insert(tree.id.clone());
            return;
        }
        self.expanded_ids.retain(|id| find_by_id(tree, id).is_some());
    }

    pub fn selected_node<'a>(&self, tree: Option<&'a Node>) -> Option<&'a Node> {
        let id = self.selected_id.as_deref()?;
        find_by_id(tree?, id)
    }

    pub fn detail<'a>(&self, tree: Option<&'a Node>) -> DetailView<'a> {
        match self.selected_node(tree) {
            Some(node) => DetailView::Folder(FolderDetail {
                node,
                folders: node.navigable_children(),
                segments: node.content_children(),
                show_upload: node.shows_upload_area(),
                can_add_subfolder: node.can_add_subfolder(),
            }),
            None => DetailView::Placeholder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tree::fixtures::sample_course;

    #[test]
    fn first_load_expands_root_and_selects_nothing() {
        let tree = sample_course();
        let mut view = ViewState::new();
        view.on_tree_loaded(&tree);
        assert!(view.is_expanded("c"));
        assert_eq!(view.expanded_ids.len(), 1);
        assert!(view.selected_id.is_none());
        assert!(matches!(view.detail(Some(&tree)), DetailView::Placeholder));
    }

    #[test]
    fn toggle_flips_membership() {
        let mut view = ViewState::new();
        assert!(view.toggle("m1"));
        assert!(view.is_expanded("m1"));
        assert!(!view.toggle("m1"));
        assert!(!view.is_expanded("m1"));
    }

    #[test]
    fn stale_selection_falls_back_to_placeholder() {
        let mut tree = sample_course();
        let mut view = ViewState::new();
        view.on_tree_loaded(&tree);
        view.select("m2");
        view.expand("m2");
        assert!(matches!(view.detail(Some(&tree)), DetailView::Folder(_)));

        tree.children.retain(|c| c.id != "m2");
        view.on_tree_loaded(&tree);
        assert_eq!(view.selected_id.as_deref(), Some("m2"));
        assert!(!view.is_expanded("m2"));
        assert!(view.is_expanded("c"));
        assert!(matches!(view.detail(Some(&tree)), DetailView::Placeholder));
        assert!(matches!(view.detail(None), DetailView::Placeholder));
    }

    #[test]
    fn detail_splits_folders_and_segments() {
        let tree = sample_course();
        let mut view = ViewState::new();
        view.on_tree_loaded(&tree);
        view.select("l1");
        match view.detail(Some(&tree)) {
            DetailView::Folder(d) => {
                assert_eq!(d.node.id, "l1");
                assert!(d.folders.is_empty());
                assert_eq!(d.segments.len(), 2);
                assert!(!d.show_upload);
                assert!(d.can_add_subfolder);
            }
            DetailView::Placeholder => panic!("expected folder detail"),
        }
    }
}
