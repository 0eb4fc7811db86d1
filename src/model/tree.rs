use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Deepest level at which a new subfolder may be created.
pub const MAX_SUBFOLDER_LEVEL: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Course,
    Module,
    Lesson,
    Segment,
}

impl NodeKind {
    /// Parse the store's `type` string, falling back to the level mapping the
    /// store itself uses (1 course, 2 module, 3 lesson, 4+ segment).
    pub fn from_wire(kind: Option<&str>, level: u32) -> Self {
        match kind.map(|k| k.to_ascii_lowercase()).as_deref() {
            Some("course") => NodeKind::Course,
            Some("module") => NodeKind::Module,
            Some("lesson") => NodeKind::Lesson,
            Some("segment") => NodeKind::Segment,
            _ => match level {
                0 | 1 => NodeKind::Course,
                2 => NodeKind::Module,
                3 => NodeKind::Lesson,
                _ => NodeKind::Segment,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Course => "course",
            NodeKind::Module => "module",
            NodeKind::Lesson => "lesson",
            NodeKind::Segment => "segment",
        }
    }

    /// Kind of content a node of this kind accepts through "add child content".
    pub fn content_child(&self) -> Option<NodeKind> {
        match self {
            NodeKind::Course => Some(NodeKind::Module),
            NodeKind::Module => Some(NodeKind::Lesson),
            NodeKind::Lesson | NodeKind::Segment => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NodeMetadata {
    #[serde(default, deserialize_with = "de_timecode")]
    pub timecode_start: Option<f64>,
    #[serde(default, deserialize_with = "de_timecode")]
    pub timecode_end: Option<f64>,
    #[serde(default)]
    pub extraction_confidence: Option<f64>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub media_thumbnail: Option<String>,
    #[serde(default)]
    pub video_duration_seconds: Option<u64>,
    #[serde(default)]
    pub transcript_language: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// One entry of the Course → Module → Lesson → Segment hierarchy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireNode")]
pub struct Node {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: NodeKind,
    pub hierarchy_level: u32,
    pub is_leaf: bool,
    pub children: Vec<Node>,
    pub metadata: NodeMetadata,
}

#[derive(Deserialize)]
struct WireNode {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    hierarchy_level: u32,
    #[serde(default)]
    is_leaf: Option<bool>,
    #[serde(default)]
    children: Vec<Node>,
    #[serde(default)]
    metadata: NodeMetadata,
}

impl From<WireNode> for Node {
    fn from(w: WireNode) -> Self {
        let flagged = w.is_leaf.unwrap_or(false);
        let timed = w.metadata.timecode_start.is_some();
        let mut kind = NodeKind::from_wire(w.kind.as_deref(), w.hierarchy_level);
        // The store types nodes by depth, so a level-4 folder arrives as "segment".
        if kind == NodeKind::Segment && !flagged && !timed {
            kind = NodeKind::Lesson;
        }
        let is_leaf = flagged || timed;
        if is_leaf {
            kind = NodeKind::Segment;
        }
        Node {
            id: w.id,
            name: w.name.unwrap_or_default(),
            description: w.description.unwrap_or_default(),
            kind,
            hierarchy_level: w.hierarchy_level,
            is_leaf,
            children: w.children,
            metadata: w.metadata,
        }
    }
}

fn de_timecode<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => parse_timecode(&s),
        _ => None,
    })
}

/// Parse `HH:MM:SS,mmm`, `MM:SS.mmm` or plain seconds.
pub fn parse_timecode(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let mut total = 0.0;
    for part in s.split(':') {
        let secs: f64 = part.replace(',', ".").parse().ok()?;
        total = total * 60.0 + secs;
    }
    Some(total)
}

/// Render seconds as `M:SS` or `H:MM:SS`.
pub fn format_timecode(secs: f64) -> String {
    let whole = secs.max(0.0) as u64;
    let (h, m, s) = (whole / 3600, (whole % 3600) / 60, whole % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

impl Node {
    #[cfg(test)]
    pub fn new(id: &str, name: &str, kind: NodeKind, hierarchy_level: u32) -> Self {
        Node {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            kind,
            hierarchy_level,
            is_leaf: kind == NodeKind::Segment,
            children: Vec::new(),
            metadata: NodeMetadata::default(),
        }
    }

    /// Sidebar/tab eligibility: not a leaf and no timecode.
    pub fn is_navigable(&self) -> bool {
        !self.is_leaf && self.metadata.timecode_start.is_none()
    }

    pub fn navigable_children(&self) -> Vec<&Node> {
        self.children.iter().filter(|c| c.is_navigable()).collect()
    }

    /// Complement of [`Node::navigable_children`]: what the detail pane lists.
    pub fn content_children(&self) -> Vec<&Node> {
        self.children.iter().filter(|c| !c.is_navigable()).collect()
    }

    pub fn can_add_subfolder(&self) -> bool {
        self.hierarchy_level < MAX_SUBFOLDER_LEVEL
    }

    pub fn can_upload_transcript(&self) -> bool {
        !matches!(self.kind, NodeKind::Course | NodeKind::Segment)
    }

    /// Upload affordance is hidden once segments exist.
    pub fn shows_upload_area(&self) -> bool {
        self.can_upload_transcript() && self.content_children().is_empty()
    }

    pub fn can_delete(&self) -> bool {
        self.kind != NodeKind::Course
    }

    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    /// `"{label} {n+1}"` where n counts navigable children.
    pub fn default_child_name(&self, label: &str) -> String {
        format!("{} {}", label, self.navigable_children().len() + 1)
    }

    pub fn duration_label(&self) -> Option<String> {
        match (self.metadata.timecode_start, self.metadata.timecode_end) {
            (Some(start), Some(end)) => Some(format!(
                "{} - {}",
                format_timecode(start),
                format_timecode(end)
            )),
            (Some(start), None) => Some(format_timecode(start)),
            _ => None,
        }
    }
}

/// Depth-first lookup; `None` is a normal outcome (stale ids after a refresh).
pub fn find_by_id<'a>(node: &'a Node, id: &str) -> Option<&'a Node> {
    if node.id == id {
        return Some(node);
    }
    node.children.iter().find_map(|c| find_by_id(c, id))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("root {id} is a {kind} at level {level}, expected a level-1 course")]
    BadRoot {
        id: String,
        kind: NodeKind,
        level: u32,
    },
    #[error("duplicate node id {0}")]
    DuplicateId(String),
    #[error("{child} is at level {child_level} under {parent} at level {parent_level}")]
    LevelSkew {
        parent: String,
        parent_level: u32,
        child: String,
        child_level: u32,
    },
}

pub fn validate_tree(root: &Node) -> Result<(), TreeError> {
    if root.kind != NodeKind::Course || root.hierarchy_level != 1 {
        return Err(TreeError::BadRoot {
            id: root.id.clone(),
            kind: root.kind,
            level: root.hierarchy_level,
        });
    }
    let mut seen = HashSet::new();
    validate_node(root, &mut seen)
}

fn validate_node<'a>(node: &'a Node, seen: &mut HashSet<&'a str>) -> Result<(), TreeError> {
    if !seen.insert(node.id.as_str()) {
        return Err(TreeError::DuplicateId(node.id.clone()));
    }
    for child in &node.children {
        if child.hierarchy_level != node.hierarchy_level + 1 {
            return Err(TreeError::LevelSkew {
                parent: node.id.clone(),
                parent_level: node.hierarchy_level,
                child: child.id.clone(),
                child_level: child.hierarchy_level,
            });
        }
        validate_node(child, seen)?;
    }
    Ok(())
}

/// One line of the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarRow {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub segment_count: usize,
}

/// Flatten navigable nodes for the sidebar, descending only into expanded ones.
pub fn sidebar_rows(root: &Node, expanded: &HashSet<String>) -> Vec<SidebarRow> {
    let mut rows = Vec::new();
    collect_rows(root, expanded, 0, &mut rows);
    rows
}

fn collect_rows(node: &Node, expanded: &HashSet<String>, depth: usize, rows: &mut Vec<SidebarRow>) {
    let folders = node.navigable_children();
    let is_expanded = expanded.contains(&node.id);
    rows.push(SidebarRow {
        id: node.id.clone(),
        name: node.name.clone(),
        kind: node.kind,
        depth,
        has_children: !folders.is_empty(),
        expanded: is_expanded,
        segment_count: node.children.len() - folders.len(),
    });
    if is_expanded {
        for child in folders {
            collect_rows(child, expanded, depth + 1, rows);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeCounts {
    pub modules: usize,
    pub lessons: usize,
    pub segments: usize,
    pub total_duration_seconds: u64,
}

/// Counts computed from a fetched tree.
pub fn tree_counts(root: &Node) -> TreeCounts {
    let mut counts = TreeCounts::default();
    tally(root, &mut counts);
    counts
}

fn tally(node: &Node, counts: &mut TreeCounts) {
    match node.kind {
        NodeKind::Module => counts.modules += 1,
        NodeKind::Lesson => {
            counts.lessons += 1;
            counts.total_duration_seconds += node.metadata.video_duration_seconds.unwrap_or(0);
        }
        NodeKind::Segment => counts.segments += 1,
        NodeKind::Course => {}
    }
    for child in &node.children {
        tally(child, counts);
    }
}

#[cfg(test)]
pub mod fixtures {
    use super::*;

    pub fn folder(id: &str, name: &str, level: u32, children: Vec<Node>) -> Node {
        let kind = NodeKind::from_wire(None, level);
        let kind = if kind == NodeKind::Segment { NodeKind::Lesson } else { kind };
        let mut node = Node::new(id, name, kind, level);
        node.children = children;
        node
    }

    pub fn segment(id: &str, level: u32, start: f64) -> Node {
        let mut node = Node::new(id, &format!("Segment {}", id), NodeKind::Segment, level);
        node.metadata.timecode_start = Some(start);
        node.metadata.timecode_end = Some(start + 30.0);
        node
    }

    /// C (1) → M1 (2) → L1 (3, two segments), L2 (3); M2 (2, empty).
    pub fn sample_course() -> Node {
        folder(
            "c",
            "Course",
            1,
            vec![
                folder(
                    "m1",
                    "Module 1",
                    2,
                    vec![
                        folder(
                            "l1",
                            "Intro",
                            3,
                            vec![segment("s1", 4, 0.0), segment("s2", 4, 30.0)],
                        ),
                        folder("l2", "Setup", 3, vec![]),
                    ],
                ),
                folder("m2", "Module 2", 2, vec![]),
            ],
        )
    }
}
