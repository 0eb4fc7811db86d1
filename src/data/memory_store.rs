use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::data::store::ContentStore;
use crate::data::transcripts::TranscriptFormat;
use crate::error::StoreError;
use crate::model::course::{
    CloneResult, CourseStats, CourseSummary, CreatedNode, DeleteResult, NodeUpdate, UploadResult,
};
use crate::model::tree::{tree_counts, Node, NodeKind};

/// In-process stand-in for the admin API, with request counting and
/// one-shot failure injection.
#[derive(Default)]
pub struct MemoryStore {
    courses: Mutex<Vec<Node>>,
    next_id: AtomicUsize,
    requests: AtomicUsize,
    fail_next: Mutex<Option<(u16, String)>>,
    fail_fetches: AtomicBool,
    fail_upload: Mutex<Option<(String, String)>>,
}

fn find_mut<'a>(node: &'a mut Node, id: &str) -> Option<&'a mut Node> {
    if node.id == id {
        return Some(node);
    }
    node.children.iter_mut().find_map(|c| find_mut(c, id))
}

fn remove(node: &mut Node, id: &str) -> Option<Node> {
    if let Some(pos) = node.children.iter().position(|c| c.id == id) {
        return Some(node.children.remove(pos));
    }
    node.children.iter_mut().find_map(|c| remove(c, id))
}

fn not_found(what: &str, id: &str) -> StoreError {
    StoreError::Remote {
        status: 404,
        detail: format!("{} {} not found", what, id),
    }
}

impl MemoryStore {
    pub fn with_course(course: Node) -> Self {
        let store = MemoryStore::default();
        store.courses.lock().unwrap().push(course);
        store
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Make the next request fail with `status` and `detail`.
    pub fn fail_next(&self, status: u16, detail: &str) {
        *self.fail_next.lock().unwrap() = Some((status, detail.to_string()));
    }

    pub fn fail_fetches(&self, on: bool) {
        self.fail_fetches.store(on, Ordering::SeqCst);
    }

    /// Reject every transcript upload to `node_id` with `detail`.
    pub fn fail_uploads_to(&self, node_id: &str, detail: &str) {
        *self.fail_upload.lock().unwrap() = Some((node_id.to_string(), detail.to_string()));
    }

    fn begin_request(&self) -> Result<(), StoreError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.fail_next.lock().unwrap().take() {
            Some((status, detail)) => Err(StoreError::Remote { status, detail }),
            None => Ok(()),
        }
    }

    fn new_id(&self) -> String {
        format!("n{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn with_node<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Node) -> R,
    ) -> Result<R, StoreError> {
        let mut courses = self.courses.lock().unwrap();
        let node = courses
            .iter_mut()
            .find_map(|c| find_mut(c, id))
            .ok_or_else(|| not_found("Folder", id))?;
        Ok(f(node))
    }

    fn add_child(
        &self,
        parent_id: &str,
        name: &str,
        description: &str,
        kind: Option<NodeKind>,
    ) -> Result<CreatedNode, StoreError> {
        self.begin_request()?;
        let id = self.new_id();
        self.with_node(parent_id, |parent| {
            let level = parent.hierarchy_level + 1;
            let kind = kind.unwrap_or(match NodeKind::from_wire(None, level) {
                NodeKind::Segment => NodeKind::Lesson,
                k => k,
            });
            let mut node = Node::new(&id, name, kind, level);
            node.description = description.to_string();
            parent.children.push(node);
        })?;
        Ok(CreatedNode {
            id,
            name: Some(name.to_string()),
        })
    }
}

fn reassign_ids(node: &mut Node, store: &MemoryStore, segments: &mut usize) {
    node.id = store.new_id();
    if node.kind == NodeKind::Segment {
        *segments += 1;
    }
    for child in &mut node.children {
        reassign_ids(child, store, segments);
    }
}

impl ContentStore for MemoryStore {
    fn fetch_tree(&self, course_id: &str) -> Result<Node, StoreError> {
        self.begin_request()?;
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(StoreError::Remote {
                status: 503,
                detail: "store unavailable".to_string(),
            });
        }
        let courses = self.courses.lock().unwrap();
        courses
            .iter()
            .find(|c| c.id == course_id)
            .cloned()
            .ok_or_else(|| not_found("Course", course_id))
    }

    fn list_courses(&self) -> Result<Vec<CourseSummary>, StoreError> {
        self.begin_request()?;
        let courses = self.courses.lock().unwrap();
        Ok(courses
            .iter()
            .map(|c| CourseSummary {
                id: c.id.clone(),
                name: Some(c.name.clone()),
                description: Some(c.description.clone()),
                thumbnail_url: None,
                created_at: None,
            })
            .collect())
    }

    fn create_course(
        &self,
        name: &str,
        description: &str,
        _thumbnail_url: Option<&str>,
    ) -> Result<CreatedNode, StoreError> {
        self.begin_request()?;
        let id = self.new_id();
        let mut course = Node::new(&id, name, NodeKind::Course, 1);
        course.description = description.to_string();
        self.courses.lock().unwrap().push(course);
        Ok(CreatedNode {
            id,
            name: Some(name.to_string()),
        })
    }

    fn create_module(
        &self,
        parent_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatedNode, StoreError> {
        self.add_child(parent_id, name, description, Some(NodeKind::Module))
    }

    fn create_lesson(
        &self,
        parent_id: &str,
        name: &str,
        description: &str,
        _video_url: Option<&str>,
    ) -> Result<CreatedNode, StoreError> {
        self.add_child(parent_id, name, description, Some(NodeKind::Lesson))
    }

    fn create_subfolder(
        &self,
        parent_id: &str,
        name: &str,
        description: &str,
        _thumbnail_url: Option<&str>,
    ) -> Result<CreatedNode, StoreError> {
        self.add_child(parent_id, name, description, None)
    }

    fn update_node(&self, id: &str, update: &NodeUpdate) -> Result<(), StoreError> {
        self.begin_request()?;
        self.with_node(id, |node| {
            if let Some(name) = &update.name {
                node.name = name.clone();
            }
            if let Some(description) = &update.description {
                node.description = description.clone();
            }
            if let Some(url) = &update.video_url {
                node.metadata.media_url = Some(url.clone());
            }
        })
    }

    fn delete_node(&self, id: &str) -> Result<DeleteResult, StoreError> {
        self.begin_request()?;
        let mut courses = self.courses.lock().unwrap();
        if let Some(pos) = courses.iter().position(|c| c.id == id) {
            let removed = courses.remove(pos);
            return Ok(DeleteResult {
                deleted_count: Some(1 + removed.descendant_count()),
            });
        }
        let removed = courses
            .iter_mut()
            .find_map(|c| remove(c, id))
            .ok_or_else(|| not_found("Folder", id))?;
        Ok(DeleteResult {
            deleted_count: Some(1 + removed.descendant_count()),
        })
    }

    fn upload_transcript(&self, node_id: &str, file: &Path) -> Result<UploadResult, StoreError> {
        self.begin_request()?;
        if let Some((id, detail)) = self.fail_upload.lock().unwrap().as_ref() {
            if id == node_id {
                return Err(StoreError::Remote {
                    status: 500,
                    detail: detail.clone(),
                });
            }
        }
        let text = std::fs::read_to_string(file)?;
        let cues = text.lines().filter(|l| l.contains("-->")).count();
        let format = match TranscriptFormat::from_path(file) {
            Some(TranscriptFormat::Vtt) => "vtt",
            _ => "srt",
        };
        let ids: Vec<String> = (0..cues).map(|_| self.new_id()).collect();
        self.with_node(node_id, |node| {
            let level = node.hierarchy_level + 1;
            for (i, id) in ids.iter().enumerate() {
                let mut seg = Node::new(id, &format!("Cue {}", i + 1), NodeKind::Segment, level);
                seg.metadata.timecode_start = Some(i as f64 * 5.0);
                seg.metadata.timecode_end = Some(i as f64 * 5.0 + 5.0);
                node.children.push(seg);
            }
        })?;
        Ok(UploadResult {
            segments_created: cues,
            format: Some(format.to_string()),
        })
    }

    fn clone_course(
        &self,
        course_id: &str,
        new_name: &str,
        regenerate_embeddings: bool,
    ) -> Result<CloneResult, StoreError> {
        self.begin_request()?;
        let mut copy = {
            let courses = self.courses.lock().unwrap();
            courses
                .iter()
                .find(|c| c.id == course_id)
                .cloned()
                .ok_or_else(|| not_found("Course", course_id))?
        };
        let mut segments = 0;
        reassign_ids(&mut copy, self, &mut segments);
        copy.name = new_name.to_string();
        let new_course_id = copy.id.clone();
        self.courses.lock().unwrap().push(copy);
        Ok(CloneResult {
            new_course_id,
            segments_cloned: segments,
            embeddings_regenerated: regenerate_embeddings,
        })
    }

    fn course_stats(&self, course_id: &str) -> Result<CourseStats, StoreError> {
        self.begin_request()?;
        let courses = self.courses.lock().unwrap();
        let course = courses
            .iter()
            .find(|c| c.id == course_id)
            .ok_or_else(|| not_found("Course", course_id))?;
        let counts = tree_counts(course);
        Ok(CourseStats {
            module_count: counts.modules,
            lesson_count: counts.lessons,
            segment_count: counts.segments,
            total_duration_seconds: counts.total_duration_seconds,
        })
    }
}
