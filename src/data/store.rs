use std::path::Path;

use crate::error::StoreError;
use crate::model::course::{
    CloneResult, CourseStats, CourseSummary, CreatedNode, DeleteResult, NodeUpdate, UploadResult,
};
use crate::model::tree::Node;

/// Remote content store. Every call is one request/response; ids are stable.
pub trait ContentStore: Send + Sync {
    fn fetch_tree(&self, course_id: &str) -> Result<Node, StoreError>;

    fn list_courses(&self) -> Result<Vec<CourseSummary>, StoreError>;

    fn create_course(
        &self,
        name: &str,
        description: &str,
        thumbnail_url: Option<&str>,
    ) -> Result<CreatedNode, StoreError>;

    fn create_module(
        &self,
        parent_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatedNode, StoreError>;

    fn create_lesson(
        &self,
        parent_id: &str,
        name: &str,
        description: &str,
        video_url: Option<&str>,
    ) -> Result<CreatedNode, StoreError>;

    fn create_subfolder(
        &self,
        parent_id: &str,
        name: &str,
        description: &str,
        thumbnail_url: Option<&str>,
    ) -> Result<CreatedNode, StoreError>;

    fn update_node(&self, id: &str, update: &NodeUpdate) -> Result<(), StoreError>;

    fn delete_node(&self, id: &str) -> Result<DeleteResult, StoreError>;

    fn upload_transcript(&self, node_id: &str, file: &Path) -> Result<UploadResult, StoreError>;

    fn clone_course(
        &self,
        course_id: &str,
        new_name: &str,
        regenerate_embeddings: bool,
    ) -> Result<CloneResult, StoreError>;

    fn course_stats(&self, course_id: &str) -> Result<CourseStats, StoreError>;
}
