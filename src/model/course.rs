use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct CourseSummary {
    pub id: String,
    #[serde(default, alias = "question")]
    pub name: Option<String>,
    #[serde(default, alias = "answer")]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl CourseSummary {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// `created_at` as a short date, if the store sent a parseable timestamp.
    pub fn created_label(&self) -> Option<String> {
        let raw = self.created_at.as_deref()?;
        chrono::DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .ok()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CourseList {
    #[serde(default)]
    pub courses: Vec<CourseSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TreeEnvelope {
    pub course: crate::model::tree::Node,
}

/// Create responses carry at least the new id; the refetch is authoritative.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedNode {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Partial update; unset fields are left alone by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_duration_seconds: Option<u64>,
}

impl NodeUpdate {
    pub fn rename(name: &str) -> Self {
        NodeUpdate {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteResult {
    #[serde(default)]
    pub deleted_count: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResult {
    pub segments_created: usize,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloneResult {
    pub new_course_id: String,
    #[serde(default)]
    pub segments_cloned: usize,
    #[serde(default)]
    pub embeddings_regenerated: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseStats {
    #[serde(default)]
    pub module_count: usize,
    #[serde(default)]
    pub lesson_count: usize,
    #[serde(default)]
    pub segment_count: usize,
    #[serde(default)]
    pub total_duration_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_serializes_only_set_fields() {
        let body = serde_json::to_value(NodeUpdate::rename("Intro")).unwrap();
        assert_eq!(body, serde_json::json!({ "name": "Intro" }));
        let body = serde_json::to_value(NodeUpdate::default()).unwrap();
        assert_eq!(body, serde_json::json!({}));
    }

    #[test]
    fn course_summary_accepts_store_column_names() {
        let c: CourseSummary = serde_json::from_str(
            r#"{"id": "abc", "question": "Online Income Lab", "created_at": "2025-03-04T10:00:00+00:00"}"#,
        )
        .unwrap();
        assert_eq!(c.display_name(), "Online Income Lab");
        assert_eq!(c.created_label().as_deref(), Some("2025-03-04"));
    }
}
