use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::data::store::ContentStore;
use crate::error::StoreError;
use crate::model::course::{
    CloneResult, CourseList, CourseStats, CourseSummary, CreatedNode, DeleteResult, NodeUpdate,
    TreeEnvelope, UploadResult,
};
use crate::model::tree::Node;

/// Content store reached over the admin REST API.
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    client: Client,
    base_url: String,
}

impl HttpContentStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpContentStore {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T, StoreError> {
        debug!(what, "store request");
        let response = req.send()?;
        let status = response.status();
        let body = response.bytes()?;
        if !status.is_success() {
            let err = remote_error(status.as_u16(), &body);
            warn!(what, status = status.as_u16(), error = %err, "store request failed");
            return Err(err);
        }
        parse_body(&body, what)
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, StoreError> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|source| StoreError::Decode {
        what: what.to_string(),
        source,
    })
}

/// Build the error for a failed response, preferring the server's `detail`.
pub fn remote_error(status: u16, body: &[u8]) -> StoreError {
    let detail = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| match v.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
        .unwrap_or_else(|| format!("HTTP {}", status));
    StoreError::Remote { status, detail }
}

impl ContentStore for HttpContentStore {
    fn fetch_tree(&self, course_id: &str) -> Result<Node, StoreError> {
        let req = self
            .client
            .get(self.url(&format!("/api/admin/courses/{}/tree", course_id)));
        let envelope: TreeEnvelope = self.send(req, "course tree")?;
        Ok(envelope.course)
    }

    fn list_courses(&self) -> Result<Vec<CourseSummary>, StoreError> {
        let req = self.client.get(self.url("/api/admin/courses"));
        let list: CourseList = self.send(req, "course list")?;
        Ok(list.courses)
    }

    fn create_course(
        &self,
        name: &str,
        description: &str,
        thumbnail_url: Option<&str>,
    ) -> Result<CreatedNode, StoreError> {
        let body = serde_json::json!({
            "name": name,
            "description": description,
            "thumbnail_url": thumbnail_url,
        });
        let req = self.client.post(self.url("/api/admin/courses")).json(&body);
        self.send(req, "create course")
    }

    fn create_module(
        &self,
        parent_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatedNode, StoreError> {
        let body = serde_json::json!({ "name": name, "description": description });
        let req = self
            .client
            .post(self.url(&format!("/api/admin/courses/{}/modules", parent_id)))
            .json(&body);
        self.send(req, "create module")
    }

    fn create_lesson(
        &self,
        parent_id: &str,
        name: &str,
        description: &str,
        video_url: Option<&str>,
    ) -> Result<CreatedNode, StoreError> {
        let body = serde_json::json!({
            "name": name,
            "description": description,
            "video_url": video_url,
        });
        let req = self
            .client
            .post(self.url(&format!("/api/admin/modules/{}/lessons", parent_id)))
            .json(&body);
        self.send(req, "create lesson")
    }

    fn create_subfolder(
        &self,
        parent_id: &str,
        name: &str,
        description: &str,
        thumbnail_url: Option<&str>,
    ) -> Result<CreatedNode, StoreError> {
        let body = serde_json::json!({
            "name": name,
            "description": description,
            "thumbnail_url": thumbnail_url,
        });
        let req = self
            .client
            .post(self.url(&format!("/api/admin/folders/{}/subfolder", parent_id)))
            .json(&body);
        self.send(req, "create subfolder")
    }

    fn update_node(&self, id: &str, update: &NodeUpdate) -> Result<(), StoreError> {
        let req = self
            .client
            .patch(self.url(&format!("/api/admin/folders/{}", id)))
            .json(update);
        let _: serde_json::Value = self.send(req, "update")?;
        Ok(())
    }

    fn delete_node(&self, id: &str) -> Result<DeleteResult, StoreError> {
        let req = self
            .client
            .delete(self.url(&format!("/api/admin/folders/{}", id)));
        self.send(req, "delete")
    }

    fn upload_transcript(&self, node_id: &str, file: &Path) -> Result<UploadResult, StoreError> {
        let form = multipart::Form::new().file("file", file)?;
        let req = self
            .client
            .post(self.url(&format!("/api/admin/lessons/{}/upload-transcript", node_id)))
            .multipart(form);
        self.send(req, "transcript upload")
    }

    fn clone_course(
        &self,
        course_id: &str,
        new_name: &str,
        regenerate_embeddings: bool,
    ) -> Result<CloneResult, StoreError> {
        let body = serde_json::json!({
            "new_name": new_name,
            "regenerate_embeddings": regenerate_embeddings,
        });
        let req = self
            .client
            .post(self.url(&format!("/api/admin/courses/{}/clone", course_id)))
            .json(&body);
        self.send(req, "clone course")
    }

    fn course_stats(&self, course_id: &str) -> Result<CourseStats, StoreError> {
        let req = self
            .client
            .get(self.url(&format!("/api/admin/courses/{}/stats", course_id)));
        self.send(req, "course stats")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_prefers_detail() {
        let err = remote_error(404, br#"{"detail": "Course abc not found"}"#);
        assert_eq!(err.to_string(), "Course abc not found");
        match err {
            StoreError::Remote { status, .. } => assert_eq!(status, 404),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn remote_error_falls_back_to_status() {
        assert_eq!(remote_error(502, b"<html>bad gateway</html>").to_string(), "HTTP 502");
        assert_eq!(remote_error(500, br#"{"detail": null}"#).to_string(), "HTTP 500");
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        let err = remote_error(422, br#"{"detail": [{"msg": "field required"}]}"#);
        assert!(err.to_string().contains("field required"));
    }

    #[test]
    fn empty_body_parses_as_null() {
        let v: serde_json::Value = parse_body(b"  ", "update").unwrap();
        assert!(v.is_null());
        let created: CreatedNode = parse_body(br#"{"id": "n1", "success": true}"#, "create").unwrap();
        assert_eq!(created.id, "n1");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let store = HttpContentStore::new("http://localhost:8001/", Duration::from_secs(5)).unwrap();
        assert_eq!(store.base_url(), "http://localhost:8001");
        assert_eq!(store.url("/api/admin/courses"), "http://localhost:8001/api/admin/courses");
    }
}
