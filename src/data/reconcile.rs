//! Fire-and-refetch reconciliation of the open course tree.
//!
//! Every mutation is validated locally, sent to the store, and followed by a
//! full refetch that replaces the held tree. Nothing is patched in place and
//! a failed request leaves the previous tree untouched.
//!
//! The work is split in three so the TUI can run the network part on a worker
//! thread: [`Reconciler::begin`] validates and marks the reconciler busy,
//! [`run`] talks to the store, and [`Reconciler::complete`] installs the
//! result. [`Reconciler::apply`] chains the three for blocking callers.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::data::store::ContentStore;
use crate::data::transcripts::{check_transcript_file, TranscriptFormat};
use crate::error::{ReconcileError, StoreError, ValidationError};
use crate::model::course::{NodeUpdate, UploadResult};
use crate::model::tree::{find_by_id, validate_tree, Node, NodeKind, MAX_SUBFOLDER_LEVEL};
use crate::model::view_state::ViewState;

pub const MODULE_LABEL: &str = "Module";
pub const LESSON_LABEL: &str = "Lesson";
pub const SUBFOLDER_LABEL: &str = "Subfolder";
pub const TAB_LABEL: &str = "Tab";

/// A structural edit as the user asked for it. `name: None` means default naming.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateModule {
        parent_id: String,
        name: Option<String>,
        description: String,
    },
    CreateLesson {
        parent_id: String,
        name: Option<String>,
        description: String,
        video_url: Option<String>,
    },
    CreateSubfolder {
        parent_id: String,
        name: Option<String>,
        description: String,
        thumbnail_url: Option<String>,
        label: &'static str,
    },
    UpdateNode {
        id: String,
        update: NodeUpdate,
    },
    DeleteNode {
        id: String,
    },
    UploadTranscript {
        node_id: String,
        path: PathBuf,
    },
}

impl Mutation {
    pub fn action(&self) -> &'static str {
        match self {
            Mutation::CreateModule { .. } => "create module",
            Mutation::CreateLesson { .. } => "create lesson",
            Mutation::CreateSubfolder { .. } => "create subfolder",
            Mutation::UpdateNode { .. } => "update",
            Mutation::DeleteNode { .. } => "delete",
            Mutation::UploadTranscript { .. } => "transcript upload",
        }
    }
}

/// A validated request, names resolved, ready to send.
#[derive(Debug, Clone)]
pub enum Request {
    CreateModule {
        parent_id: String,
        name: String,
        description: String,
    },
    CreateLesson {
        parent_id: String,
        name: String,
        description: String,
        video_url: Option<String>,
    },
    CreateSubfolder {
        parent_id: String,
        name: String,
        description: String,
        thumbnail_url: Option<String>,
    },
    Update {
        id: String,
        update: NodeUpdate,
    },
    Delete {
        id: String,
    },
    Upload {
        node_id: String,
        path: PathBuf,
        format: TranscriptFormat,
    },
}

#[derive(Debug, Clone)]
pub struct Ticket {
    pub course_id: String,
    pub action: &'static str,
    pub request: Request,
}

#[derive(Debug, Clone)]
pub enum MutationOutcome {
    Created {
        id: String,
        name: String,
        parent_id: String,
    },
    Updated {
        id: String,
    },
    Deleted {
        id: String,
        deleted_count: Option<usize>,
    },
    Uploaded {
        node_id: String,
        result: UploadResult,
    },
}

impl MutationOutcome {
    /// Id of the node the mutation acted on.
    pub fn node_id(&self) -> &str {
        match self {
            MutationOutcome::Created { id, .. }
            | MutationOutcome::Updated { id }
            | MutationOutcome::Deleted { id, .. } => id,
            MutationOutcome::Uploaded { node_id, .. } => node_id,
        }
    }

    /// One-line summary for the status bar or stdout.
    pub fn summary(&self) -> String {
        match self {
            MutationOutcome::Created { name, .. } => format!("Created {}", name),
            MutationOutcome::Updated { .. } => "Saved".to_string(),
            MutationOutcome::Deleted {
                deleted_count: Some(n),
                ..
            } => format!("Deleted {} record{}", n, if *n == 1 { "" } else { "s" }),
            MutationOutcome::Deleted { .. } => "Deleted".to_string(),
            MutationOutcome::Uploaded { result, .. } => format!(
                "Uploaded {} segments ({})",
                result.segments_created,
                result.format.as_deref().unwrap_or("transcript")
            ),
        }
    }
}

#[derive(Debug)]
pub struct Completed {
    pub outcome: MutationOutcome,
    pub tree: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pending {
    Refresh,
    Mutation(&'static str),
}

/// Owner of the open course's tree and its view state.
#[derive(Debug, Default)]
pub struct Reconciler {
    course_id: Option<String>,
    tree: Option<Node>,
    pub view: ViewState,
    pending: Option<Pending>,
}

fn resolve_name(
    name: Option<String>,
    parent: &Node,
    label: &str,
) -> Result<String, ValidationError> {
    match name {
        Some(n) => {
            let trimmed = n.trim();
            if trimmed.is_empty() {
                Err(ValidationError::EmptyName)
            } else {
                Ok(trimmed.to_string())
            }
        }
        None => Ok(parent.default_child_name(label)),
    }
}

fn require_child_kind(parent: &Node, child: NodeKind) -> Result<(), ValidationError> {
    if parent.kind.content_child() == Some(child) {
        Ok(())
    } else {
        Err(ValidationError::WrongParent {
            parent_kind: parent.kind.as_str(),
            child_kind: child.as_str(),
        })
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> Option<&Node> {
        self.tree.as_ref()
    }

    pub fn pending(&self) -> Option<&Pending> {
        self.pending.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Switch to `course_id`, dropping the old tree and view state.
    /// Returns the id to fetch.
    pub fn open(&mut self, course_id: &str) -> Result<String, ReconcileError> {
        if self.is_busy() {
            return Err(ReconcileError::Busy);
        }
        self.course_id = Some(course_id.to_string());
        self.tree = None;
        self.view = ViewState::new();
        self.pending = Some(Pending::Refresh);
        Ok(course_id.to_string())
    }

    pub fn begin_refresh(&mut self) -> Result<String, ReconcileError> {
        if self.is_busy() {
            return Err(ReconcileError::Busy);
        }
        let id = self.course_id.clone().ok_or(ReconcileError::NoCourse)?;
        self.pending = Some(Pending::Refresh);
        Ok(id)
    }

    pub fn complete_refresh(&mut self, result: Result<Node, StoreError>) -> Result<(), ReconcileError> {
        self.pending = None;
        match result {
            Ok(tree) => self.install(tree).map_err(ReconcileError::Store),
            Err(e) => {
                warn!(error = %e, "refresh failed, keeping previous tree");
                Err(ReconcileError::Store(e))
            }
        }
    }

    fn install(&mut self, tree: Node) -> Result<(), StoreError> {
        if let Err(e) = validate_tree(&tree) {
            warn!(error = %e, "rejecting fetched tree");
            return Err(StoreError::MalformedTree(e));
        }
        info!(course = %tree.id, nodes = tree.descendant_count() + 1, "tree installed");
        self.view.on_tree_loaded(&tree);
        self.tree = Some(tree);
        Ok(())
    }

    /// Validate `mutation` against the held tree and mark a request outstanding.
    pub fn begin(&mut self, mutation: Mutation) -> Result<Ticket, ReconcileError> {
        if self.is_busy() {
            return Err(ReconcileError::Busy);
        }
        let tree = self.tree.as_ref().ok_or(ReconcileError::NoCourse)?;
        let course_id = self.course_id.clone().ok_or(ReconcileError::NoCourse)?;
        let action = mutation.action();
        let lookup = |id: &str| {
            find_by_id(tree, id).ok_or_else(|| ValidationError::UnknownNode(id.to_string()))
        };

        let request = match mutation {
            Mutation::CreateModule {
                parent_id,
                name,
                description,
            } => {
                let parent = lookup(&parent_id)?;
                require_child_kind(parent, NodeKind::Module)?;
                Request::CreateModule {
                    name: resolve_name(name, parent, MODULE_LABEL)?,
                    parent_id,
                    description,
                }
            }
            Mutation::CreateLesson {
                parent_id,
                name,
                description,
                video_url,
            } => {
                let parent = lookup(&parent_id)?;
                require_child_kind(parent, NodeKind::Lesson)?;
                Request::CreateLesson {
                    name: resolve_name(name, parent, LESSON_LABEL)?,
                    parent_id,
                    description,
                    video_url,
                }
            }
            Mutation::CreateSubfolder {
                parent_id,
                name,
                description,
                thumbnail_url,
                label,
            } => {
                let parent = lookup(&parent_id)?;
                if parent.kind == NodeKind::Segment {
                    return Err(ValidationError::WrongParent {
                        parent_kind: parent.kind.as_str(),
                        child_kind: "subfolder",
                    }
                    .into());
                }
                if !parent.can_add_subfolder() {
                    return Err(ValidationError::DepthLimit {
                        name: parent.name.clone(),
                        level: parent.hierarchy_level,
                        max: MAX_SUBFOLDER_LEVEL,
                    }
                    .into());
                }
                Request::CreateSubfolder {
                    name: resolve_name(name, parent, label)?,
                    parent_id,
                    description,
                    thumbnail_url,
                }
            }
            Mutation::UpdateNode { id, update } => {
                lookup(&id)?;
                if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
                    return Err(ValidationError::EmptyName.into());
                }
                Request::Update { id, update }
            }
            Mutation::DeleteNode { id } => {
                let node = lookup(&id)?;
                if !node.can_delete() || node.id == tree.id {
                    return Err(ValidationError::CourseDelete.into());
                }
                Request::Delete { id }
            }
            Mutation::UploadTranscript { node_id, path } => {
                let node = lookup(&node_id)?;
                if !node.can_upload_transcript() {
                    return Err(ValidationError::UploadTarget(node.kind.as_str()).into());
                }
                if !node.shows_upload_area() {
                    return Err(ValidationError::SegmentsPresent(node.name.clone()).into());
                }
                let format = check_transcript_file(&path)?;
                Request::Upload {
                    node_id,
                    path,
                    format,
                }
            }
        };

        info!(action, course = %course_id, "mutation started");
        self.pending = Some(Pending::Mutation(action));
        Ok(Ticket {
            course_id,
            action,
            request,
        })
    }

    /// Install the refetched tree, or keep the old one on any failure.
    pub fn complete(
        &mut self,
        result: Result<Completed, ReconcileError>,
    ) -> Result<MutationOutcome, ReconcileError> {
        self.pending = None;
        match result {
            Ok(done) => {
                self.install(done.tree)?;
                info!(
                    node = %done.outcome.node_id(),
                    outcome = %done.outcome.summary(),
                    "mutation reconciled"
                );
                Ok(done.outcome)
            }
            Err(e) => {
                warn!(error = %e, "mutation failed, keeping previous tree");
                Err(e)
            }
        }
    }

    /// Blocking open + first fetch.
    pub fn load(&mut self, store: &dyn ContentStore, course_id: &str) -> Result<(), ReconcileError> {
        let id = self.open(course_id)?;
        self.complete_refresh(store.fetch_tree(&id))
    }

    pub fn refresh(&mut self, store: &dyn ContentStore) -> Result<(), ReconcileError> {
        let id = self.begin_refresh()?;
        self.complete_refresh(store.fetch_tree(&id))
    }

    #[cfg(test)]
    pub fn apply(
        &mut self,
        store: &dyn ContentStore,
        mutation: Mutation,
    ) -> Result<MutationOutcome, ReconcileError> {
        let ticket = self.begin(mutation)?;
        self.complete(run(store, &ticket))
    }
}

/// Send the mutation, then refetch the whole course.
pub fn run(store: &dyn ContentStore, ticket: &Ticket) -> Result<Completed, ReconcileError> {
    let outcome = match &ticket.request {
        Request::CreateModule {
            parent_id,
            name,
            description,
        } => {
            let created = store.create_module(parent_id, name, description)?;
            MutationOutcome::Created {
                id: created.id,
                name: name.clone(),
                parent_id: parent_id.clone(),
            }
        }
        Request::CreateLesson {
            parent_id,
            name,
            description,
            video_url,
        } => {
            let created = store.create_lesson(parent_id, name, description, video_url.as_deref())?;
            MutationOutcome::Created {
                id: created.id,
                name: name.clone(),
                parent_id: parent_id.clone(),
            }
        }
        Request::CreateSubfolder {
            parent_id,
            name,
            description,
            thumbnail_url,
        } => {
            let created =
                store.create_subfolder(parent_id, name, description, thumbnail_url.as_deref())?;
            MutationOutcome::Created {
                id: created.id,
                name: name.clone(),
                parent_id: parent_id.clone(),
            }
        }
        Request::Update { id, update } => {
            store.update_node(id, update)?;
            MutationOutcome::Updated { id: id.clone() }
        }
        Request::Delete { id } => {
            let result = store.delete_node(id)?;
            MutationOutcome::Deleted {
                id: id.clone(),
                deleted_count: result.deleted_count,
            }
        }
        Request::Upload {
            node_id,
            path,
            format,
        } => {
            info!(node = %node_id, ?format, path = %path.display(), "uploading transcript");
            let result = store.upload_transcript(node_id, path)?;
            MutationOutcome::Uploaded {
                node_id: node_id.clone(),
                result,
            }
        }
    };

    let tree = store
        .fetch_tree(&ticket.course_id)
        .map_err(|source| ReconcileError::RefreshFailed {
            action: ticket.action,
            source,
        })?;
    Ok(Completed { outcome, tree })
}
