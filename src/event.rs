use crate::data::reconcile::Completed;
use crate::error::{ReconcileError, StoreError};
use crate::model::course::{CourseSummary, CreatedNode};
use crate::model::tree::Node;

/// All events the app loop handles.
#[derive(Debug)]
pub enum AppEvent {
    /// Background load of the course list completed.
    CoursesLoaded(Result<Vec<CourseSummary>, StoreError>),
    /// A new course was created from the picker.
    CourseCreated(Result<CreatedNode, StoreError>),
    /// Background fetch of the open course's tree completed.
    TreeLoaded(Result<Node, StoreError>),
    /// A mutation and its refetch finished on the worker thread.
    MutationFinished(Result<Completed, ReconcileError>),
}
