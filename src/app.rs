use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::ProjectConfig;
use crate::data::reconcile::{self, Mutation, MutationOutcome, Pending, Reconciler};
use crate::data::reconcile::{LESSON_LABEL, MODULE_LABEL, SUBFOLDER_LABEL, TAB_LABEL};
use crate::data::store::ContentStore;
use crate::event::AppEvent;
use crate::model::course::{CourseSummary, NodeUpdate};
use crate::model::tree::{find_by_id, sidebar_rows, Node, NodeKind, SidebarRow};

/// Status messages disappear after this long.
const STATUS_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    CoursePicker,
    Course,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoursePane {
    Sidebar,
    Detail,
}

/// What the text prompt will do with its input on submit.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    CreateCourse,
    AddSubfolder {
        parent_id: String,
        label: &'static str,
    },
    AddModule {
        parent_id: String,
    },
    AddLesson {
        parent_id: String,
    },
    Rename {
        id: String,
    },
    EditDescription {
        id: String,
    },
    Upload {
        node_id: String,
    },
}

pub struct InputPrompt {
    pub action: InputAction,
    pub title: String,
    pub hint: String,
    pub editor: tui_textarea::TextArea<'static>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteTarget {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub descendants: usize,
}

pub struct App {
    pub should_quit: bool,
    pub show_help: bool,
    pub screen: Screen,

    // Config
    pub project_config: ProjectConfig,

    // Remote store and the channel worker threads report back on
    store: Arc<dyn ContentStore>,
    pub event_tx: Option<mpsc::Sender<AppEvent>>,

    // Course picker
    pub courses: Vec<CourseSummary>,
    pub course_index: usize,
    pub courses_loading: bool,

    // Open course
    pub reconciler: Reconciler,
    pub sidebar: Vec<SidebarRow>,
    pub sidebar_index: usize,
    pub pane: CoursePane,
    pub detail_scroll: usize,

    // Overlays
    pub confirm_delete: Option<DeleteTarget>,
    pub input: Option<InputPrompt>,

    // Dirty flag for rendering
    pub dirty: bool,

    pub status: Option<(String, Instant)>,
    pub last_error: Option<String>,
}

impl App {
    pub fn new(store: Arc<dyn ContentStore>, project_config: ProjectConfig) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            screen: Screen::CoursePicker,
            project_config,
            store,
            event_tx: None,
            courses: Vec::new(),
            course_index: 0,
            courses_loading: false,
            reconciler: Reconciler::new(),
            sidebar: Vec::new(),
            sidebar_index: 0,
            pane: CoursePane::Sidebar,
            detail_scroll: 0,
            confirm_delete: None,
            input: None,
            dirty: true,
            status: None,
            last_error: None,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn tree(&self) -> Option<&Node> {
        self.reconciler.tree()
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.reconciler.view.selected_node(self.tree())
    }

    pub fn is_busy(&self) -> bool {
        self.reconciler.is_busy()
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some((msg.into(), Instant::now()));
    }

    pub fn clear_stale_status(&mut self) {
        if let Some((_, at)) = self.status {
            if at.elapsed() >= STATUS_TTL {
                self.status = None;
            }
        }
    }

    // --- Worker dispatch ---

    /// Run `job` against the store on a worker thread, or inline when no
    /// event channel is attached.
    fn dispatch<F>(&mut self, job: F)
    where
        F: FnOnce(&dyn ContentStore) -> AppEvent + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        match self.event_tx.clone() {
            Some(tx) => {
                std::thread::spawn(move || {
                    let evt = job(store.as_ref());
                    let _ = tx.send(evt);
                });
            }
            None => {
                let evt = job(store.as_ref());
                self.handle_event(evt);
            }
        }
    }

    pub fn handle_event(&mut self, evt: AppEvent) {
        match evt {
            AppEvent::CoursesLoaded(result) => self.handle_courses_loaded(result),
            AppEvent::CourseCreated(result) => match result {
                Ok(created) => {
                    let label = created.name.clone().unwrap_or_else(|| created.id.clone());
                    self.set_status(format!("Created course {}", label));
                    self.open_course(&created.id);
                }
                Err(e) => self.last_error = Some(format!("Create course: {}", e)),
            },
            AppEvent::TreeLoaded(result) => {
                if let Err(e) = self.reconciler.complete_refresh(result) {
                    self.last_error = Some(format!("Load: {}", e));
                } else {
                    self.last_error = None;
                }
                self.rebuild_sidebar();
            }
            AppEvent::MutationFinished(result) => self.handle_mutation_finished(result),
        }
        self.mark_dirty();
    }

    // --- Course picker ---

    pub fn load_courses(&mut self) {
        self.courses_loading = true;
        self.dispatch(|store| AppEvent::CoursesLoaded(store.list_courses()));
    }

    fn handle_courses_loaded(
        &mut self,
        result: Result<Vec<CourseSummary>, crate::error::StoreError>,
    ) {
        self.courses_loading = false;
        match result {
            Ok(courses) => {
                debug!(count = courses.len(), "courses loaded");
                self.courses = courses;
                if self.course_index >= self.courses.len() {
                    self.course_index = 0;
                }
                self.last_error = None;
            }
            Err(e) => self.last_error = Some(format!("Courses: {}", e)),
        }
    }

    pub fn open_selected_course(&mut self) {
        if self.courses.is_empty() {
            return;
        }
        let idx = self.course_index.min(self.courses.len() - 1);
        let id = self.courses[idx].id.clone();
        self.open_course(&id);
    }

    pub fn open_course(&mut self, course_id: &str) {
        match self.reconciler.open(course_id) {
            Ok(id) => {
                info!(course = %id, "opening course");
                self.screen = Screen::Course;
                self.sidebar.clear();
                self.sidebar_index = 0;
                self.pane = CoursePane::Sidebar;
                self.detail_scroll = 0;
                self.dispatch(move |store| AppEvent::TreeLoaded(store.fetch_tree(&id)));
            }
            Err(e) => self.last_error = Some(e.to_string()),
        }
    }

    pub fn back_to_courses(&mut self) {
        if self.is_busy() {
            self.last_error = Some("Wait for the current request to finish".to_string());
            return;
        }
        self.screen = Screen::CoursePicker;
        self.load_courses();
    }

    // --- Open course ---

    pub fn refresh(&mut self) {
        match self.screen {
            Screen::CoursePicker => self.load_courses(),
            Screen::Course => match self.reconciler.begin_refresh() {
                Ok(id) => self.dispatch(move |store| AppEvent::TreeLoaded(store.fetch_tree(&id))),
                Err(e) => self.last_error = Some(e.to_string()),
            },
        }
    }

    /// Recompute the sidebar rows, keeping the cursor on the selected node.
    pub fn rebuild_sidebar(&mut self) {
        self.sidebar = match self.reconciler.tree() {
            Some(tree) => sidebar_rows(tree, &self.reconciler.view.expanded_ids),
            None => Vec::new(),
        };
        let selected = self.reconciler.view.selected_id.as_deref();
        if let Some(pos) = selected.and_then(|id| self.sidebar.iter().position(|r| r.id == id)) {
            self.sidebar_index = pos;
        } else if self.sidebar_index >= self.sidebar.len() {
            self.sidebar_index = self.sidebar.len().saturating_sub(1);
        }
    }

    fn select_row(&mut self, idx: usize) {
        if let Some(row) = self.sidebar.get(idx) {
            let id = row.id.clone();
            self.sidebar_index = idx;
            self.reconciler.view.select(&id);
            self.detail_scroll = 0;
        }
    }

    pub fn navigate_down(&mut self) {
        match self.screen {
            Screen::CoursePicker => {
                if !self.courses.is_empty() {
                    self.course_index = (self.course_index + 1).min(self.courses.len() - 1);
                }
            }
            Screen::Course => match self.pane {
                CoursePane::Sidebar => {
                    if !self.sidebar.is_empty() {
                        let next = (self.sidebar_index + 1).min(self.sidebar.len() - 1);
                        self.select_row(next);
                    }
                }
                CoursePane::Detail => self.detail_scroll = self.detail_scroll.saturating_add(1),
            },
        }
    }

    pub fn navigate_up(&mut self) {
        match self.screen {
            Screen::CoursePicker => self.course_index = self.course_index.saturating_sub(1),
            Screen::Course => match self.pane {
                CoursePane::Sidebar => {
                    if !self.sidebar.is_empty() {
                        self.select_row(self.sidebar_index.saturating_sub(1));
                    }
                }
                CoursePane::Detail => self.detail_scroll = self.detail_scroll.saturating_sub(1),
            },
        }
    }

    pub fn jump_top(&mut self) {
        match self.screen {
            Screen::CoursePicker => self.course_index = 0,
            Screen::Course => match self.pane {
                CoursePane::Sidebar => self.select_row(0),
                CoursePane::Detail => self.detail_scroll = 0,
            },
        }
    }

    pub fn jump_bottom(&mut self) {
        match self.screen {
            Screen::CoursePicker => self.course_index = self.courses.len().saturating_sub(1),
            Screen::Course => match self.pane {
                CoursePane::Sidebar => self.select_row(self.sidebar.len().saturating_sub(1)),
                // Clamped at render time
                CoursePane::Detail => self.detail_scroll = usize::MAX / 2,
            },
        }
    }

    pub fn navigate_left(&mut self) {
        if self.screen != Screen::Course {
            return;
        }
        match self.pane {
            CoursePane::Detail => self.pane = CoursePane::Sidebar,
            CoursePane::Sidebar => self.collapse_or_parent(),
        }
    }

    pub fn navigate_right(&mut self) {
        if self.screen == Screen::Course {
            self.pane = CoursePane::Detail;
        }
    }

    /// Enter: open a course from the picker, toggle a folder in the sidebar.
    pub fn select_item(&mut self) {
        match self.screen {
            Screen::CoursePicker => self.open_selected_course(),
            Screen::Course => {
                if self.pane != CoursePane::Sidebar {
                    return;
                }
                let Some(row) = self.sidebar.get(self.sidebar_index) else {
                    return;
                };
                let id = row.id.clone();
                let has_children = row.has_children;
                self.reconciler.view.select(&id);
                if has_children {
                    self.reconciler.view.toggle(&id);
                }
                self.rebuild_sidebar();
            }
        }
    }

    /// Collapse the row under the cursor, or move to its parent if already collapsed.
    fn collapse_or_parent(&mut self) {
        let Some(row) = self.sidebar.get(self.sidebar_index) else {
            return;
        };
        if row.expanded && row.has_children {
            let id = row.id.clone();
            self.reconciler.view.collapse(&id);
            self.rebuild_sidebar();
            return;
        }
        let depth = row.depth;
        if depth == 0 {
            return;
        }
        if let Some(pos) = self.sidebar[..self.sidebar_index]
            .iter()
            .rposition(|r| r.depth < depth)
        {
            self.select_row(pos);
        }
    }

    // --- Tabs ---

    /// Top-level folders of the open course, shown as tabs.
    pub fn tabs(&self) -> Vec<(&str, &str)> {
        self.tree()
            .map(|t| {
                t.navigable_children()
                    .into_iter()
                    .map(|c| (c.id.as_str(), c.name.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Index of the tab that contains the current selection.
    pub fn active_tab(&self) -> Option<usize> {
        let tree = self.tree()?;
        let selected = self.reconciler.view.selected_id.as_deref()?;
        tree.navigable_children()
            .iter()
            .position(|tab| find_by_id(tab, selected).is_some())
    }

    pub fn switch_to_tab(&mut self, idx: usize) {
        let Some(id) = self.tabs().get(idx).map(|(id, _)| id.to_string()) else {
            return;
        };
        if let Some(root) = self.tree().map(|t| t.id.clone()) {
            self.reconciler.view.expand(&root);
        }
        self.reconciler.view.select(&id);
        self.detail_scroll = 0;
        self.rebuild_sidebar();
    }

    pub fn next_tab(&mut self) {
        let count = self.tabs().len();
        if count == 0 {
            return;
        }
        let next = self.active_tab().map(|i| (i + 1) % count).unwrap_or(0);
        self.switch_to_tab(next);
    }

    pub fn prev_tab(&mut self) {
        let count = self.tabs().len();
        if count == 0 {
            return;
        }
        let prev = self
            .active_tab()
            .map(|i| (i + count - 1) % count)
            .unwrap_or(count - 1);
        self.switch_to_tab(prev);
    }

    // --- Input prompt ---

    fn open_input(&mut self, action: InputAction, title: String, hint: String, initial: &str) {
        let mut editor = tui_textarea::TextArea::default();
        editor.insert_str(initial);
        self.input = Some(InputPrompt {
            action,
            title,
            hint,
            editor,
        });
    }

    /// `n` on the picker: new course.
    pub fn start_create_course(&mut self) {
        self.open_input(
            InputAction::CreateCourse,
            "New course".to_string(),
            "Course name".to_string(),
            "",
        );
    }

    /// `a`: new subfolder under the selected node.
    pub fn start_add_subfolder(&mut self) {
        self.start_subfolder_under_selected(SUBFOLDER_LABEL);
    }

    /// `T`: new tab, i.e. a subfolder directly under the course root.
    pub fn start_add_tab(&mut self) {
        let Some(root) = self.tree() else {
            return;
        };
        let parent_id = root.id.clone();
        let hint = format!("Blank for \"{}\"", root.default_child_name(TAB_LABEL));
        self.open_input(
            InputAction::AddSubfolder {
                parent_id,
                label: TAB_LABEL,
            },
            "New tab".to_string(),
            hint,
            "",
        );
    }

    fn start_subfolder_under_selected(&mut self, label: &'static str) {
        let Some(node) = self.selected_node() else {
            self.last_error = Some("Select a folder first".to_string());
            return;
        };
        let parent_id = node.id.clone();
        let title = format!("New subfolder in {}", node.name);
        let hint = format!("Blank for \"{}\"", node.default_child_name(label));
        self.open_input(InputAction::AddSubfolder { parent_id, label }, title, hint, "");
    }

    /// `c`: add child content: a module under a course, a lesson under a module.
    pub fn start_add_content(&mut self) {
        let Some(node) = self.selected_node() else {
            self.last_error = Some("Select a folder first".to_string());
            return;
        };
        let parent_id = node.id.clone();
        let (action, label) = match node.kind.content_child() {
            Some(NodeKind::Module) => (InputAction::AddModule { parent_id }, MODULE_LABEL),
            Some(NodeKind::Lesson) => (InputAction::AddLesson { parent_id }, LESSON_LABEL),
            _ => {
                self.last_error = Some(format!("A {} cannot hold modules or lessons", node.kind));
                return;
            }
        };
        let title = format!("New {} in {}", label.to_lowercase(), node.name);
        let hint = format!("Blank for \"{}\"", node.default_child_name(label));
        self.open_input(action, title, hint, "");
    }

    pub fn start_rename(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        let (id, name) = (node.id.clone(), node.name.clone());
        self.open_input(
            InputAction::Rename { id },
            "Rename".to_string(),
            "New name".to_string(),
            &name,
        );
    }

    pub fn start_edit_description(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        let (id, description) = (node.id.clone(), node.description.clone());
        self.open_input(
            InputAction::EditDescription { id },
            "Description".to_string(),
            String::new(),
            &description,
        );
    }

    pub fn start_upload(&mut self) {
        let Some(node) = self.selected_node() else {
            self.last_error = Some("Select a lesson first".to_string());
            return;
        };
        if !node.can_upload_transcript() {
            self.last_error = Some(format!("Transcripts cannot be uploaded to a {}", node.kind));
            return;
        }
        if !node.shows_upload_area() {
            self.last_error = Some(format!(
                "{} already has segments; delete them before uploading again",
                node.name
            ));
            return;
        }
        let node_id = node.id.clone();
        let title = format!("Upload transcript to {}", node.name);
        self.open_input(
            InputAction::Upload { node_id },
            title,
            "Path to a .srt or .vtt file".to_string(),
            "",
        );
    }

    pub fn cancel_input(&mut self) {
        self.input = None;
    }

    pub fn submit_input(&mut self) {
        let Some(prompt) = self.input.take() else {
            return;
        };
        let text = prompt.editor.lines().join("").trim().to_string();
        let name = (!text.is_empty()).then(|| text.clone());
        let mutation = match prompt.action {
            InputAction::CreateCourse => {
                if text.is_empty() {
                    self.last_error = Some("Course name cannot be empty".to_string());
                    return;
                }
                self.dispatch(move |store| {
                    AppEvent::CourseCreated(store.create_course(&text, "", None))
                });
                return;
            }
            InputAction::AddSubfolder { parent_id, label } => Mutation::CreateSubfolder {
                parent_id,
                name,
                description: String::new(),
                thumbnail_url: None,
                label,
            },
            InputAction::AddModule { parent_id } => Mutation::CreateModule {
                parent_id,
                name,
                description: String::new(),
            },
            InputAction::AddLesson { parent_id } => Mutation::CreateLesson {
                parent_id,
                name,
                description: String::new(),
                video_url: None,
            },
            InputAction::Rename { id } => Mutation::UpdateNode {
                id,
                update: NodeUpdate::rename(&text),
            },
            InputAction::EditDescription { id } => Mutation::UpdateNode {
                id,
                update: NodeUpdate {
                    description: Some(text),
                    ..NodeUpdate::default()
                },
            },
            InputAction::Upload { node_id } => Mutation::UploadTranscript {
                node_id,
                path: expand_home(&text),
            },
        };
        self.submit(mutation);
    }

    // --- Delete ---

    pub fn request_delete(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        if !node.can_delete() {
            self.last_error = Some("The course root cannot be deleted".to_string());
            return;
        }
        self.confirm_delete = Some(DeleteTarget {
            id: node.id.clone(),
            name: node.name.clone(),
            kind: node.kind,
            descendants: node.descendant_count(),
        });
    }

    pub fn execute_delete(&mut self) {
        if let Some(target) = self.confirm_delete.take() {
            self.submit(Mutation::DeleteNode { id: target.id });
        }
    }

    pub fn cancel_delete(&mut self) {
        self.confirm_delete = None;
    }

    // --- Mutations ---

    pub fn submit(&mut self, mutation: Mutation) {
        match self.reconciler.begin(mutation) {
            Ok(ticket) => {
                self.last_error = None;
                self.set_status(format!("Working: {}...", ticket.action));
                self.dispatch(move |store| {
                    AppEvent::MutationFinished(reconcile::run(store, &ticket))
                });
            }
            Err(e) => self.last_error = Some(e.to_string()),
        }
    }

    fn handle_mutation_finished(
        &mut self,
        result: Result<reconcile::Completed, crate::error::ReconcileError>,
    ) {
        match self.reconciler.complete(result) {
            Ok(outcome) => {
                self.last_error = None;
                self.set_status(outcome.summary());
                if let MutationOutcome::Created { id, parent_id, .. } = &outcome {
                    self.reconciler.view.expand(parent_id);
                    self.reconciler.view.select(id);
                }
            }
            Err(e) => self.last_error = Some(e.to_string()),
        }
        self.rebuild_sidebar();
    }

    /// Short label for the status bar while a request is outstanding.
    pub fn pending_label(&self) -> Option<&'static str> {
        match self.reconciler.pending()? {
            Pending::Refresh => Some("LOADING"),
            Pending::Mutation(_) => Some("SAVING"),
        }
    }
}

/// Expand a leading `~/` in a typed path.
fn expand_home(text: &str) -> PathBuf {
    if let Some(rest) = text.strip_prefix("~/") {
        if let Some(dirs) = directories::BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(text)
}
