mod app;
mod commands;
mod config;
mod data;
mod error;
mod event;
mod logging;
mod model;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self as ct_event, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use crate::app::{App, Screen};
use crate::config::ProjectConfig;
use crate::data::http_store::HttpContentStore;
use crate::data::store::ContentStore;
use crate::event::AppEvent;

#[derive(Parser)]
#[command(
    name = "kbadmin",
    version,
    about = "Course content tree admin for the Q&A knowledge base",
    override_help = HELP_TEXT,
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Open this course directly instead of the course list
    #[arg(long)]
    course: Option<String>,

    /// Base URL of the admin API
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory to read .kbadmin.toml from (defaults to current directory)
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// List courses
    Courses,

    /// Print a course as an indented outline
    Tree { course_id: String },

    /// Show module, lesson and segment counts for a course
    Stats { course_id: String },

    /// Create an empty course
    CreateCourse {
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        thumbnail_url: Option<String>,
    },

    /// Copy a course with all of its content
    Clone {
        course_id: String,
        new_name: String,

        #[arg(long)]
        regenerate_embeddings: bool,
    },

    /// Match .srt/.vtt files in a directory to lessons by name and upload them
    ImportTranscripts {
        course_id: String,
        dir: PathBuf,

        /// Show the matches without uploading anything
        #[arg(long)]
        dry_run: bool,
    },
}

const HELP_TEXT: &str = "\
kbadmin - Course content tree admin

USAGE:
  kbadmin [OPTIONS]                                  Start the TUI
  kbadmin courses                                    List courses
  kbadmin tree <COURSE_ID>                           Print a course outline
  kbadmin stats <COURSE_ID>                          Show course counts
  kbadmin create-course <NAME> [OPTIONS]             Create a course
  kbadmin clone <COURSE_ID> <NEW_NAME> [OPTIONS]     Copy a course
  kbadmin import-transcripts <COURSE_ID> <DIR>       Bulk upload transcripts

MODES:
  (default)            Interactive TUI: pick a course, browse its modules,
                       lessons and subfolders, add, rename, delete and
                       upload transcripts.

  import-transcripts   Matches transcript file names to lesson names
                       (exact first, then word overlap) and uploads each
                       match in turn. Failures are reported and skipped.

GLOBAL OPTIONS:
  --api-url <URL>   Admin API base URL [env: KBADMIN_API_URL]
                    [default: http://localhost:8001]
  --cwd <DIR>       Directory holding .kbadmin.toml [default: current dir]
  -h, --help        Print this help
  -V, --version     Print version

TUI OPTIONS:
  --course <ID>     Open this course directly

CREATE-COURSE OPTIONS:
  --description <TEXT>      Course description
  --thumbnail-url <URL>     Thumbnail image URL

CLONE OPTIONS:
  --regenerate-embeddings   Recompute embeddings for the copy

IMPORT-TRANSCRIPTS OPTIONS:
  --dry-run         Show matches only

TUI KEYBINDINGS:
  1-9                Jump to tab by number
  Tab / Shift+Tab    Cycle tabs
  j/k  Up/Down       Navigate list / scroll content
  h/l  Left/Right    Collapse or go to parent / switch panes
  Enter              Open course / expand or collapse folder
  g / G              Jump to top / bottom
  n                  New course (course list)
  a                  Add subfolder
  c                  Add module (course) or lesson (module)
  T                  Add tab
  e / E              Rename / edit description
  u                  Upload .srt or .vtt transcript
  d / Del            Delete folder and everything below it
  r                  Reload
  b / Esc            Back to course list
  ? / Ctrl+H         Toggle help overlay
  q / Ctrl+C         Quit

LOGGING:
  Logs go to the file named by [logging] file in .kbadmin.toml, or to
  kbadmin.log in the user state directory. KBADMIN_LOG overrides the level.

EXAMPLES:
  kbadmin --api-url http://kb.internal:8001
  kbadmin --course 3f2a
  kbadmin import-transcripts 3f2a ./transcripts --dry-run";

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = match cli.cwd {
        Some(ref p) => p.clone(),
        None => std::env::current_dir()?,
    };
    let project_config = config::load_project_config(&config_dir);

    match logging::init_logging(&project_config.logging(), project_config.log_level()) {
        Ok(path) => info!(log_file = %path.display(), "kbadmin starting"),
        Err(e) => eprintln!("warning: logging disabled: {:#}", e),
    }

    let base_url = project_config.api_base_url(cli.api_url.as_deref());
    let store = HttpContentStore::new(&base_url, project_config.timeout())?;
    info!(api = %store.base_url(), "using admin API");

    let Some(command) = cli.command else {
        return run_tui(Arc::new(store), project_config, cli.course);
    };

    let mut out = io::stdout().lock();
    match command {
        Command::Courses => commands::list_courses(&store, &mut out),
        Command::Tree { course_id } => commands::print_tree(&store, &course_id, &mut out),
        Command::Stats { course_id } => commands::print_stats(&store, &course_id, &mut out),
        Command::CreateCourse {
            name,
            description,
            thumbnail_url,
        } => commands::create_course(
            &store,
            &name,
            &description,
            thumbnail_url.as_deref(),
            &mut out,
        ),
        Command::Clone {
            course_id,
            new_name,
            regenerate_embeddings,
        } => commands::clone_course(&store, &course_id, &new_name, regenerate_embeddings, &mut out),
        Command::ImportTranscripts {
            course_id,
            dir,
            dry_run,
        } => {
            let report = commands::import_transcripts(
                &store,
                &course_id,
                &dir,
                project_config.batch_delay(),
                dry_run,
                &mut out,
            )?;
            if report.failed > 0 {
                anyhow::bail!("{} of {} uploads failed", report.failed, report.matched);
            }
            Ok(())
        }
    }
}

fn run_tui(
    store: Arc<dyn ContentStore>,
    project_config: ProjectConfig,
    course: Option<String>,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, store, project_config, course);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {}", e);
    }
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    store: Arc<dyn ContentStore>,
    project_config: ProjectConfig,
    course: Option<String>,
) -> Result<()> {
    let mut app = App::new(store, project_config);

    // Channel first so the initial load already runs on a worker
    let (tx, rx) = mpsc::channel::<AppEvent>();
    app.event_tx = Some(tx);

    match course {
        Some(id) => app.open_course(&id),
        None => app.load_courses(),
    }

    let tick_rate = Duration::from_millis(app.project_config.tick_rate());
    let mut last_tick = Instant::now();

    loop {
        // Draw only when dirty
        if app.dirty {
            terminal.draw(|f| ui::draw(f, &app))?;
            app.dirty = false;
        }

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if ct_event::poll(timeout)? {
            if let Event::Key(key) = ct_event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut app, key);
                    app.mark_dirty();
                }
            }
        }

        // Results from worker threads
        while let Ok(evt) = rx.try_recv() {
            app.handle_event(evt);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            app.clear_stale_status();
            app.mark_dirty();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keybindings (always active)
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') if app.input.is_none() => {
            app.show_help = !app.show_help;
            return;
        }
        KeyCode::Char('h') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.show_help = !app.show_help;
            return;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return;
        }
        _ => {}
    }

    if app.show_help {
        return;
    }

    if app.confirm_delete.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.execute_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
            _ => {}
        }
        return;
    }

    if app.input.is_some() {
        handle_input_key(app, key);
        return;
    }

    if key.code == KeyCode::Char('q') {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Tab => app.next_tab(),
        KeyCode::BackTab => app.prev_tab(),

        KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
            app.switch_to_tab((c as usize) - ('1' as usize));
        }

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => app.navigate_down(),
        KeyCode::Char('k') | KeyCode::Up => app.navigate_up(),
        KeyCode::Char('h') | KeyCode::Left => app.navigate_left(),
        KeyCode::Char('l') | KeyCode::Right => app.navigate_right(),
        KeyCode::Enter => app.select_item(),

        // Jump
        KeyCode::Char('g') => app.jump_top(),
        KeyCode::Char('G') => app.jump_bottom(),

        _ => match app.screen {
            Screen::CoursePicker => handle_picker_key(app, key),
            Screen::Course => handle_course_key(app, key),
        },
    }
}

fn handle_picker_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('n') => app.start_create_course(),
        KeyCode::Char('r') => app.load_courses(),
        _ => {}
    }
}

fn handle_course_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('a') => app.start_add_subfolder(),
        KeyCode::Char('c') => app.start_add_content(),
        KeyCode::Char('T') => app.start_add_tab(),
        KeyCode::Char('e') => app.start_rename(),
        KeyCode::Char('E') => app.start_edit_description(),
        KeyCode::Char('u') => app.start_upload(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('b') | KeyCode::Esc => app.back_to_courses(),
        _ => {}
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_input(),
        KeyCode::Esc => app.cancel_input(),
        // All other keys go to the TextArea editor
        _ => {
            if let Some(ref mut prompt) = app.input {
                prompt.editor.input(key);
            }
        }
    }
}
