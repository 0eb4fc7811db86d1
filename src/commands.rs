//! Non-interactive subcommands. Each writes its report to `out` so the
//! output can be checked in tests.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::data::batch::run_sequential;
use crate::data::reconcile::Reconciler;
use crate::data::store::ContentStore;
use crate::data::transcripts::{
    check_transcript_file, lesson_targets, plan_import, scan_dir, ImportMatch, MatchKind,
};
use crate::model::course::UploadResult;
use crate::model::tree::{find_by_id, format_timecode, tree_counts, Node};

pub fn list_courses(store: &dyn ContentStore, out: &mut impl Write) -> Result<()> {
    let courses = store.list_courses().context("listing courses")?;
    if courses.is_empty() {
        writeln!(out, "No courses.")?;
        return Ok(());
    }
    let id_width = courses.iter().map(|c| c.id.len()).max().unwrap_or(0);
    for course in &courses {
        let date = course.created_label().unwrap_or_default();
        writeln!(
            out,
            "{:<id_width$}  {:<10}  {}",
            course.id,
            date,
            course.display_name(),
            id_width = id_width
        )?;
    }
    Ok(())
}

/// Fetch a course and print it as an indented outline; segments are summarised.
pub fn print_tree(store: &dyn ContentStore, course_id: &str, out: &mut impl Write) -> Result<()> {
    let mut reconciler = Reconciler::new();
    reconciler
        .load(store, course_id)
        .with_context(|| format!("loading course {}", course_id))?;
    if let Some(tree) = reconciler.tree() {
        write_outline(tree, 0, out)?;
    }
    Ok(())
}

fn write_outline(node: &Node, depth: usize, out: &mut impl Write) -> Result<()> {
    let segments = node.content_children().len();
    let mut line = format!(
        "{}{} [{}] {}",
        "  ".repeat(depth),
        node.name,
        node.kind,
        node.id
    );
    if segments > 0 {
        line.push_str(&format!(" ({} segments)", segments));
    }
    writeln!(out, "{}", line)?;
    for child in node.navigable_children() {
        write_outline(child, depth + 1, out)?;
    }
    Ok(())
}

/// Remote stats alongside counts computed from the fetched tree.
pub fn print_stats(store: &dyn ContentStore, course_id: &str, out: &mut impl Write) -> Result<()> {
    let stats = store
        .course_stats(course_id)
        .with_context(|| format!("stats for {}", course_id))?;
    let tree = store
        .fetch_tree(course_id)
        .with_context(|| format!("loading course {}", course_id))?;
    let local = tree_counts(&tree);

    writeln!(out, "{} ({})", tree.name, tree.id)?;
    writeln!(out, "  modules   {:>6}  (tree: {})", stats.module_count, local.modules)?;
    writeln!(out, "  lessons   {:>6}  (tree: {})", stats.lesson_count, local.lessons)?;
    writeln!(out, "  segments  {:>6}  (tree: {})", stats.segment_count, local.segments)?;
    writeln!(
        out,
        "  duration  {:>6}",
        format_timecode(stats.total_duration_seconds as f64)
    )?;
    Ok(())
}

pub fn create_course(
    store: &dyn ContentStore,
    name: &str,
    description: &str,
    thumbnail_url: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("course name cannot be empty");
    }
    let created = store
        .create_course(name.trim(), description, thumbnail_url)
        .context("creating course")?;
    info!(course = %created.id, "course created");
    writeln!(out, "Created course {} ({})", name.trim(), created.id)?;
    Ok(())
}

pub fn clone_course(
    store: &dyn ContentStore,
    course_id: &str,
    new_name: &str,
    regenerate_embeddings: bool,
    out: &mut impl Write,
) -> Result<()> {
    if new_name.trim().is_empty() {
        anyhow::bail!("new course name cannot be empty");
    }
    let result = store
        .clone_course(course_id, new_name.trim(), regenerate_embeddings)
        .with_context(|| format!("cloning course {}", course_id))?;
    writeln!(
        out,
        "Cloned {} -> {} ({} segments{})",
        course_id,
        result.new_course_id,
        result.segments_cloned,
        if result.embeddings_regenerated {
            ", embeddings regenerated"
        } else {
            ""
        }
    )?;
    Ok(())
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportReport {
    pub matched: usize,
    pub uploaded: usize,
    pub failed: usize,
    pub segments_created: usize,
}

/// Match transcript files in `dir` to lessons of the course and upload them one by one.
pub fn import_transcripts(
    store: &dyn ContentStore,
    course_id: &str,
    dir: &Path,
    delay: Duration,
    dry_run: bool,
    out: &mut impl Write,
) -> Result<ImportReport> {
    let mut reconciler = Reconciler::new();
    reconciler
        .load(store, course_id)
        .with_context(|| format!("loading course {}", course_id))?;
    let files = scan_dir(dir).with_context(|| format!("reading {}", dir.display()))?;

    let plan = match reconciler.tree() {
        Some(tree) => {
            let lessons = lesson_targets(tree);
            writeln!(out, "Found {} lessons and {} transcript files", lessons.len(), files.len())?;
            plan_import(&files, &lessons)
        }
        None => return Ok(ImportReport::default()),
    };

    writeln!(out, "\nMatches ({}):", plan.matches.len())?;
    for m in &plan.matches {
        let kind = match m.kind {
            MatchKind::Exact => "exact".to_string(),
            MatchKind::Fuzzy(pct) => format!("fuzzy {}%", pct),
        };
        writeln!(out, "  {} <- {} ({})", m.lesson_name, file_name(&m.path), kind)?;
    }
    if !plan.unmatched_files.is_empty() {
        writeln!(out, "\nUnmatched files ({}):", plan.unmatched_files.len())?;
        for path in &plan.unmatched_files {
            writeln!(out, "  - {}", file_name(path))?;
        }
    }
    if !plan.unmatched_lessons.is_empty() {
        writeln!(out, "\nLessons without a file ({}):", plan.unmatched_lessons.len())?;
        for (_, name) in &plan.unmatched_lessons {
            writeln!(out, "  - {}", name)?;
        }
    }

    let mut report = ImportReport {
        matched: plan.matches.len(),
        ..ImportReport::default()
    };
    if dry_run {
        writeln!(out, "\nDry run: nothing uploaded.")?;
        return Ok(report);
    }
    if plan.matches.is_empty() {
        writeln!(out, "\nNothing to upload.")?;
        return Ok(report);
    }

    writeln!(out)?;
    let total = plan.matches.len();
    let mut lines = Vec::with_capacity(total);
    let results = run_sequential(
        &plan.matches,
        delay,
        |m: &ImportMatch| -> Result<UploadResult> {
            check_transcript_file(&m.path)?;
            Ok(store.upload_transcript(&m.lesson_id, &m.path)?)
        },
        |i, m, result| {
            let status = match result {
                Ok(r) => format!("ok, {} segments", r.segments_created),
                Err(e) => format!("failed: {:#}", e),
            };
            lines.push(format!("[{}/{}] {}: {}", i + 1, total, m.lesson_name, status));
        },
    );
    for line in lines {
        writeln!(out, "{}", line)?;
    }

    for result in &results {
        match result {
            Ok(r) => {
                report.uploaded += 1;
                report.segments_created += r.segments_created;
            }
            Err(_) => report.failed += 1,
        }
    }

    if report.uploaded > 0 {
        reconciler.refresh(store).context("refreshing course after import")?;
        if let Some(tree) = reconciler.tree() {
            writeln!(out, "\nSegments per lesson after import:")?;
            for (m, result) in plan.matches.iter().zip(&results) {
                if result.is_err() {
                    continue;
                }
                let count = find_by_id(tree, &m.lesson_id)
                    .map(|n| n.content_children().len())
                    .unwrap_or(0);
                writeln!(out, "  {}: {}", m.lesson_name, count)?;
            }
        }
    }
    writeln!(
        out,
        "\nUploaded {}/{} transcripts, {} segments created, {} failed",
        report.uploaded, total, report.segments_created, report.failed
    )?;
    Ok(report)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory_store::MemoryStore;
    use crate::model::tree::fixtures::{folder, sample_course};

    fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn import_course() -> Node {
        folder(
            "c",
            "Course",
            1,
            vec![folder(
                "m",
                "Module 1",
                2,
                vec![
                    folder("a", "Lesson 1 Identify Your Niche", 3, vec![]),
                    folder("b", "Lesson 2 Pick a Domain", 3, vec![]),
                    folder("z", "Bonus", 3, vec![]),
                ],
            )],
        )
    }

    fn write_srt(dir: &Path, name: &str, cues: usize) {
        let mut body = String::new();
        for i in 0..cues {
            body.push_str(&format!(
                "{}\n00:00:0{},000 --> 00:00:0{},500\ntext\n\n",
                i + 1,
                i,
                i
            ));
        }
        std::fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn outline_hides_segments_behind_a_count() {
        let store = MemoryStore::with_course(sample_course());
        let text = output(|out| print_tree(&store, "c", out));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Course [course] c");
        assert_eq!(lines[2], "    Intro [lesson] l1 (2 segments)");
        assert!(!text.contains("s1"));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn stats_show_remote_and_local_counts() {
        let store = MemoryStore::with_course(sample_course());
        let text = output(|out| print_stats(&store, "c", out));
        let modules: Vec<&str> = text
            .lines()
            .find(|l| l.trim_start().starts_with("modules"))
            .unwrap()
            .split_whitespace()
            .collect();
        assert_eq!(modules, ["modules", "2", "(tree:", "2)"]);
        assert!(text.starts_with("Course (c)"));
    }

    #[test]
    fn create_and_clone_report_new_ids() {
        let store = MemoryStore::with_course(sample_course());
        let text = output(|out| create_course(&store, "  New course ", "", None, out));
        assert!(text.starts_with("Created course New course ("));
        let text = output(|out| clone_course(&store, "c", "Copy", true, out));
        assert!(text.contains("(2 segments, embeddings regenerated)"));
        let listing = output(|out| list_courses(&store, out));
        assert_eq!(listing.lines().count(), 3);
        assert!(create_course(&store, " ", "", None, &mut Vec::new()).is_err());
    }

    #[test]
    fn dry_run_plans_without_uploading() {
        let dir = tempfile::tempdir().unwrap();
        write_srt(dir.path(), "Lesson_1_Identify_Your_Niche.srt", 3);
        write_srt(dir.path(), "random notes.vtt", 1);
        let store = MemoryStore::with_course(import_course());

        let mut buf = Vec::new();
        let report =
            import_transcripts(&store, "c", dir.path(), Duration::ZERO, true, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(report.matched, 1);
        assert_eq!(report.uploaded, 0);
        assert_eq!(store.request_count(), 1);
        assert!(text.contains(
            "Lesson 1 Identify Your Niche <- Lesson_1_Identify_Your_Niche.srt (exact)"
        ));
        assert!(text.contains("- random notes.vtt"));
        assert!(text.contains("- Bonus"));
        assert!(text.contains("Dry run"));
    }

    #[test]
    fn import_continues_after_a_failed_upload() {
        let dir = tempfile::tempdir().unwrap();
        write_srt(dir.path(), "bonus.srt", 2);
        write_srt(dir.path(), "lesson 1 identify your niche.srt", 3);
        write_srt(dir.path(), "lesson 2 pick a domain.srt", 4);
        let store = MemoryStore::with_course(import_course());
        store.fail_uploads_to("z", "embedding service down");

        let mut buf = Vec::new();
        let report =
            import_transcripts(&store, "c", dir.path(), Duration::ZERO, false, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            report,
            ImportReport {
                matched: 3,
                uploaded: 2,
                failed: 1,
                segments_created: 7,
            }
        );
        assert!(text.contains("[1/3] Bonus: failed: embedding service down"));
        assert!(text.contains("[3/3] Lesson 2 Pick a Domain: ok, 4 segments"));
        let after = text.split("Segments per lesson after import:").nth(1).unwrap();
        assert!(after.contains("  Lesson 1 Identify Your Niche: 3"));
        assert!(after.contains("  Lesson 2 Pick a Domain: 4"));
        assert!(!after.contains("Bonus"));

        let tree = store.fetch_tree("c").unwrap();
        assert_eq!(find_by_id(&tree, "a").unwrap().content_children().len(), 3);
        assert_eq!(find_by_id(&tree, "b").unwrap().content_children().len(), 4);
        assert!(find_by_id(&tree, "z").unwrap().content_children().is_empty());
    }

    #[test]
    fn import_rejects_missing_directory() {
        let store = MemoryStore::with_course(import_course());
        let missing = Path::new("/definitely/not/here");
        assert!(
            import_transcripts(&store, "c", missing, Duration::ZERO, true, &mut Vec::new())
                .is_err()
        );
    }
}
