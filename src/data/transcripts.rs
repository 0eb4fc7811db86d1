use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::ValidationError;
use crate::model::tree::Node;

/// Word-overlap ratio above which a file is considered to name a lesson.
const FUZZY_THRESHOLD: f64 = 0.90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    Srt,
    Vtt,
}

impl TranscriptFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("srt") {
            Some(TranscriptFormat::Srt)
        } else if ext.eq_ignore_ascii_case("vtt") {
            Some(TranscriptFormat::Vtt)
        } else {
            None
        }
    }
}

/// Client-side gate run before any upload request.
pub fn check_transcript_file(path: &Path) -> Result<TranscriptFormat, ValidationError> {
    let format = TranscriptFormat::from_path(path)
        .ok_or_else(|| ValidationError::TranscriptExtension(path.display().to_string()))?;
    if !path.is_file() {
        return Err(ValidationError::MissingFile(path.display().to_string()));
    }
    Ok(format)
}

/// Transcript files directly inside `dir`, sorted by name. macOS `._*`
/// resource-fork files are skipped.
pub fn scan_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let apple_double = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with("._"));
        if !apple_double && path.is_file() && TranscriptFormat::from_path(&path).is_some() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| {
        let a = a.file_name().map(|n| n.to_string_lossy().to_lowercase());
        let b = b.file_name().map(|n| n.to_string_lossy().to_lowercase());
        a.cmp(&b)
    });
    Ok(files)
}

/// Nodes that accept a transcript and have no subfolders of their own.
pub fn lesson_targets(tree: &Node) -> Vec<&Node> {
    let mut out = Vec::new();
    collect_targets(tree, &mut out);
    out
}

fn collect_targets<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    let folders = node.navigable_children();
    if node.can_upload_transcript() && folders.is_empty() {
        out.push(node);
    }
    for child in folders {
        collect_targets(child, out);
    }
}

/// Lower-case, drop brackets and underscores, squeeze whitespace.
pub fn normalize_name(name: &str) -> String {
    name.replace(['[', ']'], "")
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn word_similarity(a: &str, b: &str) -> f64 {
    let a: HashSet<&str> = a.split_whitespace().collect();
    let b: HashSet<&str> = b.split_whitespace().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let common = a.intersection(&b).count();
    common as f64 / a.len().max(b.len()) as f64
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchKind {
    Exact,
    Fuzzy(u8),
}

#[derive(Debug, Clone)]
pub struct ImportMatch {
    pub lesson_id: String,
    pub lesson_name: String,
    pub path: PathBuf,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, Default)]
pub struct ImportPlan {
    pub matches: Vec<ImportMatch>,
    pub unmatched_files: Vec<PathBuf>,
    /// (id, name) of lessons no file matched.
    pub unmatched_lessons: Vec<(String, String)>,
}

/// Pair transcript files with lessons: exact normalised name first, then word overlap.
pub fn plan_import(files: &[PathBuf], lessons: &[&Node]) -> ImportPlan {
    let mut plan = ImportPlan::default();
    let normalized: Vec<String> = lessons.iter().map(|l| normalize_name(&l.name)).collect();

    for path in files {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let file_name = normalize_name(&stem);

        let exact = normalized.iter().position(|n| *n == file_name);
        let found = match exact {
            Some(i) => Some((i, MatchKind::Exact)),
            None => normalized.iter().enumerate().find_map(|(i, n)| {
                let sim = word_similarity(&file_name, n);
                (sim > FUZZY_THRESHOLD).then(|| (i, MatchKind::Fuzzy((sim * 100.0) as u8)))
            }),
        };

        match found {
            Some((i, kind)) => plan.matches.push(ImportMatch {
                lesson_id: lessons[i].id.clone(),
                lesson_name: lessons[i].name.clone(),
                path: path.clone(),
                kind,
            }),
            None => plan.unmatched_files.push(path.clone()),
        }
    }

    let matched: HashSet<&str> = plan.matches.iter().map(|m| m.lesson_id.as_str()).collect();
    plan.unmatched_lessons = lessons
        .iter()
        .filter(|l| !matched.contains(l.id.as_str()))
        .map(|l| (l.id.clone(), l.name.clone()))
        .collect();
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tree::fixtures::{folder, sample_course};

    #[test]
    fn extension_check_is_case_insensitive() {
        assert_eq!(TranscriptFormat::from_path(Path::new("a.SRT")), Some(TranscriptFormat::Srt));
        assert_eq!(TranscriptFormat::from_path(Path::new("a.vtt")), Some(TranscriptFormat::Vtt));
        assert_eq!(TranscriptFormat::from_path(Path::new("a.txt")), None);
        assert_eq!(TranscriptFormat::from_path(Path::new("srt")), None);
    }

    #[test]
    fn check_rejects_wrong_extension_before_touching_disk() {
        let err = check_transcript_file(Path::new("/nope/notes.docx")).unwrap_err();
        assert!(matches!(err, ValidationError::TranscriptExtension(_)));
        let err = check_transcript_file(Path::new("/nope/missing.srt")).unwrap_err();
        assert!(matches!(err, ValidationError::MissingFile(_)));
    }

    #[test]
    fn scan_dir_keeps_only_transcripts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.vtt", "A.srt", "notes.txt", "._A.srt"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.srt")).unwrap();
        let files = scan_dir(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["A.srt", "b.vtt"]);
    }

    #[test]
    fn normalize_strips_decoration() {
        assert_eq!(normalize_name("[Lesson_1]  Identify-Your-Niche"), "lesson 1 identify your niche");
    }

    #[test]
    fn targets_are_leaf_folders_below_the_course() {
        let tree = sample_course();
        let ids: Vec<&str> = lesson_targets(&tree).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["l1", "l2", "m2"]);
    }

    #[test]
    fn plan_prefers_exact_then_fuzzy() {
        let lessons = vec![
            folder("a", "Lesson-1-Identify-Your-Niche", 3, vec![]),
            folder("b", "Step 2 Sign Up for Domain Name Today Now Please Thanks", 3, vec![]),
            folder("c", "Closing", 3, vec![]),
        ];
        let refs: Vec<&Node> = lessons.iter().collect();
        let files = vec![
            PathBuf::from("/t/[Lesson_1_Identify_Your_Niche].srt"),
            PathBuf::from("/t/closing remarks.srt"),
            PathBuf::from("/t/random.vtt"),
        ];
        let plan = plan_import(&files, &refs);
        assert_eq!(plan.matches.len(), 1);
        assert_eq!(plan.matches[0].lesson_id, "a");
        assert_eq!(plan.matches[0].kind, MatchKind::Exact);
        assert_eq!(plan.unmatched_files.len(), 2);
        assert_eq!(plan.unmatched_lessons.len(), 2);

        // 10 shared words over the 11-word lesson name is 0.909
        let files = vec![PathBuf::from(
            "/t/step 2 sign up for domain name today now please.srt",
        )];
        let plan = plan_import(&files, &refs);
        assert_eq!(plan.matches.len(), 1);
        assert_eq!(plan.matches[0].lesson_id, "b");
        assert!(matches!(plan.matches[0].kind, MatchKind::Fuzzy(p) if p >= 90));
    }
}
