use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use walkdir::WalkDir;

use crate::enums::rename_identifiers;
use crate::enums::scanner::declared_names;
use crate::error::{PostprocessError, TransformError};

/// A source-to-source rewrite applied to each generated file.
pub trait Transform {
    fn name(&self) -> &'static str;

    /// Return the rewritten file, or `None` when it is left as it is.
    fn apply(&self, text: &str, file: &FileContext<'_>) -> Result<Option<Rewrite>, TransformError>;
}

/// The file a transform is rewriting and the names already taken in the tree.
#[derive(Debug, Clone, Copy)]
pub struct FileContext<'a> {
    /// Path relative to the output root.
    pub rel_path: &'a Path,
    /// Top-level names declared by any file under the output root.
    pub tree_names: &'a BTreeSet<String>,
}

/// One transform's output for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    /// Exported declarations that were renamed. References in other files are rewritten
    /// to match once every file has been transformed.
    pub renames: Vec<Rename>,
    /// Files the rewritten text depends on.
    pub support_files: Vec<SupportFile>,
}

impl Rewrite {
    pub fn new(text: String) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// A file a transform needs next to the sources it rewrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportFile {
    /// Path relative to the output root.
    pub path: &'static str,
    pub content: &'static str,
}

#[derive(Debug, Clone)]
pub struct PostprocessOptions {
    /// File extensions to rewrite, without the dot.
    pub extensions: Vec<String>,
    /// Formatter command run once in the output directory after any change. Empty disables it.
    pub formatter: Vec<String>,
}

impl Default for PostprocessOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["ts".to_string()],
            formatter: Vec::new(),
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostprocessReport {
    pub files_scanned: usize,
    /// Rewritten files, relative to the output root, in walk order.
    pub files_changed: Vec<PathBuf>,
    /// Files each transform rewrote, in transform order. Files touched only to follow a
    /// rename are not counted.
    pub hits: Vec<(&'static str, usize)>,
    /// Files that could not be decoded or that a transform failed on; left unchanged.
    pub files_failed: Vec<PathBuf>,
    pub support_files: Vec<PathBuf>,
    pub formatted: bool,
}

struct SourceFile {
    path: PathBuf,
    rel_path: PathBuf,
    original: String,
    text: Option<String>,
    failed: bool,
}

impl SourceFile {
    fn current(&self) -> &str {
        self.text.as_deref().unwrap_or(&self.original)
    }
}

/// Apply `transforms` in order to every matching file under `output_dir`.
///
/// Every file is read and transformed before anything is written. Renames of exported
/// declarations are then applied across the whole tree, so imports in other files follow
/// the new names. Files are written only when their text changed. A file that is not
/// UTF-8, or that a transform fails on, is skipped and the run continues. Support files
/// and the formatter run last.
pub fn run(
    output_dir: &Path,
    transforms: &[Box<dyn Transform>],
    options: &PostprocessOptions,
) -> Result<PostprocessReport, PostprocessError> {
    let mut report = PostprocessReport {
        hits: transforms.iter().map(|t| (t.name(), 0)).collect(),
        ..PostprocessReport::default()
    };
    let mut files = read_sources(output_dir, &options.extensions, &mut report)?;

    let mut tree_names = BTreeSet::new();
    for file in &files {
        // Unreadable files contribute no names; the transform pass reports them.
        if let Ok(names) = declared_names(&file.original) {
            tree_names.extend(names);
        }
    }

    let mut renames: Vec<Rename> = Vec::new();
    let mut support_files: Vec<SupportFile> = Vec::new();
    for file in &mut files {
        let context = FileContext {
            rel_path: &file.rel_path,
            tree_names: &tree_names,
        };
        match transform_file(&file.original, &context, transforms) {
            Ok(None) => {}
            Ok(Some((rewrite, fired))) => {
                for (hits, fired) in report.hits.iter_mut().zip(fired) {
                    hits.1 += usize::from(fired);
                }
                tree_names.extend(rewrite.renames.iter().map(|r| r.to.clone()));
                renames.extend(rewrite.renames);
                for support in rewrite.support_files {
                    if !support_files.contains(&support) {
                        support_files.push(support);
                    }
                }
                file.text = Some(rewrite.text);
            }
            Err((name, err)) => {
                log::warn!("{}: {name} failed, file left unchanged: {err}", file.rel_path.display());
                report.files_failed.push(file.rel_path.clone());
                file.failed = true;
            }
        }
    }

    if !renames.is_empty() {
        for file in files.iter_mut().filter(|f| !f.failed) {
            match rename_identifiers(file.current(), &renames) {
                Ok(text) => file.text = Some(text),
                Err(err) => log::warn!(
                    "{}: could not follow renamed declarations: {err}",
                    file.rel_path.display()
                ),
            }
        }
    }

    for file in &files {
        let Some(text) = file.text.as_ref().filter(|text| **text != file.original) else {
            continue;
        };
        fs::write(&file.path, text).map_err(|source| PostprocessError::Write {
            path: file.path.clone(),
            source,
        })?;
        log::debug!("rewrote {}", file.rel_path.display());
        report.files_changed.push(file.rel_path.clone());
    }

    if report.files_changed.is_empty() {
        return Ok(report);
    }

    for support in support_files {
        let path = output_dir.join(support.path);
        if fs::read_to_string(&path).is_ok_and(|existing| existing == support.content) {
            continue;
        }
        fs::write(&path, support.content).map_err(|source| PostprocessError::Write {
            path: path.clone(),
            source,
        })?;
        report.support_files.push(PathBuf::from(support.path));
    }

    report.formatted = try_run_formatter(output_dir, &options.formatter);
    Ok(report)
}

/// Read every file under `output_dir` with a matching extension, in sorted walk order.
fn read_sources(
    output_dir: &Path,
    extensions: &[String],
    report: &mut PostprocessReport,
) -> Result<Vec<SourceFile>, PostprocessError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(output_dir).sort_by_file_name() {
        let entry = entry.map_err(|source| PostprocessError::Walk {
            path: output_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || !has_extension(path, extensions) {
            continue;
        }
        let rel_path = path.strip_prefix(output_dir).unwrap_or(path).to_path_buf();

        let bytes = fs::read(path).map_err(|source| PostprocessError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        report.files_scanned += 1;

        match String::from_utf8(bytes) {
            Ok(original) => files.push(SourceFile {
                path: path.to_path_buf(),
                rel_path,
                original,
                text: None,
                failed: false,
            }),
            Err(err) => {
                log::warn!("{}: not valid UTF-8, file left unchanged: {err}", rel_path.display());
                report.files_failed.push(rel_path);
            }
        }
    }
    Ok(files)
}

/// Run every transform over one file's text. Returns the combined rewrite and which
/// transforms changed the text, or `None` when nothing changed.
#[allow(clippy::type_complexity)]
fn transform_file(
    original: &str,
    file: &FileContext<'_>,
    transforms: &[Box<dyn Transform>],
) -> Result<Option<(Rewrite, Vec<bool>)>, (&'static str, TransformError)> {
    let mut combined: Option<Rewrite> = None;
    let mut fired = vec![false; transforms.len()];

    for (i, transform) in transforms.iter().enumerate() {
        let text = combined.as_ref().map_or(original, |r| r.text.as_str());
        let Some(rewrite) = transform
            .apply(text, file)
            .map_err(|err| (transform.name(), err))?
        else {
            continue;
        };
        fired[i] = rewrite.text != text;
        let merged = combined.get_or_insert_with(Rewrite::default);
        merged.text = rewrite.text;
        merged.renames.extend(rewrite.renames);
        merged.support_files.extend(rewrite.support_files);
    }

    Ok(combined
        .filter(|rewrite| rewrite.text != original)
        .map(|rewrite| (rewrite, fired)))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
}

/// Run the formatter command in `output_dir`. Failures are reported, never fatal.
fn try_run_formatter(output_dir: &Path, formatter: &[String]) -> bool {
    let Some((program, args)) = formatter.split_first() else {
        return false;
    };
    match Command::new(program)
        .args(args)
        .current_dir(output_dir)
        .output()
    {
        Ok(result) if result.status.success() => {
            log::info!("formatted {} with {program}", output_dir.display());
            true
        }
        Ok(result) => {
            log::warn!(
                "{} exited with {}, output may need manual formatting",
                formatter.join(" "),
                result.status
            );
            false
        }
        Err(err) => {
            log::warn!(
                "could not run {program} ({err}); run `{}` in {} to format",
                formatter.join(" "),
                output_dir.display()
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl Transform for Upper {
        fn name(&self) -> &'static str {
            "upper"
        }

        fn apply(&self, text: &str, _: &FileContext<'_>) -> Result<Option<Rewrite>, TransformError> {
            let upper = text.to_uppercase();
            Ok((upper != text).then(|| Rewrite::new(upper)))
        }
    }

    struct Fails;

    impl Transform for Fails {
        fn name(&self) -> &'static str {
            "fails"
        }

        fn apply(&self, text: &str, _: &FileContext<'_>) -> Result<Option<Rewrite>, TransformError> {
            if text.contains("bad") {
                Err(TransformError::Unterminated {
                    what: "comment",
                    offset: 0,
                })
            } else {
                Ok(None)
            }
        }
    }

    #[test]
    fn only_matching_extensions_are_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ts"), "abc").unwrap();
        fs::write(dir.path().join("b.js"), "abc").unwrap();

        let transforms: Vec<Box<dyn Transform>> = vec![Box::new(Upper)];
        let report = run(dir.path(), &transforms, &PostprocessOptions::default()).unwrap();

        assert_eq!(report.files_scanned, 1);
        assert_eq!(report.files_changed, [PathBuf::from("a.ts")]);
        assert_eq!(report.hits, [("upper", 1)]);
        assert_eq!(fs::read_to_string(dir.path().join("a.ts")).unwrap(), "ABC");
        assert_eq!(fs::read_to_string(dir.path().join("b.js")).unwrap(), "abc");
    }

    #[test]
    fn failing_file_is_skipped_and_run_continues() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ts"), "bad").unwrap();
        fs::write(dir.path().join("b.ts"), "good").unwrap();

        let transforms: Vec<Box<dyn Transform>> = vec![Box::new(Upper), Box::new(Fails)];
        let report = run(dir.path(), &transforms, &PostprocessOptions::default()).unwrap();

        // `Fails` sees the upper-cased text, so only the original "bad" file is rejected.
        assert_eq!(report.files_failed, Vec::<PathBuf>::new());
        assert_eq!(report.files_changed.len(), 2);

        let transforms: Vec<Box<dyn Transform>> = vec![Box::new(Fails), Box::new(Upper)];
        fs::write(dir.path().join("a.ts"), "bad").unwrap();
        fs::write(dir.path().join("b.ts"), "good").unwrap();
        let report = run(dir.path(), &transforms, &PostprocessOptions::default()).unwrap();
        assert_eq!(report.files_failed, [PathBuf::from("a.ts")]);
        assert_eq!(report.files_changed, [PathBuf::from("b.ts")]);
        assert_eq!(fs::read_to_string(dir.path().join("a.ts")).unwrap(), "bad");
    }

    #[test]
    fn unchanged_tree_skips_formatter() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ts"), "ABC").unwrap();
        let options = PostprocessOptions {
            formatter: vec!["specgen-formatter-that-does-not-exist".to_string()],
            ..PostprocessOptions::default()
        };
        let transforms: Vec<Box<dyn Transform>> = vec![Box::new(Upper)];
        let report = run(dir.path(), &transforms, &options).unwrap();
        assert!(report.files_changed.is_empty());
        assert!(!report.formatted);
    }

    #[test]
    fn missing_formatter_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ts"), "abc").unwrap();
        let options = PostprocessOptions {
            formatter: vec!["specgen-formatter-that-does-not-exist".to_string()],
            ..PostprocessOptions::default()
        };
        let transforms: Vec<Box<dyn Transform>> = vec![Box::new(Upper)];
        let report = run(dir.path(), &transforms, &options).unwrap();
        assert_eq!(report.files_changed.len(), 1);
        assert!(!report.formatted);
    }

    #[test]
    fn non_utf8_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ts"), b"f\xffo").unwrap();
        fs::write(dir.path().join("b.ts"), "abc").unwrap();

        let transforms: Vec<Box<dyn Transform>> = vec![Box::new(Upper)];
        let report = run(dir.path(), &transforms, &PostprocessOptions::default()).unwrap();

        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.files_failed, [PathBuf::from("a.ts")]);
        assert_eq!(report.files_changed, [PathBuf::from("b.ts")]);
        assert_eq!(fs::read(dir.path().join("a.ts")).unwrap(), b"f\xffo");
    }
}
