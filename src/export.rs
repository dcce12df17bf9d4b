//! `.doc` artifact production.
//!
//! The renderer is pure; this module is the only place a document touches the
//! filesystem. Word opens the HTML directly when the file carries a `.doc`
//! extension and a UTF-8 byte order mark.
//!
//! Every failure surfaces as a single [`ExportError`] whose message starts
//! with `failed to generate document:`. There are no retries; the caller
//! reports the error and the user tries again.
//!
//! ## Batch Export
//!
//! [`export_batch`] renders independent files on the rayon pool. Each input
//! keeps its path relative to the input directory, so `a/policy.md` becomes
//! `out/a/policy.doc` and `b/policy.md` becomes `out/b/policy.doc`. Targets
//! are checked for clashes (`policy.md` next to `policy.MD`) before anything
//! is written.

use crate::config::{BrandConfig, DocConfig};
use crate::render::{self, EmbeddedImage, RenderOptions, scan_document};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DOC_EXTENSION: &str = "doc";

/// Lets word processors detect the encoding.
const BOM: &str = "\u{feff}";

/// Longest slug used for a generated file name.
const MAX_SLUG_LEN: usize = 80;

/// Fallback file stem when the title has no ASCII letters or digits.
const FALLBACK_STEM: &str = "document";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to generate document: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to generate document: cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to generate document: cannot read image {path}: {source}")]
    Image {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to generate document: {first} and {second} both export to {target}")]
    TargetClash {
        target: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Reduce a title to a filesystem-safe slug.
///
/// Non-ASCII characters become dashes, so an Arabic-only title yields an
/// empty slug.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut prev_dash = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }
    let trimmed = slug.trim_end_matches('-');

    if trimmed.len() <= MAX_SLUG_LEN {
        return trimmed.to_string();
    }
    let cut = &trimmed[..MAX_SLUG_LEN];
    match cut.rfind('-') {
        Some(pos) if pos > 0 => cut[..pos].to_string(),
        _ => cut.to_string(),
    }
}

/// `<slug>.doc`, falling back to `document.doc`.
pub fn document_file_name(title: &str) -> String {
    let slug = slugify(title);
    let stem = if slug.is_empty() { FALLBACK_STEM } else { &slug };
    format!("{stem}.{DOC_EXTENSION}")
}

/// Read an image for embedding (logo or process diagram).
pub fn load_image(path: &Path) -> Result<EmbeddedImage, ExportError> {
    EmbeddedImage::from_path(path).map_err(|source| ExportError::Image {
        path: path.to_path_buf(),
        source,
    })
}

/// The configured brand logo, resolved against the config directory.
pub fn brand_logo(brand: &BrandConfig, config_dir: &Path) -> Result<Option<EmbeddedImage>, ExportError> {
    if brand.logo.trim().is_empty() {
        return Ok(None);
    }
    load_image(&config_dir.join(brand.logo.trim())).map(Some)
}

/// Render `markdown` and write the `.doc` file.
///
/// If `output` is an existing directory the file is named after the document
/// title. Otherwise `output` is the file path and its parent is created.
pub fn export_document(
    markdown: &str,
    options: &RenderOptions,
    config: &DocConfig,
    output: &Path,
) -> Result<PathBuf, ExportError> {
    let target = if output.is_dir() {
        let title = render::document_title(&scan_document(markdown), options);
        output.join(document_file_name(&title))
    } else {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        output.to_path_buf()
    };

    let html = render::render_document(markdown, options, config);
    let mut bytes = Vec::with_capacity(BOM.len() + html.len());
    bytes.extend_from_slice(BOM.as_bytes());
    bytes.extend_from_slice(html.as_bytes());
    std::fs::write(&target, bytes)?;

    tracing::info!(path = %target.display(), bytes = html.len(), "document exported");
    Ok(target)
}

/// Outcome of one file in a batch.
#[derive(Debug)]
pub struct BatchResult {
    pub source: PathBuf,
    pub result: Result<PathBuf, ExportError>,
}

/// Every `.md` file under `dir`, sorted by path.
pub fn find_markdown_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("md"))
        })
        .collect();
    files.sort();
    files
}

/// Output path for a batch source, mirroring its place under `input_dir`.
///
/// A source outside `input_dir` lands directly in `output_dir`.
pub fn batch_target(source: &Path, input_dir: &Path, output_dir: &Path) -> PathBuf {
    let relative = source
        .strip_prefix(input_dir)
        .ok()
        .filter(|r| !r.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| source.file_name().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_STEM));
    output_dir.join(relative).with_extension(DOC_EXTENSION)
}

/// Pair every source with its target, rejecting two sources for one target.
fn plan_batch(
    sources: &[PathBuf],
    input_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<(PathBuf, PathBuf)>, ExportError> {
    let mut seen: HashMap<PathBuf, &PathBuf> = HashMap::new();
    let mut plan = Vec::with_capacity(sources.len());
    for source in sources {
        let target = batch_target(source, input_dir, output_dir);
        if let Some(first) = seen.insert(target.clone(), source) {
            return Err(ExportError::TargetClash {
                target,
                first: first.clone(),
                second: source.clone(),
            });
        }
        plan.push((source.clone(), target));
    }
    Ok(plan)
}

fn export_file(
    source: &Path,
    target: &Path,
    options: &RenderOptions,
    config: &DocConfig,
) -> Result<PathBuf, ExportError> {
    let markdown = std::fs::read_to_string(source).map_err(|e| ExportError::Read {
        path: source.to_path_buf(),
        source: e,
    })?;
    export_document(&markdown, options, config, target)
}

/// Render many files in parallel. Titles come from each document's own heading.
///
/// Fails as a whole only if the output directory cannot be created or two
/// sources map to the same target; per-file failures are in the results.
pub fn export_batch(
    input_dir: &Path,
    sources: &[PathBuf],
    options: &RenderOptions,
    config: &DocConfig,
    output_dir: &Path,
) -> Result<Vec<BatchResult>, ExportError> {
    let plan = plan_batch(sources, input_dir, output_dir)?;
    std::fs::create_dir_all(output_dir)?;
    let per_document = RenderOptions {
        title: None,
        ..options.clone()
    };

    let results = plan
        .par_iter()
        .map(|(source, target)| BatchResult {
            source: source.clone(),
            result: export_file(source, target, &per_document, config),
        })
        .collect::<Vec<_>>();

    let failed = results.iter().filter(|r| r.result.is_err()).count();
    if failed > 0 {
        tracing::warn!(failed, total = results.len(), "some documents failed to export");
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn slug_from_title() {
        assert_eq!(slugify("Credit Policy"), "credit-policy");
        assert_eq!(slugify("  AML / KYC: Rules!  "), "aml-kyc-rules");
        assert_eq!(slugify("سياسة الائتمان"), "");
    }

    #[test]
    fn slug_truncates_at_word_boundary() {
        let title = "word ".repeat(40);
        let slug = slugify(&title);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
        assert!(slug.ends_with("word"));
    }

    #[test]
    fn file_name_falls_back() {
        assert_eq!(document_file_name("Credit Policy"), "credit-policy.doc");
        assert_eq!(document_file_name("سياسة"), "document.doc");
    }

    #[test]
    fn export_to_directory_names_file_after_title() {
        let tmp = TempDir::new().unwrap();
        let path = export_document(
            &sample_policy_markdown(),
            &RenderOptions::default(),
            &DocConfig::default(),
            tmp.path(),
        )
        .unwrap();
        assert_eq!(path, tmp.path().join("credit-policy.doc"));
    }

    #[test]
    fn exported_file_starts_with_bom() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("nested/out.doc");
        let path = export_document("## A", &RenderOptions::default(), &DocConfig::default(), &target)
            .unwrap();
        assert_eq!(path, target);
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.starts_with("<!DOCTYPE html>"));
        assert!(text.contains("1. A"));
    }

    #[test]
    fn write_failure_is_generic_signal() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let err = export_document(
            "## A",
            &RenderOptions::default(),
            &DocConfig::default(),
            &blocker.join("out.doc"),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("failed to generate document:"));
    }

    #[test]
    fn brand_logo_resolves_against_config_dir() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("logo.png"), [1u8, 2, 3]).unwrap();
        let mut brand = BrandConfig::default();
        assert_eq!(brand_logo(&brand, tmp.path()).unwrap(), None);

        brand.logo = "logo.png".into();
        let logo = brand_logo(&brand, tmp.path()).unwrap().unwrap();
        assert_eq!(logo.mime, "image/png");
        assert_eq!(logo.data, vec![1, 2, 3]);

        brand.logo = "missing.png".into();
        assert!(matches!(
            brand_logo(&brand, tmp.path()),
            Err(ExportError::Image { .. })
        ));
    }

    #[test]
    fn finds_markdown_recursively() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("sub")).unwrap();
        std::fs::write(tmp.path().join("b.md"), "## B").unwrap();
        std::fs::write(tmp.path().join("sub/a.MD"), "## A").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "x").unwrap();
        let files = find_markdown_files(tmp.path());
        assert_eq!(
            files,
            vec![tmp.path().join("b.md"), tmp.path().join("sub/a.MD")]
        );
    }

    #[test]
    fn batch_exports_each_file_by_stem() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("credit.md"), sample_policy_markdown()).unwrap();
        std::fs::write(src.join("aml.md"), abbreviations_markdown()).unwrap();

        let out = tmp.path().join("out");
        let sources = find_markdown_files(&src);
        let results = export_batch(
            &src,
            &sources,
            &RenderOptions::default(),
            &DocConfig::default(),
            &out,
        )
        .unwrap();

        assert_eq!(results.len(), 2);
        for r in &results {
            assert!(r.result.is_ok(), "{:?} failed", r.source);
        }
        assert!(out.join("credit.doc").is_file());
        assert!(out.join("aml.doc").is_file());
    }

    #[test]
    fn batch_mirrors_subdirectories() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        for dir in ["a", "b"] {
            std::fs::create_dir_all(src.join(dir)).unwrap();
            std::fs::write(src.join(dir).join("policy.md"), format!("# Policy {dir}\n## A")).unwrap();
        }

        let out = tmp.path().join("out");
        let results = export_batch(
            &src,
            &find_markdown_files(&src),
            &RenderOptions::default(),
            &DocConfig::default(),
            &out,
        )
        .unwrap();

        let targets: Vec<&PathBuf> = results.iter().map(|r| r.result.as_ref().unwrap()).collect();
        assert_eq!(targets, vec![&out.join("a/policy.doc"), &out.join("b/policy.doc")]);
        let a = std::fs::read_to_string(out.join("a/policy.doc")).unwrap();
        let b = std::fs::read_to_string(out.join("b/policy.doc")).unwrap();
        assert!(a.contains("Policy a"));
        assert!(b.contains("Policy b"));
    }

    #[test]
    fn batch_rejects_clashing_targets() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        let sources = [tmp.path().join("policy.md"), tmp.path().join("policy.MD")];
        let err = export_batch(
            tmp.path(),
            &sources,
            &RenderOptions::default(),
            &DocConfig::default(),
            &out,
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::TargetClash { .. }));
        assert!(err.to_string().starts_with("failed to generate document:"));
        assert!(!out.exists(), "nothing is written on a clash");
    }

    #[test]
    fn batch_target_outside_input_uses_file_name() {
        let out = Path::new("out");
        assert_eq!(
            batch_target(Path::new("docs/x/aml.md"), Path::new("docs"), out),
            out.join("x/aml.doc")
        );
        assert_eq!(
            batch_target(Path::new("/elsewhere/aml.md"), Path::new("docs"), out),
            out.join("aml.doc")
        );
    }

    #[test]
    fn batch_reports_unreadable_source() {
        let tmp = TempDir::new().unwrap();
        let results = export_batch(
            tmp.path(),
            &[tmp.path().join("gone.md")],
            &RenderOptions::default(),
            &DocConfig::default(),
            tmp.path(),
        )
        .unwrap();
        let err = results[0].result.as_ref().unwrap_err();
        assert!(matches!(err, ExportError::Read { .. }));
        assert!(err.to_string().contains("gone.md"));
    }
}
