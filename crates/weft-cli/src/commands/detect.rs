//! Detect command implementation.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::cli::DetectArgs;
use crate::commands::resolve_path;
use crate::engine::Engine;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use weft_detect::DetectOptions;
use weft_domain::RelationshipType;

/// Directory names never worth scanning
const IGNORED_DIRS: &[&str] = &[".git", "target", "node_modules", "__pycache__", ".venv"];

fn is_ignored(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| name.starts_with('.') || IGNORED_DIRS.contains(&name))
        .unwrap_or(false)
}

/// Expand the given files and directories into the scan list.
///
/// Every named path must exist; directories expand to their files,
/// recursively when requested.
fn expand_paths(paths: &[PathBuf], recursive: bool) -> Result<Vec<String>> {
    let mut expanded = Vec::new();
    for path in paths {
        Engine::require_exists(path)?;
        if path.is_file() {
            expanded.push(resolve_path(path));
            continue;
        }
        let max_depth = if recursive { usize::MAX } else { 1 };
        for entry in WalkDir::new(path)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_ignored(e.path()))
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() {
                expanded.push(resolve_path(entry.path()));
            }
        }
    }
    expanded.sort();
    expanded.dedup();
    Ok(expanded)
}

fn parse_types(types: &Option<Vec<String>>) -> Result<Option<Vec<RelationshipType>>> {
    match types {
        None => Ok(None),
        Some(tags) => tags
            .iter()
            .map(|tag| {
                RelationshipType::parse(tag)
                    .map_err(|e| CliError::InvalidInput(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
    }
}

/// Execute the detect command.
pub async fn execute_detect(
    args: DetectArgs,
    engine: &Engine,
    formatter: &Formatter,
) -> Result<()> {
    let paths = expand_paths(&args.paths, args.recursive)?;
    if paths.is_empty() {
        return Err(CliError::InvalidInput(
            "no files to scan after expansion".to_string(),
        ));
    }

    let options = DetectOptions {
        types: parse_types(&args.types)?,
        apply: args.apply,
        min_strength: args.min_strength,
        ..Default::default()
    };

    let report = engine.orchestrator().detect(&paths, &options).await?;
    println!("{}", formatter.format_report(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_missing_path_is_not_found() {
        let result = expand_paths(&[PathBuf::from("/definitely/not/here.py")], false);
        assert!(matches!(result, Err(CliError::FileNotFound(_))));
    }

    #[test]
    fn test_expand_directory_shallow_and_recursive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/b.py"), "y = 2\n").unwrap();

        let shallow = expand_paths(&[dir.path().to_path_buf()], false).unwrap();
        assert_eq!(shallow.len(), 1);

        let deep = expand_paths(&[dir.path().to_path_buf()], true).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_expand_skips_ignored_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git/config"), "noise\n").unwrap();
        std::fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();

        let expanded = expand_paths(&[dir.path().to_path_buf()], true).unwrap();
        assert_eq!(expanded.len(), 1);
        assert!(expanded[0].ends_with("a.py"));
    }

    #[test]
    fn test_parse_types_rejects_empty_tag() {
        let result = parse_types(&Some(vec!["".to_string()]));
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
