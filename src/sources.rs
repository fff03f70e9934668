//! Checklist source discovery and loading.

use std::path::PathBuf;

use futures::future::join_all;
use tracing::debug;

use crate::checklist::Checklist;
use crate::error::{Error, Result};

/// A source file and its contents.
#[derive(Debug, Clone)]
pub struct Source {
    pub path: PathBuf,
    pub text: String,
}

/// Expand glob patterns into file paths.
///
/// Paths keep pattern order and appear once even when several patterns match
/// them. Directories are skipped. A pattern matching nothing contributes
/// nothing.
pub fn expand(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let entries = glob::glob(pattern).map_err(|err| Error::InvalidPattern {
            pattern: pattern.clone(),
            message: err.msg.to_string(),
        })?;

        let before = paths.len();
        for entry in entries {
            let path = entry.map_err(|err| Error::Io(std::io::Error::other(err.to_string())))?;
            if path.is_dir() || paths.contains(&path) {
                continue;
            }
            paths.push(path);
        }
        debug!(pattern = %pattern, matched = paths.len() - before, "expanded pattern");
    }

    Ok(paths)
}

/// Read every path concurrently.
pub async fn read_all(paths: Vec<PathBuf>) -> Result<Vec<Source>> {
    let reads = paths.into_iter().map(|path| async move {
        let text = tokio::fs::read_to_string(&path).await?;
        Ok::<_, Error>(Source { path, text })
    });
    join_all(reads).await.into_iter().collect()
}

/// Parse sources into one checklist, one source at a time in order.
pub fn build_checklist(sources: &[Source]) -> Checklist {
    let mut checklist = Checklist::new();
    for source in sources {
        let added = checklist.push_source(&source.text);
        debug!(path = %source.path.display(), tasks = added, "parsed source");
    }
    checklist
}

/// Expand, read and parse in one step.
pub async fn load_checklist(patterns: &[String]) -> Result<Checklist> {
    let paths = expand(patterns)?;
    let sources = read_all(paths).await?;
    Ok(build_checklist(&sources))
}
