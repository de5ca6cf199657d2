//! Drives a generation pass: groups targets by file, rewrites every file
//! and hands the results back in a stable order.

use std::borrow::Cow;
use std::collections::HashMap;

use rayon::prelude::*;

use crate::config::RewriteConfig;
use crate::edit::RewriteSession;
use crate::error::{Result, RewriteError};
use crate::file::{SourceFile, checksum};
use crate::planner::EditPlanner;
use crate::position::PositionResolver;
use crate::target::RewriteTarget;

/// The rewritten text of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenFile {
    pub path: String,
    pub content: Vec<u8>,
    /// BLAKE3 checksum of the original text
    pub original_checksum: String,
    /// BLAKE3 checksum of `content`
    pub checksum: String,
    /// Number of declarations rewritten in this file
    pub replacements: usize,
}

impl RewrittenFile {
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Per-file state while its targets are being registered
///
/// Owns the file's session and the flag recording whether the runtime
/// import has been inserted. The flag only ever goes from false to true.
#[derive(Debug)]
pub struct FileRewrite<'a> {
    file: &'a SourceFile,
    session: RewriteSession,
    import_added: bool,
    replacements: usize,
}

impl<'a> FileRewrite<'a> {
    pub fn new(file: &'a SourceFile) -> Self {
        Self {
            file,
            session: RewriteSession::new(file.as_bytes()),
            import_added: false,
            replacements: 0,
        }
    }

    pub fn import_added(&self) -> bool {
        self.import_added
    }

    pub fn session(&self) -> &RewriteSession {
        &self.session
    }

    /// Register the edits for one target, plus the import if this is the
    /// first target of the file
    pub fn add_target(
        &mut self,
        planner: &EditPlanner<'_>,
        target: &RewriteTarget,
        resolver: &dyn PositionResolver,
    ) {
        if !self.import_added {
            let import = planner.import(self.file, resolver);
            self.session.insert(import.offset, import.payload);
            self.import_added = true;
        }

        for edit in planner.replacement(target, self.file, resolver) {
            self.session.insert(edit.offset, edit.payload);
        }
        self.replacements += 1;
    }

    /// Materialize the session once every target has been registered
    pub fn finish(self) -> RewrittenFile {
        let content = self.session.materialize();
        RewrittenFile {
            path: self.file.path.clone(),
            checksum: checksum(&content),
            original_checksum: self.file.checksum.clone(),
            content,
            replacements: self.replacements,
        }
    }
}

/// Rewrites secret declarations across a set of files
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: RewriteConfig,
}

impl Generator {
    pub fn new(config: RewriteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// Rewrite every file that at least one target refers to
    ///
    /// Files are returned in the order their first target appears in
    /// `targets`; files without targets are left out. Each file is
    /// rewritten independently and in parallel.
    ///
    /// # Errors
    /// Returns an error, and rewrites nothing, if a target names a file
    /// that was not supplied or a span that does not fit its file.
    pub fn generate(
        &self,
        files: &[SourceFile],
        targets: &[RewriteTarget],
        resolver: &dyn PositionResolver,
    ) -> Result<Vec<RewrittenFile>> {
        let groups = group_targets(files, targets)?;
        let planner = EditPlanner::new(&self.config);

        let rewritten: Vec<RewrittenFile> = groups
            .par_iter()
            .map(|(file, targets)| {
                let mut rewrite = FileRewrite::new(file);
                for target in targets {
                    rewrite.add_target(&planner, target, resolver);
                }
                tracing::debug!(
                    path = %file.path,
                    targets = targets.len(),
                    edits = rewrite.session().edit_count(),
                    "rewrote file"
                );
                rewrite.finish()
            })
            .collect();

        tracing::info!(
            files = rewritten.len(),
            targets = targets.len(),
            "generation pass complete"
        );
        Ok(rewritten)
    }
}

/// Check every target against its file and group targets by file in
/// first-encounter order
fn group_targets<'f, 't>(
    files: &'f [SourceFile],
    targets: &'t [RewriteTarget],
) -> Result<Vec<(&'f SourceFile, Vec<&'t RewriteTarget>)>> {
    let mut by_path: HashMap<&str, &SourceFile> = HashMap::with_capacity(files.len());
    for file in files {
        if by_path.insert(file.path.as_str(), file).is_some() {
            return Err(RewriteError::DuplicateFile(file.path.clone()));
        }
    }

    let mut groups: Vec<(&SourceFile, Vec<&RewriteTarget>)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for target in targets {
        let file = *by_path
            .get(target.file.as_str())
            .ok_or_else(|| RewriteError::UnknownFile(target.file.clone()))?;
        validate_target(file, target)?;

        let slot = *slots.entry(file.path.as_str()).or_insert_with(|| {
            groups.push((file, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(target);
    }

    Ok(groups)
}

fn validate_target(file: &SourceFile, target: &RewriteTarget) -> Result<()> {
    if file.package_end > file.len {
        return Err(RewriteError::PackageClauseOutOfBounds {
            file: file.path.clone(),
            offset: file.package_end,
            len: file.len,
        });
    }
    if target.end < target.start {
        return Err(RewriteError::InvalidRange {
            file: file.path.clone(),
            start: target.start,
            end: target.end,
        });
    }
    if target.end > file.len {
        return Err(RewriteError::OutOfBounds {
            file: file.path.clone(),
            start: target.start,
            end: target.end,
            len: file.len,
        });
    }
    Ok(())
}
