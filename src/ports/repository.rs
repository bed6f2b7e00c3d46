//! Repository port (trait).
//! The refresh operations a repository model offers to the rest of the app,
//! without coupling to any git implementation.

use crate::domain::RepositorySettings;
use anyhow::Result;

/// Port for a repository whose cached state can be reloaded piecemeal.
/// Implementations may use git2, shell commands, or test fakes.
pub trait Repository {
    fn settings(&self) -> &RepositorySettings;

    /// Cheap check used to skip submodule scans in repositories without any.
    fn may_have_submodules(&self) -> bool;

    fn refresh_branches(&mut self) -> Result<()>;

    fn refresh_worktrees(&mut self) -> Result<()>;

    fn refresh_tags(&mut self) -> Result<()>;

    /// Reload history, bounded by `settings().max_commits`.
    fn refresh_commits(&mut self) -> Result<()>;

    fn refresh_submodules(&mut self) -> Result<()>;

    fn refresh_working_copy_changes(&mut self) -> Result<()>;

    fn refresh_stashes(&mut self) -> Result<()>;

    /// Reload everything. Submodules are skipped when the repository cannot
    /// have any.
    fn refresh_all(&mut self) -> Result<()> {
        self.refresh_branches()?;
        self.refresh_worktrees()?;
        self.refresh_tags()?;
        self.refresh_commits()?;
        if self.may_have_submodules() {
            self.refresh_submodules()?;
        }
        self.refresh_working_copy_changes()?;
        self.refresh_stashes()?;
        Ok(())
    }
}
