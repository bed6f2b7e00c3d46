//! Git2 implementation of the Repository port.
//! Each refresh reloads one slice of repository state into an in-memory snapshot.

use crate::domain::{
    Branch, Change, ChangeKind, Commit, RepositorySettings, Stash, Submodule, Tag, Worktree,
};
use crate::ports::Repository;
use anyhow::{anyhow, Context, Result};
use git2::{BranchType, Sort, Status, StatusOptions, WorktreeLockStatus};
use std::path::{Path, PathBuf};

pub struct Git2Repository {
    repo: git2::Repository,
    settings: RepositorySettings,
    branches: Vec<Branch>,
    worktrees: Vec<Worktree>,
    tags: Vec<Tag>,
    commits: Vec<Commit>,
    submodules: Vec<Submodule>,
    changes: Vec<Change>,
    stashes: Vec<Stash>,
}

impl Git2Repository {
    pub fn open(path: &Path, settings: RepositorySettings) -> Result<Self> {
        let repo = git2::Repository::discover(path).context("Failed to open git repository")?;
        Ok(Self {
            repo,
            settings,
            branches: Vec::new(),
            worktrees: Vec::new(),
            tags: Vec::new(),
            commits: Vec::new(),
            submodules: Vec::new(),
            changes: Vec::new(),
            stashes: Vec::new(),
        })
    }

    pub fn workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("Repository has no working directory (bare repo?)"))
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn worktrees(&self) -> &[Worktree] {
        &self.worktrees
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn submodules(&self) -> &[Submodule] {
        &self.submodules
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn stashes(&self) -> &[Stash] {
        &self.stashes
    }
}

impl Repository for Git2Repository {
    fn settings(&self) -> &RepositorySettings {
        &self.settings
    }

    fn may_have_submodules(&self) -> bool {
        self.repo
            .workdir()
            .map(|dir| dir.join(".gitmodules").is_file())
            .unwrap_or(false)
    }

    fn refresh_branches(&mut self) -> Result<()> {
        let mut branches = Vec::new();

        for item in self.repo.branches(None).context("Failed to list branches")? {
            let (branch, kind) = item?;
            let Some(name) = branch.name()?.map(String::from) else {
                continue;
            };
            let is_remote = matches!(kind, BranchType::Remote);
            // origin/HEAD is a symbolic alias, not a branch of its own
            if is_remote && name.ends_with("/HEAD") {
                continue;
            }

            let upstream = if is_remote {
                None
            } else {
                branch
                    .upstream()
                    .ok()
                    .and_then(|u| u.name().ok().flatten().map(String::from))
            };

            branches.push(Branch {
                head: branch
                    .get()
                    .target()
                    .map(|oid| oid.to_string())
                    .unwrap_or_default(),
                is_current: branch.is_head(),
                is_remote,
                upstream,
                name,
            });
        }

        branches.sort_by(|a, b| a.is_remote.cmp(&b.is_remote).then_with(|| a.name.cmp(&b.name)));
        self.branches = branches;
        Ok(())
    }

    fn refresh_worktrees(&mut self) -> Result<()> {
        let names = self.repo.worktrees().context("Failed to list worktrees")?;
        let mut worktrees = Vec::new();

        for name in names.iter().flatten() {
            let wt = self
                .repo
                .find_worktree(name)
                .with_context(|| format!("Failed to open worktree '{}'", name))?;
            worktrees.push(Worktree {
                name: name.to_string(),
                path: wt.path().display().to_string(),
                is_locked: matches!(wt.is_locked(), Ok(WorktreeLockStatus::Locked(_))),
            });
        }

        self.worktrees = worktrees;
        Ok(())
    }

    fn refresh_tags(&mut self) -> Result<()> {
        let names = self.repo.tag_names(None).context("Failed to list tags")?;
        let mut tags: Vec<Tag> = names
            .iter()
            .flatten()
            .map(|name| Tag {
                name: name.to_string(),
            })
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        self.tags = tags;
        Ok(())
    }

    fn refresh_commits(&mut self) -> Result<()> {
        // Unborn HEAD: nothing to walk yet
        let Some(head) = self.repo.head().ok().and_then(|h| h.target()) else {
            self.commits.clear();
            return Ok(());
        };

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(head)?;

        let mut commits = Vec::new();
        for oid in revwalk.take(self.settings.max_commits) {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            let author = commit.author();

            commits.push(Commit {
                hash: oid.to_string(),
                short_hash: format!("{:.7}", oid),
                message: commit.message().unwrap_or("").to_string(),
                author: author.name().unwrap_or("Unknown").to_string(),
                email: author.email().unwrap_or("").to_string(),
                timestamp: commit.time().seconds(),
            });
        }

        self.commits = commits;
        Ok(())
    }

    fn refresh_submodules(&mut self) -> Result<()> {
        let submodules = self
            .repo
            .submodules()
            .context("Failed to list submodules")?
            .iter()
            .map(|sm| Submodule {
                name: sm.name().unwrap_or("").to_string(),
                path: sm.path().display().to_string(),
                url: sm.url().map(String::from),
            })
            .collect();
        self.submodules = submodules;
        Ok(())
    }

    fn refresh_working_copy_changes(&mut self) -> Result<()> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(self.settings.include_untracked)
            .recurse_untracked_dirs(true)
            .renames_head_to_index(true);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .context("Failed to read working copy status")?;

        let mut changes = Vec::new();
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                continue;
            };
            let status = entry.status();

            if let Some(kind) = staged_kind(status) {
                changes.push(Change {
                    path: path.to_string(),
                    kind,
                    staged: true,
                });
            }
            if let Some(kind) = unstaged_kind(status) {
                changes.push(Change {
                    path: path.to_string(),
                    kind,
                    staged: false,
                });
            }
        }

        self.changes = changes;
        Ok(())
    }

    fn refresh_stashes(&mut self) -> Result<()> {
        let mut stashes = Vec::new();
        self.repo
            .stash_foreach(|index, message, oid| {
                stashes.push(Stash {
                    index,
                    message: message.to_string(),
                    oid: oid.to_string(),
                });
                true
            })
            .context("Failed to list stashes")?;
        self.stashes = stashes;
        Ok(())
    }
}

fn staged_kind(status: Status) -> Option<ChangeKind> {
    if status.is_conflicted() {
        None
    } else if status.is_index_new() {
        Some(ChangeKind::Added)
    } else if status.is_index_modified() {
        Some(ChangeKind::Modified)
    } else if status.is_index_deleted() {
        Some(ChangeKind::Deleted)
    } else if status.is_index_renamed() {
        Some(ChangeKind::Renamed)
    } else if status.is_index_typechange() {
        Some(ChangeKind::TypeChanged)
    } else {
        None
    }
}

fn unstaged_kind(status: Status) -> Option<ChangeKind> {
    if status.is_conflicted() {
        Some(ChangeKind::Conflicted)
    } else if status.is_wt_new() {
        Some(ChangeKind::Untracked)
    } else if status.is_wt_modified() {
        Some(ChangeKind::Modified)
    } else if status.is_wt_deleted() {
        Some(ChangeKind::Deleted)
    } else if status.is_wt_renamed() {
        Some(ChangeKind::Renamed)
    } else if status.is_wt_typechange() {
        Some(ChangeKind::TypeChanged)
    } else {
        None
    }
}
