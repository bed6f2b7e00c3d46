pub mod paths;
pub mod types;

pub use paths::{classify, is_wsl_path, parse_wsl_path, PathKind, WslPathParts};
pub use types::{
    Branch, Change, ChangeKind, Commit, RepositorySettings, Stash, Submodule, Tag, ToolInfo,
    Worktree,
};
