//! Object database and reference store for a from-scratch, local-only Git
//! repository backend: packfile + pack-index decoding, loose object
//! storage, an LRU object cache, and a symbolic reference graph, all over
//! a filesystem layout bit-compatible with canonical Git.

pub mod config;
pub mod error;
pub mod hash;
pub mod init;
pub mod layout;
pub mod object;
pub mod odb;
pub mod refs;

use std::thread;

use tracing::debug;

pub use config::Config;
pub use error::GitError;
pub use hash::Oid;
pub use layout::RepoLayout;
pub use object::{Object, ObjectType};
pub use odb::Odb;
pub use refs::{RefStore, RefTarget, Reference};

/// A repository handle: the object database, the reference store, and the
/// loaded configuration, bound together by a shared [`RepoLayout`].
pub struct Repository {
    pub layout: RepoLayout,
    pub config: Config,
    pub odb: Odb,
    pub refs: RefStore,
}

impl Repository {
    /// Open an existing repository, running the four loaders — refs,
    /// loose objects (via [`Odb::open`]'s pack scan plus the lazily-walked
    /// loose set), packs, and configuration — in parallel. Any loader
    /// failing aborts construction; the backend is never left
    /// half-initialized.
    pub fn open(layout: RepoLayout) -> Result<Self, GitError> {
        if !layout.exists() {
            return Err(GitError::RepositoryNotExist(layout.git_dir.clone()));
        }

        let config_path = layout.config();
        let odb_object_dir = layout.object_dir.clone();
        let refs_git_dir = layout.git_dir.clone();

        let (config, odb, refs) = thread::scope(|scope| {
            let config_handle = scope.spawn(|| Config::load(&config_path));
            let odb_handle = scope.spawn(|| Odb::open(odb_object_dir));
            let refs_handle = scope.spawn(|| RefStore::open(refs_git_dir).map_err(GitError::from));

            let config = config_handle.join().expect("config loader panicked")?;
            let odb = odb_handle.join().expect("odb loader panicked")?;
            let refs = refs_handle.join().expect("refs loader panicked")?;
            Ok::<_, GitError>((config, odb, refs))
        })?;

        debug!(git_dir = %layout.git_dir.display(), "repository opened");

        Ok(Repository {
            layout,
            config,
            odb,
            refs,
        })
    }

    /// Initialize a fresh repository at `layout` and open it.
    pub fn init(layout: RepoLayout, initial_branch: &str) -> Result<Self, GitError> {
        if layout.exists() && layout.head().is_file() {
            return Err(GitError::RepositoryExists(layout.git_dir.clone()));
        }
        init::init(&layout, initial_branch)?;
        Repository::open(layout)
    }
}
