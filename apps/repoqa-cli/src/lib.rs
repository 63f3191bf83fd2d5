//! Front end for the repoqa engine: loads a directory into documents for
//! the `repoqa` binary.
pub mod loader;

pub use loader::{load_directory, LoadedCorpus, LoaderConfig};
