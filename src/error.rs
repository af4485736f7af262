use std::path::PathBuf;

use crate::typegen::CompileError;

/// Fatal conditions of a generation run. The annotation core never produces
/// these; they all come from the IO, environment and compiler edges.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing required environment variable `{var}`")]
    MissingEnv { var: String },

    #[error("schema for `{collection}` has no `title`; it names the generated file")]
    MissingTitle { collection: String },

    #[error("failed to compile schema for `{collection}`")]
    Compile {
        collection: String,
        #[source]
        source: CompileError,
    },

    #[error("schema title `{title}` is not a plain file name")]
    UnsafeTitle { title: String },

    #[error("mongodb: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON source file ({path}): {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("glob pattern matched no files: {pattern}")]
    NoGlobMatch { pattern: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
