//! Rich diagnostic error types for knowgen.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! so the navigator can tell a recoverable command failure from one that must
//! end the session, and the CLI can print codes and help text.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::llm::LlmError;

/// Top-level error type for knowgen.
#[derive(Debug, Error, Diagnostic)]
pub enum KnowgenError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Navigator(#[from] NavigatorError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(knowgen::store::io),
        help(
            "A filesystem operation failed. Check that the data directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("redb transaction error: {message}")]
    #[diagnostic(
        code(knowgen::store::redb),
        help(
            "The embedded database encountered a transaction error. \
             Nothing from the failed write was committed. If the problem persists, \
             move the database file aside and start with a fresh data directory."
        )
    )]
    Redb { message: String },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(knowgen::store::serde),
        help(
            "Failed to serialize or deserialize a stored row. \
             This usually means the database was written by an incompatible version."
        )
    )]
    Serialization { message: String },

    #[error("dangling row reference: {table} has no row {id}")]
    #[diagnostic(
        code(knowgen::store::dangling),
        help("An index points at a row that does not exist. The database file may be damaged.")
    )]
    Dangling { table: String, id: u64 },
}

impl StoreError {
    /// Adapter for `map_err` on any redb error, tagging it with the failed operation.
    pub(crate) fn redb<E: std::fmt::Display>(op: &'static str) -> impl FnOnce(E) -> StoreError {
        move |e| StoreError::Redb {
            message: format!("{op} failed: {e}"),
        }
    }

    pub(crate) fn encode(e: bincode::Error) -> StoreError {
        StoreError::Serialization {
            message: format!("failed to encode row: {e}"),
        }
    }

    pub(crate) fn decode(e: bincode::Error) -> StoreError {
        StoreError::Serialization {
            message: format!("failed to decode row: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("duplicate predicate pair: (\"{predicate}\", \"{inverse}\")")]
    #[diagnostic(
        code(knowgen::graph::duplicate_registration),
        help(
            "This predicate is already registered with the same inverse. \
             Look the inverse up instead of registering the pair again."
        )
    )]
    DuplicateRegistration { predicate: String, inverse: String },

    #[error("\"{term}\" already has the inverse \"{existing}\", cannot pair it with \"{requested}\"")]
    #[diagnostic(
        code(knowgen::graph::conflicting_inverse),
        help(
            "A predicate has exactly one inverse. Use the registered inverse, \
             or pick a predicate name that is not registered yet."
        )
    )]
    ConflictingInverse {
        term: String,
        existing: String,
        requested: String,
    },

    #[error("failed to write graph output: {source}")]
    #[diagnostic(
        code(knowgen::graph::output),
        help("Check that the output path is writable and its parent directory exists.")
    )]
    Output {
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Navigator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum NavigatorError {
    #[error("no term is numbered {reference} in this session")]
    #[diagnostic(
        code(knowgen::navigator::unresolved_reference),
        help(
            "Numbers are handed out as terms are displayed and reset on every run. \
             Use a number shown on screen, or type the term itself."
        )
    )]
    UnresolvedReference { reference: String },

    #[error("terminal I/O failed: {source}")]
    #[diagnostic(
        code(knowgen::navigator::terminal),
        help("Reading from or writing to the terminal failed. The session cannot continue.")
    )]
    Terminal {
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Llm(#[from] LlmError),
}

impl NavigatorError {
    /// Whether the session can continue after showing this error to the user.
    ///
    /// Only storage and terminal failures end a session.
    pub fn is_recoverable(&self) -> bool {
        match self {
            NavigatorError::UnresolvedReference { .. } | NavigatorError::Llm(_) => true,
            NavigatorError::Graph(
                GraphError::DuplicateRegistration { .. } | GraphError::ConflictingInverse { .. },
            ) => true,
            NavigatorError::Graph(GraphError::Store(_) | GraphError::Output { .. })
            | NavigatorError::Store(_)
            | NavigatorError::Terminal { .. } => false,
        }
    }
}

/// Convenience alias for functions returning knowgen results.
pub type KnowgenResult<T> = std::result::Result<T, KnowgenError>;
