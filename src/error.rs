//! Crate-level error types.

use std::fmt;

/// Errors produced by the swirl crate.
#[derive(Debug)]
pub enum SwirlError {
    /// A shader source name resolved to no existing file.
    ShaderNotFound(String),
    /// The platform compiler rejected a shader source.
    ShaderCompile {
        /// Human-readable stage name ("vertex", "compute", ...).
        stage: &'static str,
        /// Driver diagnostic log.
        log: String,
    },
    /// The linker rejected an otherwise-compiled set of stages.
    ProgramLink {
        /// Driver diagnostic log.
        log: String,
    },
    /// A numeric storage-buffer slot outside the slot table.
    SlotOutOfRange {
        /// The rejected index.
        index: usize,
    },
    /// The platform refused to allocate a GPU object (out of resources).
    ResourceAllocation(&'static str),
    /// Generic I/O failure (shader files, parameter presets).
    Io(std::io::Error),
    /// TOML parameter parsing/serialization failure.
    ParamsParse(String),
}

impl fmt::Display for SwirlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShaderNotFound(name) => {
                write!(f, "no shader source found for '{name}'")
            }
            Self::ShaderCompile { stage, log } => {
                write!(f, "failed to compile {stage} shader: {log}")
            }
            Self::ProgramLink { log } => {
                write!(f, "failed to link shader program: {log}")
            }
            Self::SlotOutOfRange { index } => {
                write!(f, "storage buffer slot {index} is out of range")
            }
            Self::ResourceAllocation(kind) => {
                write!(f, "failed to allocate GPU {kind}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ParamsParse(msg) => {
                write!(f, "parameter parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for SwirlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SwirlError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
