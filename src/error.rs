use thiserror::Error;

use crate::cfg::{BlockId, LocalRef};

macro_rules! invariant_error {
    // Single string version
    ($block:expr, $rendered:expr, $msg:expr) => {
        crate::Error::Invariant {
            block: $block,
            message: $msg.to_string(),
            rendered: $rendered,
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($block:expr, $rendered:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::Invariant {
            block: $block,
            message: format!($fmt, $($arg)*),
            rendered: $rendered,
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// None of these conditions are recoverable in the sense of user-facing diagnostics: they
/// signal a defect in the builder that produced a graph, or in a pass that rewrote it.
/// Callers that want the historical "abort on violation" behaviour use
/// [`crate::cfg::Cfg::enforce_sanity`], which panics with the same information.
///
/// # Error Categories
///
/// ## Structural invariants
/// - [`Error::Invariant`] - Exit/back-edge bookkeeping is inconsistent for a block
/// - [`Error::ExitUnset`] - A block was never given a jump or branch
///
/// ## Dangling references
/// - [`Error::UnknownBlock`] - A block id that the graph never allocated
/// - [`Error::UnknownVariable`] - An operand or destination outside the local table
///
/// ## Misuse
/// - [`Error::GraphError`] - A construction primitive was called on an invalid shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A structural invariant of the graph does not hold.
    ///
    /// # Fields
    ///
    /// * `block` - The offending block
    /// * `message` - Which invariant failed
    /// * `rendered` - The textual dump of the offending block
    /// * `file` - Source file where the violation was detected
    /// * `line` - Source line where the violation was detected
    #[error("Invariant violated in {block} - {file}:{line}: {message}\n{rendered}")]
    Invariant {
        /// The block whose exit or back-edges are inconsistent
        block: BlockId,
        /// The message to be printed for the violation
        message: String,
        /// The rendered contents of the block
        rendered: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The exit of a block has never been set.
    #[error("Block exit condition left unset for {block}\n{rendered}")]
    ExitUnset {
        /// The unwired block
        block: BlockId,
        /// The rendered contents of the block
        rendered: String,
    },

    /// A block id that was never allocated by this graph.
    #[error("Unknown basic block {0}")]
    UnknownBlock(BlockId),

    /// A variable id that is not part of the local table of this graph.
    #[error("{block} references unknown variable {variable:?}\n{rendered}")]
    UnknownVariable {
        /// The block containing the reference
        block: BlockId,
        /// The dangling variable
        variable: LocalRef,
        /// The rendered contents of the block
        rendered: String,
    },

    /// Misuse of a graph construction primitive.
    #[error("{0}")]
    GraphError(String),
}
