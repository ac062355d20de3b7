//! Local variables of a method body.
//!
//! Every value in the graph lives in a local slot identified by a [`LocalRef`]. Ids are
//! dense per method and index the bit-vectors of the dataflow pass directly. Two ids are
//! reserved in every graph:
//!
//! - `0` is [`LocalRef::NONE`], the "no variable" sentinel used as the condition of
//!   unconditional exits
//! - `1` is [`LocalRef::SELF`], the receiver of the method
//!
//! The display name and [`LocalKind`] of each id are kept in the graph's local table
//! ([`LocalInfo`]).

use std::fmt;

use crate::cfg::Cfg;

/// Index of a local variable within one [`Cfg`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalRef(u32);

impl LocalRef {
    /// The "no variable" sentinel.
    pub const NONE: LocalRef = LocalRef(0);

    /// The implicit receiver of the method.
    pub const SELF: LocalRef = LocalRef(1);

    /// Creates a reference from a raw id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the id as a bit-vector offset.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `false` for the [`LocalRef::NONE`] sentinel.
    #[must_use]
    pub const fn exists(self) -> bool {
        self.0 != Self::NONE.0
    }

    /// Returns `true` if this local stands in for a global variable.
    ///
    /// Writes to such aliases are treated as reads by the dataflow pass unless they are
    /// the alias introduction itself.
    #[must_use]
    pub fn is_alias_for_global(self, cfg: &Cfg) -> bool {
        cfg.local(self)
            .is_some_and(|info| info.kind() == LocalKind::GlobalAlias)
    }

    /// Returns the display name of this local in `cfg`.
    #[must_use]
    pub fn show(self, cfg: &Cfg) -> String {
        match cfg.local(self) {
            Some(info) if info.kind() == LocalKind::Temporary => {
                format!("<{}${}>", info.name(), self.0)
            }
            Some(info) => info.name().to_string(),
            None => format!("<unknown${}>", self.0),
        }
    }
}

impl fmt::Debug for LocalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exists() {
            write!(f, "l{}", self.0)
        } else {
            write!(f, "<none>")
        }
    }
}

/// What a local slot represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalKind {
    /// A variable that appears in the source program.
    Named,
    /// A compiler-introduced temporary.
    Temporary,
    /// The method receiver.
    SelfRef,
    /// A local standing in for a global, instance or class variable.
    GlobalAlias,
    /// Reserved slot (the "no variable" sentinel).
    Reserved,
}

/// Entry of a graph's local table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalInfo {
    name: String,
    kind: LocalKind,
}

impl LocalInfo {
    /// Creates a table entry.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: LocalKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the kind of slot.
    #[must_use]
    pub const fn kind(&self) -> LocalKind {
        self.kind
    }
}
