//! Bindings: one assignment of an instruction's result to a local.

use std::fmt;

use crate::cfg::{Cfg, Instruction, LocalRef};

/// A byte range in the source file a binding was lowered from.
///
/// The file itself is tracked by the caller; the graph only carries offsets for
/// diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Loc {
    /// First byte, inclusive.
    pub begin: u32,
    /// Last byte, exclusive.
    pub end: u32,
}

impl Loc {
    /// Creates a location covering `begin..end`.
    #[must_use]
    pub const fn new(begin: u32, end: u32) -> Self {
        Self { begin, end }
    }

    /// A location for synthesized code with no source counterpart.
    #[must_use]
    pub const fn none() -> Self {
        Self { begin: 0, end: 0 }
    }

    /// Returns `true` if this is a synthesized location.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.begin == 0 && self.end == 0
    }
}

impl fmt::Debug for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Loc(none)")
        } else {
            write!(f, "Loc({}..{})", self.begin, self.end)
        }
    }
}

/// `bind = value`, one straight-line step of a basic block.
///
/// The destination is written by the binding; the instruction's operands are read. By the
/// builder's contract every operand was assigned by an earlier binding (in program order)
/// or arrives as a block argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Destination local.
    pub bind: LocalRef,
    /// Where in the source this binding was lowered from.
    pub loc: Loc,
    /// The instruction whose result is stored.
    pub value: Instruction,
}

impl Binding {
    /// Creates a binding.
    #[must_use]
    pub fn new(bind: LocalRef, loc: Loc, value: Instruction) -> Self {
        Self { bind, loc, value }
    }

    /// Renders `bind = value`.
    #[must_use]
    pub fn render(&self, cfg: &Cfg) -> String {
        format!("{} = {}", self.bind.show(cfg), self.value.render(cfg))
    }

    /// Renders the binding as a structured dump.
    #[must_use]
    pub fn show_raw(&self, cfg: &Cfg) -> String {
        format!(
            "Binding {{\n&nbsp;bind = {},\n&nbsp;value = {},\n}}",
            self.bind.show(cfg),
            self.value.show_raw(cfg, 1)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cfg::LocalKind, symbols::MethodRef};

    #[test]
    fn test_loc() {
        assert!(Loc::none().is_none());
        assert!(!Loc::new(3, 9).is_none());
        assert_eq!(format!("{:?}", Loc::new(3, 9)), "Loc(3..9)");
    }

    #[test]
    fn test_binding_render() {
        let mut cfg = Cfg::new(MethodRef::new(0));
        let x = cfg.enter_local("x", LocalKind::Named);
        let y = cfg.enter_local("y", LocalKind::Named);
        let binding = Binding::new(x, Loc::new(1, 2), Instruction::Ident { what: y });

        assert_eq!(binding.render(&cfg), "x = y");
        assert_eq!(
            binding.show_raw(&cfg),
            "Binding {\n&nbsp;bind = x,\n&nbsp;value = Ident {\n&nbsp;&nbsp;what = y,\n&nbsp;},\n}"
        );
    }
}
