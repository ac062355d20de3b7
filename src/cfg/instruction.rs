//! The closed instruction set of the graph.
//!
//! An [`Instruction`] is the right-hand side of a [`crate::cfg::Binding`]. The destination
//! lives on the binding; the instruction only carries its operands. Every variant declares
//! exactly which locals it *reads* through [`Instruction::for_each_read`], and every
//! consumer that needs operands goes through that one exhaustive match, so adding a
//! variant forces every extraction site to handle it.
//!
//! # Read operands
//!
//! | Variant | Reads |
//! |---------|-------|
//! | `Ident` | `what` |
//! | `Send` | `recv`, then each of `args` |
//! | `Return`, `BlockReturn`, `Absurd` | `what` |
//! | `Cast` | `value` |
//! | `LoadSelf` | `fallback` |
//! | `SolveConstraint` | `send` |
//! | `Alias`, `Literal`, `LoadArg`, `LoadYieldParams`, `GetCurrentException` | nothing |

use std::fmt::{self, Write};

use strum::{Display, EnumCount, EnumIter};

use crate::cfg::{Cfg, LocalRef};

/// The kind of a type assertion carried by [`Instruction::Cast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CastKind {
    /// Unchecked cast to the given type.
    #[strum(serialize = "cast")]
    Cast,
    /// Declares the type of a fresh variable.
    #[strum(serialize = "let")]
    Let,
    /// Asserts the value already has the given type.
    #[strum(serialize = "assert_type!")]
    AssertType,
    /// Rebinds the type of `self`.
    #[strum(serialize = "bind")]
    Bind,
}

/// A constant materialized by [`Instruction::Literal`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// `nil`
    Nil,
    /// `true` or `false`
    Bool(bool),
    /// An integer constant.
    Integer(i64),
    /// A string constant.
    String(String),
    /// A symbol constant.
    Symbol(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Symbol(s) => write!(f, ":{s}"),
        }
    }
}

/// Discriminant of an [`Instruction`], used for diagnostics and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum InstructionKind {
    /// [`Instruction::Ident`]
    Ident,
    /// [`Instruction::Alias`]
    Alias,
    /// [`Instruction::Send`]
    Send,
    /// [`Instruction::Return`]
    Return,
    /// [`Instruction::BlockReturn`]
    BlockReturn,
    /// [`Instruction::Cast`]
    Cast,
    /// [`Instruction::LoadSelf`]
    LoadSelf,
    /// [`Instruction::SolveConstraint`]
    SolveConstraint,
    /// [`Instruction::Absurd`]
    Absurd,
    /// [`Instruction::Literal`]
    Literal,
    /// [`Instruction::LoadArg`]
    LoadArg,
    /// [`Instruction::LoadYieldParams`]
    LoadYieldParams,
    /// [`Instruction::GetCurrentException`]
    GetCurrentException,
}

/// One operation, the right-hand side of a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Copies the value of another local.
    Ident {
        /// The local being copied.
        what: LocalRef,
    },

    /// Introduces the destination as an alias of a named constant or global.
    Alias {
        /// Name of the aliased entity.
        what: String,
        /// `true` when the target is a global variable rather than a constant.
        global: bool,
    },

    /// Sends a message (method call) to a receiver.
    Send {
        /// The receiver.
        recv: LocalRef,
        /// The method name.
        fun: String,
        /// Positional arguments, in call order.
        args: Vec<LocalRef>,
        /// Closure id of an attached block, if any.
        closure: Option<u32>,
    },

    /// Returns from the method.
    Return {
        /// The returned value.
        what: LocalRef,
    },

    /// Returns from a block (closure) body back to its caller.
    BlockReturn {
        /// The closure being returned from.
        closure_id: u32,
        /// The returned value.
        what: LocalRef,
    },

    /// A type assertion or cast.
    Cast {
        /// The value being cast.
        value: LocalRef,
        /// The asserted type, as written.
        ty: String,
        /// Which assertion this is.
        kind: CastKind,
    },

    /// Loads `self`, falling back to a local inside closures that rebind it.
    LoadSelf {
        /// The closure this load happens in.
        closure_id: u32,
        /// The local holding the outer receiver.
        fallback: LocalRef,
    },

    /// Solves the generic constraint collected by a previous send.
    SolveConstraint {
        /// The local holding the send result.
        send: LocalRef,
    },

    /// Marks a value that must be uninhabited at this point.
    Absurd {
        /// The value that should be impossible.
        what: LocalRef,
    },

    /// Materializes a constant.
    Literal {
        /// The constant.
        value: Literal,
    },

    /// Loads a method argument.
    LoadArg {
        /// Position of the argument.
        index: u16,
    },

    /// Loads the parameters passed to a block.
    LoadYieldParams {
        /// The closure whose parameters are loaded.
        closure_id: u32,
    },

    /// Loads the exception being handled by the enclosing rescue.
    GetCurrentException,
}

impl Instruction {
    /// Returns the discriminant of this instruction.
    #[must_use]
    pub const fn kind(&self) -> InstructionKind {
        match self {
            Self::Ident { .. } => InstructionKind::Ident,
            Self::Alias { .. } => InstructionKind::Alias,
            Self::Send { .. } => InstructionKind::Send,
            Self::Return { .. } => InstructionKind::Return,
            Self::BlockReturn { .. } => InstructionKind::BlockReturn,
            Self::Cast { .. } => InstructionKind::Cast,
            Self::LoadSelf { .. } => InstructionKind::LoadSelf,
            Self::SolveConstraint { .. } => InstructionKind::SolveConstraint,
            Self::Absurd { .. } => InstructionKind::Absurd,
            Self::Literal { .. } => InstructionKind::Literal,
            Self::LoadArg { .. } => InstructionKind::LoadArg,
            Self::LoadYieldParams { .. } => InstructionKind::LoadYieldParams,
            Self::GetCurrentException => InstructionKind::GetCurrentException,
        }
    }

    /// Returns `true` for the alias-introduction instruction.
    #[must_use]
    pub const fn is_alias(&self) -> bool {
        matches!(self, Self::Alias { .. })
    }

    /// Calls `f` once for every operand this instruction reads, in operand order.
    pub fn for_each_read(&self, mut f: impl FnMut(LocalRef)) {
        match self {
            Self::Ident { what }
            | Self::Return { what }
            | Self::BlockReturn { what, .. }
            | Self::Absurd { what } => f(*what),
            Self::Send { recv, args, .. } => {
                f(*recv);
                for arg in args {
                    f(*arg);
                }
            }
            Self::Cast { value, .. } => f(*value),
            Self::LoadSelf { fallback, .. } => f(*fallback),
            Self::SolveConstraint { send } => f(*send),
            Self::Alias { .. }
            | Self::Literal { .. }
            | Self::LoadArg { .. }
            | Self::LoadYieldParams { .. }
            | Self::GetCurrentException => {}
        }
    }

    /// Returns the operands this instruction reads, in operand order.
    #[must_use]
    pub fn reads(&self) -> Vec<LocalRef> {
        let mut reads = Vec::new();
        self.for_each_read(|var| reads.push(var));
        reads
    }

    /// Renders the instruction the way it appears in block dumps.
    #[must_use]
    pub fn render(&self, cfg: &Cfg) -> String {
        match self {
            Self::Ident { what } => what.show(cfg),
            Self::Alias { what, global } => {
                if *global {
                    format!("alias global {what}")
                } else {
                    format!("alias {what}")
                }
            }
            Self::Send {
                recv,
                fun,
                args,
                closure,
            } => {
                let args = args
                    .iter()
                    .map(|arg| arg.show(cfg))
                    .collect::<Vec<_>>()
                    .join(", ");
                match closure {
                    Some(id) => format!("{}.{fun}({args}) do<{id}>", recv.show(cfg)),
                    None => format!("{}.{fun}({args})", recv.show(cfg)),
                }
            }
            Self::Return { what } => format!("return {}", what.show(cfg)),
            Self::BlockReturn { closure_id, what } => {
                format!("blockreturn<{closure_id}> {}", what.show(cfg))
            }
            Self::Cast { value, ty, kind } => format!("{kind}({}, {ty})", value.show(cfg)),
            Self::LoadSelf { .. } => "loadSelf".to_string(),
            Self::SolveConstraint { send } => format!("Solve<{}>", send.show(cfg)),
            Self::Absurd { what } => format!("T.absurd({})", what.show(cfg)),
            Self::Literal { value } => value.to_string(),
            Self::LoadArg { index } => format!("load_arg({index})"),
            Self::LoadYieldParams { closure_id } => format!("load_yield_params<{closure_id}>"),
            Self::GetCurrentException => "<get-current-exception>".to_string(),
        }
    }

    /// Renders the instruction as a structured, field-by-field dump.
    ///
    /// Nested lines are indented with `&nbsp;` so the output stays readable inside
    /// graphviz labels.
    #[must_use]
    pub fn show_raw(&self, cfg: &Cfg, tabs: usize) -> String {
        let pad = "&nbsp;".repeat(tabs + 1);
        let close = "&nbsp;".repeat(tabs);
        let fields: Vec<(&str, String)> = match self {
            Self::Ident { what } => vec![("what", what.show(cfg))],
            Self::Alias { what, global } => {
                vec![("what", what.clone()), ("global", global.to_string())]
            }
            Self::Send {
                recv,
                fun,
                args,
                closure,
            } => vec![
                ("recv", recv.show(cfg)),
                ("fun", fun.clone()),
                (
                    "args",
                    format!(
                        "[{}]",
                        args.iter()
                            .map(|arg| arg.show(cfg))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                ),
                (
                    "closure",
                    closure.map_or_else(|| "none".to_string(), |id| id.to_string()),
                ),
            ],
            Self::Return { what } | Self::Absurd { what } => vec![("what", what.show(cfg))],
            Self::BlockReturn { closure_id, what } => vec![
                ("closure_id", closure_id.to_string()),
                ("what", what.show(cfg)),
            ],
            Self::Cast { value, ty, kind } => vec![
                ("value", value.show(cfg)),
                ("type", ty.clone()),
                ("kind", kind.to_string()),
            ],
            Self::LoadSelf {
                closure_id,
                fallback,
            } => vec![
                ("closure_id", closure_id.to_string()),
                ("fallback", fallback.show(cfg)),
            ],
            Self::SolveConstraint { send } => vec![("send", send.show(cfg))],
            Self::Literal { value } => vec![("value", value.to_string())],
            Self::LoadArg { index } => vec![("index", index.to_string())],
            Self::LoadYieldParams { closure_id } => {
                vec![("closure_id", closure_id.to_string())]
            }
            Self::GetCurrentException => vec![],
        };

        let mut out = format!("{:?} {{\n", self.kind());
        for (name, value) in fields {
            let _ = writeln!(out, "{pad}{name} = {value},");
        }
        out.push_str(&close);
        out.push('}');
        out
    }
}
