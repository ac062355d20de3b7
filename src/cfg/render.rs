//! Graphviz export of a method's control flow graph.
//!
//! Each graph is written as a `subgraph "cluster_<method>"` so that the graphs of many
//! methods can be concatenated into one `digraph`. Nodes are named `bb<method>_<id>`, the
//! entry is drawn as an inverted house and the dead block as a parallelogram. The `then`
//! edge is bold; a distinct `else` edge is tapered.

use std::fmt::Write;

use crate::{
    cfg::{BasicBlock, Cfg},
    symbols::SymbolTable,
    utils::escape_label,
};

impl Cfg {
    /// Renders the graph as a graphviz cluster, labelling every block with its
    /// [`BasicBlock::render`] dump.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flowgraph::prelude::*;
    ///
    /// let names = MethodNames::new();
    /// names.insert(MethodRef::new(4), "Foo#bar");
    ///
    /// let mut cfg = Cfg::new(MethodRef::new(4));
    /// cfg.jump_to_dead(cfg.entry(), Loc::none())?;
    ///
    /// let dot = cfg.to_dot(&names);
    /// assert!(dot.starts_with("subgraph \"cluster_Foo#bar\" {\n"));
    /// assert!(dot.contains("\"bbFoo#bar_0\" -> \"bbFoo#bar_1\" [style=\"bold\"];"));
    /// # Ok::<(), flowgraph::Error>(())
    /// ```
    #[must_use]
    pub fn to_dot(&self, symbols: &dyn SymbolTable) -> String {
        self.write_cluster(symbols, "invhouse", |bb| bb.render(self))
    }

    /// Renders the graph like [`Cfg::to_dot`] but labels blocks with the structured
    /// [`BasicBlock::show_raw`] dump and draws the entry as a box.
    #[must_use]
    pub fn show_raw_dot(&self, symbols: &dyn SymbolTable) -> String {
        self.write_cluster(symbols, "box", |bb| bb.show_raw(self))
    }

    fn write_cluster(
        &self,
        symbols: &dyn SymbolTable,
        entry_shape: &str,
        dump: impl Fn(&BasicBlock) -> String,
    ) -> String {
        let name = symbols.show_full_name(self.symbol());
        let mut dot = String::new();

        let _ = writeln!(dot, "subgraph \"cluster_{name}\" {{");
        let _ = writeln!(dot, "    label = \"{name}\";");
        dot.push_str("    color = blue;\n");
        let _ = writeln!(dot, "    \"bb{name}_{}\" [shape = {entry_shape}];", Self::ENTRY.id());
        let _ = writeln!(dot, "    \"bb{name}_{}\" [shape = parallelogram];\n", Self::DEAD.id());

        for bb in self.blocks() {
            let id = bb.id().id();
            let _ = write!(
                dot,
                "    \"bb{name}_{id}\" [\n        label = \"{}\"\n    ];\n\n",
                escape_label(&dump(bb))
            );

            // Unwired blocks get a node but no edges
            let Some(exit) = &bb.exit else {
                continue;
            };
            let _ = writeln!(
                dot,
                "    \"bb{name}_{id}\" -> \"bb{name}_{}\" [style=\"bold\"];",
                exit.then_block.id()
            );
            if exit.else_block != exit.then_block {
                let _ = writeln!(
                    dot,
                    "    \"bb{name}_{id}\" -> \"bb{name}_{}\" [style=\"tapered\"];\n",
                    exit.else_block.id()
                );
            }
        }

        dot.push('}');
        dot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        symbols::{MethodNames, MethodRef},
        test::CfgFactory,
    };

    fn names() -> MethodNames {
        let names = MethodNames::new();
        names.insert(MethodRef::new(1), "A#m");
        names
    }

    #[test]
    fn test_to_dot_layout() {
        let mut f = CfgFactory::new();
        let c = f.local("c");
        let x = f.local("x");
        let then_block = f.block();
        let entry = f.cfg.entry();
        f.copy(entry, x, c)
            .branch(entry, c, then_block, Cfg::DEAD)
            .jump(then_block, Cfg::DEAD);

        let dot = f.cfg.to_dot(&names());
        let expected = concat!(
            "subgraph \"cluster_A#m\" {\n",
            "    label = \"A#m\";\n",
            "    color = blue;\n",
            "    \"bbA#m_0\" [shape = invhouse];\n",
            "    \"bbA#m_1\" [shape = parallelogram];\n\n",
            "    \"bbA#m_0\" [\n",
            "        label = \"block[id=0, closureId=0]()\\lx = c\\lc\\l\"\n",
            "    ];\n\n",
            "    \"bbA#m_0\" -> \"bbA#m_2\" [style=\"bold\"];\n",
            "    \"bbA#m_0\" -> \"bbA#m_1\" [style=\"tapered\"];\n\n",
            "    \"bbA#m_1\" [\n",
            "        label = \"block[id=1, closureId=0]()\\l<unconditional>\\l\"\n",
            "    ];\n\n",
            "    \"bbA#m_1\" -> \"bbA#m_1\" [style=\"bold\"];\n",
            "    \"bbA#m_2\" [\n",
            "        label = \"block[id=2, closureId=0]()\\l<unconditional>\\l\"\n",
            "    ];\n\n",
            "    \"bbA#m_2\" -> \"bbA#m_1\" [style=\"bold\"];\n",
            "}",
        );
        assert_eq!(dot, expected);
    }

    #[test]
    fn test_edge_counts() {
        let mut f = CfgFactory::new();
        let c = f.local("c");
        let head = f.block();
        let left = f.block();
        let right = f.block();
        let entry = f.cfg.entry();
        f.jump(entry, head)
            .branch(head, c, left, right)
            .jump(left, Cfg::DEAD)
            .jump(right, Cfg::DEAD);

        let dot = f.cfg.to_dot(&names());
        assert_eq!(dot.matches("label = \"block[").count(), f.cfg.block_count());
        assert_eq!(dot.matches("[style=\"bold\"]").count(), f.cfg.block_count());
        assert_eq!(dot.matches("[style=\"tapered\"]").count(), 1);
    }

    #[test]
    fn test_unset_exit_has_no_edges() {
        let f = CfgFactory::new();
        let dot = f.cfg.to_dot(&names());
        // only the dead block's self-loop
        assert_eq!(dot.matches(" -> ").count(), 1);
    }

    #[test]
    fn test_show_raw_dot() {
        let mut f = CfgFactory::new();
        let x = f.local("x");
        let y = f.local("y");
        let body = f.straight_line();
        f.copy(body, x, y);

        let dot = f.cfg.show_raw_dot(&names());
        assert!(dot.contains("\"bbA#m_0\" [shape = box];"));
        assert!(dot.contains("block[id=2]()\\lBinding {\\l&nbsp;bind = x,\\l"));
        assert!(!dot.contains("invhouse"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let mut f = CfgFactory::new();
        let x = f.local("x");
        let body = f.straight_line();
        f.bind(
            body,
            x,
            crate::cfg::Instruction::Literal {
                value: crate::cfg::Literal::String("say \"hi\"".to_string()),
            },
        );

        let dot = f.cfg.to_dot(&names());
        assert!(dot.contains(r#"x = \"say \\\"hi\\\"\""#), "{dot}");
    }
}
