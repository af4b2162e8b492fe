//! Call and control-flow graphs.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::module::{Function, Module};

/// Static call graph of a module.
///
/// Nodes are function names; an edge `a -> b` means some instruction in `a`
/// calls `b`. Callees without a matching function still get a node.
pub struct CallGraph {
    graph: DiGraph<String, ()>,
    nodes: FxHashMap<String, NodeIndex>,
}

impl CallGraph {
    pub(crate) fn build(module: &Module) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = FxHashMap::default();

        let mut node = |graph: &mut DiGraph<String, ()>, name: &str| -> NodeIndex {
            *nodes
                .entry(name.to_string())
                .or_insert_with(|| graph.add_node(name.to_string()))
        };

        for function in &module.functions {
            node(&mut graph, &function.name);
        }
        for function in &module.functions {
            let caller = node(&mut graph, &function.name);
            for callee in function.instructions().filter_map(|i| i.callee()) {
                let target = node(&mut graph, callee);
                if !graph.contains_edge(caller, target) {
                    graph.add_edge(caller, target, ());
                }
            }
        }

        Self { graph, nodes }
    }

    /// Functions reachable from `root`, including `root` itself, in DFS order.
    pub fn reachable_from(&self, root: &str) -> Vec<&str> {
        let Some(&start) = self.nodes.get(root) else {
            return vec![];
        };
        let mut dfs = Dfs::new(&self.graph, start);
        let mut out = vec![];
        while let Some(n) = dfs.next(&self.graph) {
            out.push(self.graph[n].as_str());
        }
        out
    }

    /// Direct callees of `name`.
    pub fn callees(&self, name: &str) -> Vec<&str> {
        let Some(&n) = self.nodes.get(name) else {
            return vec![];
        };
        let mut callees: Vec<_> = self
            .graph
            .neighbors(n)
            .map(|c| self.graph[c].as_str())
            .collect();
        callees.sort_unstable();
        callees
    }

    /// Check whether any function can reach itself.
    pub fn is_recursive(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }
}

/// Control-flow graph over a function's basic blocks.
pub struct ControlFlowGraph {
    graph: DiGraph<usize, ()>,
    labels: Vec<String>,
}

impl ControlFlowGraph {
    pub(crate) fn build(function: &Function) -> Self {
        let mut graph = DiGraph::new();
        let index: FxHashMap<&str, NodeIndex> = function
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (b.label.as_str(), graph.add_node(i)))
            .collect();

        for block in &function.blocks {
            let from = index[block.label.as_str()];
            if let Some(term) = block.terminator() {
                for target in term.successors() {
                    if let Some(&to) = index.get(target) {
                        graph.add_edge(from, to, ());
                    }
                }
            }
        }

        Self {
            graph,
            labels: function.blocks.iter().map(|b| b.label.clone()).collect(),
        }
    }

    /// Labels of blocks reachable from the first block.
    pub fn reachable(&self) -> FxHashSet<&str> {
        let mut seen = FxHashSet::default();
        if self.graph.node_count() == 0 {
            return seen;
        }
        let mut dfs = Dfs::new(&self.graph, NodeIndex::new(0));
        while let Some(n) = dfs.next(&self.graph) {
            seen.insert(self.labels[self.graph[n]].as_str());
        }
        seen
    }

    /// Labels of blocks no path from the first block reaches, in block order.
    pub fn unreachable(&self) -> Vec<&str> {
        let reachable = self.reachable();
        self.labels
            .iter()
            .map(String::as_str)
            .filter(|l| !reachable.contains(l))
            .collect()
    }

    /// Check whether the function contains a loop.
    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Instruction;
    use crate::module::BasicBlock;
    use crate::types::Type;
    use crate::value::Value;

    fn block(label: &str, term: Instruction) -> BasicBlock {
        BasicBlock {
            label: label.into(),
            instructions: vec![term],
        }
    }

    fn function(name: &str, blocks: Vec<BasicBlock>) -> Function {
        Function {
            name: name.into(),
            ret: Type::Void,
            params: vec![],
            blocks,
            attributes: vec![],
        }
    }

    #[test]
    fn test_cfg_reachability() {
        let f = function(
            "main",
            vec![
                block(
                    "entry",
                    Instruction::CondBr {
                        condition: Value::local("c"),
                        then_target: "then".into(),
                        else_target: "exit".into(),
                    },
                ),
                block("then", Instruction::Br { target: "exit".into() }),
                block("dead", Instruction::Br { target: "exit".into() }),
                block("exit", Instruction::Ret { value: None }),
            ],
        );
        let cfg = f.control_flow_graph();
        assert_eq!(cfg.unreachable(), vec!["dead"]);
        assert!(!cfg.has_cycle());
    }

    #[test]
    fn test_call_graph() {
        let mut module = Module::new("m");
        let call = |callee: &str| Instruction::Call {
            result: None,
            ret: Type::Void,
            callee: callee.into(),
            args: vec![],
        };
        module.functions.push(function(
            "main",
            vec![BasicBlock {
                label: "entry".into(),
                instructions: vec![call("helper"), Instruction::Ret { value: None }],
            }],
        ));
        module.functions.push(function(
            "helper",
            vec![BasicBlock {
                label: "entry".into(),
                instructions: vec![
                    call("__quantum__qis__h__body"),
                    Instruction::Ret { value: None },
                ],
            }],
        ));
        module.functions.push(function("orphan", vec![]));

        let graph = module.call_graph();
        let reachable = graph.reachable_from("main");
        assert!(reachable.contains(&"helper"));
        assert!(reachable.contains(&"__quantum__qis__h__body"));
        assert!(!reachable.contains(&"orphan"));
        assert_eq!(graph.callees("main"), vec!["helper"]);
        assert!(!graph.is_recursive());
    }
}
