//! Negotiation order of the top-level statements of one unit.
//!
//! Every statement is a node with an edge to each statement declaring one of
//! its free names. Mutually dependent statements form a strongly connected
//! component and are negotiated together; components are ordered so that
//! dependencies come first.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use have_ast::TopLevelStmt;
use rustc_hash::FxHashMap;

/// Position of a statement within its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StmtId(pub u32);

/// A directed graph of top-level statements and the names they share.
#[derive(Debug, Default)]
pub struct StmtGraph {
    /// Dependencies of each statement, indexed by `StmtId.0`.
    deps: Vec<Vec<StmtId>>,
    /// Maps declared names to the statement that declares them.
    name_to_id: FxHashMap<String, StmtId>,
}

impl StmtGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph of `stmts`, with an edge for every dependency that names a
    /// statement of the same unit. Universe and imported names have no node.
    pub fn build(stmts: &[TopLevelStmt]) -> Self {
        let mut graph = StmtGraph::new();
        for top in stmts {
            graph.add_stmt(top.decls());
        }
        for (i, top) in stmts.iter().enumerate() {
            let from = StmtId(i as u32);
            for name in top.deps() {
                if let Some(to) = graph.resolve(name) {
                    graph.add_dependency(from, to);
                }
            }
        }
        graph
    }

    /// Add a statement declaring `decls`. A name declared twice keeps its
    /// first declaration; the redeclaration is reported by predeclaration.
    pub fn add_stmt(&mut self, decls: &[String]) -> StmtId {
        let id = StmtId(self.deps.len() as u32);
        for name in decls {
            self.name_to_id.entry(name.clone()).or_insert(id);
        }
        self.deps.push(Vec::new());
        id
    }

    pub fn resolve(&self, name: &str) -> Option<StmtId> {
        self.name_to_id.get(name).copied()
    }

    /// Record that `from` refers to a name `to` declares.
    /// Duplicate and self-dependencies are ignored.
    pub fn add_dependency(&mut self, from: StmtId, to: StmtId) {
        if from == to {
            return;
        }
        let deps = &mut self.deps[from.0 as usize];
        if !deps.contains(&to) {
            deps.push(to);
        }
    }

    pub fn stmt_count(&self) -> usize {
        self.deps.len()
    }

    pub fn dependencies(&self, id: StmtId) -> &[StmtId] {
        &self.deps[id.0 as usize]
    }

    /// Strongly connected components (Tarjan), each sorted by position.
    /// A component is emitted only after every component it depends on.
    pub fn components(&self) -> Vec<Vec<StmtId>> {
        let n = self.deps.len();
        let mut tarjan = Tarjan {
            graph: self,
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            next: 0,
            components: Vec::new(),
        };
        for i in 0..n {
            if tarjan.index[i].is_none() {
                tarjan.visit(StmtId(i as u32));
            }
        }
        tarjan.components
    }

    /// Components in negotiation order: dependencies first, and among
    /// components that are ready at the same time, the one whose first
    /// statement comes earliest in the source.
    pub fn negotiation_order(&self) -> Vec<Vec<StmtId>> {
        let components = self.components();
        let mut component_of = vec![0usize; self.deps.len()];
        for (c, members) in components.iter().enumerate() {
            for id in members {
                component_of[id.0 as usize] = c;
            }
        }

        // pending[c] = number of distinct components `c` still waits for.
        let mut pending = vec![0u32; components.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); components.len()];
        for (c, members) in components.iter().enumerate() {
            let mut seen: Vec<usize> = members
                .iter()
                .flat_map(|id| self.dependencies(*id))
                .map(|dep| component_of[dep.0 as usize])
                .filter(|&d| d != c)
                .collect();
            seen.sort_unstable();
            seen.dedup();
            pending[c] = seen.len() as u32;
            for d in seen {
                dependents[d].push(c);
            }
        }

        // Components are never empty and are sorted, so `members[0]` is the
        // earliest statement.
        let mut ready: BinaryHeap<Reverse<(StmtId, usize)>> = components
            .iter()
            .enumerate()
            .filter(|(c, _)| pending[*c] == 0)
            .map(|(c, members)| Reverse((members[0], c)))
            .collect();

        let mut order = Vec::with_capacity(components.len());
        while let Some(Reverse((_, c))) = ready.pop() {
            for &dependent in &dependents[c] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.push(Reverse((components[dependent][0], dependent)));
                }
            }
            order.push(c);
        }

        let mut components: Vec<Option<Vec<StmtId>>> = components.into_iter().map(Some).collect();
        order
            .into_iter()
            .filter_map(|c| components[c].take())
            .collect()
    }
}

struct Tarjan<'g> {
    graph: &'g StmtGraph,
    index: Vec<Option<u32>>,
    lowlink: Vec<u32>,
    on_stack: Vec<bool>,
    stack: Vec<StmtId>,
    next: u32,
    components: Vec<Vec<StmtId>>,
}

impl Tarjan<'_> {
    fn visit(&mut self, v: StmtId) {
        let vi = v.0 as usize;
        self.index[vi] = Some(self.next);
        self.lowlink[vi] = self.next;
        self.next += 1;
        self.stack.push(v);
        self.on_stack[vi] = true;

        let graph = self.graph;
        for &w in graph.dependencies(v) {
            let wi = w.0 as usize;
            match self.index[wi] {
                None => {
                    self.visit(w);
                    self.lowlink[vi] = self.lowlink[vi].min(self.lowlink[wi]);
                }
                Some(index) if self.on_stack[wi] => {
                    self.lowlink[vi] = self.lowlink[vi].min(index);
                }
                Some(_) => {}
            }
        }

        if self.index[vi] == Some(self.lowlink[vi]) {
            let mut component = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack[w.0 as usize] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            component.sort_unstable();
            self.components.push(component);
        }
    }
}
