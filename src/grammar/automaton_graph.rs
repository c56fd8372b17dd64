use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use super::{grammar::Symbol, LR0Automaton};

/// Read-only graph view of an LR(0) automaton: states are vertices,
/// transitions are labelled edges.
pub struct AutomatonGraph<'a, 'g> {
    automaton: &'a LR0Automaton<'g>,
}

impl<'a, 'g> AutomatonGraph<'a, 'g> {
    pub fn new(automaton: &'a LR0Automaton<'g>) -> Self {
        Self { automaton }
    }

    fn neighbours(&self, state: usize) -> &'a BTreeMap<Symbol, usize> {
        &self.automaton.state(state).transitions
    }

    fn vertex_count(&self) -> usize {
        self.automaton.states().len()
    }

    pub fn edges(&self) -> impl Iterator<Item = (usize, &'a Symbol, usize)> + '_ {
        self.automaton
            .states()
            .iter()
            .flat_map(|s| s.transitions.iter().map(move |(symbol, &v)| (s.id, symbol, v)))
    }

    /// States holding a complete item.
    pub fn final_states(&self) -> BTreeSet<usize> {
        self.automaton
            .states()
            .iter()
            .filter(|s| s.items.iter().any(|i| self.automaton.is_reduce(i)))
            .map(|s| s.id)
            .collect()
    }

    /// Empty when `from` is not a state.
    pub fn reachable(&self, from: usize) -> BTreeSet<usize> {
        if from >= self.vertex_count() {
            return BTreeSet::new();
        }
        let mut visited = BTreeSet::from([from]);
        let mut q = VecDeque::from([from]);
        while let Some(u) = q.pop_front() {
            for &v in self.neighbours(u).values() {
                if visited.insert(v) {
                    q.push_back(v);
                }
            }
        }
        visited
    }

    pub fn has_cycle(&self, from: usize) -> bool {
        fn dfs(
            graph: &AutomatonGraph<'_, '_>,
            u: usize,
            visited: &mut BTreeSet<usize>,
            on_stack: &mut BTreeSet<usize>,
        ) -> bool {
            visited.insert(u);
            on_stack.insert(u);
            for &v in graph.neighbours(u).values() {
                if on_stack.contains(&v) || (!visited.contains(&v) && dfs(graph, v, visited, on_stack)) {
                    return true;
                }
            }
            on_stack.remove(&u);
            false
        }

        from < self.vertex_count() && dfs(self, from, &mut BTreeSet::new(), &mut BTreeSet::new())
    }

    /// `(unreachable, dead_end)`: states not reachable from state 0, and
    /// reachable states from which no final state can be reached.
    pub fn useless_states(&self) -> (BTreeSet<usize>, BTreeSet<usize>) {
        if self.vertex_count() == 0 {
            return (BTreeSet::new(), BTreeSet::new());
        }
        let reachable = self.reachable(0);
        let unreachable = (0..self.vertex_count())
            .filter(|v| !reachable.contains(v))
            .collect();

        let mut reverse: HashMap<usize, Vec<usize>> = HashMap::new();
        for (u, _, v) in self.edges() {
            reverse.entry(v).or_default().push(u);
        }
        let finals = self.final_states();
        let mut useful = finals.clone();
        let mut q: VecDeque<usize> = finals.into_iter().collect();
        while let Some(v) = q.pop_front() {
            for &u in reverse.get(&v).into_iter().flatten() {
                if useful.insert(u) {
                    q.push_back(u);
                }
            }
        }

        let dead_end = reachable.difference(&useful).copied().collect();
        (unreachable, dead_end)
    }

    /// Breadth-first path as `(state, symbol taken)` steps.
    pub fn shortest_path(&self, from: usize, to: usize) -> Option<Vec<(usize, Symbol)>> {
        if from >= self.vertex_count() || to >= self.vertex_count() {
            return None;
        }
        let mut previous: HashMap<usize, (usize, &Symbol)> = HashMap::new();
        let mut visited = BTreeSet::from([from]);
        let mut q = VecDeque::from([from]);
        while let Some(u) = q.pop_front() {
            if u == to {
                let mut path = Vec::new();
                let mut current = to;
                while let Some(&(p, symbol)) = previous.get(&current) {
                    path.push((p, symbol.clone()));
                    current = p;
                }
                path.reverse();
                return Some(path);
            }
            for (symbol, &v) in self.neighbours(u) {
                if visited.insert(v) {
                    previous.insert(v, (u, symbol));
                    q.push_back(v);
                }
            }
        }
        None
    }

    pub fn in_degree(&self) -> Vec<usize> {
        let mut degree = vec![0; self.vertex_count()];
        for (_, _, v) in self.edges() {
            degree[v] += 1;
        }
        degree
    }

    pub fn out_degree(&self) -> Vec<usize> {
        (0..self.vertex_count())
            .map(|u| self.neighbours(u).len())
            .collect()
    }

    /// Transitions are keyed by symbol, so this holds unless the automaton
    /// was built with an ε edge.
    pub fn is_deterministic(&self) -> bool {
        self.edges().all(|(_, symbol, _)| *symbol != Symbol::Epsilon)
    }

    /// Tarjan's algorithm; components come out in reverse topological order.
    pub fn strongly_connected_components(&self) -> Vec<Vec<usize>> {
        struct Tarjan {
            counter: usize,
            index: Vec<Option<usize>>,
            low_link: Vec<usize>,
            on_stack: Vec<bool>,
            stack: Vec<usize>,
            components: Vec<Vec<usize>>,
        }

        fn visit(graph: &AutomatonGraph<'_, '_>, t: &mut Tarjan, v: usize) {
            t.index[v] = Some(t.counter);
            t.low_link[v] = t.counter;
            t.counter += 1;
            t.stack.push(v);
            t.on_stack[v] = true;

            for &w in graph.neighbours(v).values() {
                match t.index[w] {
                    None => {
                        visit(graph, t, w);
                        t.low_link[v] = t.low_link[v].min(t.low_link[w]);
                    }
                    Some(idx) if t.on_stack[w] => {
                        t.low_link[v] = t.low_link[v].min(idx);
                    }
                    Some(_) => {}
                }
            }

            if Some(t.low_link[v]) == t.index[v] {
                let mut component = Vec::new();
                while let Some(w) = t.stack.pop() {
                    t.on_stack[w] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                t.components.push(component);
            }
        }

        let n = self.vertex_count();
        let mut t = Tarjan {
            counter: 0,
            index: vec![None; n],
            low_link: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            components: Vec::new(),
        };
        for v in 0..n {
            if t.index[v].is_none() {
                visit(self, &mut t, v);
            }
        }
        t.components
    }
}
