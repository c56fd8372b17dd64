use std::collections::HashMap;

use log::{debug, trace, warn};
use serde::Serialize;

use super::{
    grammar::{ProductionId, Symbol},
    ll1::to_symbols,
    lr0::{LR0Automaton, Rule},
    parse_tree::{NodeId, ParseTree},
    FirstFollow, Grammar,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    Shift(usize),
    Reduce(ProductionId),
    Accept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SLRConflict {
    pub state: usize,
    pub terminal: Symbol,
    pub existing: Action,
    pub rejected: Action,
}

impl SLRConflict {
    pub fn kind(&self) -> ConflictKind {
        match (self.existing, self.rejected) {
            (Action::Shift(_), _) | (_, Action::Shift(_)) => ConflictKind::ShiftReduce,
            _ => ConflictKind::ReduceReduce,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SLRTable<'g> {
    automaton: LR0Automaton<'g>,
    action: HashMap<(usize, Symbol), Action>,
    goto: HashMap<(usize, usize), usize>,
    conflicts: Vec<SLRConflict>,
}

impl<'g> SLRTable<'g> {
    pub fn build(automaton: LR0Automaton<'g>, first_follow: &FirstFollow<'g>) -> Self {
        let grammar = automaton.grammar();
        let mut slr = Self {
            automaton,
            action: HashMap::new(),
            goto: HashMap::new(),
            conflicts: Vec::new(),
        };

        let mut writes: Vec<(usize, Symbol, Action)> = Vec::new();
        for state in slr.automaton.states() {
            for item in &state.items {
                match (slr.automaton.next_symbol(item), item.rule) {
                    (Some(symbol), _) if symbol.is_terminal() => {
                        if let Some(&v) = state.transitions.get(symbol) {
                            writes.push((state.id, symbol.clone(), Action::Shift(v)));
                        }
                    }
                    (Some(_), _) => {}
                    (None, Rule::Augmented) => {
                        writes.push((state.id, Symbol::EndMarker, Action::Accept));
                    }
                    (None, Rule::Production(id)) => {
                        for terminal in first_follow.follow(id.non_terminal) {
                            writes.push((state.id, terminal.clone(), Action::Reduce(id)));
                        }
                    }
                }
            }

            for (symbol, &v) in &state.transitions {
                if let Some(idx) = symbol
                    .non_terminal_name()
                    .and_then(|name| grammar.get_symbol_index(name))
                {
                    slr.goto.insert((state.id, idx), v);
                }
            }
        }

        for (state, terminal, action) in writes {
            slr.insert(state, terminal, action);
        }

        debug!(
            "SLR(1) table: {} actions, {} gotos, {} conflicts",
            slr.action.len(),
            slr.goto.len(),
            slr.conflicts.len()
        );
        slr
    }

    fn insert(&mut self, state: usize, terminal: Symbol, action: Action) {
        match self.action.get(&(state, terminal.clone())) {
            Some(&existing) if existing != action => {
                let conflict = SLRConflict {
                    state,
                    terminal,
                    existing,
                    rejected: action,
                };
                warn!(
                    "SLR(1) {:?} conflict in state {} on {}",
                    conflict.kind(),
                    state,
                    conflict.terminal
                );
                self.conflicts.push(conflict);
            }
            Some(_) => {}
            None => {
                self.action.insert((state, terminal), action);
            }
        }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.automaton.grammar()
    }

    pub fn automaton(&self) -> &LR0Automaton<'g> {
        &self.automaton
    }

    pub fn is_slr1(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn conflicts(&self) -> &[SLRConflict] {
        &self.conflicts
    }

    pub fn action(&self, state: usize, terminal: &Symbol) -> Option<Action> {
        self.action.get(&(state, terminal.clone())).copied()
    }

    pub fn goto(&self, state: usize, non_terminal: &str) -> Option<usize> {
        let idx = self.grammar().get_symbol_index(non_terminal)?;
        self.goto.get(&(state, idx)).copied()
    }

    /// Every action written to the cell, the kept one first.
    pub fn candidates(&self, state: usize, terminal: &Symbol) -> Vec<Action> {
        self.action(state, terminal)
            .into_iter()
            .chain(
                self.conflicts
                    .iter()
                    .filter(|c| c.state == state && &c.terminal == terminal)
                    .map(|c| c.rejected),
            )
            .collect()
    }

    pub fn parse(&self, input: &str) -> bool {
        self.run(&to_symbols(input), None).is_some()
    }

    pub fn parse_with_tree(&self, input: &str) -> Option<ParseTree> {
        let mut tree = ParseTree::detached();
        let root = self.run(&to_symbols(input), Some(&mut tree))??;
        tree.set_root(root);
        Some(tree)
    }

    /// Shift-reduce driver. Returns `None` on rejection, otherwise the node
    /// left on the node stack when tree building is on.
    fn run(&self, input: &[Symbol], mut tree: Option<&mut ParseTree>) -> Option<Option<NodeId>> {
        if !self.is_slr1() {
            return None;
        }
        let grammar = self.grammar();
        let mut states: Vec<usize> = vec![0];
        let mut nodes: Vec<NodeId> = Vec::new();
        let mut cursor = 0;

        loop {
            let state = *states.last()?;
            let current = input.get(cursor).cloned().unwrap_or(Symbol::EndMarker);
            let action = self.action(state, &current)?;
            trace!("SLR(1) state {} lookahead {} -> {:?}", state, current, action);

            match action {
                Action::Accept => return Some(nodes.pop()),
                Action::Shift(v) => {
                    states.push(v);
                    if let Some(tree) = tree.as_deref_mut() {
                        nodes.push(tree.push_node(current));
                    }
                    cursor += 1;
                }
                Action::Reduce(id) => {
                    let n = grammar.body(id).len();
                    if states.len() <= n {
                        return None;
                    }
                    states.truncate(states.len() - n);
                    let top = *states.last()?;
                    let v = self.goto.get(&(top, id.non_terminal)).copied()?;
                    states.push(v);

                    if let Some(tree) = tree.as_deref_mut() {
                        let children = if n == 0 {
                            vec![tree.push_node(Symbol::Epsilon)]
                        } else {
                            nodes.split_off(nodes.len().checked_sub(n)?)
                        };
                        let parent =
                            tree.push_node(Symbol::non_terminal(grammar.left_name(id)));
                        tree.adopt(parent, children);
                        nodes.push(parent);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(g: &Grammar) -> SLRTable<'_> {
        let ff = FirstFollow::compute(g);
        SLRTable::build(LR0Automaton::build(g), &ff)
    }

    const EXPRESSION: &str = "E -> E + T | T\nT -> T * F | F\nF -> ( E ) | i";

    #[test]
    fn expression_grammar_is_slr1() {
        let g = Grammar::parse(EXPRESSION).unwrap();
        let slr = table(&g);
        assert!(slr.is_slr1());
        assert!(slr.parse("i+i*i"));
        assert!(slr.parse("(i+i)*i"));
        assert!(slr.parse("i"));
        assert!(!slr.parse("i+"));
        assert!(!slr.parse("(i"));
        assert!(!slr.parse(""));
        assert!(!slr.parse("ii"));
    }

    #[test]
    fn table_entries() {
        let g = Grammar::parse(EXPRESSION).unwrap();
        let slr = table(&g);
        let shift = slr.action(0, &Symbol::Terminal('i'));
        assert!(matches!(shift, Some(Action::Shift(_))));
        assert!(slr.goto(0, "E").is_some());
        assert_eq!(slr.action(0, &Symbol::Terminal('+')), None);

        let Some(Action::Shift(i)) = shift else {
            unreachable!()
        };
        let f_i = ProductionId {
            non_terminal: g.get_symbol_index("F").unwrap(),
            alternative: 1,
        };
        for t in ['+', '*', ')'] {
            assert_eq!(slr.action(i, &Symbol::Terminal(t)), Some(Action::Reduce(f_i)));
        }
        assert_eq!(slr.action(i, &Symbol::EndMarker), Some(Action::Reduce(f_i)));

        let e = slr.goto(0, "E").unwrap();
        assert_eq!(slr.action(e, &Symbol::EndMarker), Some(Action::Accept));
    }

    #[test]
    fn ambiguous_grammar_reports_conflict() {
        let g = Grammar::parse("S -> S+S | n").unwrap();
        let slr = table(&g);
        assert!(!slr.is_slr1());
        assert!(slr
            .conflicts()
            .iter()
            .any(|c| c.kind() == ConflictKind::ShiftReduce && c.terminal == Symbol::Terminal('+')));
        assert!(!slr.parse("n+n"));
        assert!(slr.parse_with_tree("n").is_none());
    }

    #[test]
    fn reduce_reduce_conflict() {
        let g = Grammar::parse("S -> A | B\nA -> a\nB -> a").unwrap();
        let slr = table(&g);
        assert!(!slr.is_slr1());
        let conflict = &slr.conflicts()[0];
        assert_eq!(conflict.kind(), ConflictKind::ReduceReduce);
        assert_eq!(conflict.terminal, Symbol::EndMarker);
        assert_eq!(slr.candidates(conflict.state, &Symbol::EndMarker).len(), 2);
    }

    #[test]
    fn epsilon_reduction_pops_nothing() {
        let g = Grammar::parse("S -> aSb | ε").unwrap();
        let slr = table(&g);
        assert!(slr.is_slr1());
        assert!(slr.parse(""));
        assert!(slr.parse("aabb"));
        assert!(!slr.parse("aab"));
        assert!(!slr.parse("abab"));
    }

    #[test]
    fn tree_from_reductions() {
        let g = Grammar::parse(EXPRESSION).unwrap();
        let slr = table(&g);
        let tree = slr.parse_with_tree("i+i*i").unwrap();
        assert_eq!(tree.derived_string(), "i+i*i");
        assert_eq!(tree.symbol(tree.root()), &Symbol::non_terminal("E"));
        // E -> E + T at the top
        assert_eq!(tree.children(tree.root()).len(), 3);
        assert_eq!(tree.parent(tree.root()), None);

        let g = Grammar::parse("S -> aSb | ε").unwrap();
        let slr = table(&g);
        let tree = slr.parse_with_tree("ab").unwrap();
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.derived_string(), "ab");
        assert!(slr.parse_with_tree("ba").is_none());
    }
}
