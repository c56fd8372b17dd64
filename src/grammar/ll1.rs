use std::collections::HashMap;

use log::{debug, trace, warn};

use super::{
    grammar::{is_epsilon_production, ProductionId, Symbol},
    parse_tree::{NodeId, ParseTree},
    FirstFollow, Grammar,
};

/// A cell of the predictive table claimed by two different productions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LL1Conflict {
    pub non_terminal: usize,
    pub terminal: Symbol,
    pub existing: ProductionId,
    pub rejected: ProductionId,
}

#[derive(Debug, Clone)]
pub struct LL1Table<'g> {
    grammar: &'g Grammar,
    table: HashMap<(usize, Symbol), ProductionId>,
    conflicts: Vec<LL1Conflict>,
}

impl<'g> LL1Table<'g> {
    pub fn build(first_follow: &FirstFollow<'g>) -> Self {
        let grammar = first_follow.grammar();
        let mut ll1 = Self {
            grammar,
            table: HashMap::new(),
            conflicts: Vec::new(),
        };

        for nt in grammar.non_terminal_iter() {
            for id in grammar.productions_of(nt.index) {
                let first = first_follow.first_of(grammar.production(id));
                for terminal in first.iter().filter(|s| **s != Symbol::Epsilon) {
                    ll1.insert(nt.index, terminal.clone(), id);
                }
                if first.contains(&Symbol::Epsilon) {
                    for terminal in first_follow.follow(nt.index) {
                        ll1.insert(nt.index, terminal.clone(), id);
                    }
                }
            }
        }

        debug!(
            "LL(1) table: {} cells, {} conflicts",
            ll1.table.len(),
            ll1.conflicts.len()
        );
        ll1
    }

    fn insert(&mut self, non_terminal: usize, terminal: Symbol, id: ProductionId) {
        match self.table.get(&(non_terminal, terminal.clone())) {
            Some(&existing) if existing != id => {
                if self.conflicts.iter().any(|c| {
                    c.non_terminal == non_terminal && c.terminal == terminal && c.rejected == id
                }) {
                    return;
                }
                warn!(
                    "LL(1) conflict at [{}, {}]: {} vs {}",
                    self.grammar.non_terminal(non_terminal).name,
                    terminal,
                    self.grammar.production_to_string(existing),
                    self.grammar.production_to_string(id)
                );
                self.conflicts.push(LL1Conflict {
                    non_terminal,
                    terminal,
                    existing,
                    rejected: id,
                });
            }
            Some(_) => {}
            None => {
                self.table.insert((non_terminal, terminal), id);
            }
        }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn is_ll1(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn conflicts(&self) -> &[LL1Conflict] {
        &self.conflicts
    }

    pub fn get(&self, non_terminal: &str, terminal: &Symbol) -> Option<ProductionId> {
        let idx = self.grammar.get_symbol_index(non_terminal)?;
        self.table.get(&(idx, terminal.clone())).copied()
    }

    /// Every production that was written to the cell, the kept one first.
    pub fn candidates(&self, non_terminal: usize, terminal: &Symbol) -> Vec<ProductionId> {
        self.table
            .get(&(non_terminal, terminal.clone()))
            .into_iter()
            .copied()
            .chain(
                self.conflicts
                    .iter()
                    .filter(|c| c.non_terminal == non_terminal && &c.terminal == terminal)
                    .map(|c| c.rejected),
            )
            .collect()
    }

    pub fn parse(&self, input: &str) -> bool {
        self.run(&to_symbols(input), None)
    }

    pub fn parse_with_tree(&self, input: &str) -> Option<ParseTree> {
        let start = self.grammar.start_symbol()?;
        let mut tree = ParseTree::new(Symbol::non_terminal(start));
        if self.run(&to_symbols(input), Some(&mut tree)) {
            Some(tree)
        } else {
            None
        }
    }

    /// Predictive driver. A non-conformant table rejects everything.
    fn run(&self, input: &[Symbol], mut tree: Option<&mut ParseTree>) -> bool {
        if !self.is_ll1() {
            return false;
        }
        let Some(start) = self.grammar.start_index() else {
            return false;
        };

        let root = tree.as_ref().map(|t| t.root());
        let mut stack: Vec<(Symbol, Option<NodeId>)> = vec![
            (Symbol::EndMarker, None),
            (
                Symbol::NonTerminal(self.grammar.non_terminal(start).name.clone()),
                root,
            ),
        ];
        let mut cursor = 0;

        while let Some((top, node)) = stack.pop() {
            let current = input.get(cursor).cloned().unwrap_or(Symbol::EndMarker);
            trace!("LL(1) top {} lookahead {}", top, current);

            match &top {
                Symbol::Terminal(_) | Symbol::EndMarker => {
                    if top != current {
                        return false;
                    }
                    cursor += 1;
                }
                Symbol::NonTerminal(name) => {
                    let Some(id) = self.get(name, &current) else {
                        return false;
                    };
                    let production = self.grammar.production(id);

                    if is_epsilon_production(production) {
                        if let (Some(tree), Some(node)) = (tree.as_deref_mut(), node) {
                            tree.add_child(node, Symbol::Epsilon);
                        }
                        continue;
                    }

                    let children: Vec<Option<NodeId>> = match (tree.as_deref_mut(), node) {
                        (Some(tree), Some(node)) => production
                            .iter()
                            .map(|s| Some(tree.add_child(node, s.clone())))
                            .collect(),
                        _ => vec![None; production.len()],
                    };
                    for (symbol, child) in production.iter().zip(children).rev() {
                        stack.push((symbol.clone(), child));
                    }
                }
                Symbol::Epsilon => {}
            }
        }

        cursor == input.len() + 1
    }
}

pub(crate) fn to_symbols(input: &str) -> Vec<Symbol> {
    input.chars().map(Symbol::Terminal).collect()
}
