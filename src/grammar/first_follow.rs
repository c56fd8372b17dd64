use std::collections::BTreeSet;

use log::debug;

use super::{grammar::Symbol, Grammar};

/// FIRST and FOLLOW sets of every non-terminal, indexed like the grammar's
/// non-terminals. FIRST may contain ε; FOLLOW never does.
#[derive(Debug, Clone)]
pub struct FirstFollow<'g> {
    grammar: &'g Grammar,
    first: Vec<BTreeSet<Symbol>>,
    follow: Vec<BTreeSet<Symbol>>,
}

impl<'g> FirstFollow<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        let n = grammar.non_terminal_count();
        Self {
            grammar,
            first: vec![BTreeSet::new(); n],
            follow: vec![BTreeSet::new(); n],
        }
    }

    /// FIRST then FOLLOW, both run to their fixed point.
    pub fn compute(grammar: &'g Grammar) -> Self {
        let mut ff = Self::new(grammar);
        ff.compute_first();
        ff.compute_follow();
        ff
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn first(&self, non_terminal: usize) -> &BTreeSet<Symbol> {
        &self.first[non_terminal]
    }

    pub fn follow(&self, non_terminal: usize) -> &BTreeSet<Symbol> {
        &self.follow[non_terminal]
    }

    pub fn first_by_name(&self, name: &str) -> Option<&BTreeSet<Symbol>> {
        self.grammar.get_symbol_index(name).map(|idx| &self.first[idx])
    }

    pub fn follow_by_name(&self, name: &str) -> Option<&BTreeSet<Symbol>> {
        self.grammar.get_symbol_index(name).map(|idx| &self.follow[idx])
    }

    pub fn nullable(&self, non_terminal: usize) -> bool {
        self.first[non_terminal].contains(&Symbol::Epsilon)
    }

    /// FIRST of a symbol sequence using the current sets. Contains ε when
    /// every symbol can vanish, so the empty sequence yields `{ε}`.
    pub fn first_of(&self, sequence: &[Symbol]) -> BTreeSet<Symbol> {
        let mut result = BTreeSet::new();
        for symbol in sequence {
            match symbol {
                Symbol::Terminal(_) | Symbol::EndMarker => {
                    result.insert(symbol.clone());
                    return result;
                }
                Symbol::Epsilon => continue,
                Symbol::NonTerminal(name) => {
                    let Some(idx) = self.grammar.get_symbol_index(name) else {
                        return result;
                    };
                    let first = &self.first[idx];
                    result.extend(first.iter().filter(|s| **s != Symbol::Epsilon).cloned());
                    if !first.contains(&Symbol::Epsilon) {
                        return result;
                    }
                }
            }
        }
        result.insert(Symbol::Epsilon);
        result
    }

    /// Returns the number of passes it took to reach the fixed point.
    pub fn compute_first(&mut self) -> usize {
        for set in self.first.iter_mut() {
            set.clear();
        }

        let grammar = self.grammar;
        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            for id in grammar.production_ids() {
                let first = self.first_of(grammar.production(id));
                let set = &mut self.first[id.non_terminal];
                let before = set.len();
                set.extend(first);
                if set.len() > before {
                    changed = true;
                }
            }
        }
        debug!("FIRST reached its fixed point after {} passes", passes);
        passes
    }

    /// Requires FIRST to be final. Returns the number of passes.
    pub fn compute_follow(&mut self) -> usize {
        for set in self.follow.iter_mut() {
            set.clear();
        }
        if let Some(start) = self.grammar.start_index() {
            self.follow[start].insert(Symbol::EndMarker);
        }

        let grammar = self.grammar;
        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            for id in grammar.production_ids() {
                let production = grammar.production(id);
                for (i, symbol) in production.iter().enumerate() {
                    let Some(b) = symbol
                        .non_terminal_name()
                        .and_then(|name| grammar.get_symbol_index(name))
                    else {
                        continue;
                    };

                    let mut addition = self.first_of(&production[i + 1..]);
                    if addition.remove(&Symbol::Epsilon) {
                        addition.extend(self.follow[id.non_terminal].iter().cloned());
                    }

                    let set = &mut self.follow[b];
                    let before = set.len();
                    set.extend(addition);
                    if set.len() > before {
                        changed = true;
                    }
                }
            }
        }
        debug!("FOLLOW reached its fixed point after {} passes", passes);
        passes
    }
}
