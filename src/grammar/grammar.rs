use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Serialize, Serializer};

use super::{GrammarError, END_MARK, EPSILON};

/// A grammar symbol. Terminals are single characters because the drivers
/// read their input one character at a time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Terminal(char),
    NonTerminal(String),
    Epsilon,
    EndMarker,
}

impl Symbol {
    pub fn non_terminal(name: &str) -> Self {
        Symbol::NonTerminal(name.to_string())
    }

    /// Terminals and the end-marker, i.e. everything a driver can match
    /// against the input.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_) | Symbol::EndMarker)
    }

    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }

    pub fn non_terminal_name(&self) -> Option<&str> {
        match self {
            Symbol::NonTerminal(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(c) => write!(f, "{}", c),
            Symbol::NonTerminal(name) => write!(f, "{}", name),
            Symbol::Epsilon => write!(f, "{}", EPSILON),
            Symbol::EndMarker => write!(f, "{}", END_MARK),
        }
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Addresses one alternative of one non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProductionId {
    pub non_terminal: usize,
    pub alternative: usize,
}

#[derive(Debug, Clone)]
pub struct NonTerminal {
    pub index: usize,
    pub name: String,
    pub productions: Vec<Vec<Symbol>>,
}

impl NonTerminal {
    pub fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            productions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Grammar {
    non_terminals: Vec<NonTerminal>,
    symbol_table: HashMap<String, usize>,
    terminals: BTreeSet<char>,
    start_symbol: Option<usize>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &NonTerminal> {
        self.non_terminals.iter()
    }

    pub fn non_terminal_count(&self) -> usize {
        self.non_terminals.len()
    }

    pub fn non_terminal(&self, index: usize) -> &NonTerminal {
        &self.non_terminals[index]
    }

    pub fn get_symbol_index(&self, name: &str) -> Option<usize> {
        self.symbol_table.get(name).cloned()
    }

    /// Every terminal of the grammar followed by the end-marker.
    pub fn terminal_iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.terminals
            .iter()
            .map(|&c| Symbol::Terminal(c))
            .chain(std::iter::once(Symbol::EndMarker))
    }

    pub fn is_terminal(&self, c: char) -> bool {
        self.terminals.contains(&c)
    }

    pub fn start_index(&self) -> Option<usize> {
        self.start_symbol
    }

    pub fn start_symbol(&self) -> Option<&str> {
        self.start_symbol
            .map(|idx| self.non_terminals[idx].name.as_str())
    }

    pub fn set_start(&mut self, name: &str) -> Result<(), GrammarError> {
        match self.get_symbol_index(name) {
            Some(idx) if !self.non_terminals[idx].productions.is_empty() => {
                self.start_symbol = Some(idx);
                Ok(())
            }
            _ => Err(GrammarError::UnknownStart(name.to_string())),
        }
    }

    pub fn add_non_terminal(&mut self, name: &str) -> usize {
        if let Some(idx) = self.get_symbol_index(name) {
            return idx;
        }
        let idx = self.non_terminals.len();
        self.non_terminals
            .push(NonTerminal::new(idx, name.to_string()));
        self.symbol_table.insert(name.to_string(), idx);
        idx
    }

    /// Appends `left -> right`. An empty right-hand side is stored as the
    /// ε-production `[ε]`. The first left side ever added becomes the start
    /// symbol.
    pub fn add_production(&mut self, left: &str, right: Vec<Symbol>) -> ProductionId {
        let left_idx = self.add_non_terminal(left);
        let right = if right.is_empty() {
            vec![Symbol::Epsilon]
        } else {
            right
        };

        for symbol in &right {
            match symbol {
                Symbol::Terminal(c) => {
                    self.terminals.insert(*c);
                }
                Symbol::NonTerminal(name) => {
                    self.add_non_terminal(name);
                }
                Symbol::Epsilon | Symbol::EndMarker => {}
            }
        }

        if self.start_symbol.is_none() {
            self.start_symbol = Some(left_idx);
        }

        let productions = &mut self.non_terminals[left_idx].productions;
        productions.push(right);
        ProductionId {
            non_terminal: left_idx,
            alternative: productions.len() - 1,
        }
    }

    pub fn production(&self, id: ProductionId) -> &[Symbol] {
        &self.non_terminals[id.non_terminal].productions[id.alternative]
    }

    /// The right-hand side with the ε marker removed, so an ε-production
    /// has an empty body.
    pub fn body(&self, id: ProductionId) -> &[Symbol] {
        let production = self.production(id);
        if is_epsilon_production(production) {
            &[]
        } else {
            production
        }
    }

    pub fn left_name(&self, id: ProductionId) -> &str {
        self.non_terminals[id.non_terminal].name.as_str()
    }

    pub fn productions_of(&self, index: usize) -> impl Iterator<Item = ProductionId> {
        (0..self.non_terminals[index].productions.len()).map(move |alternative| ProductionId {
            non_terminal: index,
            alternative,
        })
    }

    pub fn production_ids(&self) -> impl Iterator<Item = ProductionId> + '_ {
        (0..self.non_terminals.len()).flat_map(move |idx| self.productions_of(idx))
    }

    pub fn production_to_string(&self, id: ProductionId) -> String {
        format!(
            "{} -> {}",
            self.left_name(id),
            self.production_to_vec_str(id).join(" ")
        )
    }

    pub fn production_to_vec_str(&self, id: ProductionId) -> Vec<String> {
        self.production(id).iter().map(|s| s.to_string()).collect()
    }

    pub fn get_symbol_prime_name(&self, mut name: String) -> String {
        while self.symbol_table.contains_key(&name) {
            name.push('\'');
        }
        name
    }

    /// Checks the invariants every table builder relies on.
    pub fn validate(&self) -> Result<(), GrammarError> {
        let start = self.start_symbol.ok_or(GrammarError::Empty)?;
        if self.non_terminals[start].productions.is_empty() {
            return Err(GrammarError::UnknownStart(
                self.non_terminals[start].name.clone(),
            ));
        }

        for nt in &self.non_terminals {
            if nt.productions.is_empty() {
                return Err(GrammarError::UndefinedNonTerminal(nt.name.clone()));
            }
            for production in &nt.productions {
                if production.len() > 1 && production.contains(&Symbol::Epsilon) {
                    return Err(GrammarError::MixedEpsilon(nt.name.clone()));
                }
                if production.contains(&Symbol::EndMarker) {
                    return Err(GrammarError::ReservedSymbol(nt.name.clone()));
                }
            }
        }
        Ok(())
    }
}

pub fn is_epsilon_production(production: &[Symbol]) -> bool {
    production == [Symbol::Epsilon]
}
