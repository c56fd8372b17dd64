use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use log::debug;

use super::{
    grammar::{ProductionId, Symbol},
    Grammar,
};

/// The production an item walks through: either the synthetic `S' -> S`
/// or one of the grammar's own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rule {
    Augmented,
    Production(ProductionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LR0Item {
    pub rule: Rule,
    pub dot: usize,
}

impl LR0Item {
    pub fn new(rule: Rule) -> Self {
        Self { rule, dot: 0 }
    }

    pub fn advance(&self) -> Self {
        Self {
            rule: self.rule,
            dot: self.dot + 1,
        }
    }
}

pub type ItemSet = BTreeSet<LR0Item>;

#[derive(Debug, Clone)]
pub struct LR0State {
    pub id: usize,
    pub items: ItemSet,
    pub transitions: BTreeMap<Symbol, usize>,
}

/// One state described only by its content: sorted item strings plus the
/// item strings of every transition target.
pub type CanonicalState = (Vec<String>, BTreeSet<(String, Vec<String>)>);

#[derive(Debug, Clone)]
pub struct LR0Automaton<'g> {
    grammar: &'g Grammar,
    augmented_start: String,
    augmented_body: Vec<Symbol>,
    states: Vec<LR0State>,
}

impl<'g> LR0Automaton<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        let start = grammar.start_symbol().unwrap_or_default().to_string();
        Self {
            grammar,
            augmented_start: grammar.get_symbol_prime_name(start.clone()),
            augmented_body: vec![Symbol::NonTerminal(start)],
            states: Vec::new(),
        }
    }

    /// Canonical LR(0) collection, discovered breadth-first from the closure
    /// of `S' -> ·S`.
    pub fn build(grammar: &'g Grammar) -> Self {
        let mut automaton = Self::new(grammar);
        if grammar.start_index().is_none() {
            return automaton;
        }

        let initial = automaton.closure(ItemSet::from([LR0Item::new(Rule::Augmented)]));
        let mut seen: HashMap<ItemSet, usize> = HashMap::from([(initial.clone(), 0)]);
        automaton.states.push(LR0State {
            id: 0,
            items: initial,
            transitions: BTreeMap::new(),
        });

        let mut q: VecDeque<usize> = VecDeque::from([0]);
        while let Some(u) = q.pop_front() {
            let items = automaton.states[u].items.clone();
            let symbols: BTreeSet<Symbol> = items
                .iter()
                .filter_map(|item| automaton.next_symbol(item))
                .cloned()
                .collect();

            for symbol in symbols {
                let target = automaton.goto(&items, &symbol);
                if target.is_empty() {
                    continue;
                }
                let v = match seen.get(&target) {
                    Some(&v) => v,
                    None => {
                        let v = automaton.states.len();
                        seen.insert(target.clone(), v);
                        automaton.states.push(LR0State {
                            id: v,
                            items: target,
                            transitions: BTreeMap::new(),
                        });
                        q.push_back(v);
                        v
                    }
                };
                automaton.states[u].transitions.insert(symbol, v);
            }
        }

        debug!("LR(0) automaton has {} states", automaton.states.len());
        automaton
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn augmented_start(&self) -> &str {
        &self.augmented_start
    }

    pub fn states(&self) -> &[LR0State] {
        &self.states
    }

    pub fn state(&self, id: usize) -> &LR0State {
        &self.states[id]
    }

    pub fn left(&self, rule: Rule) -> &str {
        match rule {
            Rule::Augmented => &self.augmented_start,
            Rule::Production(id) => self.grammar.left_name(id),
        }
    }

    pub fn body(&self, rule: Rule) -> &[Symbol] {
        match rule {
            Rule::Augmented => &self.augmented_body,
            Rule::Production(id) => self.grammar.body(id),
        }
    }

    /// The symbol right after the dot, `None` for reduce items.
    pub fn next_symbol(&self, item: &LR0Item) -> Option<&Symbol> {
        self.body(item.rule).get(item.dot)
    }

    pub fn is_reduce(&self, item: &LR0Item) -> bool {
        item.dot >= self.body(item.rule).len()
    }

    pub fn closure(&self, items: ItemSet) -> ItemSet {
        let mut closure = items;
        let mut q: VecDeque<LR0Item> = closure.iter().copied().collect();
        while let Some(item) = q.pop_front() {
            let Some(idx) = self
                .next_symbol(&item)
                .and_then(|s| s.non_terminal_name())
                .and_then(|name| self.grammar.get_symbol_index(name))
            else {
                continue;
            };
            for id in self.grammar.productions_of(idx) {
                let predicted = LR0Item::new(Rule::Production(id));
                if closure.insert(predicted) {
                    q.push_back(predicted);
                }
            }
        }
        closure
    }

    pub fn goto(&self, items: &ItemSet, symbol: &Symbol) -> ItemSet {
        let kernel: ItemSet = items
            .iter()
            .filter(|item| self.next_symbol(item) == Some(symbol))
            .map(LR0Item::advance)
            .collect();
        if kernel.is_empty() {
            return kernel;
        }
        self.closure(kernel)
    }

    pub fn item_to_string(&self, item: &LR0Item) -> String {
        let mut right: Vec<String> = self
            .body(item.rule)
            .iter()
            .map(|s| s.to_string())
            .collect();
        right.insert(item.dot.min(right.len()), "·".to_string());
        format!("{} -> {}", self.left(item.rule), right.join(" "))
    }

    fn sorted_items(&self, items: &ItemSet) -> Vec<String> {
        let mut items: Vec<String> = items.iter().map(|i| self.item_to_string(i)).collect();
        items.sort();
        items
    }

    /// Id-free view of the automaton for structural comparison.
    pub fn canonical_form(&self) -> BTreeSet<CanonicalState> {
        self.states
            .iter()
            .map(|state| {
                let transitions = state
                    .transitions
                    .iter()
                    .map(|(symbol, &v)| {
                        (symbol.to_string(), self.sorted_items(&self.states[v].items))
                    })
                    .collect();
                (self.sorted_items(&state.items), transitions)
            })
            .collect()
    }
}
