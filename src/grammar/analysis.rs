use std::{fmt, str::FromStr};

use log::info;
use serde::Serialize;

use super::{
    FirstFollow, Grammar, GrammarError, LL1Table, LR0Automaton, ParseTree, SLRTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParserKind {
    LL1,
    SLR1,
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserKind::LL1 => write!(f, "LL(1)"),
            ParserKind::SLR1 => write!(f, "SLR(1)"),
        }
    }
}

impl FromStr for ParserKind {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ll1" | "ll(1)" | "t" => Ok(ParserKind::LL1),
            "slr" | "slr1" | "slr(1)" | "b" => Ok(ParserKind::SLR1),
            _ => Err(GrammarError::UnknownParser(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Conformance {
    Both,
    LL1Only,
    SLR1Only,
    Neither,
}

/// Everything the table-driven parsers need, built once from a validated
/// grammar and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Analysis<'g> {
    first_follow: FirstFollow<'g>,
    ll1: LL1Table<'g>,
    slr: SLRTable<'g>,
}

impl<'g> Analysis<'g> {
    pub fn new(grammar: &'g Grammar) -> Result<Self, GrammarError> {
        grammar.validate()?;

        let first_follow = FirstFollow::compute(grammar);
        let ll1 = LL1Table::build(&first_follow);
        let slr = SLRTable::build(LR0Automaton::build(grammar), &first_follow);

        let analysis = Self {
            first_follow,
            ll1,
            slr,
        };
        info!("grammar conformance: {:?}", analysis.conformance());
        Ok(analysis)
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.first_follow.grammar()
    }

    pub fn first_follow(&self) -> &FirstFollow<'g> {
        &self.first_follow
    }

    pub fn ll1(&self) -> &LL1Table<'g> {
        &self.ll1
    }

    pub fn slr(&self) -> &SLRTable<'g> {
        &self.slr
    }

    pub fn automaton(&self) -> &LR0Automaton<'g> {
        self.slr.automaton()
    }

    pub fn conformance(&self) -> Conformance {
        match (self.ll1.is_ll1(), self.slr.is_slr1()) {
            (true, true) => Conformance::Both,
            (true, false) => Conformance::LL1Only,
            (false, true) => Conformance::SLR1Only,
            (false, false) => Conformance::Neither,
        }
    }

    pub fn available_parsers(&self) -> Vec<ParserKind> {
        match self.conformance() {
            Conformance::Both => vec![ParserKind::LL1, ParserKind::SLR1],
            Conformance::LL1Only => vec![ParserKind::LL1],
            Conformance::SLR1Only => vec![ParserKind::SLR1],
            Conformance::Neither => vec![],
        }
    }

    pub fn parse(&self, kind: ParserKind, input: &str) -> bool {
        match kind {
            ParserKind::LL1 => self.ll1.parse(input),
            ParserKind::SLR1 => self.slr.parse(input),
        }
    }

    pub fn parse_with_tree(&self, kind: ParserKind, input: &str) -> Option<ParseTree> {
        match kind {
            ParserKind::LL1 => self.ll1.parse_with_tree(input),
            ParserKind::SLR1 => self.slr.parse_with_tree(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conformance(text: &str) -> Conformance {
        let g = Grammar::parse(text).unwrap();
        Analysis::new(&g).unwrap().conformance()
    }

    #[test]
    fn four_way_outcome() {
        assert_eq!(conformance("S -> aSb | ε"), Conformance::Both);
        assert_eq!(
            conformance("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | i"),
            Conformance::SLR1Only
        );
        assert_eq!(conformance("S -> S+S | n"), Conformance::Neither);
        // LALR(1) but neither LL(1) nor SLR(1)
        assert_eq!(
            conformance("S -> A a | b A c | d c | b d a\nA -> d"),
            Conformance::Neither
        );
    }

    #[test]
    fn ll1_only_grammar() {
        // FOLLOW(A) and FOLLOW(B) both hold a and b, so SLR(1) sees a
        // reduce/reduce conflict in the start state.
        assert_eq!(
            conformance("S -> A a A b | B b B a\nA -> ε\nB -> ε"),
            Conformance::LL1Only
        );
    }

    #[test]
    fn malformed_grammar_is_a_hard_failure() {
        let g = Grammar::parse("S -> a B").unwrap();
        assert_eq!(
            Analysis::new(&g).err(),
            Some(GrammarError::UndefinedNonTerminal("B".to_string()))
        );
    }

    #[test]
    fn ascii_e_marks_the_empty_production() {
        let g = Grammar::parse("S -> aSb | e").unwrap();
        let analysis = Analysis::new(&g).unwrap();
        assert_eq!(analysis.conformance(), Conformance::Both);
        for kind in [ParserKind::LL1, ParserKind::SLR1] {
            assert!(analysis.parse(kind, ""));
            assert!(analysis.parse(kind, "aabb"));
            assert!(!analysis.parse(kind, "aab"));
            assert!(!analysis.parse(kind, "e"));
        }
    }

    #[test]
    fn parser_names() {
        assert_eq!("ll1".parse::<ParserKind>(), Ok(ParserKind::LL1));
        assert_eq!("SLR(1)".parse::<ParserKind>(), Ok(ParserKind::SLR1));
        assert_eq!("B".parse::<ParserKind>(), Ok(ParserKind::SLR1));
        assert_eq!(
            "lalr".parse::<ParserKind>(),
            Err(GrammarError::UnknownParser("lalr".to_string()))
        );
        assert_eq!(ParserKind::SLR1.to_string(), "SLR(1)");
    }

    #[test]
    fn both_drivers_are_reachable() {
        let g = Grammar::parse("S -> aSb | ε").unwrap();
        let analysis = Analysis::new(&g).unwrap();
        assert_eq!(
            analysis.available_parsers(),
            vec![ParserKind::LL1, ParserKind::SLR1]
        );
        for kind in analysis.available_parsers() {
            assert!(analysis.parse(kind, "ab"));
            assert_eq!(
                analysis.parse_with_tree(kind, "aabb").unwrap().derived_string(),
                "aabb"
            );
        }
    }
}
