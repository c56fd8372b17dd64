pub mod analysis;
pub mod automaton_graph;
pub mod error;
pub mod first_follow;
pub mod grammar;
pub mod ll1;
pub mod lr0;
pub mod parse;
pub mod parse_tree;
pub mod pretty_print;
pub mod slr;

pub use analysis::{Analysis, Conformance, ParserKind};
pub use automaton_graph::AutomatonGraph;
pub use error::GrammarError;
pub use first_follow::FirstFollow;
pub use grammar::{Grammar, ProductionId, Symbol};
pub use ll1::LL1Table;
pub use lr0::LR0Automaton;
pub use parse_tree::ParseTree;
pub use slr::SLRTable;

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";
