extern crate wasm_bindgen;

use serde::Serialize;
use serde_json::json;
use wasm_bindgen::prelude::*;

pub mod grammar;
pub use grammar::{
    Analysis, AutomatonGraph, Conformance, FirstFollow, Grammar, GrammarError, LL1Table,
    LR0Automaton, ParseTree, ParserKind, SLRTable, Symbol,
};

use grammar::pretty_print::NonTerminalOutputVec;

#[derive(Serialize)]
struct AnalysisReport<'a> {
    ll1: bool,
    slr1: bool,
    conformance: Conformance,
    first_follow: NonTerminalOutputVec<'a>,
}

#[derive(Serialize)]
struct ParseReport {
    accepted: bool,
    tree: Option<String>,
}

fn error_to_json(e: impl std::fmt::Display) -> String {
    json!({ "error": e.to_string() }).to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(error_to_json)
}

#[wasm_bindgen]
pub fn analyze_to_json(grammar: &str) -> String {
    let g = match Grammar::parse(grammar) {
        Ok(g) => g,
        Err(e) => return error_to_json(e),
    };
    match Analysis::new(&g) {
        Ok(analysis) => to_json(&AnalysisReport {
            ll1: analysis.ll1().is_ll1(),
            slr1: analysis.slr().is_slr1(),
            conformance: analysis.conformance(),
            first_follow: analysis.first_follow().to_non_terminal_output_vec(),
        }),
        Err(e) => error_to_json(e),
    }
}

/// `parser` is `ll1` or `slr`. The tree is the box-drawing rendering of the
/// derivation.
#[wasm_bindgen]
pub fn parse_to_json(grammar: &str, input: &str, parser: &str) -> String {
    let kind: ParserKind = match parser.parse() {
        Ok(kind) => kind,
        Err(e) => return error_to_json(e),
    };
    let g = match Grammar::parse(grammar) {
        Ok(g) => g,
        Err(e) => return error_to_json(e),
    };
    match Analysis::new(&g) {
        Ok(analysis) => {
            let tree = analysis.parse_with_tree(kind, input);
            to_json(&ParseReport {
                accepted: tree.is_some(),
                tree: tree.map(|t| t.to_string()),
            })
        }
        Err(e) => error_to_json(e),
    }
}


#[cfg(test)]
mod json_tests {
    use super::{analyze_to_json, parse_to_json};

    fn value(s: &str) -> serde_json::Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn analyze_reports_conformance() {
        let v = value(&analyze_to_json("S -> aSb | ε"));
        assert_eq!(v["ll1"], true);
        assert_eq!(v["slr1"], true);
        assert_eq!(v["conformance"], "Both");
        assert_eq!(v["first_follow"]["data"][0]["name"], "S");
        assert_eq!(v["first_follow"]["data"][0]["nullable"], true);

        let v = value(&analyze_to_json("S -> S+S | n"));
        assert_eq!(v["ll1"], false);
        assert_eq!(v["slr1"], false);
    }

    #[test]
    fn analyze_reports_errors() {
        let v = value(&analyze_to_json("S -> a B"));
        assert_eq!(v["error"], "non-terminal B is used but has no productions");

        let v = value(&analyze_to_json("S -> a -> b"));
        assert!(v["error"].as_str().unwrap().starts_with("line 1"));

        let v = value(&analyze_to_json(""));
        assert_eq!(v["error"], "grammar has no productions");
    }

    #[test]
    fn parse_with_either_driver() {
        for parser in ["ll1", "slr"] {
            let v = value(&parse_to_json("S -> aSb | ε", "aabb", parser));
            assert_eq!(v["accepted"], true);
            assert!(v["tree"].as_str().unwrap().starts_with("└── S"));

            let v = value(&parse_to_json("S -> aSb | ε", "aab", parser));
            assert_eq!(v["accepted"], false);
            assert!(v["tree"].is_null());
        }
    }

    #[test]
    fn unknown_parser() {
        let v = value(&parse_to_json("S -> a", "a", "lalr"));
        assert_eq!(v["error"], "unknown parser lalr, expected ll1 or slr");
    }
}
