use rand::prelude::*;

use ll1_slr_parser::{Analysis, Grammar, ParserKind, Symbol};

const SEED: u64 = 0x5eed;

// The last alternative of every non-terminal terminates, so derivations
// past the depth limit always finish.
const GRAMMARS: &[&str] = &[
    "S -> aSb | ε",
    "S -> ( S ) S | ε",
    "E -> T E'\nE' -> + T E' | ε\nT -> F T'\nT' -> * F T' | ε\nF -> ( E ) | i",
];

fn derive(g: &Grammar, name: &str, depth: usize, rng: &mut StdRng, out: &mut String) {
    let nt = g.non_terminal(g.get_symbol_index(name).unwrap());
    let production = if depth > 6 {
        nt.productions.last().unwrap()
    } else {
        nt.productions.choose(rng).unwrap()
    };
    for symbol in production {
        match symbol {
            Symbol::Terminal(c) => out.push(*c),
            Symbol::NonTerminal(inner) => derive(g, inner, depth + 1, rng, out),
            Symbol::Epsilon | Symbol::EndMarker => {}
        }
    }
}

fn sentence(g: &Grammar, rng: &mut StdRng) -> String {
    let mut out = String::new();
    derive(g, g.start_symbol().unwrap(), 0, rng, &mut out);
    out
}

#[test]
fn generated_sentences_are_accepted_by_both_drivers() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for text in GRAMMARS {
        let g = Grammar::parse(text).unwrap();
        let analysis = Analysis::new(&g).unwrap();
        for _ in 0..200 {
            let input = sentence(&g, &mut rng);
            for kind in [ParserKind::LL1, ParserKind::SLR1] {
                let tree = analysis.parse_with_tree(kind, &input);
                assert_eq!(
                    tree.map(|t| t.derived_string()),
                    Some(input.clone()),
                    "{} rejected {:?}",
                    kind,
                    input
                );
            }
        }
    }
}

#[test]
fn random_strings_never_panic_and_verdicts_agree() {
    let mut rng = StdRng::seed_from_u64(SEED);
    // characters outside the grammar's terminals must be rejected cleanly
    let alphabet = ['a', 'b', 'i', '+', '*', '(', ')', '$', ' ', 'ε'];
    for text in GRAMMARS {
        let g = Grammar::parse(text).unwrap();
        let analysis = Analysis::new(&g).unwrap();
        for _ in 0..500 {
            let len = rng.gen_range(0..12);
            let input: String = (0..len)
                .map(|_| *alphabet.choose(&mut rng).unwrap())
                .collect();
            let ll1 = analysis.parse(ParserKind::LL1, &input);
            let slr = analysis.parse(ParserKind::SLR1, &input);
            assert_eq!(ll1, slr, "{:?} on {:?}", text, input);
            if input.contains(['$', ' ', 'ε']) {
                assert!(!ll1);
            }
        }
    }
}

#[test]
fn non_conformant_tables_reject_everything() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let g = Grammar::parse("S -> S+S | n").unwrap();
    let analysis = Analysis::new(&g).unwrap();
    for _ in 0..100 {
        let len = rng.gen_range(0..8);
        let input: String = (0..len).map(|_| *['n', '+'].choose(&mut rng).unwrap()).collect();
        assert!(!analysis.parse(ParserKind::LL1, &input));
        assert!(!analysis.parse(ParserKind::SLR1, &input));
        assert!(analysis.parse_with_tree(ParserKind::SLR1, &input).is_none());
    }
}
