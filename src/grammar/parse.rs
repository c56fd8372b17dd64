use std::collections::HashSet;

use super::{grammar::Symbol, Grammar, GrammarError, END_MARK, EPSILON};

/// An alternative made of this token alone is the empty production too.
const EPSILON_ASCII: &str = "e";

fn is_non_terminal_token(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '\'')
}

/// A multi-letter name is kept whole when it is some left side or carries
/// a `'`, `_` or digit; otherwise `AB` is `A B`.
fn is_whole_name(token: &str, lefts: &HashSet<&str>) -> bool {
    is_non_terminal_token(token)
        && (lefts.contains(token)
            || token.chars().count() == 1
            || token.chars().any(|c| c.is_ascii_digit() || c == '_' || c == '\''))
}

fn scan_token(token: &str, lefts: &HashSet<&str>, symbols: &mut Vec<Symbol>) {
    if token == EPSILON {
        symbols.push(Symbol::Epsilon);
    } else if is_whole_name(token, lefts) {
        symbols.push(Symbol::non_terminal(token));
    } else {
        // compact notation: `aSb` is `a S b`
        for c in token.chars() {
            symbols.push(if c.is_ascii_uppercase() {
                Symbol::NonTerminal(c.to_string())
            } else if c.to_string() == EPSILON {
                Symbol::Epsilon
            } else {
                Symbol::Terminal(c)
            });
        }
    }
}

fn parse_alternative(
    right: &str,
    lefts: &HashSet<&str>,
    line: usize,
) -> Result<Vec<Symbol>, GrammarError> {
    let tokens: Vec<&str> = right.split_whitespace().collect();
    if tokens == [EPSILON_ASCII] {
        return Ok(vec![Symbol::Epsilon]);
    }

    let mut symbols = Vec::new();
    for token in tokens {
        if token.contains(END_MARK) {
            return Err(GrammarError::Syntax {
                line,
                message: format!("\"{}\" is reserved for the end of input", END_MARK),
            });
        }
        scan_token(token, lefts, &mut symbols);
    }
    Ok(symbols)
}

impl Grammar {
    /// Reads `A -> α | β` lines; a line starting with `|` continues the
    /// previous left side.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut g = Self::new();

        let mut raw_productions: Vec<(String, &str, usize)> = Vec::new();

        let mut previous_left: Option<String> = None;
        for (i, line) in grammar.lines().enumerate() {
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }
            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() > 2 {
                return Err(GrammarError::Syntax {
                    line: i + 1,
                    message: "too many \"->\"".to_string(),
                });
            }
            let (left, rights): (String, &str) = if parts.len() == 2 {
                let left_str = parts[0].trim();
                if left_str.is_empty() {
                    return Err(GrammarError::Syntax {
                        line: i + 1,
                        message: "empty left side".to_string(),
                    });
                } else if left_str.split_whitespace().count() != 1 {
                    return Err(GrammarError::Syntax {
                        line: i + 1,
                        message: "left side contains whitespace".to_string(),
                    });
                } else if !is_non_terminal_token(left_str) {
                    return Err(GrammarError::Syntax {
                        line: i + 1,
                        message: format!("left side {} is not an upper-case name", left_str),
                    });
                }
                (left_str.to_string(), parts[1].trim())
            } else {
                match (&previous_left, parts[0].trim().strip_prefix('|')) {
                    (Some(left), Some(rest)) => (left.clone(), rest.trim()),
                    _ => {
                        return Err(GrammarError::Syntax {
                            line: i + 1,
                            message: "cannot find left side".to_string(),
                        })
                    }
                }
            };

            previous_left = Some(left.clone());
            raw_productions.push((left, rights, i + 1));
        }

        let lefts: HashSet<&str> = raw_productions
            .iter()
            .map(|(left, _, _)| left.as_str())
            .collect();
        for (left, rights, line) in &raw_productions {
            for right in rights.split('|') {
                let symbols = parse_alternative(right, &lefts, *line)?;
                g.add_production(left, symbols);
            }
        }

        Ok(g)
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::{Grammar, GrammarError, ProductionId, Symbol};

    fn rhs(g: &Grammar, nt: &str, alternative: usize) -> Vec<Symbol> {
        g.production(ProductionId {
            non_terminal: g.get_symbol_index(nt).unwrap(),
            alternative,
        })
        .to_vec()
    }

    #[test]
    fn compact_and_spaced_notation_agree() {
        let compact = Grammar::parse("S -> aSb | ε").unwrap();
        let spaced = Grammar::parse("S -> a S b\n  | ε").unwrap();
        assert_eq!(rhs(&compact, "S", 0), rhs(&spaced, "S", 0));
        assert_eq!(rhs(&compact, "S", 1), vec![Symbol::Epsilon]);
        assert_eq!(rhs(&spaced, "S", 1), vec![Symbol::Epsilon]);
    }

    #[test]
    fn long_non_terminal_names() {
        let g = Grammar::parse("EXPR -> TERM E'\nE' -> + TERM E' | ε\nTERM -> n").unwrap();
        assert_eq!(g.start_symbol(), Some("EXPR"));
        assert_eq!(
            rhs(&g, "E'", 0),
            vec![
                Symbol::Terminal('+'),
                Symbol::non_terminal("TERM"),
                Symbol::non_terminal("E'")
            ]
        );
        assert!(g.validate().is_ok());
    }

    #[test]
    fn mixed_token_is_scanned_by_character() {
        let g = Grammar::parse("S -> S+S | n").unwrap();
        assert_eq!(
            rhs(&g, "S", 0),
            vec![
                Symbol::non_terminal("S"),
                Symbol::Terminal('+'),
                Symbol::non_terminal("S")
            ]
        );
    }

    #[test]
    fn upper_case_run_splits_into_letters() {
        let g = Grammar::parse("S -> AB\nA -> a\nB -> b").unwrap();
        assert_eq!(
            rhs(&g, "S", 0),
            vec![Symbol::non_terminal("A"), Symbol::non_terminal("B")]
        );
        assert_eq!(g.get_symbol_index("AB"), None);
        assert!(g.validate().is_ok());

        let g = Grammar::parse("S -> SS | a").unwrap();
        assert_eq!(
            rhs(&g, "S", 0),
            vec![Symbol::non_terminal("S"), Symbol::non_terminal("S")]
        );
        assert!(g.validate().is_ok());
    }

    #[test]
    fn defined_or_marked_names_stay_whole() {
        let g = Grammar::parse("S -> AB c\nAB -> a").unwrap();
        assert_eq!(
            rhs(&g, "S", 0),
            vec![Symbol::non_terminal("AB"), Symbol::Terminal('c')]
        );

        let g = Grammar::parse("S -> X_1 | T2").unwrap();
        assert_eq!(rhs(&g, "S", 0), vec![Symbol::non_terminal("X_1")]);
        assert_eq!(rhs(&g, "S", 1), vec![Symbol::non_terminal("T2")]);
    }

    #[test]
    fn lone_e_is_epsilon() {
        let g = Grammar::parse("S -> aSb | e").unwrap();
        assert_eq!(rhs(&g, "S", 1), vec![Symbol::Epsilon]);
        assert!(!g.is_terminal('e'));

        // inside a longer alternative e is an ordinary terminal
        let g = Grammar::parse("S -> e S | e x").unwrap();
        assert_eq!(
            rhs(&g, "S", 0),
            vec![Symbol::Terminal('e'), Symbol::non_terminal("S")]
        );
        assert_eq!(rhs(&g, "S", 1), vec![Symbol::Terminal('e'), Symbol::Terminal('x')]);
    }

    #[test]
    fn empty_alternative_is_epsilon() {
        let g = Grammar::parse("S -> a |").unwrap();
        assert_eq!(rhs(&g, "S", 1), vec![Symbol::Epsilon]);
    }

    #[test]
    fn blank_input_gives_empty_grammar() {
        let g = Grammar::parse("  \n  ").unwrap();
        assert_eq!(g.validate(), Err(GrammarError::Empty));
    }

    #[test]
    #[should_panic]
    fn two_rightarrows_parse() {
        let _g = Grammar::parse("S -> a -> b").unwrap();
    }

    #[test]
    #[should_panic]
    fn no_previous_left_parse() {
        let _g = Grammar::parse("| a b\n S -> a").unwrap();
    }

    #[test]
    #[should_panic]
    fn left_contain_space() {
        let _g = Grammar::parse("S a S -> x").unwrap();
    }

    #[test]
    fn end_marker_is_reserved() {
        assert!(matches!(
            Grammar::parse("S -> a$"),
            Err(GrammarError::Syntax { line: 1, .. })
        ));
    }
}
