use std::collections::HashSet;

use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    automaton_graph::AutomatonGraph,
    grammar::{ProductionId, Symbol},
    lr0::{LR0Item, LR0State},
    slr::Action,
    FirstFollow, Grammar, LL1Table, LR0Automaton, SLRTable, EPSILON,
};

fn symbol_to_latex(s: &str, terminal_set: &HashSet<String>) -> String {
    if s == EPSILON {
        "\\epsilon".to_string()
    } else if terminal_set.contains(s) {
        format!("\\text{{{}}}", escape::tex(s))
    } else {
        escape::tex(s).to_string()
    }
}

fn align_columns(output: &[Vec<String>]) -> String {
    let columns = output.first().map(|row| row.len()).unwrap_or(0);
    let width: Vec<usize> = (0..columns)
        .map(|j| {
            output
                .iter()
                .map(|row| row[j].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    output
        .iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<Vec<String>>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| right.join(" "))
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool, terminal_set: &HashSet<String>) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow &", escape::tex(self.left))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left))
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                right
                    .iter()
                    .map(|s| symbol_to_latex(s, terminal_set))
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");

        left + &right
    }
}

#[derive(Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
    #[serde(skip)]
    terminal_set: HashSet<String>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(
                self.productions
                    .iter()
                    .map(|s| s.to_latex(true, &self.terminal_set)),
            )
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    fn terminal_name_set(&self) -> HashSet<String> {
        self.terminal_iter().map(|t| t.to_string()).collect()
    }

    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .non_terminal_iter()
            .map(|nt| ProductionOutput {
                left: nt.name.as_str(),
                rights: self
                    .productions_of(nt.index)
                    .map(|id| self.production_to_vec_str(id))
                    .collect(),
            })
            .collect();
        ProductionOutputVec {
            productions,
            terminal_set: self.terminal_name_set(),
        }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<String>,
    follow: Vec<String>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.nullable,
            self.first.join(", "),
            self.follow.join(", ")
        )
    }

    fn to_latex(&self) -> String {
        fn f(a: &[String]) -> String {
            a.iter()
                .map(|s| {
                    if s == EPSILON {
                        r"$\epsilon$".to_string()
                    } else {
                        escape::tex(s.as_str()).to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(r"\ ")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl<'g> FirstFollow<'g> {
    pub fn to_non_terminal_output_vec(&self) -> NonTerminalOutputVec<'g> {
        let grammar = self.grammar();
        let data = grammar
            .non_terminal_iter()
            .map(|nt| NonTerminalOutput {
                name: nt.name.as_str(),
                nullable: self.nullable(nt.index),
                first: self.first(nt.index).iter().map(|s| s.to_string()).collect(),
                follow: self.follow(nt.index).iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}

#[derive(Serialize)]
pub struct LL1TableOutput<'a> {
    terminals: Vec<String>,
    rows: Vec<(&'a str, Vec<ProductionOutput<'a>>)>,
    #[serde(skip)]
    terminal_set: HashSet<String>,
}

impl LL1TableOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().cloned());
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(
                row.iter()
                    .map(|productions| productions.to_plaintext(left.chars().count(), false)),
            );
            output.push(line);
        }
        align_columns(&output)
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|t| format!("\\text{{{}}}", escape::tex(t.as_str()))),
        );
        let header = header.join(" & ");

        let output = self
            .rows
            .iter()
            .map(|(left, row)| {
                let mut line: Vec<String> = vec![escape::tex(*left).to_string()];
                line.extend(row.iter().map(|productions| {
                    let cell = productions.to_latex(false, &self.terminal_set);
                    if productions.rights.len() > 1 {
                        format!("{{\\color{{red}}{}}}", cell)
                    } else {
                        cell
                    }
                }));
                line.join(" & ")
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }
}

impl<'g> LL1Table<'g> {
    /// Conflicting cells list every candidate production.
    pub fn to_output(&self) -> LL1TableOutput<'g> {
        let grammar = self.grammar();
        let terminals: Vec<Symbol> = grammar.terminal_iter().collect();

        let rows = grammar
            .non_terminal_iter()
            .map(|nt| {
                let left = nt.name.as_str();
                let row = terminals
                    .iter()
                    .map(|t| ProductionOutput {
                        left,
                        rights: self
                            .candidates(nt.index, t)
                            .into_iter()
                            .map(|id| grammar.production_to_vec_str(id))
                            .collect(),
                    })
                    .collect();
                (left, row)
            })
            .collect();

        LL1TableOutput {
            terminals: terminals.iter().map(|t| t.to_string()).collect(),
            rows,
            terminal_set: grammar.terminal_name_set(),
        }
    }
}

#[derive(Serialize)]
pub struct StateOutput {
    id: usize,
    items: Vec<String>,
    transitions: Vec<(String, usize)>,
}

#[derive(Serialize)]
pub struct AutomatonOutput {
    states: Vec<StateOutput>,
    start: usize,
}

impl LR0Automaton<'_> {
    fn item_to_latex(&self, item: &LR0Item) -> String {
        let mut right: Vec<String> = self
            .body(item.rule)
            .iter()
            .map(|s| escape::tex(s.to_string()).to_string())
            .collect();
        right.insert(item.dot.min(right.len()), ".".to_string());
        format!(
            "${} \\rightarrow {}$",
            escape::tex(self.left(item.rule)),
            right.join(" ")
        )
    }

    /// Kernel items first, then the ones added by closure.
    fn split_items<'s>(&self, state: &'s LR0State) -> (Vec<&'s LR0Item>, Vec<&'s LR0Item>) {
        state
            .items
            .iter()
            .partition(|item| {
                item.dot > 0 || (state.id == 0 && self.left(item.rule) == self.augmented_start())
            })
    }

    fn state_to_plaintext(&self, state: &LR0State) -> String {
        let (kernel, extend) = self.split_items(state);
        let kernel = kernel
            .iter()
            .map(|c| self.item_to_string(c))
            .collect::<Vec<_>>()
            .join("\n");

        let extend = if !extend.is_empty() {
            format!(
                "\n---\n{}",
                extend
                    .iter()
                    .map(|c| self.item_to_string(c))
                    .collect::<Vec<_>>()
                    .join("\n")
            )
        } else {
            String::new()
        };

        let edges = if !state.transitions.is_empty() {
            format!(
                "\n===\n{}",
                state
                    .transitions
                    .iter()
                    .map(|(k, v)| format!("- {} -> {}", k, v))
                    .collect::<Vec<_>>()
                    .join("\n")
            )
        } else {
            String::new()
        };

        format!("{}{}{}", kernel, extend, edges)
    }

    pub fn to_plaintext(&self) -> String {
        let states = self
            .states()
            .iter()
            .map(|s| format!("I{}\n{}", s.id, self.state_to_plaintext(s)))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!("{}\n\nstart: 0", states)
    }

    fn node_to_latex(&self, state: &LR0State) -> String {
        let id = state.id;
        let content = state
            .items
            .iter()
            .map(|e| self.item_to_latex(e))
            .collect::<Vec<_>>()
            .join(" \\\\ \n");
        format!(
            "\\node [block] (I_{}){}\n{{\n$I_{}$\\\\\n{}\n}};",
            id,
            if id > 0 {
                if id % 2 == 0 {
                    format!(" [below of = I_{}] ", id - 2)
                } else {
                    format!(" [right of = I_{}] ", id - 1)
                }
            } else {
                String::new()
            },
            id,
            content
        )
    }

    fn edge_to_latex(&self, state: &LR0State) -> String {
        let id = state.id;
        state
            .transitions
            .iter()
            .map(|(e, v)| {
                format!(
                    "\\path [->] (I_{}) edge {} node [above]{{{}}} (I_{});",
                    id,
                    if id == *v { "[loop left]" } else { "[right]" },
                    escape::tex(e.to_string()),
                    v
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        format!(
            "\\begin{{tikzpicture}}[node distance=5cm,block/.style={{state, rectangle, text width=6em}}]\n{}\n\\end{{tikzpicture}}",
            self.states()
                .iter()
                .map(|s| self.node_to_latex(s))
                .chain(self.states().iter().map(|s| self.edge_to_latex(s)))
                .collect::<Vec<_>>()
                .join("\n")
        )
    }

    pub fn to_output(&self) -> AutomatonOutput {
        AutomatonOutput {
            states: self
                .states()
                .iter()
                .map(|s| StateOutput {
                    id: s.id,
                    items: s.items.iter().map(|i| self.item_to_string(i)).collect(),
                    transitions: s
                        .transitions
                        .iter()
                        .map(|(symbol, &v)| (symbol.to_string(), v))
                        .collect(),
                })
                .collect(),
            start: 0,
        }
    }
}

#[derive(Serialize)]
pub struct GraphOutput {
    reachable: Vec<usize>,
    unreachable: Vec<usize>,
    dead_end: Vec<usize>,
    has_cycle: bool,
    in_degree: Vec<usize>,
    out_degree: Vec<usize>,
    components: Vec<Vec<usize>>,
}

impl GraphOutput {
    pub fn to_plaintext(&self) -> String {
        fn list(a: &[usize]) -> String {
            a.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
        }

        [
            format!("reachable: {}", list(&self.reachable)),
            format!("unreachable: {}", list(&self.unreachable)),
            format!("dead end: {}", list(&self.dead_end)),
            format!("cycle: {}", self.has_cycle),
            format!("in degree: {}", list(&self.in_degree)),
            format!("out degree: {}", list(&self.out_degree)),
            format!(
                "components: {}",
                self.components
                    .iter()
                    .map(|c| format!("{{{}}}", list(c)))
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
        ]
        .join("\n")
    }
}

impl AutomatonGraph<'_, '_> {
    pub fn to_output(&self) -> GraphOutput {
        let (unreachable, dead_end) = self.useless_states();
        GraphOutput {
            reachable: self.reachable(0).into_iter().collect(),
            unreachable: unreachable.into_iter().collect(),
            dead_end: dead_end.into_iter().collect(),
            has_cycle: self.has_cycle(0),
            in_degree: self.in_degree(),
            out_degree: self.out_degree(),
            components: self.strongly_connected_components(),
        }
    }
}

impl Action {
    fn to_plaintext(self, grammar: &Grammar) -> String {
        match self {
            Action::Reduce(id) => format!("r({})", grammar.production_to_string(id)),
            Action::Shift(s) => format!("s{}", s),
            Action::Accept => "acc".to_string(),
        }
    }

    fn to_latex(self, grammar: &Grammar, terminal_set: &HashSet<String>) -> String {
        match self {
            Action::Reduce(id) => format!(
                "reduce ${} \\rightarrow {}$",
                escape::tex(grammar.left_name(id)),
                production_to_latex(grammar, id, terminal_set)
            ),
            Action::Shift(s) => format!("shift {}", s),
            Action::Accept => "accept".to_string(),
        }
    }
}

fn production_to_latex(grammar: &Grammar, id: ProductionId, terminal_set: &HashSet<String>) -> String {
    grammar
        .production_to_vec_str(id)
        .iter()
        .map(|s| symbol_to_latex(s, terminal_set))
        .collect::<Vec<_>>()
        .join(" \\  ")
}

#[derive(Serialize)]
pub struct SLRTableOutput {
    terminals: Vec<String>,
    non_terminals: Vec<String>,
    action: Vec<Vec<Vec<String>>>,
    #[serde(skip)]
    action_latex: Vec<Vec<Vec<String>>>,
    goto: Vec<Vec<Option<usize>>>,
}

impl SLRTableOutput {
    pub fn to_plaintext(&self) -> String {
        let mut output: Vec<Vec<String>> = Vec::new();

        output.push(vec![String::new()]);
        for s in self.terminals.iter().chain(self.non_terminals.iter()) {
            output[0].push(s.clone());
        }

        for (r1, r2) in self.action.iter().zip(self.goto.iter()) {
            let i = output.len() - 1;
            let row: Vec<String> = std::iter::once(i.to_string())
                .chain(r1.iter().map(|actions| actions.join("; ")))
                .chain(r2.iter().map(|goto| match goto {
                    Some(goto) => goto.to_string(),
                    None => String::new(),
                }))
                .collect::<Vec<_>>();
            output.push(row);
        }

        align_columns(&output)
    }

    pub fn to_latex(&self) -> String {
        let header: String = format!(
            "\\begin{{tabular}}{{c{}}}\n & \\multicolumn{{{}}}{{c}}{{action}} & \\multicolumn{{{}}}{{|c}}{{goto}}\\\\",
            "|l".repeat(self.terminals.len() + self.non_terminals.len()),
            self.terminals.len(),
            self.non_terminals.len(),
        );

        let mut first_row: Vec<String> = vec![String::new()];
        for s in self.terminals.iter().chain(self.non_terminals.iter()) {
            first_row.push(escape::tex(s.as_str()).to_string());
        }
        let first_row = first_row.join(" & ");

        let content = self
            .action_latex
            .iter()
            .zip(self.goto.iter())
            .enumerate()
            .map(|(i, (r1, r2))| {
                std::iter::once(i.to_string())
                    .chain(r1.iter().map(|actions| {
                        let r = actions.join("; ");
                        if actions.len() > 1 {
                            format!("{{\\color{{red}}{}}}", r)
                        } else {
                            r
                        }
                    }))
                    .chain(r2.iter().map(|goto| match goto {
                        Some(goto) => goto.to_string(),
                        None => String::new(),
                    }))
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect::<Vec<_>>()
            .join(" \\\\\n");

        format!(
            "{}\n{} \\\\\\hline\n{}\n\\end{{tabular}}",
            header, first_row, content
        )
    }
}

impl SLRTable<'_> {
    pub fn to_output(&self) -> SLRTableOutput {
        let grammar = self.grammar();
        let terminals: Vec<Symbol> = grammar.terminal_iter().collect();
        let terminal_set = grammar.terminal_name_set();
        let states = self.automaton().states();

        let cells = |render: &dyn Fn(Action) -> String| -> Vec<Vec<Vec<String>>> {
            states
                .iter()
                .map(|s| {
                    terminals
                        .iter()
                        .map(|t| self.candidates(s.id, t).into_iter().map(render).collect())
                        .collect()
                })
                .collect()
        };

        SLRTableOutput {
            terminals: terminals.iter().map(|t| t.to_string()).collect(),
            non_terminals: grammar.non_terminal_iter().map(|nt| nt.name.clone()).collect(),
            action: cells(&|a| a.to_plaintext(grammar)),
            action_latex: cells(&|a| a.to_latex(grammar, &terminal_set)),
            goto: states
                .iter()
                .map(|s| {
                    grammar
                        .non_terminal_iter()
                        .map(|nt| self.goto(s.id, &nt.name))
                        .collect()
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::{automaton_graph::AutomatonGraph, Analysis, Grammar};

    #[test]
    fn production_listing() {
        let g = Grammar::parse("S -> aSb | ε\nAB -> c").unwrap();
        assert_eq!(
            g.to_production_output_vec().to_plaintext(),
            " S -> a S b\n    | ε\nAB -> c"
        );
        assert!(g
            .to_production_output_vec()
            .to_latex()
            .contains("S & \\rightarrow &\\text{a} \\ S \\ \\text{b} \\mid \\epsilon"));
    }

    #[test]
    fn first_follow_listing() {
        let g = Grammar::parse("S -> aSb | ε").unwrap();
        let analysis = Analysis::new(&g).unwrap();
        let output = analysis.first_follow().to_non_terminal_output_vec();
        assert_eq!(output.to_plaintext(), "S | true | a, ε | b, $");
        assert_eq!(
            output.to_json().unwrap(),
            r#"{"data":[{"name":"S","nullable":true,"first":["a","ε"],"follow":["b","$"]}]}"#
        );
    }

    #[test]
    fn ll1_table_listing() {
        let g = Grammar::parse("S -> aSb | ε").unwrap();
        let analysis = Analysis::new(&g).unwrap();
        assert_eq!(
            analysis.ll1().to_output().to_plaintext(),
            "  |          a |      b |      $\nS | S -> a S b | S -> ε | S -> ε"
        );
    }

    #[test]
    fn conflicting_cells_show_every_candidate() {
        let g = Grammar::parse("S -> aA | aB\nA -> c\nB -> d").unwrap();
        let analysis = Analysis::new(&g).unwrap();
        let text = analysis.ll1().to_output().to_plaintext();
        assert!(text.contains("S -> a A | a B"));
        assert!(analysis.ll1().to_output().to_latex().contains("\\color{red}"));
    }

    #[test]
    fn slr_table_listing() {
        let g = Grammar::parse("S -> aSb | ε").unwrap();
        let analysis = Analysis::new(&g).unwrap();
        let text = analysis.slr().to_output().to_plaintext();
        assert!(text.contains("acc"));
        assert!(text.contains("r(S -> ε)"));
        assert!(text.contains("r(S -> a S b)"));
        assert_eq!(text.lines().count(), analysis.automaton().states().len() + 1);
        assert!(analysis.slr().to_output().to_latex().contains("reduce $S \\rightarrow \\epsilon$"));
    }

    #[test]
    fn automaton_listing() {
        let g = Grammar::parse("S -> aSb | ε").unwrap();
        let analysis = Analysis::new(&g).unwrap();
        let text = analysis.automaton().to_plaintext();
        assert!(text.starts_with("I0\nS' -> · S\n---\n"));
        assert!(text.ends_with("start: 0"));
        assert!(analysis.automaton().to_latex().contains("\\node [block] (I_0)"));

        let graph = AutomatonGraph::new(analysis.automaton()).to_output();
        // the state reached on a loops back to itself on a
        assert!(graph.to_plaintext().contains("cycle: true"));
    }
}
