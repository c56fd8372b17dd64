use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ll1_slr_parser::ParserKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Output {
    /// Productions
    Prod,
    /// Nullable, FIRST and FOLLOW sets
    Ff,
    /// LL(1) parsing table
    Ll1,
    /// LR(0) automaton
    Lr0,
    /// SLR(1) parsing table
    Slr,
    /// Reachability, cycles and components of the LR(0) automaton
    Graph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    #[default]
    Plain,
    Latex,
    Json,
}

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// File containing the grammar (default: stdin, up to the first blank line)
    pub file: Option<PathBuf>,

    /// Tables to print instead of starting the interactive session
    #[arg(short, long = "output", value_name = "WHAT")]
    pub outputs: Vec<Output>,

    #[arg(short, long, value_enum, default_value_t = Format::Plain)]
    pub format: Format,

    /// Start symbol (default: first left side in the file)
    #[arg(short, long, value_name = "SYMBOL")]
    pub start: Option<String>,

    /// Parser to use without asking (ll1 or slr)
    #[arg(short, long, value_name = "PARSER")]
    pub parser: Option<ParserKind>,

    /// Print the parse tree of every accepted string
    #[arg(short, long)]
    pub tree: bool,

    /// Log analysis steps at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_outputs() {
        let cli = Cli::parse_from(["ll1-slr-parser", "-o", "ff", "-o", "slr", "-f", "json", "g.txt"]);
        assert_eq!(cli.outputs, vec![Output::Ff, Output::Slr]);
        assert_eq!(cli.format, Format::Json);
        assert_eq!(cli.file, Some(PathBuf::from("g.txt")));
    }

    #[test]
    fn interactive_defaults() {
        let cli = Cli::parse_from(["ll1-slr-parser", "-p", "slr", "-t"]);
        assert!(cli.outputs.is_empty());
        assert_eq!(cli.format, Format::Plain);
        assert_eq!(cli.parser, Some(ParserKind::SLR1));
        assert!(cli.tree);
        assert!(cli.file.is_none());
    }

    #[test]
    fn unknown_parser_is_rejected() {
        assert!(Cli::try_parse_from(["ll1-slr-parser", "-p", "lalr"]).is_err());
    }
}
