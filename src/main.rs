mod cli;
mod session;

use std::{
    error::Error,
    fs,
    io::{self, BufRead},
};

use clap::Parser;
use log::{info, LevelFilter};
use serde::Serialize;

use cli::{Cli, Format, Output};
use ll1_slr_parser::{Analysis, AutomatonGraph, Grammar};
use session::Session;

fn render<T: Serialize>(
    format: Format,
    value: &T,
    plain: impl FnOnce() -> String,
    latex: impl FnOnce() -> String,
) -> serde_json::Result<String> {
    Ok(match format {
        Format::Plain => plain(),
        Format::Latex => latex(),
        Format::Json => serde_json::to_string(value)?,
    })
}

fn print_output(analysis: &Analysis, output: Output, format: Format) -> serde_json::Result<()> {
    let text = match output {
        Output::Prod => {
            let t = analysis.grammar().to_production_output_vec();
            render(format, &t, || t.to_plaintext(), || t.to_latex())?
        }
        Output::Ff => {
            let t = analysis.first_follow().to_non_terminal_output_vec();
            render(format, &t, || t.to_plaintext(), || t.to_latex())?
        }
        Output::Ll1 => {
            let t = analysis.ll1().to_output();
            render(format, &t, || t.to_plaintext(), || t.to_latex())?
        }
        Output::Lr0 => {
            let automaton = analysis.automaton();
            render(
                format,
                &automaton.to_output(),
                || automaton.to_plaintext(),
                || automaton.to_latex(),
            )?
        }
        Output::Slr => {
            let t = analysis.slr().to_output();
            render(format, &t, || t.to_plaintext(), || t.to_latex())?
        }
        Output::Graph => {
            let t = AutomatonGraph::new(analysis.automaton()).to_output();
            render(format, &t, || t.to_plaintext(), || t.to_plaintext())?
        }
    };
    println!("{}", text);
    Ok(())
}

/// Grammar lines from stdin up to the first blank line, so the strings to
/// analyze can follow on the same stream.
fn read_grammar_from_stdin() -> io::Result<String> {
    let mut lines = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let input = match &cli.file {
        Some(path) => fs::read_to_string(path)?,
        None => read_grammar_from_stdin()?,
    };

    let mut g = Grammar::parse(&input)?;
    if let Some(start) = &cli.start {
        g.set_start(start)?;
    }
    let analysis = Analysis::new(&g)?;
    info!("available parsers: {:?}", analysis.available_parsers());

    if !cli.outputs.is_empty() {
        for output in &cli.outputs {
            print_output(&analysis, *output, cli.format)?;
        }
        return Ok(());
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(&analysis, cli.tree, stdin.lock(), stdout.lock()).run(cli.parser)?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
