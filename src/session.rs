use std::io::{self, BufRead, Write};

use ll1_slr_parser::{Analysis, Conformance, ParserKind};
use log::debug;

const SELECT_PROMPT: &str = "Select a parser (T: for LL(1), B: for SLR(1), Q: quit):";
const INPUT_PROMPT: &str = "Enter a string to analyze or Q to quit:";

pub struct Session<'a, 'g, R, W> {
    analysis: &'a Analysis<'g>,
    show_tree: bool,
    input: R,
    output: W,
}

fn is_quit(line: &str) -> bool {
    line == "Q" || line == "q"
}

impl<'a, 'g, R: BufRead, W: Write> Session<'a, 'g, R, W> {
    pub fn new(analysis: &'a Analysis<'g>, show_tree: bool, input: R, output: W) -> Self {
        Self {
            analysis,
            show_tree,
            input,
            output,
        }
    }

    /// `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn answer(&mut self, kind: ParserKind, line: &str) -> io::Result<()> {
        if self.show_tree {
            match self.analysis.parse_with_tree(kind, line) {
                Some(tree) => write!(self.output, "yes\n{}", tree)?,
                None => writeln!(self.output, "no")?,
            }
        } else {
            let accepted = self.analysis.parse(kind, line);
            writeln!(self.output, "{}", if accepted { "yes" } else { "no" })?;
        }
        Ok(())
    }

    pub fn run(&mut self, preselected: Option<ParserKind>) -> io::Result<()> {
        let available = self.analysis.available_parsers();
        if let Some(kind) = preselected {
            if !available.contains(&kind) {
                writeln!(self.output, "The grammar is not {}.", kind)?;
                return Ok(());
            }
            return self.single(kind);
        }

        match self.analysis.conformance() {
            Conformance::Both => self.select(),
            Conformance::LL1Only => {
                writeln!(self.output, "The grammar is LL(1).")?;
                self.single(ParserKind::LL1)
            }
            Conformance::SLR1Only => {
                writeln!(self.output, "The grammar is SLR(1).")?;
                self.single(ParserKind::SLR1)
            }
            Conformance::Neither => {
                writeln!(
                    self.output,
                    "The grammar cannot be analyzed with either LL(1) or SLR(1)."
                )?;
                Ok(())
            }
        }
    }

    /// One string per line until Q.
    fn single(&mut self, kind: ParserKind) -> io::Result<()> {
        loop {
            writeln!(self.output, "{}", INPUT_PROMPT)?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(());
            };
            if is_quit(&line) {
                return Ok(());
            }
            if line.is_empty() {
                continue;
            }
            self.answer(kind, &line)?;
        }
    }

    /// Parser choice, then strings until a blank line, then choose again.
    fn select(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "{}", SELECT_PROMPT)?;
            self.output.flush()?;
            let Some(choice) = self.read_line()? else {
                return Ok(());
            };
            if is_quit(&choice) {
                return Ok(());
            }
            let kind = match choice.as_str() {
                "T" | "t" => ParserKind::LL1,
                "B" | "b" => ParserKind::SLR1,
                _ => continue,
            };
            debug!("selected {}", kind);

            loop {
                let Some(line) = self.read_line()? else {
                    return Ok(());
                };
                if line.is_empty() {
                    break;
                }
                self.answer(kind, &line)?;
            }
        }
    }
}
