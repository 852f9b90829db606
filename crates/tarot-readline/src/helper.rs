use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use tarot_core::MAJOR_ARCANA;

pub const COMMANDS: [&str; 8] = [
    "/back", "/cards", "/help", "/history", "/new", "/random", "/resume", "/save",
];

/// Completes slash commands and card names.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
    card_names: Vec<String>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
            card_names: MAJOR_ARCANA.iter().map(|c| c.name.to_string()).collect(),
        }
    }

    fn candidates(&self, line: &str) -> Vec<String> {
        if line.starts_with('/') {
            self.commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .cloned()
                .collect()
        } else if line.is_empty() {
            Vec::new()
        } else {
            let lower = line.to_lowercase();
            self.card_names
                .iter()
                .filter(|name| name.to_lowercase().starts_with(&lower))
                .cloned()
                .collect()
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = self
            .candidates(&line[..pos])
            .into_iter()
            .map(|name| Pair {
                display: name.clone(),
                replacement: name,
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates() {
        let helper = CliHelper::new();
        assert_eq!(helper.candidates("/r"), vec!["/random", "/resume"]);
        assert_eq!(helper.candidates("the s"), vec!["The Star", "The Sun"]);
        assert!(helper.candidates("").is_empty());
    }
}
