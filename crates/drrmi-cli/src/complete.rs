//! Tab-completion over the session cache.
//!
//! Suggests repository names for the first argument of `tags`/`rmi` and
//! previously-cached, not-yet-used tag names for the remaining `rmi`
//! arguments. Purely a UX aid; candidate selection is a pure function over
//! the session state so it can be tested without a terminal.

use std::sync::Arc;

use parking_lot::Mutex;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::session::SessionState;

const COMMANDS: &[&str] = &["exit", "help", "ls", "rmi", "tags", "tree"];

/// Rustyline helper backed by the shared session state.
pub struct ShellHelper {
    session: Arc<Mutex<SessionState>>,
}

impl ShellHelper {
    /// Creates a helper over the shell's session state.
    pub fn new(session: Arc<Mutex<SessionState>>) -> Self {
        Self { session }
    }
}

/// Returns the start offset of the word being completed and its candidates.
fn candidates(session: &SessionState, line: &str, pos: usize) -> (usize, Vec<String>) {
    let line = &line[..pos];
    let word_start = line.rfind(' ').map_or(0, |i| i + 1);
    let prefix = &line[word_start..];
    let words: Vec<&str> = line[..word_start].split_whitespace().collect();

    let candidates = match (words.first().copied(), words.len()) {
        (_, 0) => COMMANDS
            .iter()
            .filter(|c| c.starts_with(prefix))
            .map(ToString::to_string)
            .collect(),
        (Some("tags" | "rmi"), 1) => session.repository_candidates(prefix),
        (Some("rmi"), _) => session.tag_candidates(words[1], prefix, &words[2..]),
        _ => Vec::new(),
    };

    (word_start, candidates)
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let session = self.session.lock();
        let (start, words) = candidates(&session, line, pos);
        let pairs = words
            .into_iter()
            .map(|word| Pair {
                display: word.clone(),
                replacement: word,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
