//! Interactive command loop and dispatch.
//!
//! One command at a time: each line blocks on its registry calls before the
//! next prompt. Registry errors are reported and the session continues;
//! only `exit` (or end of input) ends the run.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use drrmi_registry::RegistryClient;
use parking_lot::Mutex;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing::debug;

use crate::complete::ShellHelper;
use crate::session::SessionState;

/// One parsed shell line.
#[derive(Debug, Parser)]
#[command(multicall = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

/// Available shell commands.
#[derive(Debug, Subcommand)]
enum ShellCommand {
    /// List all repositories and their tags
    Tree,

    /// List repositories
    Ls,

    /// List the tags of a repository
    Tags {
        /// Repository name
        name: String,
    },

    /// Delete image tags (resolves each tag to its digest first)
    Rmi {
        /// Repository name
        name: String,
        /// Tags to delete
        #[arg(required = true)]
        tags: Vec<String>,
    },

    /// Exit the session
    Exit,
}

/// Whether the loop should keep reading lines.
#[derive(Debug, PartialEq, Eq)]
pub enum ShellOutcome {
    /// Read the next line.
    Continue,
    /// Terminate the session.
    Exit,
}

/// Command dispatcher over the registry client and session cache.
pub struct Shell<W> {
    client: RegistryClient,
    session: Arc<Mutex<SessionState>>,
    out: W,
}

impl<W: Write> Shell<W> {
    /// Creates a shell writing its command output to `out`.
    pub fn new(client: RegistryClient, session: Arc<Mutex<SessionState>>, out: W) -> Self {
        Self {
            client,
            session,
            out,
        }
    }

    /// Parses and executes one input line.
    ///
    /// Unknown commands and bad arguments are reported on `out` and the
    /// session continues; registry failures bubble up to the caller, which
    /// likewise keeps the session alive.
    pub async fn handle_line(&mut self, line: &str) -> Result<ShellOutcome> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Ok(ShellOutcome::Continue);
        }

        let parsed = match ShellLine::try_parse_from(words.iter().copied()) {
            Ok(parsed) => parsed,
            Err(err) => {
                write!(self.out, "{err}")?;
                return Ok(ShellOutcome::Continue);
            }
        };

        match parsed.command {
            ShellCommand::Tree => self.tree().await?,
            ShellCommand::Ls => self.ls().await?,
            ShellCommand::Tags { name } => self.tags(&name).await?,
            ShellCommand::Rmi { name, tags } => self.rmi(&name, &tags).await?,
            ShellCommand::Exit => return Ok(ShellOutcome::Exit),
        }

        Ok(ShellOutcome::Continue)
    }

    /// Prints every repository with its sorted tags nested beneath it.
    async fn tree(&mut self) -> Result<()> {
        let repositories = self.client.list_repositories().await?;
        self.session.lock().set_repositories(repositories.clone());

        for name in &repositories {
            writeln!(self.out, "{name}")?;
            let tags = self.client.list_tags(name).await?;
            let sorted = self.session.lock().cache_tags(name, tags).to_vec();
            for tag in &sorted {
                writeln!(self.out, "    {tag}")?;
            }
        }

        Ok(())
    }

    /// Refreshes and prints the repository list.
    async fn ls(&mut self) -> Result<()> {
        let repositories = self.client.list_repositories().await?;
        writeln!(self.out, "{}", repositories.join(" "))?;
        self.session.lock().set_repositories(repositories);
        Ok(())
    }

    /// Prints the sorted tags of a previously listed repository.
    ///
    /// A name absent from the last repository listing is a silent no-op;
    /// `ls` or `tree` must run first. Intentional, pinned by test.
    async fn tags(&mut self, name: &str) -> Result<()> {
        if !self.session.lock().has_repository(name) {
            debug!(name, "repository not in last listing; ignoring");
            return Ok(());
        }

        let tags = self.client.list_tags(name).await?;
        let sorted = self.session.lock().cache_tags(name, tags).to_vec();
        writeln!(self.out, "{}", sorted.join(" "))?;
        Ok(())
    }

    /// Deletes tags one by one, confirming each accepted deletion.
    ///
    /// A tag with no resolvable digest, or a delete the registry answers
    /// with anything but 202, is skipped without output so that a batch
    /// keeps going past individual failures.
    async fn rmi(&mut self, name: &str, tags: &[String]) -> Result<()> {
        for tag in tags {
            let Some(digest) = self.client.digest(name, tag).await? else {
                debug!(name, %tag, "tag has no digest; skipping");
                continue;
            };

            if self.client.delete_manifest(name, &digest).await? {
                writeln!(self.out, "rmi {name} {tag}")?;
            }
        }

        Ok(())
    }
}

/// Runs the interactive loop until `exit` or end of input.
///
/// Ctrl-C clears the current line and returns to the prompt; Ctrl-D behaves
/// like `exit`.
pub async fn run(client: RegistryClient) -> Result<()> {
    let session = Arc::new(Mutex::new(SessionState::default()));

    let mut editor: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(ShellHelper::new(Arc::clone(&session))));

    let mut shell = Shell::new(client, session, std::io::stdout());

    loop {
        match editor.readline("DRRMI> ") {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                match shell.handle_line(&line).await {
                    Ok(ShellOutcome::Continue) => {}
                    Ok(ShellOutcome::Exit) => break,
                    Err(err) => eprintln!("{err:#}"),
                }
            }
            Err(ReadlineError::Interrupted) => {}
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}
