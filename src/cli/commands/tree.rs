//! Step tree preview.

use super::{current_settings, print_json};
use crate::cli::TreeArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{TextFormatOptions, TreeOutput, render_tree};
use crate::source::{HttpClient, fetch_text};
use crate::tree::StepTree;
use std::io::{self, IsTerminal};

/// Execute the tree command.
///
/// # Errors
///
/// Returns an error if the log cannot be fetched.
pub fn execute(args: &TreeArgs, json: bool, overrides: &CliOverrides) -> Result<()> {
    let settings = current_settings(overrides)?;
    let client = HttpClient::new(settings.credentials, settings.timeout);
    let tree = StepTree::from_log(&fetch_text(&args.source, &client)?);

    if json {
        return print_json(&TreeOutput::from(tree));
    }

    if tree.roots.is_empty() {
        println!("No steps found.");
        return Ok(());
    }

    let options = if io::stdout().is_terminal() {
        TextFormatOptions::for_terminal()
    } else {
        TextFormatOptions::plain()
    };
    println!("{}", render_tree(&tree, options));
    Ok(())
}
