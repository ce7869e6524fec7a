//! Interactive input
//!
//! Article bodies are written in `$EDITOR`; single values are read from a prompt.

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::Command;

/// Everything up to and including this line is dropped from the edited body
const BODY_MARKER: &str = "# ---- write the article below this line ----";

const FALLBACK_EDITORS: [&str; 6] = ["nano", "vim", "vi", "emacs", "code", "notepad"];

/// Scratch file removed when dropped, whatever the editor did
struct ScratchFile(PathBuf);

impl Drop for ScratchFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

/// Edit `initial_content` in the user's editor and return the saved text
pub fn edit_text(initial_content: &str) -> Result<String> {
    let editor = find_editor()?;
    let scratch = ScratchFile(env::temp_dir().join(format!("technova_draft_{}.md", std::process::id())));

    fs::write(&scratch.0, initial_content)
        .with_context(|| format!("Failed to create draft file: {:?}", scratch.0))?;

    let status = Command::new(&editor)
        .arg(&scratch.0)
        .status()
        .with_context(|| format!("Could not start editor '{}'", editor))?;
    if !status.success() {
        bail!("Editor '{}' failed ({}); the draft was discarded", editor, status);
    }

    fs::read_to_string(&scratch.0)
        .with_context(|| format!("Failed to read draft file: {:?}", scratch.0))
}

/// Write an article body in the editor, below a short markup cheat sheet
pub fn edit_body(title: &str) -> Result<String> {
    let template = format!(
        "# Title: {title}\n\
         # Markup: '# ' and '## ' headings, '> ' quotes, ![alt](url) images,\n\
         # [text](url) links, **bold** and _italic_.\n\
         {BODY_MARKER}\n"
    );
    let content = edit_text(&template)?;
    Ok(strip_template(&content))
}

fn strip_template(content: &str) -> String {
    content
        .split_once(BODY_MARKER)
        .map_or(content, |(_, body)| body)
        .trim()
        .to_string()
}

/// `$EDITOR`, then `$VISUAL`, then the first common editor on PATH
fn find_editor() -> Result<String> {
    let configured = ["EDITOR", "VISUAL"]
        .into_iter()
        .filter_map(|var| env::var(var).ok())
        .find(|editor| !editor.is_empty());
    if let Some(editor) = configured {
        return Ok(editor);
    }

    match FALLBACK_EDITORS.into_iter().find(|cmd| command_exists(cmd)) {
        Some(editor) => Ok(editor.to_string()),
        None => bail!("No editor found. Set $EDITOR, e.g. `export EDITOR=nano`, or pass --body"),
    }
}

fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .is_ok_and(|out| out.status.success())
}

/// Read one line from stdin, printing `label` first when attached to a terminal
pub fn prompt(label: &str) -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        print!("{label}: ");
        io::stdout().flush()?;
    }

    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn value_or_prompt(value: Option<String>, label: &str) -> Result<String> {
    value.map_or_else(|| prompt(label), Ok)
}
