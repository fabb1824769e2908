//! Terminal-backed [`Console`] for the review loop.

use async_trait::async_trait;
use llm_mend_core::contract::Console;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Presents proposals on stdout and reads decisions line by line from stdin.
///
/// Each prompt names the item it is about. The review loop keeps one item's prompts
/// together; the lock here only keeps a prompt and its answer paired.
pub struct StdinConsole {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl StdinConsole {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for StdinConsole {
    fn default() -> Self {
        Self::new()
    }
}

fn prompt_line(item: &Path, prompt: &str) -> String {
    format!("[{}] {}", item.display(), prompt)
}

#[async_trait]
impl Console for StdinConsole {
    async fn show_proposal(&self, item: &Path, proposal: &str) -> std::io::Result<()> {
        let mut out = tokio::io::stdout();
        let text = format!("AI's suggestion for {}:\n{}\n", item.display(), proposal);
        out.write_all(text.as_bytes()).await?;
        out.flush().await
    }

    async fn read_line(&self, item: &Path, prompt: &str) -> std::io::Result<Option<String>> {
        let mut lines = self.lines.lock().await;
        let mut out = tokio::io::stdout();
        out.write_all(prompt_line(item, prompt).as_bytes()).await?;
        out.flush().await?;
        lines.next_line().await
    }
}
