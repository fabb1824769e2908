#![allow(dead_code)]

use async_trait::async_trait;
use llm_mend_core::contract::Console;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Console that answers prompts from a per-file script and records everything shown.
#[derive(Default)]
pub struct ScriptedConsole {
    replies: Mutex<HashMap<String, VecDeque<String>>>,
    shown: Mutex<Vec<(PathBuf, String)>>,
    prompts: Mutex<Vec<(PathBuf, String)>>,
}

fn key(item: &Path) -> String {
    item.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for the file named `file_name`, answered in order.
    pub fn script(self, file_name: &str, replies: &[&str]) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(file_name.to_string(), replies.iter().map(|r| r.to_string()).collect());
        self
    }

    pub fn shown(&self) -> Vec<(PathBuf, String)> {
        self.shown.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<(PathBuf, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn show_proposal(&self, item: &Path, proposal: &str) -> std::io::Result<()> {
        self.shown
            .lock()
            .unwrap()
            .push((item.to_path_buf(), proposal.to_string()));
        Ok(())
    }

    async fn read_line(&self, item: &Path, prompt: &str) -> std::io::Result<Option<String>> {
        self.prompts
            .lock()
            .unwrap()
            .push((item.to_path_buf(), prompt.to_string()));
        tokio::task::yield_now().await;
        Ok(self
            .replies
            .lock()
            .unwrap()
            .get_mut(&key(item))
            .and_then(|queue| queue.pop_front()))
    }
}

pub fn write_file(dir: &Path, rel: &str, content: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

pub fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

/// Console fed from one ordered stream of lines, like a real terminal: whichever prompt
/// reads next gets the next line, regardless of the item it belongs to.
#[derive(Default)]
pub struct SharedInputConsole {
    lines: Mutex<VecDeque<String>>,
    events: Mutex<Vec<(PathBuf, String)>>,
}

impl SharedInputConsole {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: Mutex::new(lines.iter().map(|l| l.to_string()).collect()),
            events: Mutex::default(),
        }
    }

    /// Every show and prompt, in the order they happened.
    pub fn events(&self) -> Vec<(PathBuf, String)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Console for SharedInputConsole {
    async fn show_proposal(&self, item: &Path, _proposal: &str) -> std::io::Result<()> {
        self.events
            .lock()
            .unwrap()
            .push((item.to_path_buf(), "show".to_string()));
        tokio::task::yield_now().await;
        Ok(())
    }

    async fn read_line(&self, item: &Path, prompt: &str) -> std::io::Result<Option<String>> {
        self.events
            .lock()
            .unwrap()
            .push((item.to_path_buf(), prompt.to_string()));
        tokio::task::yield_now().await;
        Ok(self.lines.lock().unwrap().pop_front())
    }
}
