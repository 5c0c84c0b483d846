//! Confirm-step collaborators.

use super::Confirmer;
use super::human::SharedLines;
use crate::orchestrator::{ConfirmChoice, ConfirmPrompt};
use anyhow::Result;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Reads the choice from the shared line source.
///
/// `c` or `change` swaps roles; any other line continues.
pub struct LineConfirmer {
    lines: SharedLines,
}

impl LineConfirmer {
    /// Creates a confirmer over `lines`.
    pub fn new(lines: SharedLines) -> Self {
        Self { lines }
    }
}

#[async_trait::async_trait]
impl Confirmer for LineConfirmer {
    async fn confirm(&mut self, prompt: &ConfirmPrompt) -> Result<ConfirmChoice> {
        info!(message = %prompt.message, "Awaiting confirmation");
        let mut lines = self.lines.lock().await;
        let Some(line) = lines.recv().await else {
            anyhow::bail!("Input channel closed");
        };
        let choice = match line.trim().to_lowercase().as_str() {
            "c" | "change" => ConfirmChoice::Change,
            _ => ConfirmChoice::Continue,
        };
        debug!(?choice, "Confirmation received");
        Ok(choice)
    }
}

/// Replays a fixed list of choices, then continues forever.
#[derive(Debug, Default)]
pub struct ScriptedConfirmer {
    choices: VecDeque<ConfirmChoice>,
    prompts: Vec<String>,
}

impl ScriptedConfirmer {
    /// Creates a confirmer that answers with `choices` in order.
    pub fn new(choices: impl IntoIterator<Item = ConfirmChoice>) -> Self {
        Self {
            choices: choices.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    /// Messages of all prompts seen so far.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

#[async_trait::async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&mut self, prompt: &ConfirmPrompt) -> Result<ConfirmChoice> {
        self.prompts.push(prompt.message.clone());
        Ok(self.choices.pop_front().unwrap_or(ConfirmChoice::Continue))
    }
}
