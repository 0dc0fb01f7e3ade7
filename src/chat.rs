//! Chat screen state: the message list and the mock assistant that echoes
//! each user message back after a fixed delay.
//!
//! Pending replies are owned by the session; dropping it cancels them, so a
//! reply never lands in a conversation that is no longer on screen.

use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, time::Duration};
use tokio::{
    sync::oneshot::{self, error::TryRecvError},
    task::JoinHandle,
};
use tracing::{debug, error};
use ulid::Ulid;

pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1500);
pub const INITIAL_AURA: u32 = 51;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Ulid,
    pub text: String,
    pub sender: Sender,
}

impl Message {
    fn new(text: String, sender: Sender) -> Self {
        Self {
            id: Ulid::new(),
            text,
            sender,
        }
    }
}

#[must_use]
pub fn mock_reply(text: &str) -> Message {
    Message::new(
        format!("That's an interesting thought! For now, I'm just a simple AI. You said: \"{text}\""),
        Sender::Ai,
    )
}

struct PendingReply {
    reply: oneshot::Receiver<Message>,
    task: JoinHandle<()>,
}

pub struct ChatSession {
    messages: Vec<Message>,
    has_sent_message: bool,
    aura: u32,
    reply_delay: Duration,
    // Reply tasks in send order; replies are appended front to back.
    pending: VecDeque<PendingReply>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY_DELAY)
    }
}

impl ChatSession {
    #[must_use]
    pub fn new(reply_delay: Duration) -> Self {
        Self {
            messages: Vec::new(),
            has_sent_message: false,
            aura: INITIAL_AURA,
            reply_delay,
            pending: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// `false` until the first message, while the screen shows its prompt.
    #[must_use]
    pub fn has_sent_message(&self) -> bool {
        self.has_sent_message
    }

    #[must_use]
    pub fn aura(&self) -> u32 {
        self.aura
    }

    #[must_use]
    pub fn pending_replies(&self) -> usize {
        self.pending.len()
    }

    /// Appends the trimmed input as a user message and schedules the reply.
    /// Blank input is ignored.
    ///
    /// Must be called from within a tokio runtime.
    pub fn send(&mut self, input: &str) -> Option<Message> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }

        self.has_sent_message = true;

        let message = Message::new(text.to_string(), Sender::User);
        self.messages.push(message.clone());

        let delay = self.reply_delay;
        let text = text.to_string();
        let (tx, reply) = oneshot::channel();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(mock_reply(&text));
        });
        self.pending.push_back(PendingReply { reply, task });

        debug!("message {} queued for reply", message.id);
        Some(message)
    }

    /// Waits for the oldest scheduled reply and appends it. Returns `None`
    /// when nothing is pending.
    pub async fn next_reply(&mut self) -> Option<&Message> {
        while let Some(pending) = self.pending.pop_front() {
            match pending.reply.await {
                Ok(reply) => {
                    self.messages.push(reply);
                    return self.messages.last();
                }
                Err(e) => error!("Reply task failed: {}", e),
            }
        }
        None
    }

    /// Appends the replies that are already due, stopping at the first one
    /// still pending so replies keep send order. Returns how many were added.
    pub fn collect_replies(&mut self) -> usize {
        let mut added = 0;
        while let Some(pending) = self.pending.front_mut() {
            match pending.reply.try_recv() {
                Ok(reply) => {
                    self.messages.push(reply);
                    added += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => error!("Reply task ended without a reply"),
            }
            self.pending.pop_front();
        }
        added
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        for pending in self.pending.drain(..) {
            pending.task.abort();
        }
    }
}
