//! In-memory thread store.
//!
//! Every mutation goes through [`ThreadStore::apply`] so the inbox has one
//! ordered stream of state changes.

use std::collections::{HashMap, HashSet};

use super::{
    message::{DeliveryState, Message},
    thread::Thread,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreAction {
    ThreadsReplaced(Vec<Thread>),
    MessagesLoaded {
        thread_id: String,
        messages: Vec<Message>,
    },
    MessageAppended {
        thread_id: String,
        message: Message,
    },
    MessageConfirmed {
        thread_id: String,
        correlation_id: String,
        message: Message,
    },
    /// The backend accepted the message without returning a stored copy;
    /// the provisional record stays, marked confirmed.
    MessageAccepted {
        thread_id: String,
        correlation_id: String,
    },
    MessageFailed {
        thread_id: String,
        correlation_id: String,
    },
    UnreadCleared {
        thread_id: String,
    },
}

impl StoreAction {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreAction::ThreadsReplaced(_) => "threads_replaced",
            StoreAction::MessagesLoaded { .. } => "messages_loaded",
            StoreAction::MessageAppended { .. } => "message_appended",
            StoreAction::MessageConfirmed { .. } => "message_confirmed",
            StoreAction::MessageAccepted { .. } => "message_accepted",
            StoreAction::MessageFailed { .. } => "message_failed",
            StoreAction::UnreadCleared { .. } => "unread_cleared",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThreadStore {
    threads: HashMap<String, Thread>,
    order: Vec<String>,
}

impl ThreadStore {
    pub fn get(&self, thread_id: &str) -> Option<&Thread> {
        self.threads.get(thread_id)
    }

    pub fn contains(&self, thread_id: &str) -> bool {
        self.threads.contains_key(thread_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Threads in the order the backend listed them.
    pub fn threads(&self) -> impl Iterator<Item = &Thread> {
        self.order.iter().filter_map(|id| self.threads.get(id))
    }

    pub fn position(&self, thread_id: &str) -> Option<usize> {
        self.order.iter().position(|id| id == thread_id)
    }

    pub fn thread_at(&self, index: usize) -> Option<&Thread> {
        self.order.get(index).and_then(|id| self.threads.get(id))
    }

    pub fn messages(&self, thread_id: &str) -> &[Message] {
        self.threads
            .get(thread_id)
            .map(|thread| thread.messages.as_slice())
            .unwrap_or_default()
    }

    /// Applies one action. Returns `false` when the action targeted an
    /// unknown thread or changed nothing.
    pub fn apply(&mut self, action: StoreAction) -> bool {
        let kind = action.kind();
        let applied = match action {
            StoreAction::ThreadsReplaced(threads) => {
                self.replace_threads(threads);
                true
            }
            StoreAction::MessagesLoaded {
                thread_id,
                messages,
            } => self.with_thread(&thread_id, |thread| {
                merge_loaded(thread, messages);
                true
            }),
            StoreAction::MessageAppended { thread_id, message } => {
                self.with_thread(&thread_id, |thread| {
                    thread.messages.push(message);
                    true
                })
            }
            StoreAction::MessageConfirmed {
                thread_id,
                correlation_id,
                message,
            } => self.with_thread(&thread_id, |thread| {
                confirm_message(thread, &correlation_id, message)
            }),
            StoreAction::MessageAccepted {
                thread_id,
                correlation_id,
            } => self.with_thread(&thread_id, |thread| {
                mark_delivery(thread, &correlation_id, DeliveryState::Confirmed)
            }),
            StoreAction::MessageFailed {
                thread_id,
                correlation_id,
            } => self.with_thread(&thread_id, |thread| {
                mark_delivery(thread, &correlation_id, DeliveryState::Failed)
            }),
            StoreAction::UnreadCleared { thread_id } => self.with_thread(&thread_id, |thread| {
                let changed = thread.unread_count != 0;
                thread.unread_count = 0;
                changed
            }),
        };

        if !applied {
            tracing::debug!(action = kind, "store action had no effect");
        }

        applied
    }

    fn with_thread<F>(&mut self, thread_id: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut Thread) -> bool,
    {
        match self.threads.get_mut(thread_id) {
            Some(thread) => mutate(thread),
            None => false,
        }
    }

    fn replace_threads(&mut self, threads: Vec<Thread>) {
        let mut previous = std::mem::take(&mut self.threads);
        self.order.clear();

        for mut thread in threads {
            if self.threads.contains_key(&thread.id) {
                continue;
            }

            // Messages are fetched once per session; a list refresh keeps them.
            if let Some(existing) = previous.remove(&thread.id) {
                if !existing.messages.is_empty() {
                    thread.messages = existing.messages;
                }
            }

            self.order.push(thread.id.clone());
            self.threads.insert(thread.id.clone(), thread);
        }
    }
}

fn merge_loaded(thread: &mut Thread, loaded: Vec<Message>) {
    let loaded_ids: HashSet<String> = loaded
        .iter()
        .filter_map(|m| m.id.durable().map(str::to_owned))
        .collect();

    let local_only: Vec<Message> = std::mem::take(&mut thread.messages)
        .into_iter()
        .filter(|m| {
            m.is_provisional() || m.id.durable().is_some_and(|id| !loaded_ids.contains(id))
        })
        .collect();

    thread.messages = loaded;
    thread.messages.extend(local_only);
}

fn mark_delivery(thread: &mut Thread, correlation_id: &str, delivery: DeliveryState) -> bool {
    let Some(message) = thread
        .messages
        .iter_mut()
        .find(|m| m.id.correlation_id() == Some(correlation_id))
    else {
        return false;
    };
    message.delivery = delivery;
    true
}

fn confirm_message(thread: &mut Thread, correlation_id: &str, mut confirmed: Message) -> bool {
    confirmed.delivery = DeliveryState::Confirmed;

    let provisional_index = thread
        .messages
        .iter()
        .position(|m| m.id.correlation_id() == Some(correlation_id));

    let already_present = confirmed.id.durable().is_some_and(|durable| {
        thread
            .messages
            .iter()
            .any(|m| m.id.durable() == Some(durable))
    });

    match (provisional_index, already_present) {
        (Some(index), true) => {
            thread.messages.remove(index);
            true
        }
        (Some(index), false) => {
            thread.messages[index] = confirmed;
            true
        }
        (None, false) => {
            thread.messages.push(confirmed);
            true
        }
        (None, true) => false,
    }
}
