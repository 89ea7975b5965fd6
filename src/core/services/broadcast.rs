use crate::{
    core::{directory::UserId, workflow::ConfirmedBroadcast},
    errors::MyError,
};
use async_trait::async_trait;
use futures::{StreamExt, stream};
use log::{debug, warn};
use teloxide::{Bot, prelude::Requester, types::ChatId};

pub const DEFAULT_FAN_OUT: usize = 8;

/// Anything that can put a plain text message into a chat.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_text(&self, chat_id: UserId, text: &str) -> Result<(), MyError>;
}

#[async_trait]
impl MessageSender for Bot {
    async fn send_text(&self, chat_id: UserId, text: &str) -> Result<(), MyError> {
        self.send_message(ChatId(chat_id), text.to_string()).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

/// Delivers confirmed broadcasts. Each recipient is sent to on its own; a
/// failed send is logged and counted and never stops the rest.
#[derive(Debug, Clone)]
pub struct BroadcastDispatcher {
    fan_out: usize,
}

impl BroadcastDispatcher {
    pub fn new(fan_out: usize) -> Self {
        Self {
            fan_out: fan_out.max(1),
        }
    }

    pub async fn dispatch<S>(&self, sender: &S, broadcast: &ConfirmedBroadcast) -> DispatchReport
    where
        S: MessageSender + ?Sized,
    {
        let text = broadcast.text.as_str();
        let outcomes: Vec<bool> = stream::iter(broadcast.recipients.iter().copied())
            .map(|chat_id| async move {
                match sender.send_text(chat_id, text).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Broadcast to {} failed: {}", chat_id, e);
                        false
                    }
                }
            })
            .buffer_unordered(self.fan_out)
            .collect()
            .await;

        let sent = outcomes.iter().filter(|ok| **ok).count();
        let report = DispatchReport {
            sent,
            failed: outcomes.len() - sent,
        };
        debug!(
            "Broadcast to '{}' finished: {} sent, {} failed",
            broadcast.target.id(),
            report.sent,
            report.failed
        );
        report
    }
}

impl Default for BroadcastDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_FAN_OUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::directory::{Directory, Secrets};
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct FlakySender {
        failing: HashSet<UserId>,
        delivered: Mutex<Vec<UserId>>,
    }

    #[async_trait]
    impl MessageSender for FlakySender {
        async fn send_text(&self, chat_id: UserId, _text: &str) -> Result<(), MyError> {
            if self.failing.contains(&chat_id) {
                return Err(MyError::Other("blocked by user".to_string()));
            }
            self.delivered.lock().unwrap().push(chat_id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_rest() {
        let mut dir = Directory::new(Secrets {
            admin: "a".into(),
            superadmin: "s".into(),
        });
        for id in 1..=5 {
            dir.register_or_get(id);
        }
        let target = dir.group("news").cloned().unwrap();
        let broadcast = ConfirmedBroadcast {
            text: "hello".to_string(),
            target,
            recipients: dir.recipients("news"),
        };
        let sender = FlakySender {
            failing: HashSet::from([2, 4]),
            delivered: Mutex::new(Vec::new()),
        };

        let report = BroadcastDispatcher::new(2).dispatch(&sender, &broadcast).await;

        assert_eq!(report, DispatchReport { sent: 3, failed: 2 });
        let mut delivered = sender.delivered.lock().unwrap().clone();
        delivered.sort();
        assert_eq!(delivered, vec![1, 3, 5]);
    }

    #[tokio::test]
    async fn empty_recipient_list() {
        let broadcast = ConfirmedBroadcast {
            text: "x".to_string(),
            target: crate::core::directory::Group::new("news", "News"),
            recipients: vec![],
        };
        let sender = FlakySender {
            failing: HashSet::new(),
            delivered: Mutex::new(Vec::new()),
        };
        let report = BroadcastDispatcher::default().dispatch(&sender, &broadcast).await;
        assert_eq!(report, DispatchReport::default());
    }
}
