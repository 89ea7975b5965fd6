//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use broadcast_bot::core::{
    directory::{Directory, Secrets, UserId},
    services::broadcast::MessageSender,
    timer::{Expiry, InactivityTimer},
    workflow::PublishWorkflow,
};
use broadcast_bot::errors::MyError;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

pub const ADMIN_SECRET: &str = "admin-secret";
pub const SUPERADMIN_SECRET: &str = "root-secret";
pub const FOOTER: &str = "Manage your subscriptions with /home";
pub const TIMEOUT: Duration = Duration::from_secs(15 * 60);

pub struct Harness {
    pub dir: Directory,
    pub timer: InactivityTimer,
    pub expiries: UnboundedReceiver<Expiry>,
    pub workflow: PublishWorkflow,
}

pub fn harness() -> Harness {
    let dir = Directory::new(Secrets {
        admin: ADMIN_SECRET.to_string(),
        superadmin: SUPERADMIN_SECRET.to_string(),
    });
    let (timer, expiries) = InactivityTimer::new(TIMEOUT);
    Harness {
        dir,
        timer,
        expiries,
        workflow: PublishWorkflow::new(FOOTER),
    }
}

/// Records every delivery; chats listed in `failing` reject the message.
#[derive(Default)]
pub struct RecordingSender {
    pub failing: HashSet<UserId>,
    pub delivered: Mutex<Vec<(UserId, String)>>,
}

impl RecordingSender {
    pub fn failing_for(ids: &[UserId]) -> Self {
        Self {
            failing: ids.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn recipients(&self) -> Vec<UserId> {
        let mut ids: Vec<_> = self.delivered.lock().unwrap().iter().map(|(id, _)| *id).collect();
        ids.sort();
        ids
    }

    pub fn texts(&self) -> Vec<String> {
        self.delivered.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_text(&self, chat_id: UserId, text: &str) -> Result<(), MyError> {
        if self.failing.contains(&chat_id) {
            return Err(MyError::Other(format!("chat {} blocked the bot", chat_id)));
        }
        self.delivered.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}
