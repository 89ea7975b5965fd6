//! Publish mode: how an admin composes, targets and confirms a broadcast.
//!
//! ```text
//! Idle --/publish--> Composing --text--> ChoosingTarget --group--> Confirming
//!   ^                    ^                                           |
//!   |                    +------------------- edit ------------------+
//!   +---------------------------- send / cancel / stop / timeout ----+
//! ```
//!
//! The state itself lives in each admin's [`PublishDraft`]; this module only
//! moves it along and keeps the inactivity timer in step.

use crate::core::{
    directory::{Directory, Group, PublishDraft, Role, UserId},
    timer::{Expiry, InactivityTimer},
};
use crate::util::MESSAGE_LIMIT;
use log::info;
use thiserror::Error;

/// Room kept free in the confirmation preview for its heading and the target
/// group line.
pub const PREVIEW_RESERVE: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Idle,
    Composing,
    ChoosingTarget,
    Confirming,
}

impl PublishState {
    pub fn of(draft: &PublishDraft) -> Self {
        match (draft.publish_mode, &draft.pending_message, &draft.pending_target) {
            (false, _, _) => PublishState::Idle,
            (true, None, _) => PublishState::Composing,
            (true, Some(_), None) => PublishState::ChoosingTarget,
            (true, Some(_), Some(_)) => PublishState::Confirming,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("only admins can publish")]
    NotAuthorized,
    #[error("not currently publishing")]
    NotPublishing,
    #[error("already publishing")]
    AlreadyPublishing,
    #[error("action does not fit the current step ({0:?})")]
    OutOfStep(PublishState),
    #[error("no such group '{0}'")]
    NoSuchGroup(String),
    #[error("message is {len} characters, at most {max} fit")]
    MessageTooLong { len: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Waiting for the message text.
    Started,
    /// Text stored; the admin now picks one of these groups.
    TargetsOffered { groups: Vec<Group> },
    /// Text and target stored; waiting for send / edit / cancel.
    AwaitingConfirmation { preview: String, target: Group },
    EditRequested,
    Cancelled,
    Stopped,
}

/// A broadcast that left publish mode and is ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedBroadcast {
    pub text: String,
    pub target: Group,
    pub recipients: Vec<UserId>,
}

pub struct PublishWorkflow {
    footer: String,
}

impl PublishWorkflow {
    pub fn new(footer: impl Into<String>) -> Self {
        Self {
            footer: footer.into(),
        }
    }

    /// Longest text, in characters, whose preview and footer-appended
    /// broadcast both fit in one message.
    pub fn max_text_len(&self) -> usize {
        let footer = if self.footer.is_empty() {
            0
        } else {
            self.footer.chars().count() + 2
        };
        MESSAGE_LIMIT.saturating_sub(footer.max(PREVIEW_RESERVE))
    }

    pub fn state(&self, dir: &Directory, id: UserId) -> PublishState {
        dir.user(id)
            .map_or(PublishState::Idle, |u| PublishState::of(&u.draft))
    }

    pub fn begin(
        &self,
        dir: &mut Directory,
        timer: &InactivityTimer,
        id: UserId,
    ) -> Result<Transition, WorkflowError> {
        let draft = admin_draft(dir, id)?;
        if draft.publish_mode {
            return Err(WorkflowError::AlreadyPublishing);
        }

        draft.clear();
        draft.publish_mode = true;
        timer.rearm(id);
        info!("Admin {} entered publish mode", id);
        Ok(Transition::Started)
    }

    /// Stores `text` verbatim. A target kept from before an edit is reused,
    /// otherwise the whole catalog is offered. Text longer than
    /// [`max_text_len`](Self::max_text_len) is refused and the admin stays on
    /// the composing step.
    pub fn submit_text(
        &self,
        dir: &mut Directory,
        timer: &InactivityTimer,
        id: UserId,
        text: &str,
    ) -> Result<Transition, WorkflowError> {
        let groups = dir.all_groups().to_vec();
        let draft = admin_draft(dir, id)?;
        match PublishState::of(draft) {
            PublishState::Idle => return Err(WorkflowError::NotPublishing),
            PublishState::Composing => {}
            other => return Err(WorkflowError::OutOfStep(other)),
        }

        let (len, max) = (text.chars().count(), self.max_text_len());
        if len > max {
            timer.rearm(id);
            return Err(WorkflowError::MessageTooLong { len, max });
        }

        draft.pending_message = Some(text.to_string());
        timer.rearm(id);

        let kept_target = draft
            .pending_target
            .as_deref()
            .and_then(|target| groups.iter().find(|g| g.id() == target));
        match kept_target {
            Some(target) => Ok(Transition::AwaitingConfirmation {
                preview: text.to_string(),
                target: target.clone(),
            }),
            None => Ok(Transition::TargetsOffered { groups }),
        }
    }

    pub fn select_group(
        &self,
        dir: &mut Directory,
        timer: &InactivityTimer,
        id: UserId,
        group_id: &str,
    ) -> Result<Transition, WorkflowError> {
        let target = dir.group(group_id).cloned();
        let draft = admin_draft(dir, id)?;
        match PublishState::of(draft) {
            PublishState::Idle => return Err(WorkflowError::NotPublishing),
            PublishState::ChoosingTarget | PublishState::Confirming => {}
            other => return Err(WorkflowError::OutOfStep(other)),
        }
        let Some(target) = target else {
            return Err(WorkflowError::NoSuchGroup(group_id.to_string()));
        };

        draft.pending_target = Some(target.id().to_string());
        timer.rearm(id);
        Ok(Transition::AwaitingConfirmation {
            preview: draft.pending_message.clone().unwrap_or_default(),
            target,
        })
    }

    /// Leaves publish mode and hands back the message with the footer
    /// appended, plus everyone it should reach.
    pub fn confirm(
        &self,
        dir: &mut Directory,
        timer: &InactivityTimer,
        id: UserId,
    ) -> Result<ConfirmedBroadcast, WorkflowError> {
        let draft = admin_draft(dir, id)?;
        let (message, target_id) = match PublishState::of(draft) {
            PublishState::Idle => return Err(WorkflowError::NotPublishing),
            PublishState::Confirming => (
                draft.pending_message.take().unwrap_or_default(),
                draft.pending_target.take().unwrap_or_default(),
            ),
            other => return Err(WorkflowError::OutOfStep(other)),
        };
        draft.clear();
        timer.cancel(id);

        let target = dir
            .group(&target_id)
            .cloned()
            .ok_or_else(|| WorkflowError::NoSuchGroup(target_id.clone()))?;
        let recipients = dir.recipients(target.id());
        info!(
            "Admin {} confirmed a broadcast to '{}' ({} recipients)",
            id,
            target.id(),
            recipients.len()
        );

        Ok(ConfirmedBroadcast {
            text: self.with_footer(&message),
            target,
            recipients,
        })
    }

    /// Drops the pending text but keeps the chosen target.
    pub fn edit(
        &self,
        dir: &mut Directory,
        timer: &InactivityTimer,
        id: UserId,
    ) -> Result<Transition, WorkflowError> {
        let draft = admin_draft(dir, id)?;
        match PublishState::of(draft) {
            PublishState::Idle => return Err(WorkflowError::NotPublishing),
            PublishState::Confirming => {}
            other => return Err(WorkflowError::OutOfStep(other)),
        }

        draft.pending_message = None;
        timer.rearm(id);
        Ok(Transition::EditRequested)
    }

    pub fn cancel(
        &self,
        dir: &mut Directory,
        timer: &InactivityTimer,
        id: UserId,
    ) -> Result<Transition, WorkflowError> {
        let draft = admin_draft(dir, id)?;
        match PublishState::of(draft) {
            PublishState::Idle => return Err(WorkflowError::NotPublishing),
            PublishState::Confirming => {}
            other => return Err(WorkflowError::OutOfStep(other)),
        }

        draft.clear();
        timer.cancel(id);
        info!("Admin {} cancelled the pending broadcast", id);
        Ok(Transition::Cancelled)
    }

    /// Explicit early exit, allowed from every publishing step.
    pub fn stop(
        &self,
        dir: &mut Directory,
        timer: &InactivityTimer,
        id: UserId,
    ) -> Result<Transition, WorkflowError> {
        let draft = admin_draft(dir, id)?;
        if !draft.publish_mode {
            return Err(WorkflowError::NotPublishing);
        }

        draft.clear();
        timer.cancel(id);
        info!("Admin {} left publish mode", id);
        Ok(Transition::Stopped)
    }

    /// Applies a timer expiry. Returns `true` if the admin was thrown out of
    /// publish mode and should be told so.
    pub fn force_exit(&self, dir: &mut Directory, timer: &InactivityTimer, expiry: Expiry) -> bool {
        if !timer.claim(expiry) {
            return false;
        }

        let Some(user) = dir.user_mut(expiry.admin_id) else {
            return false;
        };
        if !user.draft.publish_mode {
            return false;
        }

        user.draft.clear();
        info!("Admin {} timed out of publish mode", expiry.admin_id);
        true
    }

    fn with_footer(&self, message: &str) -> String {
        if self.footer.is_empty() {
            message.to_string()
        } else {
            format!("{}\n\n{}", message, self.footer)
        }
    }
}

fn admin_draft(dir: &mut Directory, id: UserId) -> Result<&mut PublishDraft, WorkflowError> {
    match dir.user_mut(id) {
        Some(user) if user.role() >= Role::Admin => Ok(&mut user.draft),
        _ => Err(WorkflowError::NotAuthorized),
    }
}
