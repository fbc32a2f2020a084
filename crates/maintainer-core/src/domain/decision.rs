//! Decision model: lifecycle classification of a stack version.
//!
//! This module defines the Lifecycle states, the Decider trait and the
//! LifecycleDecider that maps a stack to an optional change request.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::change::{ChangeAction, ChangeKind, ChangeRequest, branch_name};
use super::devfile::{self, DEPRECATED_TAG};
use super::errors::StackError;
use super::stack::RegistryStack;

/// Inactivity limits, in days.
///
/// Both limits are measured from the stack's last modification. Removal is not
/// re-anchored to the moment the deprecation tag was added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub deprecation_days: u32,
    pub removal_days: u32,
}

impl Limits {
    pub fn new(deprecation_days: u32, removal_days: u32) -> Self {
        Self {
            deprecation_days,
            removal_days,
        }
    }

    pub fn deprecation(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.deprecation_days))
    }

    pub fn removal(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.removal_days))
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(365, 365)
    }
}

/// Where a stack stands in its lifecycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Not deprecated, modified within the deprecation limit.
    Active,

    /// Not deprecated, untouched past the deprecation limit.
    Stale,

    /// Deprecated, modified within the removal limit.
    DeprecatedFresh,

    /// Deprecated, untouched past the removal limit.
    DeprecatedStale,
}

impl Lifecycle {
    pub fn classify(stack: &RegistryStack, now: DateTime<Utc>, limits: &Limits) -> Self {
        match stack.deprecated {
            false if limit_reached(stack.last_modified, now, limits.deprecation()) => Lifecycle::Stale,
            false => Lifecycle::Active,
            true if limit_reached(stack.last_modified, now, limits.removal()) => {
                Lifecycle::DeprecatedStale
            }
            true => Lifecycle::DeprecatedFresh,
        }
    }

    /// The change this state asks for, if any.
    pub fn pending_change(&self) -> Option<ChangeKind> {
        match self {
            Lifecycle::Stale => Some(ChangeKind::Deprecate),
            Lifecycle::DeprecatedStale => Some(ChangeKind::Remove),
            Lifecycle::Active | Lifecycle::DeprecatedFresh => None,
        }
    }
}

/// `now` is past `last_modified + limit`.
pub fn limit_reached(last_modified: DateTime<Utc>, now: DateTime<Utc>, limit: TimeDelta) -> bool {
    last_modified
        .checked_add_signed(limit)
        .is_some_and(|deadline| now > deadline)
}

/// Trait for deciding what should happen to a stack.
///
/// Deciders are pure functions: the same stack and instant always give the
/// same answer, and nothing is read or written outside the arguments.
pub trait Decider: Send + Sync {
    /// # Returns
    /// `Ok(None)` when the stack needs no action, `Err` when the change it
    /// needs cannot be built from the stack's content.
    fn evaluate(
        &self,
        stack: &RegistryStack,
        now: DateTime<Utc>,
    ) -> Result<Option<ChangeRequest>, StackError>;
}

/// Default decider: deprecate after inactivity, remove deprecated stacks after
/// a second inactivity window.
#[derive(Debug, Clone)]
pub struct LifecycleDecider {
    limits: Limits,
}

impl LifecycleDecider {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    fn deprecate(&self, stack: &RegistryStack) -> Result<ChangeRequest, StackError> {
        let updated_content = devfile::transform(&stack.raw_content, DEPRECATED_TAG)?;
        let days = self.limits.deprecation_days;

        Ok(ChangeRequest {
            action: ChangeAction::Deprecate { updated_content },
            stack_name: stack.name.clone(),
            target_path: stack.path.clone(),
            content_hash: stack.file_sha.clone(),
            branch_name: branch_name(ChangeKind::Deprecate, &stack.name),
            commit_message: format!("Deprecate {}", stack.name),
            title: format!(
                "chore: Deprecate {} stack after {} days of inactivity",
                stack.name, days
            ),
            description: describe(
                format!(
                    "This PR deprecates the {} stack as it has reached the inactivity limit of {} days.",
                    stack.name, days
                ),
                &stack.owners,
            ),
        })
    }

    fn remove(&self, stack: &RegistryStack) -> ChangeRequest {
        let days = self.limits.removal_days;

        ChangeRequest {
            action: ChangeAction::Remove,
            stack_name: stack.name.clone(),
            target_path: stack.path.clone(),
            content_hash: stack.file_sha.clone(),
            branch_name: branch_name(ChangeKind::Remove, &stack.name),
            commit_message: format!("Remove {}", stack.name),
            title: format!(
                "chore: Remove {} stack after {} days of inactivity",
                stack.name, days
            ),
            description: describe(
                format!(
                    "This PR removes the deprecated {} stack as it has reached the inactivity limit of {} days.",
                    stack.name, days
                ),
                &stack.owners,
            ),
        }
    }
}

impl Default for LifecycleDecider {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl Decider for LifecycleDecider {
    fn evaluate(
        &self,
        stack: &RegistryStack,
        now: DateTime<Utc>,
    ) -> Result<Option<ChangeRequest>, StackError> {
        let Some(kind) = Lifecycle::classify(stack, now, &self.limits).pending_change() else {
            return Ok(None);
        };
        match kind {
            ChangeKind::Deprecate => self.deprecate(stack).map(Some),
            ChangeKind::Remove => Ok(Some(self.remove(stack))),
        }
    }
}

/// PR body: heading, explanation, and a reviewer mention line when owners exist.
fn describe(explanation: String, owners: &[String]) -> String {
    let mut lines = vec!["## What this PR does?\n".to_string(), explanation];
    if let Some(mention) = owners_mention(owners) {
        lines.push(mention);
    }
    lines.join("\n")
}

fn owners_mention(owners: &[String]) -> Option<String> {
    if owners.is_empty() {
        return None;
    }
    let mentions: Vec<String> = owners.iter().map(|owner| format!("@{owner}")).collect();
    Some(format!("The PR should be reviewed by: {}", mentions.join(", ")))
}
