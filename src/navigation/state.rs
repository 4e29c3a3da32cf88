//! Navigation targets, lifecycle states and outcomes.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RouterError;
use crate::loader::ViewHandle;
use crate::routing::ResolvedRoute;

/// Where a navigation should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    /// A raw location, e.g. `/patient/42?tab=ecg`.
    Path(String),
    /// A named route with its parameters.
    Named {
        name: String,
        params: HashMap<String, String>,
    },
}

impl NavigationTarget {
    pub fn path(path: impl Into<String>) -> Self {
        NavigationTarget::Path(path.into())
    }

    pub fn named<K, V>(name: impl Into<String>, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        NavigationTarget::Named {
            name: name.into(),
            params: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<&str> for NavigationTarget {
    fn from(path: &str) -> Self {
        NavigationTarget::Path(path.to_string())
    }
}

impl From<String> for NavigationTarget {
    fn from(path: String) -> Self {
        NavigationTarget::Path(path)
    }
}

/// Lifecycle of a single navigation attempt.
///
/// ```text
/// Idle → Matching → Guarding → Loading → Committing → Committed
///           │          │          │           │
///           └──────────┴──────────┴───────────┴──▶ Cancelled | Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationState {
    Idle,
    Matching,
    Guarding,
    Loading,
    Committing,
    Committed,
    Cancelled,
    Failed,
}

impl NavigationState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            NavigationState::Committed | NavigationState::Cancelled | NavigationState::Failed
        )
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: NavigationState) -> bool {
        use NavigationState::*;
        match (self, next) {
            (Idle, Matching)
            | (Matching, Guarding)
            | (Guarding, Loading)
            | (Loading, Committing)
            | (Committing, Committed) => true,
            (Matching | Guarding | Loading | Committing, Cancelled | Failed) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NavigationState::Idle => "idle",
            NavigationState::Matching => "matching",
            NavigationState::Guarding => "guarding",
            NavigationState::Loading => "loading",
            NavigationState::Committing => "committing",
            NavigationState::Committed => "committed",
            NavigationState::Cancelled => "cancelled",
            NavigationState::Failed => "failed",
        }
    }
}

/// Why a navigation ended without committing or failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelReason {
    /// A newer navigation was initiated.
    Superseded { by: u64 },
    /// A guard refused the transition.
    GuardRejected(String),
}

/// Terminal result of a navigation, returned to the caller that started it.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    Committed(Arc<ResolvedRoute>),
    Cancelled(CancelReason),
    Failed(RouterError),
}

impl NavigationOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, NavigationOutcome::Committed(_))
    }

    /// The committed route, if any.
    pub fn route(&self) -> Option<&Arc<ResolvedRoute>> {
        match self {
            NavigationOutcome::Committed(route) => Some(route),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RouterError> {
        match self {
            NavigationOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Metrics label.
    pub fn label(&self) -> &'static str {
        match self {
            NavigationOutcome::Committed(_) => "committed",
            NavigationOutcome::Cancelled(_) => "cancelled",
            NavigationOutcome::Failed(_) => "failed",
        }
    }
}

/// What the rendering layer receives on every commit.
#[derive(Debug, Clone)]
pub struct ActiveView {
    pub route: Arc<ResolvedRoute>,
    pub view: ViewHandle,
    /// Route parameters for `ParamsAsProps` routes.
    pub props: Option<HashMap<String, String>>,
}

/// How a committed navigation changes the history record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HistoryMode {
    Push,
    Replace,
    /// Move the cursor to an existing entry, as long as the entry at `index`
    /// still reads `entry` at commit time.
    Traverse { index: usize, entry: String },
}

/// State machine of one in-progress navigation.
#[derive(Debug)]
pub(crate) struct Transition {
    pub id: u64,
    state: NavigationState,
}

impl Transition {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            state: NavigationState::Idle,
        }
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn advance(&mut self, next: NavigationState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal navigation transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::trace!(
            navigation_id = self.id,
            from = self.state.as_str(),
            to = next.as_str(),
            "Navigation state changed"
        );
        self.state = next;
    }
}
