//! Per-session state passed explicitly into every turn.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::{AssistantError, Result};
use crate::memory::ConversationHistory;
use crate::profile::{ProfileAttributes, UserProfile};
use crate::sql_database::{SqlBackend, SqlDatabase};

/// Whether a session has a database bound.
#[derive(Clone, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connected(Arc<dyn SqlBackend>),
}

impl fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Idle => f.write_str("Idle"),
            ConnectionState::Connected(db) => write!(f, "Connected({})", db.describe()),
        }
    }
}

/// History, database binding, optional profile and model id of one user
/// session. Owned by the caller and borrowed mutably for the length of a turn.
#[derive(Debug)]
pub struct SessionContext {
    id: Uuid,
    history: ConversationHistory,
    connection: ConnectionState,
    profile: Option<UserProfile>,
    model: String,
}

impl SessionContext {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            history: ConversationHistory::new(),
            connection: ConnectionState::Idle,
            profile: None,
            model: model.into(),
        }
    }

    /// A profile switches both prompt stages to the grocery templates.
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.history = ConversationHistory::with_greeting(greeting);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Bind a database. Replaces any previous binding; history is kept.
    pub fn connect(&mut self, database: Arc<dyn SqlBackend>) {
        info!("Session {} connected to {}", self.id, database.describe());
        self.connection = ConnectionState::Connected(database);
    }

    /// Open a SQLite file and bind it. On failure the session keeps its
    /// previous state.
    pub fn connect_path(&mut self, path: &Path) -> Result<()> {
        let database = SqlDatabase::open(path)?;
        self.connect(Arc::new(database));
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if self.is_connected() {
            info!("Session {} disconnected", self.id);
        }
        self.connection = ConnectionState::Idle;
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.connection, ConnectionState::Connected(_))
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    pub fn database(&self) -> Result<Arc<dyn SqlBackend>> {
        match &self.connection {
            ConnectionState::Connected(db) => Ok(Arc::clone(db)),
            ConnectionState::Idle => Err(AssistantError::NotConnected),
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Drop every message, keeping the connection and profile.
    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn profile_attributes(&self) -> Option<ProfileAttributes> {
        self.profile.as_ref().map(ProfileAttributes::from_profile)
    }

    pub(crate) fn record_turn(&mut self, question: &str, answer: &str) {
        self.history.record_turn(question, answer);
    }
}
