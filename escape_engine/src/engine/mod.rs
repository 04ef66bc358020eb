//! The game engine facade.
//!
//! Every player action is one atomic read-modify-write against the session
//! store: the session is loaded under a per-session lock, the action is
//! applied to a working copy, and the copy is written back only if the
//! action changed it. Actions that fail a game rule return an unsuccessful
//! [`ActionOutcome`]; only missing data and store failures are errors.

mod navigation;
mod perform;
mod puzzles;
mod saves;

pub use navigation::InventoryAction;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use escape_rules::{
    hint_budget_for, keys, Catalog, CatalogError, Evaluation, NarrativeValue, SessionId,
    SessionState, Theme,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

use crate::adapters::{InMemorySessionStore, InMemorySnapshotStore, SystemClock};
use crate::config::EngineConfig;
use crate::describe::{describe_room, StaticDescriptions};
use crate::error::EngineError;
use crate::hints::HintManager;
use crate::intent::Normalizer;
use crate::options::contextual_options;
use crate::ports::{Clock, DescriptionGenerator, DescriptionRequest, SessionStore, SnapshotStore};
use crate::resolution::current_room;

/// Result of a player action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    /// Never empty.
    pub message: String,
    pub session: SessionState,
    /// Actions open to the player after this one.
    pub options: Vec<String>,
    #[serde(default)]
    pub evaluation: Option<Evaluation>,
    /// True only on the action that completed the escape.
    #[serde(default)]
    pub game_over: bool,
}

/// A session together with its current options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub session: SessionState,
    pub options: Vec<String>,
}

/// What an action did to the working copy of a session.
#[derive(Debug, Clone, Default)]
pub(crate) struct Step {
    success: bool,
    message: String,
    evaluation: Option<Evaluation>,
    game_over: bool,
    changed: bool,
}

impl Step {
    /// Successful action that modified the session.
    fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            changed: true,
            ..Default::default()
        }
    }

    /// Successful action that left the session as it was.
    fn info(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Default::default()
        }
    }

    /// Rejected action; the session is untouched.
    fn refused(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    fn escaped(mut self, game_over: bool, win_message: &str) -> Self {
        if game_over {
            self.game_over = true;
            self.message.push(' ');
            self.message.push_str(win_message);
        }
        self
    }
}

/// Runs escape-room sessions over a shared, read-only catalog.
pub struct GameEngine {
    catalog: Arc<Catalog>,
    config: EngineConfig,
    normalizer: Normalizer,
    hints: HintManager,
    sessions: Arc<dyn SessionStore>,
    snapshots: Arc<dyn SnapshotStore>,
    describer: Arc<dyn DescriptionGenerator>,
    clock: Arc<dyn Clock>,
    locks: DashMap<SessionId, Arc<Mutex<()>>>,
}

impl GameEngine {
    /// Create an engine with in-memory stores, static descriptions and the system clock.
    pub fn new(catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        Self {
            catalog,
            normalizer: Normalizer::new(&config),
            hints: HintManager::new(config.hint_cooldown_secs),
            config,
            sessions: Arc::new(InMemorySessionStore::new()),
            snapshots: Arc::new(InMemorySnapshotStore::new()),
            describer: Arc::new(StaticDescriptions),
            clock: Arc::new(SystemClock::new()),
            locks: DashMap::new(),
        }
    }

    /// Create an engine over the built-in themes with default configuration.
    pub fn with_builtin_catalog() -> Result<Self, CatalogError> {
        Ok(Self::new(Arc::new(Catalog::builtin()?), EngineConfig::default()))
    }

    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.sessions = store;
        self
    }

    pub fn with_snapshot_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.snapshots = store;
        self
    }

    pub fn with_describer(mut self, describer: Arc<dyn DescriptionGenerator>) -> Self {
        self.describer = describer;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a new session in `start_room_id` of `theme_id`.
    pub fn start(
        &self,
        player_id: &str,
        theme_id: &str,
        start_room_id: &str,
        difficulty: &str,
    ) -> Result<ActionOutcome, EngineError> {
        if player_id.trim().is_empty() {
            return Err(EngineError::validation("Player id must not be empty"));
        }
        let theme = self
            .catalog
            .theme(theme_id)
            .ok_or_else(|| EngineError::validation(format!("Invalid theme: {}", theme_id)))?;
        if !theme.has_room(start_room_id) {
            return Err(EngineError::validation(format!(
                "Invalid starting location: {}",
                start_room_id
            )));
        }

        let now = self.clock.now();
        let mut session = SessionState::new(player_id, theme_id, start_room_id, difficulty, now);
        session.set_narrative(keys::INTRO_STORY, NarrativeValue::Text(theme.intro_story.clone()));
        session.set_hints_remaining(hint_budget_for(difficulty));
        self.refresh_description(theme, &mut session)?;

        session.id = self.sessions.create(session.clone())?;

        tracing::info!(
            session_id = %session.id,
            player_id = %player_id,
            theme = %theme_id,
            difficulty = %difficulty,
            "Session started"
        );

        let message = if theme.intro_story.trim().is_empty() {
            format!("Welcome to {}.", theme.name)
        } else {
            theme.intro_story.clone()
        };
        let options = contextual_options(&session, theme);
        Ok(ActionOutcome {
            success: true,
            message,
            session,
            options,
            evaluation: None,
            game_over: false,
        })
    }

    /// Current state of a session and its options.
    pub fn get_session(&self, session_id: SessionId) -> Result<SessionView, EngineError> {
        let session = self.load_session(session_id)?;
        let theme = self.theme_of(&session)?;
        let options = contextual_options(&session, theme);
        Ok(SessionView { session, options })
    }

    /// Delete a session. Returns false if it did not exist.
    pub fn delete(&self, session_id: SessionId) -> Result<bool, EngineError> {
        let deleted = {
            let lock = self.lock_for(session_id);
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.sessions.delete(session_id)?
        };
        self.locks.remove(&session_id);
        if deleted {
            tracing::info!(session_id = %session_id, "Session deleted");
        }
        Ok(deleted)
    }

    /// Apply an action to a session as one locked read-modify-write.
    pub(crate) fn act<F>(&self, session_id: SessionId, action: F) -> Result<ActionOutcome, EngineError>
    where
        F: FnOnce(&Theme, &mut SessionState, DateTime<Utc>) -> Result<Step, EngineError>,
    {
        let lock = self.lock_for(session_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut session = self.load_locked(session_id)?;
        let theme = self.theme_of(&session)?;
        let now = self.clock.now();

        let step = action(theme, &mut session, now)?;
        if step.changed {
            session.touch(now);
            self.sessions.put(session.clone())?;
        }

        let options = contextual_options(&session, theme);
        Ok(ActionOutcome {
            success: step.success,
            message: step.message,
            session,
            options,
            evaluation: step.evaluation,
            game_over: step.game_over,
        })
    }

    fn lock_for(&self, session_id: SessionId) -> Arc<Mutex<()>> {
        self.locks.entry(session_id).or_default().value().clone()
    }

    /// Load a session while holding its lock, dropping the lock entry of unknown ids.
    fn load_locked(&self, session_id: SessionId) -> Result<SessionState, EngineError> {
        let loaded = self.load_session(session_id);
        if matches!(loaded, Err(EngineError::SessionNotFound(_))) {
            self.locks.remove(&session_id);
        }
        loaded
    }

    fn load_session(&self, session_id: SessionId) -> Result<SessionState, EngineError> {
        self.sessions
            .get(session_id)?
            .ok_or(EngineError::SessionNotFound(session_id))
    }

    fn theme_of(&self, session: &SessionState) -> Result<&Theme, EngineError> {
        self.catalog.theme(&session.theme).ok_or_else(|| {
            EngineError::configuration(format!(
                "Theme {} of session {} not found",
                session.theme, session.id
            ))
        })
    }

    /// Regenerate the current room's description, falling back to static text.
    fn refresh_description(&self, theme: &Theme, session: &mut SessionState) -> Result<(), EngineError> {
        let room = current_room(theme, session)?;
        let request = DescriptionRequest {
            theme,
            scenario: &session.location,
            narrative_state: &session.narrative_state,
            room,
        };
        let text = describe_room(self.describer.as_ref(), &request);
        session.current_room_description = text;
        Ok(())
    }

    /// Finish arriving in the current room: describe it and check for the escape.
    ///
    /// Returns true the first time the player stands in the terminal room
    /// with every puzzle outside it solved.
    fn arrive(&self, theme: &Theme, session: &mut SessionState) -> Result<bool, EngineError> {
        self.refresh_description(theme, session)?;
        tracing::info!(
            session_id = %session.id,
            room_id = %session.current_room,
            "Entered room"
        );

        if !theme.is_terminal(&session.current_room) {
            return Ok(false);
        }
        let all_solved = theme
            .non_terminal_puzzle_ids()
            .into_iter()
            .all(|id| session.is_solved(id));
        let escaped = all_solved && session.mark_escaped();
        if escaped {
            tracing::info!(session_id = %session.id, theme = %theme.id, "Player escaped");
        }
        Ok(escaped)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::TestGame;
    use super::*;
    use crate::describe::NarrativeDescriptions;
    use crate::error::DescriptionError;

    #[test]
    fn test_start_session() {
        let game = TestGame::new();
        let outcome = game
            .engine
            .start("player-1", "mystery", "ancient_library", "medium")
            .unwrap();
        let session = &outcome.session;

        assert!(outcome.success);
        assert!(!session.id.is_nil());
        assert_eq!(session.hints_remaining(), 5);
        assert!(session.inventory.is_empty());
        assert!(session.history.is_empty());
        assert!(session.puzzle_state.is_empty());
        assert_eq!(session.current_room, "ancient_library");
        assert_eq!(session.location, "ancient_library");
        assert!(session.current_room_description.contains("Towering shelves"));
        assert!(session.flag_is_set(keys::INTRO_STORY));
        assert!(outcome.options.contains(&"Look around".to_string()));
        assert_eq!(game.session(session.id), *session);
    }

    #[test]
    fn test_hint_budget_by_difficulty() {
        let game = TestGame::new();
        for (difficulty, budget) in [("easy", 8), ("hard", 3), ("whatever", 5)] {
            let outcome = game
                .engine
                .start("p", "mystery", "ancient_library", difficulty)
                .unwrap();
            assert_eq!(outcome.session.hints_remaining(), budget);
        }
    }

    #[test]
    fn test_start_validation() {
        let game = TestGame::new();
        let err = game.engine.start("p", "atlantis", "ancient_library", "easy").unwrap_err();
        assert_eq!(err.to_string(), "Invalid theme: atlantis");

        let err = game.engine.start("p", "mystery", "hangar_main", "easy").unwrap_err();
        assert_eq!(err.to_string(), "Invalid starting location: hangar_main");

        let err = game.engine.start("  ", "mystery", "ancient_library", "easy").unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_unknown_session() {
        let game = TestGame::new();
        let missing = SessionId::new();
        assert!(matches!(
            game.engine.get_session(missing),
            Err(EngineError::SessionNotFound(id)) if id == missing
        ));
        assert!(game.engine.move_player(missing, "north").unwrap_err().is_not_found());
    }

    #[test]
    fn test_unknown_sessions_leave_no_locks() {
        let game = TestGame::new();
        for _ in 0..100 {
            let missing = SessionId::new();
            assert!(game.engine.move_player(missing, "north").is_err());
            assert!(game.engine.save(missing, "slot").is_err());
        }
        assert!(game.engine.locks.is_empty());

        let id = game.start_mystery();
        game.engine.move_player(id, "north").unwrap();
        assert_eq!(game.engine.locks.len(), 1);
    }

    #[test]
    fn test_delete_session() {
        let game = TestGame::new();
        let id = game.start_mystery();
        assert!(game.engine.delete(id).unwrap());
        assert!(!game.engine.delete(id).unwrap());
        assert!(game.engine.get_session(id).unwrap_err().is_not_found());
    }

    struct BrokenNarrator;

    impl DescriptionGenerator for BrokenNarrator {
        fn describe(&self, _: &DescriptionRequest<'_>) -> Result<String, DescriptionError> {
            Err(DescriptionError::Failed("model offline".into()))
        }
    }

    #[test]
    fn test_description_falls_back_when_generator_fails() {
        let game = TestGame::new();
        let engine = GameEngine::new(game.engine.catalog.clone(), EngineConfig::default())
            .with_describer(Arc::new(BrokenNarrator));

        let outcome = engine.start("p", "mystery", "ancient_library", "medium").unwrap();
        let room = engine.catalog().room("mystery", "ancient_library").unwrap();
        assert_eq!(outcome.session.current_room_description, room.description);

        let moved = engine.move_player(outcome.session.id, "north").unwrap();
        let next = engine.catalog().room("mystery", "mysterious_observatory").unwrap();
        assert_eq!(moved.session.current_room_description, next.description);
    }

    #[test]
    fn test_embellished_descriptions() {
        let game = TestGame::new();
        let engine = GameEngine::new(game.engine.catalog.clone(), EngineConfig::default())
            .with_describer(Arc::new(NarrativeDescriptions::new(true)));

        let outcome = engine.start("p", "mystery", "ancient_library", "medium").unwrap();
        assert!(outcome
            .session
            .current_room_description
            .contains("the Reading Desk and the Dusty Shelves"));
    }
}
