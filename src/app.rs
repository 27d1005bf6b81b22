use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info};

use crate::client::{FetchError, WordLoader, WordSource, WordsLoaded};
use crate::runtime::PracticeEvent;
use crate::session::{PracticeSession, TapOutcome};

/// Ticks the "Correct!" banner stays up after finishing a word
pub const CELEBRATION_TICKS: u8 = 12;

pub const EMPTY_FILTER_NOTICE: &str = "Please enter some hiragana characters.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    EnteringFilter,
    Practicing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Idle,
    Loading { generation: u64 },
    Failed(FetchError),
}

/// What the event loop has to do on behalf of the app
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Fetch(Option<String>),
    Quit,
}

pub fn is_hiragana(c: char) -> bool {
    ('\u{3041}'..='\u{309F}').contains(&c)
}

/// Client-side state: the filter box, the tiles built from it, the load
/// status and the one practice session the UI owns.
#[derive(Debug)]
pub struct App {
    pub mode: Mode,
    pub filter_input: String,
    pub tiles: Vec<char>,
    pub selected_tile: usize,
    pub session: PracticeSession,
    pub load_status: LoadStatus,
    pub notice: Option<String>,
    pub last_query: Option<String>,
    pub celebration_ticks: u8,
}

impl Default for App {
    fn default() -> Self {
        Self::new(None)
    }
}

impl App {
    pub fn new(initial_chars: Option<String>) -> Self {
        Self {
            mode: Mode::EnteringFilter,
            filter_input: initial_chars.unwrap_or_default(),
            tiles: Vec::new(),
            selected_tile: 0,
            session: PracticeSession::new(),
            load_status: LoadStatus::Idle,
            notice: None,
            last_query: None,
            celebration_ticks: 0,
        }
    }

    /// Advance the app by one event. Returns false once the user quits.
    pub fn handle_event<S: WordSource>(
        &mut self,
        event: PracticeEvent,
        loader: &mut WordLoader<S>,
    ) -> bool {
        match event {
            PracticeEvent::Tick => self.on_tick(),
            PracticeEvent::Resize => {}
            PracticeEvent::Loaded(loaded) => {
                self.on_words_loaded(loaded);
            }
            PracticeEvent::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    return true;
                }
                if let Some(action) = self.handle_key(key) {
                    return self.perform(action, loader);
                }
            }
        }
        true
    }

    /// Carry out `action`. Returns false when the app should quit.
    pub fn perform<S: WordSource>(&mut self, action: Action, loader: &mut WordLoader<S>) -> bool {
        match action {
            Action::Quit => false,
            Action::Fetch(chars) => {
                let generation = loader.request(chars);
                self.begin_load(generation);
                true
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Some(Action::Quit);
        }

        match self.mode {
            Mode::EnteringFilter => match key.code {
                KeyCode::Enter => self.submit_filter(),
                KeyCode::Backspace => {
                    self.filter_input.pop();
                    None
                }
                KeyCode::Char(c)
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    self.filter_input.push(c);
                    None
                }
                _ => None,
            },
            Mode::Practicing => match key.code {
                KeyCode::Left => {
                    self.move_selection(-1);
                    None
                }
                KeyCode::Right => {
                    self.move_selection(1);
                    None
                }
                KeyCode::Enter | KeyCode::Char(' ') => {
                    if let Some(&c) = self.tiles.get(self.selected_tile) {
                        self.tap(c);
                    }
                    None
                }
                KeyCode::Backspace => {
                    self.session.clear_input();
                    None
                }
                KeyCode::Char('/') => {
                    self.mode = Mode::EnteringFilter;
                    None
                }
                KeyCode::Char('r') => self.retry(),
                KeyCode::Char(c) if is_hiragana(c) => {
                    self.tap(c);
                    None
                }
                _ => None,
            },
        }
    }

    /// Turn the filter box into tiles and ask for the matching words.
    /// A blank box only raises a notice.
    pub fn submit_filter(&mut self) -> Option<Action> {
        let chars = self.filter_input.trim().to_string();
        if chars.is_empty() {
            self.notice = Some(EMPTY_FILTER_NOTICE.to_string());
            return None;
        }

        self.notice = None;
        self.tiles = chars.chars().collect();
        self.selected_tile = 0;
        // The old words may not be spellable from the new tiles
        self.session = PracticeSession::new();
        self.mode = Mode::Practicing;
        self.last_query = Some(chars.clone());
        Some(Action::Fetch(Some(chars)))
    }

    fn retry(&mut self) -> Option<Action> {
        match self.load_status {
            LoadStatus::Failed(_) => Some(Action::Fetch(self.last_query.clone())),
            _ => None,
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.tiles.is_empty() {
            return;
        }
        let len = self.tiles.len() as isize;
        self.selected_tile = (self.selected_tile as isize + delta).rem_euclid(len) as usize;
    }

    pub fn begin_load(&mut self, generation: u64) {
        self.load_status = LoadStatus::Loading { generation };
    }

    /// Apply a finished fetch. Results from a superseded request are dropped;
    /// returns whether this one was applied.
    pub fn on_words_loaded(&mut self, loaded: WordsLoaded) -> bool {
        match self.load_status {
            LoadStatus::Loading { generation } if generation == loaded.generation => {}
            _ => {
                debug!(generation = loaded.generation, "dropping stale word list");
                return false;
            }
        }

        match loaded.result {
            Ok(words) => {
                info!(matched = words.len(), chars = ?loaded.chars, "word list loaded");
                self.session.load_word_list(words);
                self.load_status = LoadStatus::Idle;
            }
            Err(err) => {
                self.load_status = LoadStatus::Failed(err);
            }
        }
        true
    }

    /// Feed one glyph to the session. Ignored unless a word is on screen.
    pub fn tap(&mut self, c: char) -> Option<TapOutcome> {
        if !self.session.is_active() {
            return None;
        }
        let outcome = self.session.submit_character(c).ok()?;
        match &outcome {
            TapOutcome::WordComplete { completed, .. } => {
                info!(word = %completed.romanized, "word complete");
                self.celebration_ticks = CELEBRATION_TICKS;
            }
            TapOutcome::Mismatch(err) => {
                debug!(expected = %err.expected, actual = %err.actual, "mismatched tap");
            }
            TapOutcome::Accepted => {}
        }
        Some(outcome)
    }

    pub fn on_tick(&mut self) {
        self.celebration_ticks = self.celebration_ticks.saturating_sub(1);
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebration_ticks > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::WordEntry;
    use crate::session::SessionPhase;
    use assert_matches::assert_matches;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn loaded(generation: u64, words: Vec<WordEntry>) -> WordsLoaded {
        WordsLoaded {
            generation,
            chars: None,
            result: Ok(words),
        }
    }

    /// App practicing すし then かさ with the tiles "すしかさ"
    fn practicing_app() -> App {
        let mut app = App::new(Some("すしかさ".into()));
        assert_eq!(app.submit_filter(), Some(Action::Fetch(Some("すしかさ".into()))));
        app.begin_load(1);
        assert!(app.on_words_loaded(loaded(
            1,
            vec![WordEntry::new("sushi", "すし"), WordEntry::new("kasa", "かさ")]
        )));
        app
    }

    #[test]
    fn test_new_app_starts_in_filter_entry() {
        let app = App::new(None);
        assert_eq!(app.mode, Mode::EnteringFilter);
        assert_eq!(app.session.phase(), SessionPhase::Empty);
        assert_eq!(app.load_status, LoadStatus::Idle);
    }

    #[test]
    fn test_typing_and_enter_requests_fetch() {
        let mut app = App::new(None);
        type_str(&mut app, " かさ ");
        let action = app.handle_key(key(KeyCode::Enter));
        assert_eq!(action, Some(Action::Fetch(Some("かさ".into()))));
        assert_eq!(app.tiles, vec!['か', 'さ']);
        assert_eq!(app.mode, Mode::Practicing);
    }

    #[test]
    fn test_blank_filter_shows_notice_without_fetch() {
        let mut app = App::new(Some("   ".into()));
        assert_eq!(app.handle_key(key(KeyCode::Enter)), None);
        assert_eq!(app.notice.as_deref(), Some(EMPTY_FILTER_NOTICE));
        assert_eq!(app.mode, Mode::EnteringFilter);
    }

    #[test]
    fn test_backspace_edits_filter() {
        let mut app = App::new(Some("かさx".into()));
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.filter_input, "かさ");
    }

    #[test]
    fn test_escape_quits_from_any_mode() {
        let mut app = practicing_app();
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Some(Action::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(App::new(None).handle_key(ctrl_c), Some(Action::Quit));
    }

    #[test]
    fn test_loaded_words_activate_session() {
        let app = practicing_app();
        assert_eq!(app.session.phase(), SessionPhase::Active);
        assert_eq!(app.session.current_word().unwrap().romanized, "sushi");
        assert_eq!(app.load_status, LoadStatus::Idle);
    }

    #[test]
    fn test_stale_load_is_dropped() {
        let mut app = App::new(Some("かさ".into()));
        app.submit_filter();
        app.begin_load(1);
        app.begin_load(2);

        assert!(!app.on_words_loaded(loaded(1, vec![WordEntry::new("kasa", "かさ")])));
        assert_eq!(app.session.phase(), SessionPhase::Empty);

        assert!(app.on_words_loaded(loaded(2, vec![])));
        assert_eq!(app.session.phase(), SessionPhase::Cleared);
    }

    #[test]
    fn test_selected_tile_tap() {
        let mut app = practicing_app();
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.session.typed_prefix(), "す");

        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session.current_index(), 1);
        assert!(app.is_celebrating());
    }

    #[test]
    fn test_selection_wraps() {
        let mut app = practicing_app();
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.selected_tile, 3);
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.selected_tile, 0);
    }

    #[test]
    fn test_direct_hiragana_tap_and_mismatch() {
        let mut app = practicing_app();
        app.handle_key(key(KeyCode::Char('か')));
        assert!(app.session.last_error().is_some());
        assert_eq!(app.session.typed_prefix(), "");

        app.handle_key(key(KeyCode::Char('す')));
        assert!(app.session.last_error().is_none());
        assert_eq!(app.session.typed_prefix(), "す");

        // latin letters are not taps
        app.handle_key(key(KeyCode::Char('x')));
        assert!(app.session.last_error().is_none());
    }

    #[test]
    fn test_backspace_clears_input() {
        let mut app = practicing_app();
        type_str(&mut app, "すか");
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.session.typed_prefix(), "");
        assert!(app.session.last_error().is_none());
    }

    #[test]
    fn test_celebration_fades_with_ticks() {
        let mut app = practicing_app();
        type_str(&mut app, "すし");
        assert!(app.is_celebrating());
        for _ in 0..CELEBRATION_TICKS {
            app.on_tick();
        }
        assert!(!app.is_celebrating());
    }

    #[test]
    fn test_failed_load_offers_retry() {
        let mut app = App::new(Some("みず".into()));
        app.submit_filter();
        app.begin_load(1);
        app.on_words_loaded(WordsLoaded {
            generation: 1,
            chars: Some("みず".into()),
            result: Err(FetchError::Status(500)),
        });

        assert_matches!(app.load_status, LoadStatus::Failed(FetchError::Status(500)));
        assert!(app.session.current_word().is_none());
        assert_eq!(app.tap('み'), None);

        let action = app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(action, Some(Action::Fetch(Some("みず".into()))));
    }

    #[test]
    fn test_resubmit_replaces_session() {
        let mut app = practicing_app();
        app.handle_key(key(KeyCode::Char('/')));
        app.filter_input.clear();
        type_str(&mut app, "みず");

        let action = app.handle_key(key(KeyCode::Enter));

        assert_eq!(action, Some(Action::Fetch(Some("みず".into()))));
        assert_eq!(app.session.phase(), SessionPhase::Empty);
        assert!(app.session.current_word().is_none());
        // tiles of the new pool never count against the old word
        assert_eq!(app.tap('み'), None);

        app.begin_load(2);
        app.on_words_loaded(WordsLoaded {
            generation: 2,
            chars: Some("みず".into()),
            result: Err(FetchError::Status(500)),
        });
        assert_eq!(app.session.phase(), SessionPhase::Empty);
        assert!(app.session.current_word().is_none());
        assert_eq!(app.tiles, vec!['み', 'ず']);
    }

    #[test]
    fn test_modified_keys_do_not_edit_filter() {
        let mut app = App::new(Some("かさ".into()));
        app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        app.handle_key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::ALT));
        assert_eq!(app.filter_input, "かさ");

        app.handle_key(KeyEvent::new(KeyCode::Char('み'), KeyModifiers::SHIFT));
        assert_eq!(app.filter_input, "かさみ");
    }

    #[test]
    fn test_retry_is_ignored_when_not_failed() {
        let mut app = practicing_app();
        assert_eq!(app.handle_key(key(KeyCode::Char('r'))), None);
    }

    #[test]
    fn test_slash_returns_to_filter_entry() {
        let mut app = practicing_app();
        app.handle_key(key(KeyCode::Char('/')));
        assert_eq!(app.mode, Mode::EnteringFilter);
        assert_eq!(app.filter_input, "すしかさ");
    }

    #[test]
    fn test_is_hiragana() {
        assert!(is_hiragana('あ'));
        assert!(is_hiragana('ん'));
        assert!(!is_hiragana('ア'));
        assert!(!is_hiragana('a'));
    }
}
