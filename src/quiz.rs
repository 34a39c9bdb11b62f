use tracing::info;

use crate::cloze::Attempt;
use crate::curriculum::Browser;
use crate::sentence::Sentence;
use crate::session::{Phase, Session};
use crate::speech::{Speech, SpeechOutcome};
use crate::TICK_RATE_MS;

/// How long a status message stays up
const STATUS_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub kind: StatusKind,
    ticks_left: u64,
}

impl Status {
    fn new(text: impl Into<String>, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            ticks_left: STATUS_SECS * 1000 / TICK_RATE_MS,
        }
    }
}

/// The sentence currently in front of the learner: session state plus which
/// gap the cursor is in and any transient status line.
pub struct Quiz {
    pub session: Session,
    focused: usize,
    status: Option<Status>,
    speech: Option<Speech>,
    browser: Option<Browser>,
}

impl Quiz {
    pub fn new(mut session: Session, speech: Option<Speech>) -> Self {
        session.prepare();
        Self {
            session,
            focused: 0,
            status: None,
            speech,
            browser: None,
        }
    }

    /// Allow switching level and topic from inside the quiz
    pub fn with_browser(mut self, browser: Browser) -> Self {
        self.browser = Some(browser);
        self
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn has_speech(&self) -> bool {
        self.speech.is_some()
    }

    pub fn attempt(&self) -> Option<&Attempt> {
        self.session.attempt()
    }

    pub fn is_checked(&self) -> bool {
        self.session.phase() == Phase::Checked
    }

    /// Word position of the gap being edited
    pub fn focused_gap(&self) -> Option<usize> {
        self.session
            .mask()
            .and_then(|m| m.positions().get(self.focused).copied())
    }

    fn gap_count(&self) -> usize {
        self.session.mask().map_or(0, |m| m.len())
    }

    pub fn focus_next(&mut self) {
        let n = self.gap_count();
        if n > 0 {
            self.focused = (self.focused + 1) % n;
        }
    }

    pub fn focus_prev(&mut self) {
        let n = self.gap_count();
        if n > 0 {
            self.focused = (self.focused + n - 1) % n;
        }
    }

    pub fn type_char(&mut self, c: char) {
        if let Some(position) = self.focused_gap() {
            let mut text = self.session.answer(position).to_string();
            text.push(c);
            // focused_gap always names a gap of the live mask
            let _ = self.session.set_answer(position, text);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(position) = self.focused_gap() {
            let mut text = self.session.answer(position).to_string();
            if text.pop().is_some() {
                let _ = self.session.set_answer(position, text);
            }
        }
    }

    /// Enter: score the answers, or move on once they have been scored
    pub fn check_or_next(&mut self) {
        if self.is_checked() {
            self.next();
            return;
        }
        if let Ok(attempt) = self.session.submit() {
            info!(
                correct = attempt.correct_count(),
                gaps = attempt.results.len(),
                "sentence checked"
            );
        }
    }

    pub fn next(&mut self) {
        let step = self.session.advance();
        if step.wrapped {
            self.set_status("Round complete! Restarting from the beginning.", StatusKind::Info);
        }
        self.reset_view();
    }

    pub fn previous(&mut self) {
        self.session.retreat();
        self.reset_view();
    }

    pub fn new_mask(&mut self) {
        self.session.regenerate();
        self.focused = 0;
    }

    pub fn cycle_difficulty(&mut self) {
        let difficulty = self.session.difficulty().next();
        self.session.set_difficulty(difficulty);
        self.focused = 0;
        self.set_status(format!("Difficulty: {difficulty}"), StatusKind::Info);
    }

    pub fn next_level(&mut self) {
        self.switch_pool(Browser::next_level);
    }

    pub fn next_topic(&mut self) {
        self.switch_pool(Browser::next_topic);
    }

    fn switch_pool(&mut self, step: fn(&mut Browser) -> Vec<Sentence>) {
        let Some(browser) = self.browser.as_mut() else {
            self.set_status("Switching topics needs the built-in curriculum", StatusKind::Warning);
            return;
        };
        let pool = step(browser);
        let label = browser.describe();
        match self.session.replace_pool(pool) {
            Ok(()) => {
                info!(selection = %label, "switched sentence pool");
                self.reset_view();
                self.set_status(label, StatusKind::Info);
            }
            Err(e) => self.set_status(e.to_string(), StatusKind::Warning),
        }
    }

    /// Request audio for the current sentence; the result shows up on a later tick
    pub fn speak(&mut self) {
        let Some(speech) = self.speech.as_ref() else {
            self.set_status(
                "Speech is not configured (see --speech-command)",
                StatusKind::Warning,
            );
            return;
        };
        speech.speak(self.session.current());
        self.set_status("Fetching audio...", StatusKind::Info);
    }

    /// Returns true when the status line changed
    pub fn on_tick(&mut self) -> bool {
        let mut changed = false;
        if let Some(outcome) = self.speech.as_ref().and_then(Speech::poll) {
            match outcome {
                SpeechOutcome::Playing => self.status = None,
                SpeechOutcome::Unavailable => {
                    self.set_status("Audio unavailable for this sentence", StatusKind::Warning)
                }
                SpeechOutcome::NoPlayer => self.set_status(
                    "No audio player configured (see --player-command)",
                    StatusKind::Warning,
                ),
            }
            changed = true;
        }
        if let Some(status) = self.status.as_mut() {
            status.ticks_left = status.ticks_left.saturating_sub(1);
            if status.ticks_left == 0 {
                self.status = None;
                changed = true;
            }
        }
        changed
    }

    fn reset_view(&mut self) {
        self.session.prepare();
        self.focused = 0;
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(Status::new(text, kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloze::{Difficulty, MaskRatios};
    use crate::curriculum::Curriculum;
    use crate::error::SpeechError;
    use crate::speech::Synthesizer;
    use std::sync::Arc;
    use std::time::Duration;

    struct Mute;

    impl Synthesizer for Mute {
        fn synthesize(&self, _text: &str, _timeout: Duration) -> Result<Vec<u8>, SpeechError> {
            Err(SpeechError::Empty {
                program: "mute".into(),
            })
        }
    }

    struct Echo;

    impl Synthesizer for Echo {
        fn synthesize(&self, text: &str, _timeout: Duration) -> Result<Vec<u8>, SpeechError> {
            Ok(text.as_bytes().to_vec())
        }
    }

    fn quiz_with_speech(synth: Arc<dyn Synthesizer>) -> Quiz {
        let pool = vec![Sentence::new("Can you hear this sentence?", "")];
        let session = Session::with_seed(pool, Difficulty::Low, MaskRatios::default(), Some(2)).unwrap();
        Quiz::new(session, Some(Speech::new(synth, None, Duration::from_millis(200))))
    }

    /// Tick until a warning shows up or give up after about two seconds
    fn tick_until_warning(q: &mut Quiz) -> Option<String> {
        for _ in 0..200 {
            q.on_tick();
            if let Some(status) = q.status().filter(|s| s.kind == StatusKind::Warning) {
                return Some(status.text.clone());
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        None
    }

    fn quiz(texts: &[&str]) -> Quiz {
        let pool = texts.iter().map(|t| Sentence::new(*t, "")).collect();
        let session = Session::with_seed(pool, Difficulty::High, MaskRatios::default(), Some(9)).unwrap();
        Quiz::new(session, None)
    }

    fn type_str(q: &mut Quiz, s: &str) {
        for c in s.chars() {
            q.type_char(c);
        }
    }

    #[test]
    fn starts_with_mask_and_first_gap_focused() {
        let q = quiz(&["I have been waiting for you for two hours."]);
        assert_eq!(q.session.phase(), Phase::MaskReady);
        let first = q.session.mask().unwrap().positions()[0];
        assert_eq!(q.focused_gap(), Some(first));
    }

    #[test]
    fn typing_fills_the_focused_gap() {
        let mut q = quiz(&["English is spoken all over the world."]);
        let gap = q.focused_gap().unwrap();
        type_str(&mut q, "abcd");
        q.backspace();
        assert_eq!(q.session.answer(gap), "abc");
        assert_eq!(q.session.phase(), Phase::Answering);
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut q = quiz(&["The correlation between poverty and crime is a subject of intense debate."]);
        let gaps = q.session.mask().unwrap().positions().to_vec();
        assert!(gaps.len() > 1);
        q.focus_prev();
        assert_eq!(q.focused_gap(), gaps.last().copied());
        q.focus_next();
        assert_eq!(q.focused_gap(), Some(gaps[0]));
    }

    #[test]
    fn filling_every_gap_correctly_is_perfect() {
        let mut q = quiz(&["Seldom have we seen such a magnificent view."]);
        let words: Vec<String> = q.session.words().iter().map(|w| w.to_string()).collect();
        let gaps = q.session.mask().unwrap().len();
        for _ in 0..gaps {
            let gap = q.focused_gap().unwrap();
            type_str(&mut q, &words[gap]);
            q.focus_next();
        }
        q.check_or_next();
        assert!(q.is_checked());
        assert!(q.attempt().unwrap().all_correct);
    }

    #[test]
    fn enter_twice_moves_on_and_wraps_with_status() {
        let mut q = quiz(&["One sentence here.", "Another sentence there."]);
        q.check_or_next();
        assert!(q.is_checked());
        q.check_or_next();
        assert_eq!(q.session.current_index(), 1);
        assert_eq!(q.session.phase(), Phase::MaskReady);
        assert!(q.status().is_none());

        q.next();
        assert_eq!(q.session.current_index(), 0);
        assert_eq!(q.status().map(|s| s.kind), Some(StatusKind::Info));
    }

    #[test]
    fn status_expires_after_ticks() {
        let mut q = quiz(&["Short words only here."]);
        q.cycle_difficulty();
        assert_eq!(q.status().unwrap().text, "Difficulty: Low");
        for _ in 0..(STATUS_SECS * 1000 / TICK_RATE_MS) {
            q.on_tick();
        }
        assert!(q.status().is_none());
    }

    #[test]
    fn speaking_without_speech_warns() {
        let mut q = quiz(&["Nobody will hear this."]);
        assert!(!q.has_speech());
        q.speak();
        assert_eq!(q.status().map(|s| s.kind), Some(StatusKind::Warning));
    }

    #[test]
    fn previous_and_new_mask_reset_focus() {
        let mut q = quiz(&["First sentence goes here.", "Second sentence goes there."]);
        q.focus_next();
        q.previous();
        assert_eq!(q.session.current_index(), 1);
        assert_eq!(q.focused_gap(), q.session.mask().map(|m| m.positions()[0]));

        q.focus_next();
        q.new_mask();
        assert_eq!(q.focused_gap(), q.session.mask().map(|m| m.positions()[0]));
    }

    #[test]
    fn unavailable_audio_is_reported_on_a_later_tick() {
        let mut q = quiz_with_speech(Arc::new(Mute));
        assert!(q.has_speech());
        q.speak();
        assert_eq!(q.status().map(|s| s.kind), Some(StatusKind::Info));
        let warning = tick_until_warning(&mut q).unwrap();
        assert!(warning.contains("unavailable"));
    }

    #[test]
    fn audio_without_a_player_is_reported() {
        let mut q = quiz_with_speech(Arc::new(Echo));
        q.speak();
        let warning = tick_until_warning(&mut q).unwrap();
        assert!(warning.contains("--player-command"));
    }

    #[test]
    fn tick_reports_status_changes() {
        let mut q = quiz(&["Nothing is shown at first."]);
        assert!(!q.on_tick());
        q.cycle_difficulty();
        let ticks = STATUS_SECS * 1000 / TICK_RATE_MS;
        let changes = (0..ticks).filter(|_| q.on_tick()).count();
        assert_eq!(changes, 1);
    }

    #[test]
    fn switching_topic_replaces_the_pool() {
        let browser = Browser::new(Curriculum::builtin().unwrap(), Some("CET-4/6"), None).unwrap();
        let session = Session::with_seed(
            browser.sentences(),
            Difficulty::Normal,
            MaskRatios::default(),
            Some(4),
        )
        .unwrap();
        let mut q = Quiz::new(session, None).with_browser(browser);
        q.next();
        q.focus_next();
        assert_eq!(q.session.current_index(), 1);

        q.next_topic();
        assert_eq!(q.session.pool().len(), 3);
        assert_eq!(q.session.current_index(), 0);
        assert_eq!(q.session.phase(), Phase::MaskReady);
        assert_eq!(q.focused_gap(), q.session.mask().map(|m| m.positions()[0]));
        assert_eq!(q.status().unwrap().text, "大学英语 (CET-4/6) / 虚拟语气");

        q.next_level();
        assert_eq!(q.session.pool().len(), 5);
        assert_eq!(q.session.current().level.as_deref(), Some("IELTS/TOEFL"));
    }

    #[test]
    fn switching_without_curriculum_warns() {
        let mut q = quiz(&["Sentences from a file only."]);
        q.next_level();
        assert_eq!(q.status().map(|s| s.kind), Some(StatusKind::Warning));
        assert_eq!(q.session.pool().len(), 1);
    }
}
