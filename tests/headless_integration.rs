use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::KeyCode;
use gapfill::{
    cloze::MaskRatios,
    quiz::Quiz,
    runtime::{AppEvent, FixedTicker, Runner, TestEventSource},
    session::{Phase, Session},
    Difficulty, Sentence,
};

// Headless integration using the runtime + Quiz without a TTY.
// Keys are applied the way the binary applies them.
fn apply(quiz: &mut Quiz, event: AppEvent) {
    match event {
        AppEvent::Tick => {
            quiz.on_tick();
        }
        AppEvent::Resize => {}
        AppEvent::Key(key) => match key.code {
            KeyCode::Char(c) => quiz.type_char(c),
            KeyCode::Backspace => quiz.backspace(),
            KeyCode::Tab => quiz.focus_next(),
            KeyCode::Enter => quiz.check_or_next(),
            _ => {}
        },
    }
}

fn quiz(pool: Vec<Sentence>, seed: u64) -> Quiz {
    let session = Session::with_seed(pool, Difficulty::Normal, MaskRatios::default(), Some(seed)).unwrap();
    Quiz::new(session, None)
}

fn drain(quiz: &mut Quiz, runner: &Runner<TestEventSource, FixedTicker>, steps: u32) {
    for _ in 0..steps {
        apply(quiz, runner.step());
    }
}

#[test]
fn headless_answering_flow_scores_every_gap() {
    let mut quiz = quiz(
        vec![Sentence::new(
            "The window was broken by the naughty boy.",
            "窗户被那个淘气的男孩打破了。",
        )],
        7,
    );
    let words: Vec<String> = quiz.session.words().iter().map(|w| w.to_string()).collect();
    let gaps = quiz.session.mask().unwrap().positions().to_vec();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    // Type each answer in upper case with trailing punctuation dropped, Tab between gaps
    let mut sent = 0u32;
    for gap in &gaps {
        let answer = words[*gap].trim_end_matches('.').to_uppercase();
        for c in answer.chars() {
            tx.send(AppEvent::char(c)).unwrap();
            sent += 1;
        }
        tx.send(AppEvent::code(KeyCode::Tab)).unwrap();
        sent += 1;
    }
    tx.send(AppEvent::code(KeyCode::Enter)).unwrap();
    sent += 1;

    drain(&mut quiz, &runner, sent);

    assert_eq!(quiz.session.phase(), Phase::Checked);
    let attempt = quiz.attempt().unwrap();
    assert_eq!(attempt.results.len(), gaps.len());
    assert!(attempt.all_correct);
    assert_eq!(attempt.accuracy(), 100.0);
}

#[test]
fn headless_wrong_answer_is_reported() {
    let mut quiz = quiz(vec![Sentence::new("English is spoken all over the world.", "")], 11);
    let gap = quiz.focused_gap().unwrap();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );
    for ev in [
        AppEvent::char('z'),
        AppEvent::char('q'),
        AppEvent::code(KeyCode::Backspace),
        AppEvent::code(KeyCode::Enter),
    ] {
        tx.send(ev).unwrap();
    }
    drain(&mut quiz, &runner, 4);

    let attempt = quiz.attempt().unwrap();
    let result = attempt.results.iter().find(|r| r.position == gap).unwrap();
    assert_eq!(result.given, "z");
    assert!(!result.correct);
    assert!(!attempt.all_correct);
}

#[test]
fn headless_enter_walks_the_pool_and_wraps() {
    let pool = vec![
        Sentence::new("If I were you, I would not accept the offer.", ""),
        Sentence::new("Had I known the truth, I would have told you.", ""),
        Sentence::new("Seldom have we seen such a magnificent view.", ""),
    ];
    let mut quiz = quiz(pool, 5);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    // Check then move on, once per sentence
    for _ in 0..6 {
        tx.send(AppEvent::code(KeyCode::Enter)).unwrap();
    }
    drain(&mut quiz, &runner, 6);

    assert_eq!(quiz.session.current_index(), 0);
    assert_eq!(quiz.session.rounds_completed(), 1);
    assert_eq!(quiz.session.phase(), Phase::MaskReady);
    assert!(quiz.status().is_some());
}

#[test]
fn headless_ticks_clear_the_status_line() {
    let mut quiz = quiz(vec![Sentence::new("Nobody will hear this sentence.", "")], 1);
    quiz.speak();
    assert!(quiz.status().is_some());

    let (_tx, rx) = mpsc::channel::<AppEvent>();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );
    // Status lines last a few seconds at the regular tick rate
    drain(&mut quiz, &runner, 100);

    assert!(quiz.status().is_none());
}

#[test]
fn same_seed_gives_same_gaps() {
    let pool = || {
        vec![Sentence::new(
            "The correlation between poverty and crime is a subject of intense debate.",
            "",
        )]
    };
    let a = quiz(pool(), 99);
    let b = quiz(pool(), 99);
    assert_eq!(a.session.mask(), b.session.mask());
}
