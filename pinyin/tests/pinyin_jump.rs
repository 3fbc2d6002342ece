// pinyin/tests/pinyin_jump.rs
//
// Integration tests for jumping through pinyin readings on the grid host.
//
// Tests cover:
// - Full pinyin, initials and tone-marked queries over Han text
// - Plain Latin text only matching directly
// - Labels across several matching rows
// - Reading overrides loaded through PinyinConfig
// - Restore of the prior selection on cancel

use hintjump_core::{CaretTarget, MatchStrategy, Selection};
use hintjump_pinyin::{
    pinyin_engine, GridHost, InputEvent, JumpEngine, Key, KeyInput, PinyinConfig, PinyinRomanizer, SessionState,
};

fn engine(lines: &[&str]) -> JumpEngine<PinyinRomanizer, GridHost> {
    pinyin_engine(GridHost::new(lines.iter().copied()), PinyinConfig::default()).expect("default config")
}

fn run_query(engine: &mut JumpEngine<PinyinRomanizer, GridHost>, raw: &str) {
    engine.process_event(InputEvent::Key(KeyInput::at_ms(Key::Shift, 0)));
    engine.process_event(InputEvent::Key(KeyInput::at_ms(Key::Shift, 100)));
    assert_eq!(engine.state(), SessionState::AwaitingQuery);
    engine.process_event(InputEvent::SubmitQuery(raw.to_string()));
}

#[test]
fn full_pinyin_jumps_into_han_text() {
    let mut engine = engine(&["hello world", "你好世界"]);
    run_query(&mut engine, "nihao");

    assert_eq!(engine.state(), SessionState::Idle);
    assert_eq!(
        engine.host().caret(),
        Some(&CaretTarget {
            handle: 1,
            offset: 2,
            at_unit_end: false
        })
    );
    assert_eq!(engine.host().focused(), Some(1));
    assert!(engine.host().overlay().hints.is_empty());
}

#[test]
fn initials_reach_the_end_of_a_unit() {
    let mut engine = engine(&["hello world", "你好世界"]);
    let found = engine.collect(&["sj"]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].strategy, MatchStrategy::Initials);
    assert_eq!((found[0].span.start, found[0].span.len), (2, 2));

    run_query(&mut engine, "sj");
    let caret = engine.host().caret().expect("jumped");
    assert_eq!(caret.offset, 4);
    assert!(caret.at_unit_end);
}

#[test]
fn tone_marks_are_folded() {
    let mut engine = engine(&["中国人", "日本人"]);
    run_query(&mut engine, "zhōngguó");
    assert_eq!(engine.host().caret().map(|c| (c.handle, c.offset)), Some((0, 2)));
}

#[test]
fn umlaut_query_reaches_its_reading() {
    let mut engine = engine(&["红色", "绿色"]);
    run_query(&mut engine, "lǜ");
    assert_eq!(engine.state(), SessionState::Idle);
    assert_eq!(engine.host().caret().map(|c| (c.handle, c.offset)), Some((1, 1)));
}

#[test]
fn several_rows_get_labels() {
    let mut engine = engine(&["你好", "hello world", "你们好"]);
    run_query(&mut engine, "ni");

    assert_eq!(engine.state(), SessionState::Active);
    let hints: Vec<(&str, usize, usize)> = engine
        .session()
        .hints()
        .iter()
        .map(|h| (h.label.as_str(), h.span.handle, h.span.start))
        .collect();
    assert_eq!(hints, vec![("a", 0, 0), ("s", 2, 0)]);
    assert_eq!(engine.host().overlay().hints.len(), 2);

    engine.process_event(InputEvent::Key(KeyInput::at_ms(Key::Char('s'), 500)));
    assert_eq!(engine.state(), SessionState::Idle);
    assert_eq!(engine.host().caret().map(|c| (c.handle, c.offset)), Some((2, 1)));
    assert!(!engine.host().overlay().is_visible());
}

#[test]
fn direct_matches_still_win_in_mixed_text() {
    let mut engine = engine(&["用 Rust 写", "rust 和 你"]);
    let found = engine.collect(&["rust"]);
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|c| c.strategy == MatchStrategy::Direct));
}

#[test]
fn not_found_shows_notice() {
    let mut engine = engine(&["你好世界"]);
    run_query(&mut engine, "xyz");
    assert_eq!(engine.state(), SessionState::Idle);
    assert_eq!(engine.host().effects().len(), 1);
    assert!(engine.host().caret().is_none());
}

#[test]
fn reading_overrides_from_config_file() {
    let dir = std::env::temp_dir().join(format!("hintjump_pinyin_it_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    std::fs::write(dir.join("readings.tsv"), "# bank\n行\thang\n").expect("write table");
    std::fs::write(
        dir.join("hintjump.toml"),
        "label_alphabet = \"jk\"\nextra_readings = \"readings.tsv\"\n",
    )
    .expect("write config");

    let config = PinyinConfig::load_toml(dir.join("hintjump.toml")).expect("config loads");
    let mut engine = pinyin_engine(GridHost::new(["去银行", "银行卡"]), config).expect("engine");
    let _ = std::fs::remove_dir_all(&dir);

    run_query(&mut engine, "yinhang");
    let labels: Vec<&str> = engine.session().hints().iter().map(|h| h.label.as_str()).collect();
    assert_eq!(labels, vec!["j", "k"]);

    engine.process_event(InputEvent::Key(KeyInput::at_ms(Key::Char('k'), 500)));
    assert_eq!(engine.host().caret().map(|c| (c.handle, c.offset)), Some((1, 2)));
}

#[test]
fn broken_reading_table_is_a_setup_error() {
    let config = PinyinConfig {
        extra_readings: Some(std::env::temp_dir().join("hintjump_missing_readings.tsv")),
        ..PinyinConfig::default()
    };
    assert!(pinyin_engine(GridHost::new(["x"]), config).is_err());
}

#[test]
fn cancel_restores_prior_selection() {
    let selection = Selection {
        anchor: 0,
        anchor_offset: 0,
        focus: 0,
        focus_offset: 2,
        text: "你好".to_string(),
    };
    let host = GridHost::new(["你好世界"]).with_selection(selection.clone());
    let mut engine = pinyin_engine(host, PinyinConfig::default()).expect("engine");

    engine.process_event(InputEvent::Key(KeyInput::at_ms(Key::Shift, 0)));
    engine.process_event(InputEvent::Key(KeyInput::at_ms(Key::Shift, 100)));
    assert_eq!(engine.context().prompt_prefill, "你好");

    engine.process_event(InputEvent::Key(KeyInput::at_ms(Key::Escape, 200)));
    assert_eq!(engine.state(), SessionState::Idle);
    assert_eq!(engine.host().current_selection(), Some(&selection));
    assert_eq!(engine.host().focused(), Some(0));
}

#[test]
fn latin_words_do_not_match_by_initials() {
    let mut engine = engine(&["hello world", "the quick fox"]);
    assert!(engine.collect(&["tqf"]).is_empty());
    assert!(engine.collect(&["lowo"]).is_empty());

    run_query(&mut engine, "tqf");
    assert_eq!(engine.state(), SessionState::Idle);
    assert!(engine.host().caret().is_none());
    assert_eq!(engine.host().effects().len(), 1);
}
