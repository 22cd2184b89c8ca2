//! 浏览器环境下的绑定测试：`wasm-pack test --headless --firefox`

#![cfg(target_arch = "wasm32")]

use guess_game::{
    validate_name, validate_phone, GamePhase, GuessGame, RegistrationFormHandle, Resolution,
    RoundSnapshot,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn parse(json: &str) -> Resolution {
    serde_json::from_str(json).expect("resolution should be valid JSON")
}

#[wasm_bindgen_test]
fn validators_return_messages_or_nothing() {
    assert_eq!(validate_name("Ada"), None);
    assert_eq!(
        validate_name("A").as_deref(),
        Some("Name must be more than 1 character")
    );
    assert_eq!(validate_phone("5551234562"), None);
    assert!(validate_phone("5551234561").is_some());
}

#[wasm_bindgen_test]
fn registration_flows_into_a_game() {
    let mut form = RegistrationFormHandle::new();
    assert!(form.set_name("Ada".into()).is_none());
    assert!(form.set_email("ada@example.com".into()).is_none());
    assert!(form.set_phone("5551234565".into()).is_none());
    assert!(!form.can_submit(), "robot flag not set yet");
    assert!(form.submit().is_err());

    form.set_not_robot(true);
    let confirmation = form.submit().expect("valid form should submit");
    let game = confirmation.continue_to_game();

    let resolution = parse(&game.reset().expect("reset starts the first round"));
    assert_eq!(resolution.snapshot.phase, GamePhase::Active);
    assert_eq!(resolution.snapshot.last_digit, 5);
}

#[wasm_bindgen_test]
fn invalid_guess_surfaces_as_a_tagged_error() {
    let game = GuessGame::new(None, Some(42));
    game.start("5551234563").expect("start should succeed");
    let error: JsValue = game.guess("abc").expect_err("non-numeric guess");
    let error: serde_json::Value =
        serde_wasm_bindgen::from_value(error).expect("error should be an object");
    assert_eq!(error["type"], "InvalidGuess");

    let snapshot: RoundSnapshot = serde_json::from_str(&game.snapshot_json().expect("snapshot"))
        .expect("snapshot should be valid JSON");
    assert_eq!(snapshot.attempts_remaining, 4);
}

#[wasm_bindgen_test]
fn stale_round_ticks_are_ignored_through_the_binding() {
    let game = GuessGame::new(Some("5551234568".into()), Some(7));
    game.reset().expect("first round");
    let first = game.round_id().expect("round id");
    game.end_early("").expect("end the first round");
    game.reset().expect("second round");

    let resolution = parse(&game.tick_round(first).expect("tick never fails"));
    assert!(resolution.events.is_empty());
    assert_eq!(resolution.snapshot.seconds_remaining, 60);
}

#[wasm_bindgen_test]
async fn countdown_ticks_the_active_round() {
    let game = GuessGame::new(Some("5551234562".into()), Some(3));
    game.reset().expect("first round");
    game.start_countdown(None).expect("round is active");

    gloo_timers::future::TimeoutFuture::new(2_500).await;

    let snapshot: RoundSnapshot = serde_json::from_str(&game.snapshot_json().expect("snapshot"))
        .expect("snapshot should be valid JSON");
    assert!(snapshot.seconds_remaining <= 58);
    assert_eq!(snapshot.phase, GamePhase::Active);
}
