pub mod game;
pub mod registration;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::js_sys::Function;

pub use game::{
    GameError, GameEvent, GamePhase, GameRound, GuessEngine, Hint, Resolution, RoundId,
    RoundSnapshot, TargetPicker, Transition, Verdict, INITIAL_ATTEMPTS, INITIAL_SECONDS,
    MAX_GUESS,
};
pub use registration::{
    ConfirmedRegistration, Field, RegistrationForm, RegistrationInput, SubmitRejected,
    ValidationError,
};

/// 倒计时间隔（毫秒）。
pub const TICK_INTERVAL_MS: u32 = 1_000;

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
}

fn to_js_error<E: Serialize>(error: E) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn game_to_js_error(error: GameError) -> JsValue {
    // 非法状态转换说明前端调用顺序有误，需要显眼地报出来
    if matches!(error, GameError::InvalidTransition { .. }) {
        utils::error(&format!("guess game: {error}"));
    }
    to_js_error(error)
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn message_of(result: Result<(), ValidationError>) -> Option<String> {
    result.err().map(|error| error.to_string())
}

#[wasm_bindgen(js_name = "validateName")]
pub fn validate_name(value: &str) -> Option<String> {
    message_of(registration::validate_name(value))
}

#[wasm_bindgen(js_name = "validateEmail")]
pub fn validate_email(value: &str) -> Option<String> {
    message_of(registration::validate_email(value))
}

#[wasm_bindgen(js_name = "validatePhone")]
pub fn validate_phone(value: &str) -> Option<String> {
    message_of(registration::validate_phone(value))
}

/// `input` 为 `{ name, email, phone }` 对象。
#[wasm_bindgen(js_name = "canSubmit")]
pub fn can_submit(input: JsValue, not_robot: bool) -> Result<bool, JsValue> {
    let input: RegistrationInput = from_value(input).map_err(JsValue::from)?;
    Ok(registration::can_submit(&input, not_robot))
}

#[wasm_bindgen(js_name = "RegistrationForm")]
pub struct RegistrationFormHandle {
    form: RegistrationForm,
}

#[wasm_bindgen(js_class = "RegistrationForm")]
impl RegistrationFormHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> RegistrationFormHandle {
        RegistrationFormHandle {
            form: RegistrationForm::new(),
        }
    }

    #[wasm_bindgen(js_name = "setName")]
    pub fn set_name(&mut self, text: String) -> Option<String> {
        self.form.set_name(text).map(|error| error.to_string())
    }

    #[wasm_bindgen(js_name = "setEmail")]
    pub fn set_email(&mut self, text: String) -> Option<String> {
        self.form.set_email(text).map(|error| error.to_string())
    }

    #[wasm_bindgen(js_name = "setPhone")]
    pub fn set_phone(&mut self, text: String) -> Option<String> {
        self.form.set_phone(text).map(|error| error.to_string())
    }

    #[wasm_bindgen(js_name = "setNotRobot")]
    pub fn set_not_robot(&mut self, checked: bool) {
        self.form.set_not_robot(checked);
    }

    #[wasm_bindgen(js_name = "canSubmit")]
    pub fn can_submit(&self) -> bool {
        self.form.can_submit()
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_value(&self.form).map_err(JsValue::from)
    }

    pub fn submit(&self) -> Result<Confirmation, JsValue> {
        match self.form.submit() {
            Ok(confirmed) => {
                utils::log(&format!("registration confirmed for {}", confirmed.name()));
                Ok(Confirmation { confirmed })
            }
            Err(rejected) => Err(to_js_error(rejected)),
        }
    }

    pub fn reset(&mut self) {
        self.form.reset();
    }
}

impl Default for RegistrationFormHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// 确认弹窗持有的注册信息。
#[wasm_bindgen]
pub struct Confirmation {
    confirmed: ConfirmedRegistration,
}

#[wasm_bindgen]
impl Confirmation {
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        to_value(&self.confirmed.summary()).map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = "goBack")]
    pub fn go_back(self) -> RegistrationFormHandle {
        RegistrationFormHandle {
            form: self.confirmed.go_back(),
        }
    }

    /// 返回绑定了该手机号的游戏，尚未开局。
    #[wasm_bindgen(js_name = "continueToGame")]
    pub fn continue_to_game(self) -> GuessGame {
        GuessGame::from_engine(GuessEngine::new().for_phone(self.confirmed.continue_to_game()))
    }
}

#[wasm_bindgen]
pub struct GuessGame {
    engine: Rc<RefCell<GuessEngine>>,
    countdown: Rc<Cell<Option<RoundId>>>,
}

impl GuessGame {
    fn from_engine(engine: GuessEngine) -> GuessGame {
        GuessGame {
            engine: Rc::new(RefCell::new(engine)),
            countdown: Rc::new(Cell::new(None)),
        }
    }

    fn apply<F>(&self, action: F) -> Result<String, JsValue>
    where
        F: FnOnce(&mut GuessEngine) -> Result<Vec<GameEvent>, GameError>,
    {
        let mut engine = self.engine.borrow_mut();
        let events = action(&mut *engine).map_err(game_to_js_error)?;
        serde_json::to_string(&engine.resolution(events)).map_err(serde_to_js_error)
    }
}

#[wasm_bindgen]
impl GuessGame {
    #[wasm_bindgen(constructor)]
    pub fn new(phone: Option<String>, seed: Option<u32>) -> GuessGame {
        let engine = match seed {
            Some(seed) => GuessEngine::with_seed(u64::from(seed)),
            None => GuessEngine::new(),
        };
        let engine = match phone {
            Some(phone) => engine.for_phone(phone),
            None => engine,
        };
        GuessGame::from_engine(engine)
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_value(&self.engine.borrow().snapshot()).map_err(JsValue::from)
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.engine.borrow().snapshot()).map_err(serde_to_js_error)
    }

    #[wasm_bindgen(js_name = "roundId")]
    pub fn round_id(&self) -> Option<u32> {
        self.engine.borrow().round_id()
    }

    pub fn start(&self, phone: &str) -> Result<String, JsValue> {
        self.apply(|engine| engine.start(phone))
    }

    pub fn reset(&self) -> Result<String, JsValue> {
        self.apply(GuessEngine::reset)
    }

    pub fn guess(&self, raw_input: &str) -> Result<String, JsValue> {
        self.apply(|engine| engine.guess(raw_input))
    }

    #[wasm_bindgen(js_name = "useHint")]
    pub fn use_hint(&self) -> Result<String, JsValue> {
        self.apply(GuessEngine::use_hint)
    }

    #[wasm_bindgen(js_name = "endEarly")]
    pub fn end_early(&self, reason: &str) -> Result<String, JsValue> {
        self.apply(|engine| engine.end_early(reason))
    }

    /// 作用于当前回合。自行用定时器驱动时请改用 `tickRound`，
    /// 否则上一回合遗留的定时器会扣减新回合的时间。
    pub fn tick(&self) -> Result<String, JsValue> {
        self.apply(|engine| Ok(engine.tick()))
    }

    #[wasm_bindgen(js_name = "tickRound")]
    pub fn tick_round(&self, round_id: u32) -> Result<String, JsValue> {
        self.apply(|engine| Ok(engine.tick_round(round_id)))
    }

    /// 为当前回合启动每秒一次的倒计时；回合结束或被替换后自动停止。
    #[wasm_bindgen(js_name = "startCountdown")]
    pub fn start_countdown(&self, on_tick: Option<Function>) -> Result<(), JsValue> {
        let (round_id, phase) = {
            let engine = self.engine.borrow();
            (engine.round_id(), engine.phase())
        };
        let round_id = match round_id {
            Some(round_id) if phase == GamePhase::Active => round_id,
            _ => {
                return Err(game_to_js_error(GameError::InvalidTransition {
                    operation: Transition::StartCountdown,
                    phase,
                }))
            }
        };
        // 同一回合只保留一个倒计时
        if self.countdown.get() == Some(round_id) {
            return Ok(());
        }
        self.countdown.set(Some(round_id));

        let engine = Rc::clone(&self.engine);
        let countdown = Rc::clone(&self.countdown);
        spawn_local(async move {
            loop {
                TimeoutFuture::new(TICK_INTERVAL_MS).await;

                // 应用计时前再次核对回合，旧回合的计时到这里就停止
                let resolution = {
                    let mut engine = engine.borrow_mut();
                    let events = engine.tick_round(round_id);
                    if events.is_empty() {
                        break;
                    }
                    engine.resolution(events)
                };

                if let Some(callback) = &on_tick {
                    match serde_json::to_string(&resolution) {
                        Ok(json) => {
                            let payload = JsValue::from_str(&json);
                            if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
                                utils::error(&format!("countdown callback failed: {err:?}"));
                            }
                        }
                        Err(err) => utils::error(&format!("countdown serialization failed: {err}")),
                    }
                }

                if resolution.snapshot.phase != GamePhase::Active {
                    break;
                }
            }
            if countdown.get() == Some(round_id) {
                countdown.set(None);
            }
        });
        Ok(())
    }
}
