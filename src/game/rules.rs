use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{
    state::{
        invalid_guess_notice, GamePhase, GameRound, Hint, RoundId, RoundSnapshot, GUESS_HIGHER,
        GUESS_LOWER, MAX_GUESS, MIN_GUESS, OUT_OF_ATTEMPTS, OUT_OF_TIME,
    },
    target::{last_digit_of, TargetPicker},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Transition {
    Start,
    Guess,
    UseHint,
    EndEarly,
    Reset,
    StartCountdown,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transition::Start => "start",
            Transition::Guess => "guess",
            Transition::UseHint => "useHint",
            Transition::EndEarly => "endEarly",
            Transition::Reset => "reset",
            Transition::StartCountdown => "startCountdown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum GameError {
    #[error("{notice}")]
    InvalidGuess { input: String, notice: String },
    #[error("cannot {operation} while the round is {phase}")]
    InvalidTransition {
        operation: Transition,
        phase: GamePhase,
    },
    #[error("phone {phone:?} does not end in a digit between 2 and 9")]
    InvalidPhoneForGame { phone: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Higher,
    Lower,
}

/// 每次状态转换产生的事件。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    RoundStarted { round_id: RoundId, last_digit: u8 },
    GuessEvaluated { value: u8, verdict: Verdict },
    HintRevealed { hint: Hint },
    SecondElapsed { seconds_remaining: u8 },
    RoundWon { attempts_used: u8 },
    RoundLost { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub snapshot: RoundSnapshot,
    pub events: Vec<GameEvent>,
}

impl Resolution {
    pub fn new(snapshot: RoundSnapshot, events: Vec<GameEvent>) -> Self {
        Self { snapshot, events }
    }
}

/// 与前端 `parseInt` 一致：忽略前导空白，读取可选符号和开头的数字，其余字符丢弃。
/// 没有数字或数值溢出时返回 None。
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let text = raw.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digit_count = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digit_count == 0 {
        return None;
    }
    let magnitude = rest[..digit_count].parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// 猜数字引擎：持有当前回合，所有转换都在这里校验。
pub struct GuessEngine {
    picker: TargetPicker,
    phone: Option<String>,
    round: Option<GameRound>,
    last_round_id: RoundId,
}

impl GuessEngine {
    pub fn new() -> Self {
        Self::with_picker(TargetPicker::new())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_picker(TargetPicker::with_seed(seed))
    }

    fn with_picker(picker: TargetPicker) -> Self {
        Self {
            picker,
            phone: None,
            round: None,
            last_round_id: 0,
        }
    }

    /// 绑定确认页传来的手机号，之后可直接 reset 开局。
    pub fn for_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn phase(&self) -> GamePhase {
        self.round
            .as_ref()
            .map(GameRound::phase)
            .unwrap_or_default()
    }

    pub fn round(&self) -> Option<&GameRound> {
        self.round.as_ref()
    }

    pub fn round_id(&self) -> Option<RoundId> {
        self.round.as_ref().map(GameRound::round_id)
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        self.round
            .as_ref()
            .map(GameRound::snapshot)
            .unwrap_or_else(RoundSnapshot::not_started)
    }

    pub fn resolution(&self, events: Vec<GameEvent>) -> Resolution {
        Resolution::new(self.snapshot(), events)
    }

    fn ensure_can_start(&self, operation: Transition) -> Result<(), GameError> {
        let phase = self.phase();
        if !phase.can_start() {
            warn!(%operation, %phase, "rejected transition");
            return Err(GameError::InvalidTransition { operation, phase });
        }
        Ok(())
    }

    fn active_round_mut(&mut self, operation: Transition) -> Result<&mut GameRound, GameError> {
        let phase = self.phase();
        match self.round.as_mut() {
            Some(round) if phase == GamePhase::Active => Ok(round),
            _ => {
                warn!(%operation, %phase, "rejected transition");
                Err(GameError::InvalidTransition { operation, phase })
            }
        }
    }

    pub fn start(&mut self, phone: &str) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_can_start(Transition::Start)?;
        self.begin_round(phone)
    }

    /// 用上一次的手机号重新开局。
    pub fn reset(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_can_start(Transition::Reset)?;
        let Some(phone) = self.phone.clone() else {
            warn!("reset without a known phone");
            return Err(GameError::InvalidTransition {
                operation: Transition::Reset,
                phase: self.phase(),
            });
        };
        self.begin_round(&phone)
    }

    fn begin_round(&mut self, phone: &str) -> Result<Vec<GameEvent>, GameError> {
        let invalid_phone = || GameError::InvalidPhoneForGame {
            phone: phone.to_owned(),
        };
        let last_digit = last_digit_of(phone).ok_or_else(invalid_phone)?;
        let target = self.picker.pick(last_digit).ok_or_else(invalid_phone)?;

        self.last_round_id = self.last_round_id.wrapping_add(1);
        let round_id = self.last_round_id;
        self.round = Some(GameRound::begin(round_id, last_digit, target));
        self.phone = Some(phone.to_owned());
        info!(round_id, last_digit, "round started");

        Ok(vec![GameEvent::RoundStarted {
            round_id,
            last_digit,
        }])
    }

    pub fn guess(&mut self, raw_input: &str) -> Result<Vec<GameEvent>, GameError> {
        let round = self.active_round_mut(Transition::Guess)?;

        let value = match parse_leading_int(raw_input) {
            Some(value) if (i64::from(MIN_GUESS)..=i64::from(MAX_GUESS)).contains(&value) => {
                value as u8
            }
            _ => {
                debug!(input = raw_input, "guess rejected");
                return Err(GameError::InvalidGuess {
                    input: raw_input.to_owned(),
                    notice: invalid_guess_notice(round.last_digit),
                });
            }
        };

        round.attempts_remaining = round.attempts_remaining.saturating_sub(1);

        // 先判断是否猜中，再判断次数是否用尽
        let mut events = Vec::new();
        if value == round.target {
            events.push(GameEvent::GuessEvaluated {
                value,
                verdict: Verdict::Correct,
            });
            round.finish(GamePhase::Won, "");
            events.push(GameEvent::RoundWon {
                attempts_used: round.attempts_used(),
            });
            info!(round_id = round.round_id, attempts_used = round.attempts_used(), "round won");
            return Ok(events);
        }

        let (verdict, message) = if value < round.target {
            (Verdict::Higher, GUESS_HIGHER)
        } else {
            (Verdict::Lower, GUESS_LOWER)
        };
        events.push(GameEvent::GuessEvaluated { value, verdict });

        if round.attempts_remaining == 0 {
            round.finish(GamePhase::Lost, OUT_OF_ATTEMPTS);
            events.push(GameEvent::RoundLost {
                reason: OUT_OF_ATTEMPTS.to_owned(),
            });
            info!(round_id = round.round_id, "round lost: {OUT_OF_ATTEMPTS}");
        } else {
            round.last_outcome_message = message.to_owned();
        }
        Ok(events)
    }

    /// 第二次使用提示不会改变任何状态。
    pub fn use_hint(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let round = self.active_round_mut(Transition::UseHint)?;
        if round.hint_revealed {
            return Ok(Vec::new());
        }
        round.hint_revealed = true;
        let hint = Hint::for_target(round.target, round.last_digit);
        debug!(round_id = round.round_id, %hint, "hint revealed");
        Ok(vec![GameEvent::HintRevealed { hint }])
    }

    /// 当前回合的计时；回合不在进行中时不产生任何效果。
    /// 外部定时器可能跨回合存活，此时应使用 `tick_round`。
    pub fn tick(&mut self) -> Vec<GameEvent> {
        match self.round_id() {
            Some(round_id) => self.tick_round(round_id),
            None => Vec::new(),
        }
    }

    /// 只对指定回合生效，旧回合遗留的计时会被忽略。
    pub fn tick_round(&mut self, round_id: RoundId) -> Vec<GameEvent> {
        let Some(round) = self.round.as_mut() else {
            return Vec::new();
        };
        if round.round_id != round_id || round.phase != GamePhase::Active {
            debug!(round_id, current = round.round_id, phase = %round.phase, "stale tick ignored");
            return Vec::new();
        }

        round.seconds_remaining = round.seconds_remaining.saturating_sub(1);
        let mut events = vec![GameEvent::SecondElapsed {
            seconds_remaining: round.seconds_remaining,
        }];
        if round.seconds_remaining == 0 {
            round.finish(GamePhase::Lost, OUT_OF_TIME);
            events.push(GameEvent::RoundLost {
                reason: OUT_OF_TIME.to_owned(),
            });
            info!(round_id, "round lost: {OUT_OF_TIME}");
        }
        events
    }

    pub fn end_early(&mut self, reason: &str) -> Result<Vec<GameEvent>, GameError> {
        let round = self.active_round_mut(Transition::EndEarly)?;
        round.finish(GamePhase::Lost, reason);
        info!(round_id = round.round_id, reason, "round ended early");
        Ok(vec![GameEvent::RoundLost {
            reason: reason.to_owned(),
        }])
    }
}

impl Default for GuessEngine {
    fn default() -> Self {
        Self::new()
    }
}
