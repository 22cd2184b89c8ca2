use serde::{Deserialize, Serialize};
use std::fmt;

pub const INITIAL_ATTEMPTS: u8 = 4;
pub const INITIAL_SECONDS: u8 = 60;
pub const MIN_GUESS: u8 = 1;
pub const MAX_GUESS: u8 = 100;
const HALF_WAY: u8 = MAX_GUESS / 2;

pub const OUT_OF_TIME: &str = "out of time";
pub const OUT_OF_ATTEMPTS: &str = "out of attempts";
pub const GUESS_HIGHER: &str = "guess higher";
pub const GUESS_LOWER: &str = "guess lower";

/// 每局游戏的代号，每次 start 递增。
pub type RoundId = u32;

/// 回合阶段。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum GamePhase {
    #[default]
    NotStarted,
    Active,
    Won,
    Lost,
}

impl GamePhase {
    pub fn is_finished(self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }

    pub fn can_start(self) -> bool {
        !matches!(self, GamePhase::Active)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GamePhase::NotStarted => "NotStarted",
            GamePhase::Active => "Active",
            GamePhase::Won => "Won",
            GamePhase::Lost => "Lost",
        };
        f.write_str(name)
    }
}

/// 提示内容不单独保存，而是每次根据目标数字推导。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "half", rename_all = "lowercase")]
pub enum Hint {
    Lower { last_digit: u8 },
    Upper,
}

impl Hint {
    pub fn for_target(target: u8, last_digit: u8) -> Self {
        if target <= HALF_WAY {
            Hint::Lower { last_digit }
        } else {
            Hint::Upper
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hint::Lower { last_digit } => {
                write!(f, "target is in the lower half [{last_digit}..{HALF_WAY}]")
            }
            Hint::Upper => write!(f, "target is in the upper half ({HALF_WAY}..{MAX_GUESS}]"),
        }
    }
}

/// 一局猜数字游戏的完整状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRound {
    pub(crate) round_id: RoundId,
    pub(crate) target: u8,
    pub(crate) last_digit: u8,
    pub(crate) attempts_remaining: u8,
    pub(crate) seconds_remaining: u8,
    pub(crate) hint_revealed: bool,
    pub(crate) phase: GamePhase,
    pub(crate) last_outcome_message: String,
}

impl GameRound {
    pub(crate) fn begin(round_id: RoundId, last_digit: u8, target: u8) -> Self {
        Self {
            round_id,
            target,
            last_digit,
            attempts_remaining: INITIAL_ATTEMPTS,
            seconds_remaining: INITIAL_SECONDS,
            hint_revealed: false,
            phase: GamePhase::Active,
            last_outcome_message: String::new(),
        }
    }

    pub fn round_id(&self) -> RoundId {
        self.round_id
    }

    pub fn last_digit(&self) -> u8 {
        self.last_digit
    }

    pub fn attempts_remaining(&self) -> u8 {
        self.attempts_remaining
    }

    pub fn seconds_remaining(&self) -> u8 {
        self.seconds_remaining
    }

    pub fn hint_revealed(&self) -> bool {
        self.hint_revealed
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn last_outcome_message(&self) -> &str {
        &self.last_outcome_message
    }

    pub fn attempts_used(&self) -> u8 {
        INITIAL_ATTEMPTS - self.attempts_remaining
    }

    pub fn hint(&self) -> Option<Hint> {
        self.hint_revealed
            .then(|| Hint::for_target(self.target, self.last_digit))
    }

    /// 回合结束后才公开目标数字。
    pub fn revealed_target(&self) -> Option<u8> {
        self.phase.is_finished().then_some(self.target)
    }

    pub fn instructions(&self) -> String {
        instructions_for(self.last_digit)
    }

    pub(crate) fn finish(&mut self, phase: GamePhase, message: impl Into<String>) {
        self.phase = phase;
        self.last_outcome_message = message.into();
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            round_id: self.round_id,
            phase: self.phase,
            last_digit: self.last_digit,
            attempts_remaining: self.attempts_remaining,
            attempts_used: self.attempts_used(),
            seconds_remaining: self.seconds_remaining,
            hint_revealed: self.hint_revealed,
            hint: self.hint().map(|hint| hint.to_string()),
            last_outcome_message: self.last_outcome_message.clone(),
            target: self.revealed_target(),
            instructions: self.instructions(),
        }
    }
}

pub fn instructions_for(last_digit: u8) -> String {
    format!("Guess a number between {MIN_GUESS} & {MAX_GUESS} that is multiply of {last_digit}")
}

pub fn invalid_guess_notice(last_digit: u8) -> String {
    format!("Number has to be a multiply of {last_digit} between {MIN_GUESS} and {MAX_GUESS}.")
}

/// 每次状态变化后交给前端渲染的快照。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoundSnapshot {
    pub round_id: RoundId,
    pub phase: GamePhase,
    pub last_digit: u8,
    pub attempts_remaining: u8,
    pub attempts_used: u8,
    pub seconds_remaining: u8,
    pub hint_revealed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub last_outcome_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u8>,
    pub instructions: String,
}

impl RoundSnapshot {
    /// 尚未开始游戏时的空快照。
    pub fn not_started() -> Self {
        Self {
            round_id: 0,
            phase: GamePhase::NotStarted,
            last_digit: 0,
            attempts_remaining: INITIAL_ATTEMPTS,
            attempts_used: 0,
            seconds_remaining: INITIAL_SECONDS,
            hint_revealed: false,
            hint: None,
            last_outcome_message: String::new(),
            target: None,
            instructions: String::new(),
        }
    }

    /// 胜利卡片上展示的图片地址。
    pub fn win_image_url(&self) -> Option<String> {
        match (self.phase, self.target) {
            (GamePhase::Won, Some(target)) => {
                Some(format!("https://picsum.photos/id/{target}/100/100"))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_text_depends_on_the_half() {
        assert_eq!(
            Hint::for_target(28, 4).to_string(),
            "target is in the lower half [4..50]"
        );
        assert_eq!(
            Hint::for_target(50, 5).to_string(),
            "target is in the lower half [5..50]"
        );
        assert_eq!(
            Hint::for_target(56, 7).to_string(),
            "target is in the upper half (50..100]"
        );
    }

    #[test]
    fn target_stays_hidden_until_the_round_ends() {
        let mut round = GameRound::begin(1, 4, 28);
        assert_eq!(round.revealed_target(), None);
        assert_eq!(round.snapshot().target, None);

        round.finish(GamePhase::Won, "");
        let snapshot = round.snapshot();
        assert_eq!(snapshot.target, Some(28));
        assert_eq!(
            snapshot.win_image_url().as_deref(),
            Some("https://picsum.photos/id/28/100/100")
        );
    }

    #[test]
    fn snapshot_uses_camel_case_for_the_ui() {
        let round = GameRound::begin(3, 6, 42);
        let json = serde_json::to_value(round.snapshot()).expect("snapshot should serialize");
        assert_eq!(json["attemptsRemaining"], 4);
        assert_eq!(json["secondsRemaining"], 60);
        assert_eq!(json["phase"], "Active");
        assert_eq!(json["roundId"], 3);
        assert_eq!(
            json["instructions"],
            "Guess a number between 1 & 100 that is multiply of 6"
        );
        assert!(json.get("target").is_none());
    }
}
