//! 猜数字游戏核心逻辑（回合状态、目标生成、状态转换）。

pub mod rules;
pub mod state;
pub mod target;

pub use rules::{GameError, GameEvent, GuessEngine, Resolution, Transition, Verdict};
pub use state::{
    instructions_for, invalid_guess_notice, GamePhase, GameRound, Hint, RoundId, RoundSnapshot,
    INITIAL_ATTEMPTS, INITIAL_SECONDS, MAX_GUESS, MIN_GUESS,
};
pub use target::{last_digit_of, multiples_of, TargetPicker};
