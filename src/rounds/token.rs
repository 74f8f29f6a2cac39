//! Round action tokens.
//!
//! Grammar:
//! - `{slot}{普|大|下}`: basic move, slot 1-5
//! - `额外:{slot}{普|大|下}`: extra move in the same round
//! - `额外:等待:{ms}`
//! - `额外:左侧目标` / `额外:右侧目标`
//! - `重开:全灭` / `重开:左上角`
//!
//! Anything else parses to [`Token::Unknown`] and formats back verbatim.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

pub const EXTRA_PREFIX: &str = "额外:";
pub const WAIT_PREFIX: &str = "等待:";
pub const RESTART_PREFIX: &str = "重开:";

pub const SWITCH_LEFT: &str = "左侧目标";
pub const SWITCH_RIGHT: &str = "右侧目标";
pub const RESTART_FULL: &str = "全灭";
pub const RESTART_MANUAL: &str = "左上角";

/// Used when a wait payload is missing or invalid
pub const DEFAULT_WAIT_MS: u32 = 1000;

pub const MIN_SLOT: u8 = 1;
pub const MAX_SLOT: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Move {
    Normal,
    Ultimate,
    Defense,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Normal, Move::Ultimate, Move::Defense];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '普' => Some(Move::Normal),
            '大' => Some(Move::Ultimate),
            '下' => Some(Move::Defense),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Move::Normal => '普',
            Move::Ultimate => '大',
            Move::Defense => '下',
        }
    }

    /// Gesture name used in graph template keys
    pub fn gesture(self) -> &'static str {
        match self {
            Move::Normal => "普攻",
            Move::Ultimate => "上拉",
            Move::Defense => "下拉",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Move::Normal => "普攻",
            Move::Ultimate => "释放大招",
            Move::Defense => "下拉防御",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Normal,
    Ultimate,
    Defense,
    Again,
    Wait,
    SwitchLeft,
    SwitchRight,
    RestartFull,
    RestartManual,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Basic { slot: u8, mv: Move },
    Again { slot: u8, mv: Move },
    Wait { ms: u32 },
    SwitchLeft,
    SwitchRight,
    RestartFull,
    RestartManual,
    Unknown(String),
}

impl Token {
    pub fn parse(raw: &str) -> Token {
        if let Some((slot, mv)) = parse_slot_move(raw) {
            return Token::Basic { slot, mv };
        }

        if let Some(rest) = raw.strip_prefix(EXTRA_PREFIX) {
            if let Some((slot, mv)) = parse_slot_move(rest) {
                return Token::Again { slot, mv };
            }
            if let Some(payload) = rest.strip_prefix(WAIT_PREFIX) {
                return Token::Wait { ms: parse_wait_ms(payload) };
            }
            match rest {
                SWITCH_LEFT => return Token::SwitchLeft,
                SWITCH_RIGHT => return Token::SwitchRight,
                _ => {}
            }
        }

        if let Some(rest) = raw.strip_prefix(RESTART_PREFIX) {
            match rest {
                RESTART_FULL => return Token::RestartFull,
                RESTART_MANUAL => return Token::RestartManual,
                _ => {}
            }
        }

        Token::Unknown(raw.to_string())
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Basic { mv: Move::Normal, .. } => TokenKind::Normal,
            Token::Basic { mv: Move::Ultimate, .. } => TokenKind::Ultimate,
            Token::Basic { mv: Move::Defense, .. } => TokenKind::Defense,
            Token::Again { .. } => TokenKind::Again,
            Token::Wait { .. } => TokenKind::Wait,
            Token::SwitchLeft => TokenKind::SwitchLeft,
            Token::SwitchRight => TokenKind::SwitchRight,
            Token::RestartFull => TokenKind::RestartFull,
            Token::RestartManual => TokenKind::RestartManual,
            Token::Unknown(_) => TokenKind::Unknown,
        }
    }

    pub fn slot(&self) -> Option<u8> {
        match self {
            Token::Basic { slot, .. } | Token::Again { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    pub fn is_restart(&self) -> bool {
        matches!(self, Token::RestartFull | Token::RestartManual)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Basic { slot, mv } => write!(f, "{}{}", slot, mv.as_char()),
            Token::Again { slot, mv } => {
                write!(f, "{}{}{}", EXTRA_PREFIX, slot, mv.as_char())
            }
            Token::Wait { ms } => write!(f, "{}{}{}", EXTRA_PREFIX, WAIT_PREFIX, ms),
            Token::SwitchLeft => write!(f, "{}{}", EXTRA_PREFIX, SWITCH_LEFT),
            Token::SwitchRight => write!(f, "{}{}", EXTRA_PREFIX, SWITCH_RIGHT),
            Token::RestartFull => write!(f, "{}{}", RESTART_PREFIX, RESTART_FULL),
            Token::RestartManual => write!(f, "{}{}", RESTART_PREFIX, RESTART_MANUAL),
            Token::Unknown(raw) => f.write_str(raw),
        }
    }
}

impl FromStr for Token {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Token::parse(s))
    }
}

fn parse_slot_move(s: &str) -> Option<(u8, Move)> {
    let mut chars = s.chars();
    let slot = chars.next()?.to_digit(10)? as u8;
    let mv = Move::from_char(chars.next()?)?;
    if chars.next().is_some() || !(MIN_SLOT..=MAX_SLOT).contains(&slot) {
        return None;
    }
    Some((slot, mv))
}

fn parse_wait_ms(payload: &str) -> u32 {
    let payload = payload.trim();
    if let Ok(ms) = payload.parse::<u32>() {
        return ms;
    }
    match payload.parse::<f64>() {
        Ok(ms) if ms.is_finite() && ms >= 0.0 && ms <= f64::from(u32::MAX) => {
            ms.round() as u32
        }
        _ => DEFAULT_WAIT_MS,
    }
}
