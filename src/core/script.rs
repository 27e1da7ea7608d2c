//! Frame scripts: recorded or simulated detector signals for replay
//!
//! One event per line, `#` starts a comment:
//!
//! ```text
//! 0     hand          # hand present
//! 2500  hand x=0.40   # hand present at 40% of frame width
//! 5001  none          # no hand
//! 6000  reset         # explicit reset (e.g. a click)
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{AuraError, Result};
use crate::types::Frame;

/// Frame size used when a script places a hand by fraction
pub const SCRIPT_FRAME_WIDTH: f64 = 640.0;
pub const SCRIPT_FRAME_HEIGHT: f64 = 480.0;

lazy_static! {
    static ref RE_EVENT: Regex = Regex::new(
        r"(?i)^\s*(\d+)\s*(?:ms)?\s+(hand|none|reset)(?:\s+x\s*=\s*([0-9]*\.?[0-9]+))?\s*$"
    ).unwrap();
}

/// What happens at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptAction {
    /// Hand detected; `x` is its horizontal fraction when given
    Hand { x: Option<f64> },
    /// No hand detected
    NoHand,
    /// Explicit reset
    Reset,
}

/// A timestamped script event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptEvent {
    pub at_ms: u64,
    pub action: ScriptAction,
}

impl ScriptEvent {
    pub fn new(at_ms: u64, action: ScriptAction) -> Self {
        Self { at_ms, action }
    }

    /// Detector frame for this event, if it is a frame at all
    pub fn frame(&self) -> Option<Frame> {
        match self.action {
            ScriptAction::Hand { x } => Some(Frame::with_hand_at(
                SCRIPT_FRAME_WIDTH,
                SCRIPT_FRAME_HEIGHT,
                x.unwrap_or(0.5),
            )),
            ScriptAction::NoHand => Some(Frame::empty(SCRIPT_FRAME_WIDTH, SCRIPT_FRAME_HEIGHT)),
            ScriptAction::Reset => None,
        }
    }
}

/// Parse a whole script; errors name the offending line
pub fn parse_script(text: &str) -> Result<Vec<ScriptEvent>> {
    let mut events = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        events.push(parse_line(line, index + 1)?);
    }
    Ok(events)
}

fn parse_line(line: &str, line_no: usize) -> Result<ScriptEvent> {
    let caps = RE_EVENT
        .captures(line)
        .ok_or_else(|| AuraError::script(line_no, format!("cannot parse '{}'", line)))?;

    let at_ms = caps[1]
        .parse::<u64>()
        .map_err(|_| AuraError::script(line_no, format!("timestamp '{}' out of range", &caps[1])))?;

    let x = match caps.get(3) {
        Some(m) => {
            let value: f64 = m
                .as_str()
                .parse()
                .map_err(|_| AuraError::script(line_no, format!("bad x '{}'", m.as_str())))?;
            if !(0.0..=1.0).contains(&value) {
                return Err(AuraError::script(line_no, format!("x={} outside [0, 1]", value)));
            }
            Some(value)
        }
        None => None,
    };

    let action = match caps[2].to_ascii_lowercase().as_str() {
        "hand" => ScriptAction::Hand { x },
        _ if x.is_some() => {
            return Err(AuraError::script(line_no, "x= is only valid on 'hand' lines"));
        }
        "none" => ScriptAction::NoHand,
        _ => ScriptAction::Reset,
    };

    Ok(ScriptEvent::new(at_ms, action))
}

/// A steady hand held for `hold_ms`, one frame every `frame_ms`,
/// followed by one empty frame.
pub fn simulate_hold(hold_ms: u64, frame_ms: u64) -> Vec<ScriptEvent> {
    let step = frame_ms.max(1);
    let mut events: Vec<ScriptEvent> = (0..=hold_ms / step)
        .map(|i| ScriptEvent::new(i * step, ScriptAction::Hand { x: None }))
        .collect();
    let last = events.last().map(|e| e.at_ms).unwrap_or(0);
    events.push(ScriptEvent::new(last + step, ScriptAction::NoHand));
    events
}
