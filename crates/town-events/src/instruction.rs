//! Per-tick instructions.
//!
//! One instruction is consumed per call to the step controller. The serde
//! form matches what bot and API callers send:
//! `{"command": "interview", "agent_to_interview": "Bob"}`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the caller wants the next tick to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Instruction {
    /// Let the simulated agents run one scheduling pass
    Continue,
    /// Talk directly to one simulated agent, bypassing the scheduler
    Interview {
        #[serde(rename = "agent_to_interview")]
        target: String,
    },
    /// End the run
    Exit,
}

impl Instruction {
    /// Creates an interview instruction.
    pub fn interview(target: impl Into<String>) -> Self {
        Instruction::Interview {
            target: target.into(),
        }
    }

    /// Returns the tag without the payload.
    pub fn kind(&self) -> InstructionKind {
        match self {
            Instruction::Continue => InstructionKind::Continue,
            Instruction::Interview { .. } => InstructionKind::Interview,
            Instruction::Exit => InstructionKind::Exit,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Continue => write!(f, "continue"),
            Instruction::Interview { target } => write!(f, "interview {}", target),
            Instruction::Exit => write!(f, "exit"),
        }
    }
}

/// Parses console text such as `continue`, `interview Bob` or `exit`.
///
/// The interview target keeps its inner whitespace, so `interview Mary Ann`
/// targets "Mary Ann".
impl FromStr for Instruction {
    type Err = ParseInstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (command, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (trimmed, ""),
        };

        match command.parse::<InstructionKind>()? {
            InstructionKind::Continue => Ok(Instruction::Continue),
            InstructionKind::Exit => Ok(Instruction::Exit),
            InstructionKind::Interview if rest.is_empty() => {
                Err(ParseInstructionError::MissingTarget)
            }
            InstructionKind::Interview => Ok(Instruction::interview(rest)),
        }
    }
}

/// Instruction tag, used when asking the human to pick an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionKind {
    Continue,
    Interview,
    Exit,
}

impl InstructionKind {
    /// All tags in the order they are offered to the human.
    pub const ALL: [InstructionKind; 3] = [
        InstructionKind::Continue,
        InstructionKind::Interview,
        InstructionKind::Exit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InstructionKind::Continue => "continue",
            InstructionKind::Interview => "interview",
            InstructionKind::Exit => "exit",
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstructionKind {
    type Err = ParseInstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" => Err(ParseInstructionError::Empty),
            "continue" => Ok(InstructionKind::Continue),
            "interview" => Ok(InstructionKind::Interview),
            "exit" => Ok(InstructionKind::Exit),
            other => Err(ParseInstructionError::UnknownCommand(other.to_string())),
        }
    }
}

/// Error type for parsing instructions from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseInstructionError {
    Empty,
    UnknownCommand(String),
    MissingTarget,
}

impl fmt::Display for ParseInstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseInstructionError::Empty => write!(f, "empty instruction"),
            ParseInstructionError::UnknownCommand(s) => write!(
                f,
                "unknown command '{}', expected one of continue/interview/exit",
                s
            ),
            ParseInstructionError::MissingTarget => {
                write!(f, "interview needs the name of the agent to talk to")
            }
        }
    }
}

impl std::error::Error for ParseInstructionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_commands() {
        assert_eq!("continue".parse::<Instruction>(), Ok(Instruction::Continue));
        assert_eq!("  EXIT ".parse::<Instruction>(), Ok(Instruction::Exit));
    }

    #[test]
    fn test_parse_interview_target() {
        assert_eq!(
            "interview Mary Ann".parse::<Instruction>(),
            Ok(Instruction::interview("Mary Ann"))
        );
        assert_eq!(
            "interview".parse::<Instruction>(),
            Err(ParseInstructionError::MissingTarget)
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            "dance".parse::<Instruction>(),
            Err(ParseInstructionError::UnknownCommand("dance".to_string()))
        );
        assert_eq!("".parse::<Instruction>(), Err(ParseInstructionError::Empty));
    }

    #[test]
    fn test_instruction_wire_format() {
        let json = serde_json::to_string(&Instruction::interview("Bob")).unwrap();
        assert_eq!(json, r#"{"command":"interview","agent_to_interview":"Bob"}"#);

        let parsed: Instruction = serde_json::from_str(r#"{"command":"continue"}"#).unwrap();
        assert_eq!(parsed, Instruction::Continue);
        assert_eq!(parsed.kind(), InstructionKind::Continue);
    }
}
