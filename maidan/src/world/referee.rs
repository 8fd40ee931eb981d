//! Referee commands as seen by the planner.

use crate::core::Team;
use crate::proto;

/// Game-controller command, numbered as on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefereeCommand {
    Halt,
    Stop,
    NormalStart,
    ForceStart,
    PrepareKickoff(Team),
    PreparePenalty(Team),
    DirectFree(Team),
    IndirectFree(Team),
    Timeout(Team),
    Goal(Team),
    BallPlacement(Team),
}

impl RefereeCommand {
    /// Map a wire enum value. Yellow variants are even, blue odd, from 4 on.
    pub fn from_i32(value: i32) -> Option<Self> {
        use RefereeCommand::*;
        let team = if value % 2 == 0 { Team::Yellow } else { Team::Blue };
        Some(match value {
            0 => Halt,
            1 => Stop,
            2 => NormalStart,
            3 => ForceStart,
            4 | 5 => PrepareKickoff(team),
            6 | 7 => PreparePenalty(team),
            8 | 9 => DirectFree(team),
            10 | 11 => IndirectFree(team),
            12 | 13 => Timeout(team),
            14 | 15 => Goal(team),
            16 | 17 => BallPlacement(team),
            _ => return None,
        })
    }

    pub fn to_i32(self) -> i32 {
        use RefereeCommand::*;
        let (base, team) = match self {
            Halt => return 0,
            Stop => return 1,
            NormalStart => return 2,
            ForceStart => return 3,
            PrepareKickoff(t) => (4, t),
            PreparePenalty(t) => (6, t),
            DirectFree(t) => (8, t),
            IndirectFree(t) => (10, t),
            Timeout(t) => (12, t),
            Goal(t) => (14, t),
            BallPlacement(t) => (16, t),
        };
        match team {
            Team::Yellow => base,
            Team::Blue => base + 1,
        }
    }

    /// Team the command is addressed to, if any.
    pub fn team(self) -> Option<Team> {
        use RefereeCommand::*;
        match self {
            Halt | Stop | NormalStart | ForceStart => None,
            PrepareKickoff(t) | PreparePenalty(t) | DirectFree(t) | IndirectFree(t)
            | Timeout(t) | Goal(t) | BallPlacement(t) => Some(t),
        }
    }
}

/// Latest raw referee payload plus its decoded command.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RefereeMessage {
    pub raw: Vec<u8>,
    pub command: Option<RefereeCommand>,
    pub command_counter: Option<u32>,
}

impl RefereeMessage {
    /// Keep the payload; decode it if it is a referee datagram.
    pub fn from_payload(raw: Vec<u8>) -> Self {
        match proto::decode_referee(&raw) {
            Ok(msg) => Self {
                command: RefereeCommand::from_i32(msg.command),
                command_counter: Some(msg.command_counter),
                raw,
            },
            Err(e) => {
                log::debug!("Undecodable referee payload ({} bytes): {}", raw.len(), e);
                Self {
                    raw,
                    command: None,
                    command_counter: None,
                }
            }
        }
    }
}
