//! Team command frame codec
//!
//! One radio frame carries up to six robot commands:
//!
//! ```text
//! 0x64 | [0x0F 0 0 0] x (6 - n) | cmd_0 | ... | cmd_n-1 | 0xFF
//! ```
//!
//! Each command is 4 bytes:
//!
//! | Byte | Content |
//! |------|---------|
//! | 0 | bits 0-3 robot id, bit 4 reserved, bit 5 dribble, bit 6 charge, bit 7 kick |
//! | 1 | x velocity, quantized over (-1000, 1000) mm/s |
//! | 2 | y velocity, quantized over (-1000, 1000) mm/s |
//! | 3 | w velocity, quantized over (-2π, 2π) rad/s |
//!
//! Quantized values top out at 254 and the empty slot uses id 15 with
//! zeroed bytes, so 0xFF can only ever appear as the terminator.
//!
//! # Pattern
//!
//! ```ignore
//! let mut frame = TeamFrame::new();   // Create once at thread start
//! frame.encode(&commands)?;           // Fill from this tick's commands
//! frame.send_to(&mut port)?;          // Send
//! ```

use std::f64::consts::TAU;
use std::io::{self, Write};

use crate::core::{MAX_ROBOT_ID, RobotId};
use crate::error::{Error, Result};

/// First byte of every frame
pub const START_KEY: u8 = 0x64;
/// Last byte of every frame; never appears anywhere else
pub const END_KEY: u8 = 0xFF;
/// Robot id reserved for unused slots
pub const EMPTY_ID: u8 = 15;
/// Filler for unused slots
pub const EMPTY_COMMAND: [u8; COMMAND_LENGTH] = [EMPTY_ID, 0, 0, 0];

/// Bytes per robot command
pub const COMMAND_LENGTH: usize = 4;
/// Robot slots per frame
pub const ROBOTS_PER_FRAME: usize = 6;
/// Total frame length
pub const TEAM_COMMAND_MESSAGE_LENGTH: usize = 2 + COMMAND_LENGTH * ROBOTS_PER_FRAME;

/// Largest quantized value
pub const MAX_ENCODING: f64 = 254.0;

pub const MIN_X: f64 = -1000.0;
pub const MAX_X: f64 = 1000.0;
pub const MIN_Y: f64 = -1000.0;
pub const MAX_Y: f64 = 1000.0;
pub const MIN_W: f64 = -TAU;
pub const MAX_W: f64 = TAU;

const DRIBBLE_BIT: u8 = 1 << 5;
const CHARGE_BIT: u8 = 1 << 6;
const KICK_BIT: u8 = 1 << 7;
const RESERVED_BIT: u8 = 1 << 4;
const ID_MASK: u8 = 0x0F;

/// One robot's slot in a team frame.
///
/// Velocities are in the robot-local frame (mm/s, rad/s).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RobotCommand {
    pub id: RobotId,
    pub is_dribbling: bool,
    pub is_charging: bool,
    pub is_kicking: bool,
    pub x: f64,
    pub y: f64,
    pub w: f64,
}

impl RobotCommand {
    /// Zero-velocity command with all flags cleared.
    pub fn stopped(id: RobotId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// Quantize `value` over the open interval (min, max).
fn quantize(channel: &'static str, value: f64, min: f64, max: f64) -> Result<u8> {
    // Written as a negated conjunction so NaN is rejected too
    if !(value > min && value < max) {
        return Err(Error::ValueOutOfRange {
            channel,
            value,
            min,
            max,
        });
    }
    Ok(((value - min) / (max - min) * MAX_ENCODING).round() as u8)
}

#[inline]
fn dequantize(byte: u8, min: f64, max: f64) -> f64 {
    min + f64::from(byte) / MAX_ENCODING * (max - min)
}

/// Encode one robot command into its 4-byte slot.
pub fn encode_command(cmd: &RobotCommand) -> Result<[u8; COMMAND_LENGTH]> {
    if cmd.id > MAX_ROBOT_ID {
        return Err(Error::BadRobotId(cmd.id));
    }

    let mut header = cmd.id & ID_MASK;
    if cmd.is_dribbling {
        header |= DRIBBLE_BIT;
    }
    if cmd.is_charging {
        header |= CHARGE_BIT;
    }
    if cmd.is_kicking {
        header |= KICK_BIT;
    }

    Ok([
        header,
        quantize("x", cmd.x, MIN_X, MAX_X)?,
        quantize("y", cmd.y, MIN_Y, MAX_Y)?,
        quantize("w", cmd.w, MIN_W, MAX_W)?,
    ])
}

/// Decode a 4-byte slot. Returns `None` for the empty sentinel.
pub fn decode_command(bytes: &[u8; COMMAND_LENGTH]) -> Result<Option<RobotCommand>> {
    let header = bytes[0];
    let id = header & ID_MASK;
    if id == EMPTY_ID {
        return Ok(None);
    }
    if header & RESERVED_BIT != 0 {
        return Err(Error::FrameCorrupt(format!(
            "reserved bit set in header 0x{:02X}",
            header
        )));
    }

    Ok(Some(RobotCommand {
        id,
        is_dribbling: header & DRIBBLE_BIT != 0,
        is_charging: header & CHARGE_BIT != 0,
        is_kicking: header & KICK_BIT != 0,
        x: dequantize(bytes[1], MIN_X, MAX_X),
        y: dequantize(bytes[2], MIN_Y, MAX_Y),
        w: dequantize(bytes[3], MIN_W, MAX_W),
    }))
}

/// Reusable team frame buffer.
///
/// Start and end keys are pre-filled; `encode` rewrites only the body.
/// A failed `encode` leaves the previous contents untouched.
pub struct TeamFrame {
    data: [u8; TEAM_COMMAND_MESSAGE_LENGTH],
}

impl Default for TeamFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl TeamFrame {
    /// Create an all-empty frame.
    pub const fn new() -> Self {
        let mut data = [0u8; TEAM_COMMAND_MESSAGE_LENGTH];
        data[0] = START_KEY;
        let mut slot = 0;
        while slot < ROBOTS_PER_FRAME {
            data[1 + slot * COMMAND_LENGTH] = EMPTY_ID;
            slot += 1;
        }
        data[TEAM_COMMAND_MESSAGE_LENGTH - 1] = END_KEY;
        Self { data }
    }

    /// Fill the frame with up to six commands, padding the front with
    /// empty slots.
    pub fn encode(&mut self, commands: &[RobotCommand]) -> Result<()> {
        let n = commands.len();
        if n > ROBOTS_PER_FRAME {
            return Err(Error::TooManyRobots(n));
        }

        let mut body = [0u8; COMMAND_LENGTH * ROBOTS_PER_FRAME];
        let pad = ROBOTS_PER_FRAME - n;
        for slot in body.chunks_exact_mut(COMMAND_LENGTH).take(pad) {
            slot.copy_from_slice(&EMPTY_COMMAND);
        }
        for (i, cmd) in commands.iter().enumerate() {
            let start = (pad + i) * COMMAND_LENGTH;
            body[start..start + COMMAND_LENGTH].copy_from_slice(&encode_command(cmd)?);
        }

        if let Some(pos) = body.iter().position(|&b| b == END_KEY) {
            return Err(Error::FrameCorrupt(format!(
                "terminator byte inside body at offset {}",
                pos + 1
            )));
        }

        self.data[1..TEAM_COMMAND_MESSAGE_LENGTH - 1].copy_from_slice(&body);
        Ok(())
    }

    /// Frame bytes for sending
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Send frame to any writer (serial port, etc.)
    #[inline]
    pub fn send_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.as_bytes())
    }
}

/// Encode a team frame into a fresh buffer.
pub fn encode_team(commands: &[RobotCommand]) -> Result<[u8; TEAM_COMMAND_MESSAGE_LENGTH]> {
    let mut frame = TeamFrame::new();
    frame.encode(commands)?;
    Ok(frame.data)
}

/// Decode a team frame, skipping empty slots.
pub fn decode_team(frame: &[u8]) -> Result<Vec<RobotCommand>> {
    if frame.len() != TEAM_COMMAND_MESSAGE_LENGTH {
        return Err(Error::FrameCorrupt(format!(
            "length {} != {}",
            frame.len(),
            TEAM_COMMAND_MESSAGE_LENGTH
        )));
    }
    if frame[0] != START_KEY {
        return Err(Error::FrameCorrupt(format!(
            "bad start key 0x{:02X}",
            frame[0]
        )));
    }
    if frame[TEAM_COMMAND_MESSAGE_LENGTH - 1] != END_KEY {
        return Err(Error::FrameCorrupt(format!(
            "bad end key 0x{:02X}",
            frame[TEAM_COMMAND_MESSAGE_LENGTH - 1]
        )));
    }

    let body = &frame[1..TEAM_COMMAND_MESSAGE_LENGTH - 1];
    if body.contains(&END_KEY) {
        return Err(Error::FrameCorrupt("terminator byte inside body".into()));
    }

    let mut commands = Vec::with_capacity(ROBOTS_PER_FRAME);
    for chunk in body.chunks_exact(COMMAND_LENGTH) {
        let slot = [chunk[0], chunk[1], chunk[2], chunk[3]];
        if let Some(cmd) = decode_command(&slot)? {
            commands.push(cmd);
        }
    }
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const QUANTUM_XY: f64 = (MAX_X - MIN_X) / MAX_ENCODING;
    const QUANTUM_W: f64 = (MAX_W - MIN_W) / MAX_ENCODING;

    fn command(id: RobotId, x: f64, y: f64, w: f64) -> RobotCommand {
        RobotCommand {
            id,
            x,
            y,
            w,
            ..Default::default()
        }
    }

    fn assert_frame_shape(frame: &[u8]) {
        assert_eq!(frame.len(), TEAM_COMMAND_MESSAGE_LENGTH);
        assert_eq!(frame[0], START_KEY);
        assert_eq!(frame[25], END_KEY);
        assert!(frame[1..25].iter().all(|&b| b != END_KEY));
    }

    #[test]
    fn test_frame_length_constant() {
        assert_eq!(TEAM_COMMAND_MESSAGE_LENGTH, 26);
    }

    #[test]
    fn test_empty_frame() {
        let frame = encode_team(&[]).unwrap();
        assert_frame_shape(&frame);
        for slot in frame[1..25].chunks(4) {
            assert_eq!(slot, EMPTY_COMMAND);
        }
        assert!(decode_team(&frame).unwrap().is_empty());
    }

    #[test]
    fn test_padding_comes_first() {
        let frame = encode_team(&[command(2, 0.0, 0.0, 0.0)]).unwrap();
        assert_frame_shape(&frame);
        for slot in frame[1..21].chunks(4) {
            assert_eq!(slot, EMPTY_COMMAND);
        }
        assert_eq!(frame[21], 2);
        assert_eq!(&frame[22..25], &[127, 127, 127]);
    }

    #[test]
    fn test_full_frame_with_extreme_values() {
        let commands: Vec<RobotCommand> = (9..=14)
            .map(|id| RobotCommand {
                id,
                is_dribbling: true,
                is_charging: true,
                is_kicking: true,
                x: MAX_X - 1e-9,
                y: MIN_Y + 1e-9,
                w: MAX_W - 1e-9,
            })
            .collect();
        let frame = encode_team(&commands).unwrap();
        assert_frame_shape(&frame);
        assert_eq!(decode_team(&frame).unwrap().len(), 6);
    }

    #[test]
    fn test_codec_stability() {
        let cmd = RobotCommand {
            id: 3,
            is_dribbling: true,
            is_charging: false,
            is_kicking: true,
            x: -200.0,
            y: 300.0,
            w: -2.0,
        };
        let frame = encode_team(&[cmd]).unwrap();
        let decoded = decode_team(&frame).unwrap();
        assert_eq!(decoded.len(), 1);
        let d = decoded[0];
        assert_eq!(d.id, 3);
        assert!(d.is_dribbling);
        assert!(!d.is_charging);
        assert!(d.is_kicking);
        assert_abs_diff_eq!(d.x, -200.0, epsilon = 20.0);
        assert_abs_diff_eq!(d.y, 300.0, epsilon = 20.0);
        assert_abs_diff_eq!(d.w, -2.0, epsilon = 0.1);
    }

    #[test]
    fn test_round_trip_within_one_quantum() {
        let samples = [-999.0, -512.3, -7.0, 0.0, 3.3, 250.0, 999.9];
        let angles = [-6.2, -3.1, -0.5, 0.0, 1.0, 4.4, 6.28];
        for (i, (&v, &w)) in samples.iter().zip(angles.iter()).enumerate() {
            let cmd = command(i as RobotId, v, -v, w);
            let bytes = encode_command(&cmd).unwrap();
            let d = decode_command(&bytes).unwrap().unwrap();
            assert_eq!(d.id, cmd.id);
            assert_abs_diff_eq!(d.x, v, epsilon = QUANTUM_XY);
            assert_abs_diff_eq!(d.y, -v, epsilon = QUANTUM_XY);
            assert_abs_diff_eq!(d.w, w, epsilon = QUANTUM_W);
        }
    }

    #[test]
    fn test_zero_is_within_one_quantum() {
        let d = decode_command(&encode_command(&command(0, 0.0, 0.0, 0.0)).unwrap())
            .unwrap()
            .unwrap();
        assert!(d.x.abs() < QUANTUM_XY);
        assert!(d.y.abs() < QUANTUM_XY);
        assert!(d.w.abs() < QUANTUM_W);
    }

    #[test]
    fn test_near_bounds_encode() {
        let eps = 1e-6;
        assert!(encode_command(&command(1, MIN_X + eps, MAX_Y - eps, MIN_W + eps)).is_ok());
        assert!(encode_command(&command(1, MAX_X - eps, MIN_Y + eps, MAX_W - eps)).is_ok());
    }

    #[test]
    fn test_bounds_are_excluded() {
        let err = encode_command(&command(1, MIN_X, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, Error::ValueOutOfRange { channel: "x", .. }));
        let err = encode_command(&command(1, 0.0, MAX_Y, 0.0)).unwrap_err();
        assert!(matches!(err, Error::ValueOutOfRange { channel: "y", .. }));
        let err = encode_command(&command(1, 0.0, 0.0, MAX_W)).unwrap_err();
        assert!(matches!(err, Error::ValueOutOfRange { channel: "w", .. }));
        assert!(encode_command(&command(1, f64::NAN, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_bad_robot_id() {
        let err = encode_team(&[command(15, 0.0, 0.0, 0.0)]).unwrap_err();
        assert!(matches!(err, Error::BadRobotId(15)));
    }

    #[test]
    fn test_too_many_robots() {
        let commands: Vec<_> = (0..7).map(|id| command(id, 0.0, 0.0, 0.0)).collect();
        assert!(matches!(
            encode_team(&commands).unwrap_err(),
            Error::TooManyRobots(7)
        ));
    }

    #[test]
    fn test_failed_encode_keeps_previous_frame() {
        let mut frame = TeamFrame::new();
        frame.encode(&[command(4, 100.0, 0.0, 0.0)]).unwrap();
        let before = frame.as_bytes().to_vec();
        assert!(frame.encode(&[command(4, 5000.0, 0.0, 0.0)]).is_err());
        assert_eq!(frame.as_bytes(), before.as_slice());
    }

    #[test]
    fn test_send_to_writer() {
        let mut frame = TeamFrame::new();
        frame.encode(&[command(1, 10.0, 20.0, 0.5)]).unwrap();
        let mut out = Vec::new();
        frame.send_to(&mut out).unwrap();
        assert_eq!(out.as_slice(), frame.as_bytes());
    }

    #[test]
    fn test_decode_rejects_corrupt_frames() {
        let good = encode_team(&[command(1, 0.0, 0.0, 0.0)]).unwrap();

        assert!(decode_team(&good[..25]).is_err());

        let mut bad_start = good;
        bad_start[0] = 0x00;
        assert!(decode_team(&bad_start).is_err());

        let mut bad_end = good;
        bad_end[25] = 0x00;
        assert!(decode_team(&bad_end).is_err());

        let mut inner_end = good;
        inner_end[22] = END_KEY;
        assert!(decode_team(&inner_end).is_err());

        let mut reserved = good;
        reserved[21] |= RESERVED_BIT;
        assert!(matches!(
            decode_team(&reserved).unwrap_err(),
            Error::FrameCorrupt(_)
        ));
    }
}
