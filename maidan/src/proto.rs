//! SSL-Vision and game-controller datagram subsets
//!
//! Only the fields the control core reads are declared; prost skips the
//! rest on decode. Tags follow `ssl_vision_wrapper.proto`,
//! `ssl_vision_detection.proto` and `ssl_gc_referee_message.proto`.

use prost::Message;

/// Top-level vision datagram. Geometry (tag 2) is ignored.
#[derive(Clone, PartialEq, Message)]
pub struct SslWrapperPacket {
    #[prost(message, optional, tag = "1")]
    pub detection: Option<SslDetectionFrame>,
}

/// One camera's detections for one frame.
#[derive(Clone, PartialEq, Message)]
pub struct SslDetectionFrame {
    #[prost(uint32, required, tag = "1")]
    pub frame_number: u32,
    #[prost(double, required, tag = "2")]
    pub t_capture: f64,
    #[prost(double, required, tag = "3")]
    pub t_sent: f64,
    #[prost(uint32, required, tag = "4")]
    pub camera_id: u32,
    #[prost(message, repeated, tag = "5")]
    pub balls: Vec<SslDetectionBall>,
    #[prost(message, repeated, tag = "6")]
    pub robots_yellow: Vec<SslDetectionRobot>,
    #[prost(message, repeated, tag = "7")]
    pub robots_blue: Vec<SslDetectionRobot>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SslDetectionBall {
    #[prost(float, required, tag = "1")]
    pub confidence: f32,
    #[prost(uint32, optional, tag = "2")]
    pub area: Option<u32>,
    #[prost(float, required, tag = "3")]
    pub x: f32,
    #[prost(float, required, tag = "4")]
    pub y: f32,
    #[prost(float, optional, tag = "5")]
    pub z: Option<f32>,
    #[prost(float, required, tag = "6")]
    pub pixel_x: f32,
    #[prost(float, required, tag = "7")]
    pub pixel_y: f32,
}

#[derive(Clone, PartialEq, Message)]
pub struct SslDetectionRobot {
    #[prost(float, required, tag = "1")]
    pub confidence: f32,
    #[prost(uint32, optional, tag = "2")]
    pub robot_id: Option<u32>,
    #[prost(float, required, tag = "3")]
    pub x: f32,
    #[prost(float, required, tag = "4")]
    pub y: f32,
    #[prost(float, optional, tag = "5")]
    pub orientation: Option<f32>,
    #[prost(float, required, tag = "6")]
    pub pixel_x: f32,
    #[prost(float, required, tag = "7")]
    pub pixel_y: f32,
    #[prost(float, optional, tag = "8")]
    pub height: Option<f32>,
}

/// Referee box message. Team info and later fields are ignored.
///
/// `stage` and `command` are kept as raw enum numbers; see
/// [`crate::world::RefereeCommand`] for the command mapping.
#[derive(Clone, PartialEq, Message)]
pub struct SslReferee {
    #[prost(uint64, required, tag = "1")]
    pub packet_timestamp: u64,
    #[prost(int32, required, tag = "2")]
    pub stage: i32,
    #[prost(sint64, optional, tag = "3")]
    pub stage_time_left: Option<i64>,
    #[prost(int32, required, tag = "4")]
    pub command: i32,
    #[prost(uint32, required, tag = "5")]
    pub command_counter: u32,
    #[prost(uint64, required, tag = "6")]
    pub command_timestamp: u64,
}

/// Decode a vision datagram.
pub fn decode_wrapper(bytes: &[u8]) -> Result<SslWrapperPacket, prost::DecodeError> {
    SslWrapperPacket::decode(bytes)
}

/// Decode a referee datagram.
pub fn decode_referee(bytes: &[u8]) -> Result<SslReferee, prost::DecodeError> {
    SslReferee::decode(bytes)
}
