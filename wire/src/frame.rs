//! Frame message header.

use msg::{MsgReader, MsgWriter};

use crate::error::{WireError, WireResult};
use crate::limits::MAX_AREA_BYTES;

/// The fixed leader of every frame message.
///
/// The player state and entity run follow it in the same message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Sequence number of this frame.
    pub server_frame: i32,
    /// Frame this one is delta-compressed against; zero or negative means
    /// the frame is a self-contained keyframe.
    pub delta_frame: i32,
    /// Number of messages the server dropped for rate control since the
    /// previous frame.
    pub suppress_count: u8,
    /// Number of meaningful bytes in `area_bits`.
    pub area_len: u8,
    /// Area visibility bits, zero-padded past `area_len`.
    pub area_bits: [u8; MAX_AREA_BYTES],
}

impl FrameHeader {
    /// Returns `true` if this frame carries no delta reference.
    #[must_use]
    pub const fn is_keyframe(&self) -> bool {
        self.delta_frame <= 0
    }
}

/// Reads a frame header, bounding the area bit run.
pub fn read_frame_header(msg: &mut MsgReader<'_>) -> WireResult<FrameHeader> {
    let server_frame = msg.read_i32()?;
    let delta_frame = msg.read_i32()?;
    let suppress_count = msg.read_u8()?;

    let area_len = msg.read_u8()?;
    if usize::from(area_len) > MAX_AREA_BYTES {
        return Err(WireError::AreaBitsTooLong { len: area_len });
    }
    let run = msg.read_data(usize::from(area_len))?;
    let mut area_bits = [0u8; MAX_AREA_BYTES];
    area_bits[..run.len()].copy_from_slice(run);

    Ok(FrameHeader {
        server_frame,
        delta_frame,
        suppress_count,
        area_len,
        area_bits,
    })
}

/// Writes a frame header.
pub fn write_frame_header(msg: &mut MsgWriter, header: &FrameHeader) {
    msg.write_i32(header.server_frame);
    msg.write_i32(header.delta_frame);
    msg.write_u8(header.suppress_count);
    msg.write_u8(header.area_len);
    msg.write_data(&header.area_bits[..usize::from(header.area_len)]);
}
