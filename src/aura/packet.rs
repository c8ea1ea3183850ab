//! Outbound packets produced by the aura manager.
//!
//! Only one message is aura-specific: the duration update sent to the
//! controlling player.
//!
//! ```text
//! SMSG_UPDATE_AURA_DURATION
//! +------+----------------------+
//! | u8   | i32 (little endian)  |
//! | slot | remaining ms         |
//! +------+----------------------+
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Opcode {
    SmsgUpdateAuraDuration = 0x137,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },
    #[error("unexpected opcode {0:?}")]
    UnexpectedOpcode(Opcode),
}

/// A framed server message waiting to be sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    pub opcode: Opcode,
    pub payload: Bytes,
}

/// Remaining duration of the aura in one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuraDurationUpdate {
    pub slot: u8,
    pub duration_ms: i32,
}

impl AuraDurationUpdate {
    pub const SIZE: usize = 5;

    pub fn new(slot: u8, duration_ms: i32) -> Self {
        Self { slot, duration_ms }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        buf.put_u8(self.slot);
        buf.put_i32_le(self.duration_ms);
        buf.freeze()
    }

    pub fn decode(mut payload: &[u8]) -> Result<Self, PacketError> {
        if payload.len() < Self::SIZE {
            return Err(PacketError::Truncated {
                needed: Self::SIZE,
                actual: payload.len(),
            });
        }
        let slot = payload.get_u8();
        let duration_ms = payload.get_i32_le();
        Ok(Self { slot, duration_ms })
    }

    pub fn into_packet(self) -> Packet {
        Packet {
            opcode: Opcode::SmsgUpdateAuraDuration,
            payload: self.encode(),
        }
    }

    pub fn from_packet(packet: &Packet) -> Result<Self, PacketError> {
        if packet.opcode != Opcode::SmsgUpdateAuraDuration {
            return Err(PacketError::UnexpectedOpcode(packet.opcode));
        }
        Self::decode(&packet.payload)
    }
}
