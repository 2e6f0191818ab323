//! Replication creation message and its fixed wire layout.
//!
//! Layout (little endian, 27 bytes):
//!
//! | offset | size | field          |
//! |--------|------|----------------|
//! | 0      | 2    | descriptor id  |
//! | 2      | 1    | team           |
//! | 3      | 4    | x              |
//! | 7      | 4    | y              |
//! | 11     | 4    | angle          |
//! | 15     | 4    | damage         |
//! | 19     | 4    | velocity scale |
//! | 23     | 4    | lifetime scale |

use serde::{Deserialize, Serialize};

use crate::error::ReplicationError;
use crate::types::{DescriptorId, Team};

/// Everything a peer needs to recreate a projectile through the spawn factory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreateProjectile {
    pub descriptor: DescriptorId,
    pub team: Team,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    /// Negative means "descriptor default".
    pub damage: f32,
    pub velocity_scale: f32,
    pub lifetime_scale: f32,
}

impl CreateProjectile {
    pub const ENCODED_LEN: usize = 27;

    /// Explicit damage override carried by the message, if any.
    pub fn damage_override(&self) -> Option<f32> {
        (self.damage >= 0.0).then_some(self.damage)
    }

    pub fn encode(&self) -> [u8; Self::ENCODED_LEN] {
        let mut buf = [0u8; Self::ENCODED_LEN];
        buf[0..2].copy_from_slice(&self.descriptor.0.to_le_bytes());
        buf[2] = self.team.0;
        let floats = [
            self.x,
            self.y,
            self.angle,
            self.damage,
            self.velocity_scale,
            self.lifetime_scale,
        ];
        for (i, value) in floats.iter().enumerate() {
            let at = 3 + i * 4;
            buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
        }
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ReplicationError> {
        let bytes: &[u8; Self::ENCODED_LEN] =
            bytes
                .try_into()
                .map_err(|_| ReplicationError::LengthMismatch {
                    expected: Self::ENCODED_LEN,
                    actual: bytes.len(),
                })?;
        let float = |i: usize| {
            let at = 3 + i * 4;
            f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        Ok(Self {
            descriptor: DescriptorId(u16::from_le_bytes([bytes[0], bytes[1]])),
            team: Team(bytes[2]),
            x: float(0),
            y: float(1),
            angle: float(2),
            damage: float(3),
            velocity_scale: float(4),
            lifetime_scale: float(5),
        })
    }
}
