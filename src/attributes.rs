// src/attributes.rs

use glam::Vec2;

// Low two bits of the attribute byte select the record kind. The shader
// decodes the same constants, so these values are part of the GPU contract.
pub const POLYGON_BODY: u8 = 0b0000_0000;
pub const OUTLINE_CORNER: u8 = 0b0000_0001;
pub const OUTLINE_QUAD: u8 = 0b0000_0010;

const KIND_MASK: u8 = 0b0000_0011;
const CORNER_MASK: u8 = 0b0000_1100;

// Corner selector bits (already shifted into bits 2..=3), in quad emission
// order: bottom-left, top-left, top-right, bottom-right. Bit 2 is the x
// sign, bit 3 the y sign.
pub const CORNER_SELECTORS: [u8; 4] = [0b0000_0000, 0b0000_1000, 0b0000_1100, 0b0000_0100];

// Unit-square offsets the shader applies per selector, same order.
pub const CORNER_OFFSETS: [Vec2; 4] = [
    Vec2::new(-1.0, -1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, -1.0),
];

/// Closed set of vertex-record kinds carried in the per-vertex attribute
/// byte. `Corner` holds the selector index (0..4) picking one of the four
/// [`CORNER_OFFSETS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexKind {
    Body,
    Corner(u8),
    EdgeQuad,
}

impl VertexKind {
    /// Packs the kind into the attribute byte uploaded to the GPU.
    pub fn encode(self) -> u8 {
        match self {
            VertexKind::Body => POLYGON_BODY,
            VertexKind::Corner(selector) => {
                CORNER_SELECTORS[selector as usize % 4] | OUTLINE_CORNER
            }
            VertexKind::EdgeQuad => OUTLINE_QUAD,
        }
    }

    /// Inverse of [`encode`](Self::encode). Returns `None` for byte patterns
    /// outside the contract (unknown kind bits, or selector bits set on a
    /// non-corner record).
    pub fn decode(byte: u8) -> Option<Self> {
        match byte & KIND_MASK {
            POLYGON_BODY if byte == POLYGON_BODY => Some(VertexKind::Body),
            OUTLINE_CORNER if (byte & !(KIND_MASK | CORNER_MASK)) == 0 => {
                let selector = match byte & CORNER_MASK {
                    0b0000_0000 => 0,
                    0b0000_1000 => 1,
                    0b0000_1100 => 2,
                    _ => 3,
                };
                Some(VertexKind::Corner(selector))
            }
            OUTLINE_QUAD if byte == OUTLINE_QUAD => Some(VertexKind::EdgeQuad),
            _ => None,
        }
    }

    pub fn corner_offset(self) -> Option<Vec2> {
        match self {
            VertexKind::Corner(selector) => Some(CORNER_OFFSETS[selector as usize % 4]),
            _ => None,
        }
    }
}
