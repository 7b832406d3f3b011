//! Packed vertex format used for chunk meshes.
//!
//! Every cube corner is stored as a single `u32` so a chunk mesh can be uploaded
//! to the GPU without any per-vertex expansion. The layout is fixed:
//!
//! | bits    | field      | width |
//! |---------|------------|-------|
//! | 0..6    | x (+16)    | 6     |
//! | 6..12   | y (+16)    | 6     |
//! | 12..18  | z (+16)    | 6     |
//! | 18..21  | normal id  | 3     |
//! | 21..26  | atlas u    | 5     |
//! | 26..31  | atlas v    | 5     |
//!
//! Inputs are masked to their field width and never validated. Out of range
//! values wrap silently.

/// Bias added to local positions so `-16..=47` fits the unsigned 6-bit fields.
pub const POSITION_BIAS: i32 = 16;

const POSITION_MASK: u32 = 0x3F;
const NORMAL_MASK: u32 = 0x7;
const ATLAS_MASK: u32 = 0x1F;

const X_SHIFT: u32 = 0;
const Y_SHIFT: u32 = 6;
const Z_SHIFT: u32 = 12;
const NORMAL_SHIFT: u32 = 18;
const U_SHIFT: u32 = 21;
const V_SHIFT: u32 = 26;

/// Every bit owned by the normal, u and v fields.
const FACE_ATTR_BITS: u32 =
    (NORMAL_MASK << NORMAL_SHIFT) | (ATLAS_MASK << U_SHIFT) | (ATLAS_MASK << V_SHIFT);

/// A cube corner packed into one 32-bit word.
///
/// # Memory Layout
/// `#[repr(transparent)]` over `u32`, so a `&[PackedVertex]` can be handed to
/// `bytemuck::cast_slice` and written straight into a vertex buffer.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedVertex(pub u32);

/// The unpacked fields of a [`PackedVertex`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecodedVertex {
    /// Local x, bias removed
    pub x: i32,
    /// Local y, bias removed
    pub y: i32,
    /// Local z, bias removed
    pub z: i32,
    /// Face normal id (0..=5 for front, back, left, right, top, bottom)
    pub normal: u32,
    /// Atlas column
    pub u: u32,
    /// Atlas row
    pub v: u32,
}

impl PackedVertex {
    /// Packs a local position, face normal id and atlas cell into one vertex.
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - Local position in render units, biased by [`POSITION_BIAS`]
    /// * `normal` - Face normal id, masked to 3 bits
    /// * `u`, `v` - Atlas cell, each masked to 5 bits
    pub fn encode(x: i32, y: i32, z: i32, normal: u32, u: u32, v: u32) -> Self {
        let position = (Self::bias(x) << X_SHIFT)
            | (Self::bias(y) << Y_SHIFT)
            | (Self::bias(z) << Z_SHIFT);
        PackedVertex(position | Self::face_bits(normal, u, v))
    }

    /// Splits the vertex back into its fields.
    pub fn decode(self) -> DecodedVertex {
        let raw = self.0;
        DecodedVertex {
            x: ((raw >> X_SHIFT) & POSITION_MASK) as i32 - POSITION_BIAS,
            y: ((raw >> Y_SHIFT) & POSITION_MASK) as i32 - POSITION_BIAS,
            z: ((raw >> Z_SHIFT) & POSITION_MASK) as i32 - POSITION_BIAS,
            normal: (raw >> NORMAL_SHIFT) & NORMAL_MASK,
            u: (raw >> U_SHIFT) & ATLAS_MASK,
            v: (raw >> V_SHIFT) & ATLAS_MASK,
        }
    }

    /// Replaces the normal and atlas fields, leaving the position bits untouched.
    ///
    /// Cube corners are computed once per block and then re-attributed for
    /// every face that shares them.
    pub fn update_face_attrs(self, normal: u32, u: u32, v: u32) -> Self {
        PackedVertex((self.0 & !FACE_ATTR_BITS) | Self::face_bits(normal, u, v))
    }

    /// The raw packed word.
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Returns the vertex buffer layout description for a packed chunk mesh.
    ///
    /// # Shader Attributes
    /// - `location = 0`: packed vertex (u32)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PackedVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Uint32,
            }],
        }
    }

    fn bias(coordinate: i32) -> u32 {
        (coordinate.wrapping_add(POSITION_BIAS) as u32) & POSITION_MASK
    }

    fn face_bits(normal: u32, u: u32, v: u32) -> u32 {
        ((normal & NORMAL_MASK) << NORMAL_SHIFT)
            | ((u & ATLAS_MASK) << U_SHIFT)
            | ((v & ATLAS_MASK) << V_SHIFT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_inverts_encode_across_field_ranges() {
        for x in [-16, -1, 0, 15, 31, 47] {
            for y in [-16, 0, 30, 47] {
                for z in [-16, 1, 29, 47] {
                    for normal in 0..=5 {
                        for (u, v) in [(0, 0), (13, 12), (31, 31), (4, 1)] {
                            let decoded = PackedVertex::encode(x, y, z, normal, u, v).decode();
                            assert_eq!(
                                decoded,
                                DecodedVertex { x, y, z, normal, u, v }
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn re_encoding_decoded_fields_reproduces_the_word() {
        let vertex = PackedVertex::encode(-1, 31, 7, 4, 3, 1);
        let d = vertex.decode();
        assert_eq!(PackedVertex::encode(d.x, d.y, d.z, d.normal, d.u, d.v), vertex);
    }

    #[test]
    fn update_face_attrs_keeps_position_bits() {
        let position_bits = (POSITION_MASK << X_SHIFT)
            | (POSITION_MASK << Y_SHIFT)
            | (POSITION_MASK << Z_SHIFT);
        let original = PackedVertex::encode(-1, 29, 31, 1, 0, 0);
        let updated = original.update_face_attrs(5, 13, 12);

        assert_eq!(original.raw() & position_bits, updated.raw() & position_bits);
        let decoded = updated.decode();
        assert_eq!((decoded.normal, decoded.u, decoded.v), (5, 13, 12));
    }

    #[test]
    fn buffer_layout_is_one_u32_per_vertex() {
        let layout = PackedVertex::desc();
        assert_eq!(layout.array_stride, 4);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Vertex);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Uint32);
    }

    #[test]
    fn out_of_range_inputs_wrap_into_their_field() {
        let wrapped = PackedVertex::encode(48, 0, 0, 9, 33, 32).decode();
        assert_eq!(wrapped.x, -16);
        assert_eq!(wrapped.normal, 1);
        assert_eq!(wrapped.u, 1);
        assert_eq!(wrapped.v, 0);
        // Neighbouring fields are not disturbed by the overflow.
        assert_eq!(wrapped.y, 0);
        assert_eq!(wrapped.z, 0);
    }
}
