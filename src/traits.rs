/// Something that assigns a display color to every vertex of a brain mesh.
pub trait VertexColor {
    /// The colors as 3 RGB values per vertex.
    fn vertex_color_rgb(&self) -> Vec<u8>;
}
