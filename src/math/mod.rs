pub mod mat22;
pub mod vec2;

pub use mat22::Mat22;
pub use vec2::Vec2;
