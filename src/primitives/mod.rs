pub mod camera;
pub mod lights;
pub mod mesh;
pub mod scene;
pub mod sphere;
pub mod surface;
pub mod texture;
