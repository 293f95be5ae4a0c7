// Chart rendering - geometry, gestures and the drawable scene
pub mod geometry;
pub mod interaction;
pub mod scene;
pub mod session;
pub mod svg;
