pub mod dom;
pub mod editor;
pub mod host;
pub mod render;
pub mod seed;
pub mod theme;
