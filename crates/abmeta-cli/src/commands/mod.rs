pub mod extract;
pub mod plugins;
