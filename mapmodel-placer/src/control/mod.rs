pub mod background_loader;
pub mod controllers;
