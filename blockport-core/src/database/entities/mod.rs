pub mod action_collections;
pub mod actions;
pub mod applications;
pub mod custom_js_libs;
pub mod datasources;
pub mod pages;
pub mod plugins;
pub mod workspaces;
