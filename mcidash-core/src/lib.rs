pub mod config;
pub mod model;
pub mod status;

// Snapshot indexing and derived state
pub mod aggregate;
pub mod index;
pub mod selection;

// External surfaces
pub mod dashboard;
pub mod feed;
pub mod view;
