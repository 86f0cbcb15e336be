pub mod batch;
pub mod github;
