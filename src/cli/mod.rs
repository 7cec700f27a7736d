pub mod add;
pub mod summary;
pub mod ui;
