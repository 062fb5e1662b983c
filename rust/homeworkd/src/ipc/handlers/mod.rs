pub mod assignments;
pub mod calendar;
pub mod core;
pub mod theme;
pub mod view;
