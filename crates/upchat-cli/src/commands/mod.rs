pub mod history;
pub mod profile;
pub mod send;
