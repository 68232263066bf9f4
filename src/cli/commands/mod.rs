pub mod check;
pub mod diff;
pub mod get;
pub mod show;
pub mod url;
