pub mod config;
pub mod next;
pub mod once;
pub mod run;
