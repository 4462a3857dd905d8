pub mod broker;
pub mod credential;
pub mod exchange;
pub mod prompt;
pub mod registration;
