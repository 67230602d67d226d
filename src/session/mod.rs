pub mod flow;
pub mod question;
pub mod quiz;
pub mod result;
pub mod setup;
