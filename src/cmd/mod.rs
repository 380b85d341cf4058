pub mod holidays;
pub mod init;
pub mod month;
pub mod quote;
pub mod root;
