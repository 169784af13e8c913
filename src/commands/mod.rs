pub mod doctor;
pub mod init;
pub mod roles;
pub mod run;
pub mod schema;
