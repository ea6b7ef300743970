pub mod compare;
pub mod init;
pub mod list_keys;
pub mod score;
pub mod validate;
