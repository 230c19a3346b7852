pub mod message;
pub mod requests;
pub mod response;
