pub mod channels;
pub mod gateway;
