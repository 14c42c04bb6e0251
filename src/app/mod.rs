pub(crate) mod components;
pub mod dispatch;
