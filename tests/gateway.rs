#[path = "support/fakes.rs"]
mod fakes;
#[path = "gateway/run_now.rs"]
mod run_now;
