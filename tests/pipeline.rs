#[path = "support/fakes.rs"]
mod fakes;
#[path = "pipeline/delivery_limits.rs"]
mod delivery_limits;
#[path = "pipeline/end_to_end.rs"]
mod end_to_end;
