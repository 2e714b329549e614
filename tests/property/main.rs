#[path = "../fixtures/mod.rs"]
mod fixtures;

mod arguments;
mod dispatch;
mod utils;
