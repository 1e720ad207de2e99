pub mod dispatch;
pub mod run;
pub mod scenarios;
pub mod validate;

pub use dispatch::dispatch;
