pub mod batch;
pub mod input;
pub mod output;
