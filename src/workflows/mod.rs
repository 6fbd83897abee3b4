pub mod grading;
pub mod obs;
pub mod transcript;
