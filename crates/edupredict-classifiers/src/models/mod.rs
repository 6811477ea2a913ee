pub mod classifier_trait;
pub mod factory;
pub mod forest;
pub mod logistic;

pub use classifier_trait::Classifier;
