use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregatorError {
    #[error("Value {value} is not a finite number")]
    NonFinite { value: f64 },
}
