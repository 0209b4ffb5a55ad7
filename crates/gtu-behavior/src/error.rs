use thiserror::Error;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("strategy parameter {name} must be positive and finite, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
