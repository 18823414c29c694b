//! Error macros for codejudge

/// Macro for creating invalid value errors
#[macro_export]
macro_rules! bail_invalid {
    ($context:expr, $value:expr) => {
        return Err($crate::error::JudgeError::invalid_value($context, $value))
    };
}

/// Macro for creating usage errors
#[macro_export]
macro_rules! bail_usage {
    ($msg:expr) => {
        return Err($crate::error::JudgeError::UsageError($msg.to_string()))
    };
}

/// Macro for rejecting a judge response field
#[macro_export]
macro_rules! bail_score {
    ($field:expr, $($reason:tt)+) => {
        return Err($crate::error::JudgeError::invalid_score(
            $field,
            format!($($reason)+),
        ))
    };
}
