//! Assertion macros for scenario bodies
//!
//! Scenarios return [`HarnessResult`](crate::HarnessResult); these macros
//! turn a failed check into [`HarnessError::AssertionFailed`](crate::HarnessError)
//! so the runner records it like any other failure.

/// Fail the scenario unless `cond` holds
#[macro_export]
macro_rules! ensure {
    ($cond:expr $(,)?) => {
        if !$cond {
            return Err($crate::HarnessError::AssertionFailed(
                concat!("condition failed: ", stringify!($cond)).to_string(),
            ));
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::HarnessError::AssertionFailed(format!($($arg)+)));
        }
    };
}

/// Fail the scenario unless both sides are equal
#[macro_export]
macro_rules! ensure_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => {
                if !(*left == *right) {
                    return Err($crate::HarnessError::AssertionFailed(format!(
                        "{} == {}: left {:?}, right {:?}",
                        stringify!($left),
                        stringify!($right),
                        left,
                        right
                    )));
                }
            }
        }
    };
    ($left:expr, $right:expr, $($arg:tt)+) => {
        match (&$left, &$right) {
            (left, right) => {
                if !(*left == *right) {
                    return Err($crate::HarnessError::AssertionFailed(format!(
                        "{}: left {:?}, right {:?}",
                        format!($($arg)+),
                        left,
                        right
                    )));
                }
            }
        }
    };
}
