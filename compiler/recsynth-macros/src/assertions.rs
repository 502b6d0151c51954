//! Assertion macros
//!
//! This module contains macros for performing assertions in tests. Notable macros defined in this
//! module are:
//!
//! - [`assert_ok!`]
//! - [`assert_err!`]
//! - [`assert_some!`]
//! - [`assert_none!`]
//! - [`assert_matches!`]
//! - [`assert_any!`]
//! - [`assert_no_match!`]
//!
//! This module is only available when the `assertion-macros` feature is enabled.

/// Assert that a `Result` is `Ok`, returning the value inside the `Ok` variant.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {{
        match $expr {
            ::std::result::Result::Ok(val) => val,
            ::std::result::Result::Err(err) => {
                panic!("assertion failed: Err({:?})", err);
            }
        }
    }};
}

/// Assert that a `Result` is `Err`, returning the error inside the `Err` variant.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {{
        match $expr {
            ::std::result::Result::Ok(val) => {
                panic!("assertion failed: Ok({:?})", val);
            }
            ::std::result::Result::Err(err) => err,
        }
    }};
}

/// Assert that an `Option` is `Some`, returning the value inside the `Some` variant.
#[macro_export]
macro_rules! assert_some {
    ($expr:expr) => {{
        match $expr {
            ::std::option::Option::Some(val) => val,
            ::std::option::Option::None => {
                panic!("assertion failed: None");
            }
        }
    }};
}

/// Assert that an `Option` is `None`.
#[macro_export]
macro_rules! assert_none {
    ($expr:expr) => {{
        if let ::std::option::Option::Some(val) = $expr {
            panic!("assertion failed: Some({:?})", val);
        };
    }};
}

/// Assert that an expression matches a pattern, returning the expression on the right-hand side of
/// the arrow.
#[macro_export]
macro_rules! assert_matches {
    ($expr:expr, $ty:pat_param => $output:expr) => {{
        match $expr {
            $ty => $output,
            ref other => {
                panic!(
                    "assertion failed: expected {:?} to match {}",
                    other,
                    stringify!($ty)
                );
            }
        }
    }};
}

/// Assert that at least one item yielded by an iterator matches the pattern.
///
/// This is mostly used to look for a specific diagnostic in a diagnostic bag without caring about
/// the order or the presence of other diagnostics.
#[macro_export]
macro_rules! assert_any {
    ($iter:expr, $pat:pat_param) => {{
        let items = ($iter).into_iter().collect::<::std::vec::Vec<_>>();
        if !items.iter().any(|item| matches!(item, $pat)) {
            panic!(
                "assertion failed: no item matched {} in {:?}",
                stringify!($pat),
                items
            );
        }
    }};
}

/// Assert that no item yielded by an iterator matches the pattern.
#[macro_export]
macro_rules! assert_no_match {
    ($iter:expr, $pat:pat_param) => {{
        let items = ($iter).into_iter().collect::<::std::vec::Vec<_>>();
        if let Some(found) = items.iter().find(|item| matches!(item, $pat)) {
            panic!(
                "assertion failed: {:?} unexpectedly matched {}",
                found,
                stringify!($pat)
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_std_result_assertions() {
        let result: Result<i32, &str> = Ok(42);
        assert_eq!(assert_ok!(result), 42);
        let result: Result<i32, &str> = Err("error");
        assert_eq!(assert_err!(result), "error");
    }

    #[test]
    fn test_std_option_assertions() {
        let option: Option<i32> = Some(42);
        assert_eq!(assert_some!(option), 42);
        let option: Option<i32> = None;
        assert_none!(option);
    }

    #[test]
    fn test_iterator_assertions() {
        let codes = vec![1, 2, 3];
        assert_any!(codes.iter(), 2);
        assert_no_match!(codes.iter(), 4..=9);
    }

    #[test]
    #[should_panic]
    fn test_assert_any_fails_without_match() {
        let codes: Vec<i32> = vec![];
        assert_any!(codes.iter(), 1);
    }

    #[test]
    #[should_panic]
    fn test_assert_ok_err() {
        let result: Result<i32, &str> = Err("error");
        assert_ok!(result);
    }
}
