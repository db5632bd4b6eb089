//! Assertion macros that end in the fatal reporter.
//!
//! Every failing branch evaluates to `!`, so the macros can stand in
//! expression position wherever control must not continue.

/// Formats a message like `format_args!`, reports it and aborts.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => {
        $crate::report_fatal_fmt(::std::format_args!($($arg)+))
    };
}

/// Aborts with the stringified condition, plus an optional message, when
/// the condition is false.
#[macro_export]
macro_rules! check {
    ($cond:expr $(,)?) => {
        if !($cond) {
            $crate::fatal!("{}", ::std::stringify!($cond))
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !($cond) {
            $crate::fatal!(
                "{}: {}",
                ::std::stringify!($cond),
                ::std::format_args!($($arg)+)
            )
        }
    };
}

/// [`check!`] in builds with debug assertions, nothing otherwise.
#[macro_export]
macro_rules! debug_check {
    ($($arg:tt)+) => {
        if ::std::cfg!(debug_assertions) {
            $crate::check!($($arg)+);
        }
    };
}

#[macro_export]
macro_rules! unreachable_fatal {
    () => {
        $crate::fatal!("unreachable")
    };
    ($($arg:tt)+) => {
        $crate::fatal!("unreachable: {}", ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! unimplemented_fatal {
    () => {
        $crate::fatal!("unimplemented")
    };
    ($($arg:tt)+) => {
        $crate::fatal!("unimplemented: {}", ::std::format_args!($($arg)+))
    };
}
