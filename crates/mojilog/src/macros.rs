//! Logging macros for the global logger.
//!
//! Unlike the free functions, the macros also record the name of the enclosing function, and
//! they only evaluate attribute expressions when the level is enabled.

/// Logs through the global logger at the given level.
///
/// ```
/// use mojilog::Level;
///
/// mojilog::log!(Level::WARN, "Cache miss detected", "key" => "user:123");
/// ```
#[macro_export]
macro_rules! log {
    ($level:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        let __level: $crate::Level = $level;
        let __logger = $crate::get();
        if __logger.enabled(__level) {
            let __attrs: ::std::vec::Vec<$crate::Attr> =
                ::std::vec![$($crate::Attr::new($key, $value)),*];
            $crate::__private::emit(
                __logger,
                __level,
                ::core::convert::AsRef::<str>::as_ref(&$message),
                __attrs,
                $crate::CallSite::new(
                    ::core::file!(),
                    ::core::line!(),
                    ::core::option::Option::Some($crate::__function!()),
                ),
            );
        }
    }};
}

/// Logs through the global logger at the `TRACE` level.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::TRACE, $($arg)+)
    };
}

/// Logs through the global logger at the `DEBUG` level.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::DEBUG, $($arg)+)
    };
}

/// Logs through the global logger at the `INFO` level.
///
/// ```
/// mojilog::info!("Server started", "port" => 8080, "tls" => true);
/// ```
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::INFO, $($arg)+)
    };
}

/// Logs through the global logger at the `WARN` level.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::WARN, $($arg)+)
    };
}

/// Logs through the global logger at the `ERROR` level.
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::ERROR, $($arg)+)
    };
}

/// Expands to the fully qualified path of the enclosing function.
#[doc(hidden)]
#[macro_export]
macro_rules! __function {
    () => {{
        fn __here() {}
        $crate::__private::enclosing_function(::core::any::type_name_of_val(&__here))
    }};
}
