//! crates/taglog/src/macros.rs
//! Content construction macro.

/// Builds [`Content`](crate::Content) from positional and keyword arguments.
///
/// Positional values come first in the order written; `name = value` pairs
/// become keyword arguments. Any value convertible into
/// [`Value`](crate::Value) is accepted.
///
/// # Examples
///
/// ```
/// use taglog::{Content, Value, content};
///
/// let content = content!("hello world!", 3, key = 1337, user = "ada");
/// assert_eq!(content.args(), &[Value::from("hello world!"), Value::from(3)]);
/// assert_eq!(content.kwargs()["key"], Value::from(1337));
/// assert_eq!(content!(), Content::new());
/// ```
#[macro_export]
macro_rules! content {
    (@acc ($acc:expr)) => {
        $acc
    };
    (@acc ($acc:expr) $key:ident = $value:expr $(, $($rest:tt)*)?) => {
        $crate::content!(@acc ($acc.kwarg(::core::stringify!($key), $value)) $($($rest)*)?)
    };
    (@acc ($acc:expr) $value:expr $(, $($rest:tt)*)?) => {
        $crate::content!(@acc ($acc.arg($value)) $($($rest)*)?)
    };
    () => {
        $crate::Content::new()
    };
    ($($args:tt)+) => {
        $crate::content!(@acc ($crate::Content::new()) $($args)+)
    };
}
