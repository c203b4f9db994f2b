// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error handling macros.

/// Early return with an error.
///
/// The error expression is converted with `Into`, so typed error enums and
/// string errors both work.
///
/// # Example
///
/// ```
/// use maki_macros::bail;
///
/// fn read_count(count: u32) -> Result<u32, String> {
///     if count > 1024 {
///         bail!("count {} exceeds limit", count);
///     }
///     Ok(count)
/// }
///
/// assert!(read_count(4096).is_err());
/// assert_eq!(read_count(3), Ok(3));
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($msg.into())
    };
    ($fmt:literal, $($arg:tt)*) => {
        return Err(format!($fmt, $($arg)*).into())
    };
    ($err:expr $(,)?) => {
        return Err($err.into())
    };
}

/// Ensure a condition is true, or return an error.
///
/// # Example
///
/// ```
/// use maki_macros::ensure;
///
/// fn magic(bytes: &[u8]) -> Result<(), String> {
///     ensure!(bytes.starts_with(b"FG"), "bad magic");
///     Ok(())
/// }
///
/// assert!(magic(b"XX").is_err());
/// assert!(magic(b"FG\x03").is_ok());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return Err($msg.into());
        }
    };
    ($cond:expr, $fmt:literal, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($fmt, $($arg)*).into());
        }
    };
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

/// Unwrap an `Option`, or return an error.
///
/// # Example
///
/// ```
/// use maki_macros::try_unwrap;
///
/// fn first(items: &[u32]) -> Result<u32, String> {
///     let value = try_unwrap!(items.first(), "empty table");
///     Ok(*value)
/// }
///
/// assert_eq!(first(&[7]), Ok(7));
/// assert!(first(&[]).is_err());
/// ```
#[macro_export]
macro_rules! try_unwrap {
    ($opt:expr, $msg:literal $(,)?) => {
        match $opt {
            Some(v) => v,
            None => return Err($msg.into()),
        }
    };
    ($opt:expr, $err:expr $(,)?) => {
        match $opt {
            Some(v) => v,
            None => return Err($err.into()),
        }
    };
}
