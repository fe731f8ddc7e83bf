//! Barrier Macros - Field access through the barriers
//!
//! Available Macros:
//! - `stm_read_field!` - Read a payload word through the read barrier
//! - `stm_write_field!` - Write a payload word through the write barrier

/// Read a payload word of `$obj` through the read barrier
///
/// # Examples
///
/// ```rust,ignore
/// let a = stm_read_field!(thread, obj, 0);
/// ```
#[macro_export]
macro_rules! stm_read_field {
    ($thread:expr, $obj:expr, $offset:expr) => {{
        let obj = $thread.read_barrier($obj);
        unsafe { $crate::object::read_field(obj, $offset) }
    }};
}

/// Write a payload word of `$obj` through the write barrier
///
/// Evaluates to `Result<usize>`: the address actually written.
///
/// # Examples
///
/// ```rust,ignore
/// let written = stm_write_field!(thread, obj, 8, 34)?;
/// ```
#[macro_export]
macro_rules! stm_write_field {
    ($thread:expr, $obj:expr, $offset:expr, $value:expr) => {{
        match $thread.write_barrier($obj) {
            Ok(obj) => {
                unsafe { $crate::object::write_field(obj, $offset, $value) };
                Ok(obj)
            }
            Err(e) => Err(e),
        }
    }};
}
