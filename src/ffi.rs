//! Raw declarations for the subset of the libpostal C API used by the parser.
//!
//! Only the address parser entry points are declared here:
//!
//! * `libpostal_setup` / `libpostal_setup_parser` (and their `_datadir`
//!   variants) load the engine and the parser model.
//! * `libpostal_get_address_parser_default_options` returns a value record
//!   whose `language`/`country` pointers may be overwritten before use.
//! * `libpostal_parse_address` returns an owned response, or null.
//! * `libpostal_address_parser_response_destroy` frees a response together
//!   with every string it owns.
//!
//! Nothing in this module is safe to call directly. The safe surface lives in
//! [`crate::engine`] and [`crate::parser`].
//!
//! The declarations are only linked when the build script found libpostal
//! (`cfg(libpostal_linked)`). Without it, [`crate::engine::Libpostal`] reports
//! a setup failure instead of failing to link.

#![allow(non_camel_case_types)]
#![allow(missing_docs)] // Mirrors libpostal.h

use libc::{c_char, size_t};

/// Parser options record, passed by value to `libpostal_parse_address`.
///
/// Null pointers mean "auto-detect".
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct libpostal_address_parser_options_t {
    /// Language hint, NUL-terminated, or null
    pub language: *mut c_char,
    /// Country hint, NUL-terminated, or null
    pub country: *mut c_char,
}

impl Default for libpostal_address_parser_options_t {
    fn default() -> Self {
        Self {
            language: std::ptr::null_mut(),
            country: std::ptr::null_mut(),
        }
    }
}

/// Parser response owned by libpostal.
///
/// `components` and `labels` are parallel arrays of `num_components`
/// NUL-terminated strings.
#[repr(C)]
#[derive(Debug)]
pub struct libpostal_address_parser_response_t {
    /// Number of entries in both arrays
    pub num_components: size_t,
    /// Substrings of the input, in parse order
    pub components: *mut *mut c_char,
    /// Label for each entry of `components`
    pub labels: *mut *mut c_char,
}

#[cfg(libpostal_linked)]
unsafe extern "C" {
    pub fn libpostal_setup() -> bool;
    pub fn libpostal_setup_datadir(datadir: *mut c_char) -> bool;
    pub fn libpostal_setup_parser() -> bool;
    pub fn libpostal_setup_parser_datadir(datadir: *mut c_char) -> bool;

    pub fn libpostal_get_address_parser_default_options() -> libpostal_address_parser_options_t;

    pub fn libpostal_parse_address(
        address: *mut c_char,
        options: libpostal_address_parser_options_t,
    ) -> *mut libpostal_address_parser_response_t;

    pub fn libpostal_address_parser_response_destroy(
        response: *mut libpostal_address_parser_response_t,
    );
}
