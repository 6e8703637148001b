//! The native engine seam.
//!
//! [`NativeEngine`] mirrors the fixed C contract of libpostal's parser one
//! method per entry point. [`Libpostal`] forwards to the real library; tests
//! plug in instrumented doubles that allocate responses the same way C does.
//!
//! Implementations never synchronize themselves. Every call is made while
//! the owning [`crate::Engine`] holds its lock, which is why every method is
//! `unsafe` to call.

use std::ffi::CString;
use std::path::{Path, PathBuf};

use libc::c_char;

use crate::data;
use crate::ffi::{libpostal_address_parser_options_t, libpostal_address_parser_response_t};
use crate::PostalConfig;

/// The raw libpostal parser contract.
///
/// # Safety
///
/// libpostal keeps process-wide state and is not reentrant. Callers of any
/// method must guarantee that no other call into the same library is in
/// flight anywhere in the process. [`crate::Engine`] upholds this with its
/// lock.
pub trait NativeEngine: Send {
    /// Load the base engine.
    ///
    /// # Safety
    ///
    /// See the trait-level contract.
    unsafe fn setup(&mut self) -> bool;

    /// Load the address parser model. Only called after [`setup`](Self::setup)
    /// succeeded.
    ///
    /// # Safety
    ///
    /// See the trait-level contract.
    unsafe fn setup_parser(&mut self) -> bool;

    /// The library's default parser options.
    ///
    /// # Safety
    ///
    /// See the trait-level contract.
    unsafe fn default_parser_options(&mut self) -> libpostal_address_parser_options_t;

    /// Parse a NUL-terminated address.
    ///
    /// Returns null when the engine could not produce a response.
    ///
    /// # Safety
    ///
    /// `address` and any non-null pointer in `options` must point to valid
    /// NUL-terminated strings that outlive the call. Setup must have succeeded.
    unsafe fn parse_address(
        &mut self,
        address: *mut c_char,
        options: libpostal_address_parser_options_t,
    ) -> *mut libpostal_address_parser_response_t;

    /// Release a response and all the strings it owns.
    ///
    /// # Safety
    ///
    /// `response` must be a non-null pointer returned by
    /// [`parse_address`](Self::parse_address) on this engine and must not
    /// have been destroyed already.
    unsafe fn destroy_response(&mut self, response: *mut libpostal_address_parser_response_t);

    /// Extra context appended to the initialization error after a failed setup.
    fn failure_hint(&self) -> Option<String> {
        None
    }
}

/// The system libpostal library.
///
/// Only the crate builds one, for the process-wide [`crate::Engine::global`],
/// so there is never a second lock in front of the same C library:
///
/// ```compile_fail
/// use libpostal_parser::{Engine, Libpostal};
///
/// let second = Engine::new(Libpostal::new());
/// ```
///
/// ```compile_fail
/// use libpostal_parser::{Engine, Libpostal};
///
/// let second = Engine::new(Libpostal::default());
/// ```
#[derive(Debug)]
pub struct Libpostal {
    data_dir: Option<PathBuf>,
    verify_data_files: bool,
    hint: Option<String>,
}

impl Libpostal {
    /// Use libpostal's compiled-in data directory.
    #[cfg(test)]
    pub(crate) fn new() -> Self {
        Self::with_config(&PostalConfig {
            data_dir: None,
            verify_data_files: false,
        })
    }

    /// Apply a [`PostalConfig`].
    pub(crate) fn with_config(config: &PostalConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            verify_data_files: config.verify_data_files,
            hint: None,
        }
    }

    /// The data directory passed to setup, if any.
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    #[cfg_attr(not(libpostal_linked), allow(dead_code))]
    fn data_dir_cstring(&mut self) -> Option<CString> {
        let dir = self.data_dir.as_ref()?;
        match CString::new(dir.to_string_lossy().as_bytes()) {
            Ok(c_dir) => Some(c_dir),
            Err(_) => {
                self.hint = Some(format!("invalid data directory path {}", dir.display()));
                None
            }
        }
    }

    /// What is wrong with the data directory for one setup stage, if checked.
    fn data_problem(&self, check: fn(&Path) -> crate::Result<()>) -> Option<String> {
        let (Some(dir), true) = (self.data_dir.as_deref(), self.verify_data_files) else {
            return None;
        };
        check(dir).err().map(|e| e.to_string())
    }
}

#[cfg(libpostal_linked)]
impl NativeEngine for Libpostal {
    unsafe fn setup(&mut self) -> bool {
        if let Some(problem) = self.data_problem(data::verify_base_files) {
            self.hint = Some(problem);
            return false;
        }

        if self.data_dir.is_none() {
            return unsafe { crate::ffi::libpostal_setup() };
        }
        match self.data_dir_cstring() {
            Some(c_dir) => unsafe {
                crate::ffi::libpostal_setup_datadir(c_dir.as_ptr() as *mut _)
            },
            None => false,
        }
    }

    unsafe fn setup_parser(&mut self) -> bool {
        if let Some(problem) = self.data_problem(data::verify_parser_files) {
            self.hint = Some(problem);
            return false;
        }

        if self.data_dir.is_none() {
            return unsafe { crate::ffi::libpostal_setup_parser() };
        }
        match self.data_dir_cstring() {
            Some(c_dir) => unsafe {
                crate::ffi::libpostal_setup_parser_datadir(c_dir.as_ptr() as *mut _)
            },
            None => false,
        }
    }

    unsafe fn default_parser_options(&mut self) -> libpostal_address_parser_options_t {
        unsafe { crate::ffi::libpostal_get_address_parser_default_options() }
    }

    unsafe fn parse_address(
        &mut self,
        address: *mut c_char,
        options: libpostal_address_parser_options_t,
    ) -> *mut libpostal_address_parser_response_t {
        unsafe { crate::ffi::libpostal_parse_address(address, options) }
    }

    unsafe fn destroy_response(&mut self, response: *mut libpostal_address_parser_response_t) {
        unsafe { crate::ffi::libpostal_address_parser_response_destroy(response) }
    }

    fn failure_hint(&self) -> Option<String> {
        self.hint.clone().or_else(|| {
            self.data_dir
                .as_ref()
                .map(|dir| format!("data directory: {}", dir.display()))
        })
    }
}

/// Stand-in used when the build script could not find libpostal: setup
/// always fails, so no other entry point is ever reached.
#[cfg(not(libpostal_linked))]
impl NativeEngine for Libpostal {
    unsafe fn setup(&mut self) -> bool {
        // A broken data directory is the more useful message when both apply.
        self.hint = self.data_problem(data::verify_base_files);
        false
    }

    unsafe fn setup_parser(&mut self) -> bool {
        false
    }

    unsafe fn default_parser_options(&mut self) -> libpostal_address_parser_options_t {
        libpostal_address_parser_options_t::default()
    }

    unsafe fn parse_address(
        &mut self,
        _address: *mut c_char,
        _options: libpostal_address_parser_options_t,
    ) -> *mut libpostal_address_parser_response_t {
        std::ptr::null_mut()
    }

    unsafe fn destroy_response(&mut self, _response: *mut libpostal_address_parser_response_t) {}

    fn failure_hint(&self) -> Option<String> {
        Some(
            self.hint
                .clone()
                .unwrap_or_else(|| "libpostal was not found when this crate was built".to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_libpostal_with_config() {
        let config = PostalConfig::builder()
            .data_dir("/opt/libpostal")
            .verify_data_files(false)
            .build();
        let engine = Libpostal::with_config(&config);
        assert_eq!(engine.data_dir(), Some(Path::new("/opt/libpostal")));
        assert!(Libpostal::new().data_dir().is_none());
    }

    #[test]
    fn test_missing_data_files_fail_setup() {
        let dir = tempfile::tempdir().unwrap();
        let config = PostalConfig::builder().data_dir(dir.path()).build();
        let mut engine = Libpostal::with_config(&config);

        // SAFETY: the data check fails before any native call
        assert!(!unsafe { engine.setup() });
        let hint = engine.failure_hint().unwrap();
        assert!(hint.contains("Missing data file"), "unexpected hint: {hint}");
    }

    #[test]
    fn test_unchecked_data_dir_has_no_problem() {
        let config = PostalConfig::builder()
            .data_dir("/nonexistent/libpostal")
            .verify_data_files(false)
            .build();
        let engine = Libpostal::with_config(&config);

        assert_eq!(engine.data_problem(data::verify_base_files), None);
        assert_eq!(Libpostal::new().data_problem(data::verify_parser_files), None);
    }
}
