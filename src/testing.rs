//! Instrumented stand-in for libpostal used by the unit tests.
//!
//! Responses are heap-allocated C arrays of C strings, like the real thing.
//! On destroy every string is overwritten with `#` and parked until the fake
//! is dropped, so an adapter that read after destroy would return garbage
//! instead of the expected text.

use std::ffi::{CStr, CString};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use libc::c_char;

use crate::engine::NativeEngine;
use crate::ffi::{libpostal_address_parser_options_t, libpostal_address_parser_response_t};

type Labeler = Box<dyn Fn(&str) -> Option<Vec<(String, String)>> + Send>;

/// Options as seen by the native side during one parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SeenOptions {
    pub language: Option<String>,
    pub country: Option<String>,
}

/// Shared view of everything the fake observed.
#[derive(Debug, Default)]
pub(crate) struct Probe {
    pub setup_calls: AtomicUsize,
    pub parser_setup_calls: AtomicUsize,
    pub parse_calls: AtomicUsize,
    pub destroy_calls: AtomicUsize,
    pub double_destroys: AtomicUsize,
    pub seen_addresses: Mutex<Vec<String>>,
    pub seen_options: Mutex<Vec<SeenOptions>>,
    pub intervals: Mutex<Vec<(Instant, Instant)>>,
}

impl Probe {
    pub fn parse_calls(&self) -> usize {
        self.parse_calls.load(Ordering::SeqCst)
    }

    pub fn destroy_calls(&self) -> usize {
        self.destroy_calls.load(Ordering::SeqCst)
    }

    pub fn setup_calls(&self) -> usize {
        self.setup_calls.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<SeenOptions> {
        self.seen_options.lock().unwrap().last().cloned()
    }

    /// Whether any two native parses ran at the same time.
    pub fn has_overlap(&self) -> bool {
        let mut intervals = self.intervals.lock().unwrap().clone();
        intervals.sort_by_key(|(enter, _)| *enter);
        intervals.windows(2).any(|pair| pair[1].0 < pair[0].1)
    }
}

struct Graveyard(Vec<*mut libpostal_address_parser_response_t>);

// Only touched through `&mut FakeLibpostal`, which the engine lock serializes.
unsafe impl Send for Graveyard {}

pub(crate) struct FakeLibpostal {
    probe: Arc<Probe>,
    labeler: Labeler,
    fail_setup: bool,
    fail_parser_setup: bool,
    null_value_at: Option<usize>,
    default_language: Option<&'static CStr>,
    default_country: Option<&'static CStr>,
    delay: Duration,
    graveyard: Graveyard,
}

impl FakeLibpostal {
    /// Labels each whitespace token `label_<index>`; blank input yields null.
    pub fn new() -> Self {
        Self {
            probe: Arc::new(Probe::default()),
            labeler: Box::new(|address| {
                if address.trim().is_empty() {
                    return None;
                }
                Some(
                    address
                        .split_whitespace()
                        .enumerate()
                        .map(|(i, token)| (format!("label_{i}"), token.to_string()))
                        .collect(),
                )
            }),
            fail_setup: false,
            fail_parser_setup: false,
            null_value_at: None,
            default_language: None,
            default_country: None,
            delay: Duration::ZERO,
            graveyard: Graveyard(Vec::new()),
        }
    }

    pub fn probe(&self) -> Arc<Probe> {
        Arc::clone(&self.probe)
    }

    pub fn with_labeler(
        mut self,
        labeler: impl Fn(&str) -> Option<Vec<(String, String)>> + Send + 'static,
    ) -> Self {
        self.labeler = Box::new(labeler);
        self
    }

    pub fn failing_setup(mut self) -> Self {
        self.fail_setup = true;
        self
    }

    pub fn failing_parser_setup(mut self) -> Self {
        self.fail_parser_setup = true;
        self
    }

    pub fn with_null_value_at(mut self, index: usize) -> Self {
        self.null_value_at = Some(index);
        self
    }

    pub fn with_defaults(
        mut self,
        language: Option<&'static CStr>,
        country: Option<&'static CStr>,
    ) -> Self {
        self.default_language = language;
        self.default_country = country;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn allocate(&self, pairs: Vec<(String, String)>) -> *mut libpostal_address_parser_response_t {
        let num_components = pairs.len();
        let mut labels = Vec::with_capacity(num_components);
        let mut components = Vec::with_capacity(num_components);

        for (i, (label, value)) in pairs.into_iter().enumerate() {
            labels.push(CString::new(label).unwrap().into_raw());
            if self.null_value_at == Some(i) {
                components.push(std::ptr::null_mut());
            } else {
                components.push(CString::new(value).unwrap().into_raw());
            }
        }

        let labels = Box::into_raw(labels.into_boxed_slice()) as *mut *mut c_char;
        let components = Box::into_raw(components.into_boxed_slice()) as *mut *mut c_char;
        Box::into_raw(Box::new(libpostal_address_parser_response_t {
            num_components,
            components,
            labels,
        }))
    }

    unsafe fn scribble(ptr: *mut c_char) {
        if ptr.is_null() {
            return;
        }
        let len = unsafe { CStr::from_ptr(ptr) }.to_bytes().len();
        for i in 0..len {
            unsafe { *ptr.add(i) = b'#' as c_char };
        }
    }

    unsafe fn free(response: *mut libpostal_address_parser_response_t) {
        let response = unsafe { Box::from_raw(response) };
        let n = response.num_components;
        let labels =
            unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(response.labels, n)) };
        let components =
            unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(response.components, n)) };

        for ptr in labels.iter().chain(components.iter()) {
            if !ptr.is_null() {
                drop(unsafe { CString::from_raw(*ptr) });
            }
        }
    }
}

fn read_opt(ptr: *mut c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

impl NativeEngine for FakeLibpostal {
    unsafe fn setup(&mut self) -> bool {
        self.probe.setup_calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        !self.fail_setup
    }

    unsafe fn setup_parser(&mut self) -> bool {
        self.probe.parser_setup_calls.fetch_add(1, Ordering::SeqCst);
        !self.fail_parser_setup
    }

    unsafe fn default_parser_options(&mut self) -> libpostal_address_parser_options_t {
        libpostal_address_parser_options_t {
            language: self
                .default_language
                .map_or(std::ptr::null_mut(), |s| s.as_ptr() as *mut c_char),
            country: self
                .default_country
                .map_or(std::ptr::null_mut(), |s| s.as_ptr() as *mut c_char),
        }
    }

    unsafe fn parse_address(
        &mut self,
        address: *mut c_char,
        options: libpostal_address_parser_options_t,
    ) -> *mut libpostal_address_parser_response_t {
        let enter = Instant::now();
        self.probe.parse_calls.fetch_add(1, Ordering::SeqCst);

        let address = unsafe { CStr::from_ptr(address) }.to_string_lossy().into_owned();
        self.probe.seen_options.lock().unwrap().push(SeenOptions {
            language: read_opt(options.language),
            country: read_opt(options.country),
        });
        self.probe.seen_addresses.lock().unwrap().push(address.clone());

        thread::sleep(self.delay);
        let response = match (self.labeler)(&address) {
            Some(pairs) => self.allocate(pairs),
            None => std::ptr::null_mut(),
        };

        self.probe
            .intervals
            .lock()
            .unwrap()
            .push((enter, Instant::now()));
        response
    }

    unsafe fn destroy_response(&mut self, response: *mut libpostal_address_parser_response_t) {
        self.probe.destroy_calls.fetch_add(1, Ordering::SeqCst);
        if self.graveyard.0.contains(&response) {
            self.probe.double_destroys.fetch_add(1, Ordering::SeqCst);
            return;
        }

        let r = unsafe { &*response };
        for i in 0..r.num_components {
            unsafe {
                Self::scribble(*r.labels.add(i));
                Self::scribble(*r.components.add(i));
            }
        }
        self.graveyard.0.push(response);
    }

    fn failure_hint(&self) -> Option<String> {
        Some("fake engine refused to load".to_string())
    }
}

impl Drop for FakeLibpostal {
    fn drop(&mut self) {
        for response in self.graveyard.0.drain(..) {
            unsafe { Self::free(response) };
        }
    }
}
