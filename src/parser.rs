//! Address parsing functionality.
//!
//! Every parse follows the same path:
//!
//! 1. The address is checked for UTF-8. Bad input never reaches libpostal
//!    and never triggers setup. Text after an interior NUL is dropped, since
//!    a C string ends there.
//! 2. Language/country hints are copied into C strings owned by this call,
//!    cut at the first NUL the same way.
//! 3. Under the engine lock, the library defaults are fetched and only the
//!    supplied hints are overlaid on them.
//! 4. The response arrays are read as bounded slices of `num_components`
//!    entries and copied into owned strings.
//! 5. The response is destroyed exactly once, after the copy.

use std::ffi::{CStr, CString};
use std::ptr::NonNull;
use std::time::Instant;

use libc::c_char;
use log::{debug, trace};

use crate::engine::{Libpostal, NativeEngine};
use crate::error::Result;
use crate::ffi::{libpostal_address_parser_options_t, libpostal_address_parser_response_t};
use crate::guard::Engine;
use crate::stats::StatsRecorder;
use crate::types::{AddressHint, Country, Language, ParseOptions, ParseOutcome, ParsedComponent};

/// C copies of the caller's hints. Freed when the parse call returns.
struct NativeHints {
    language: Option<CString>,
    country: Option<CString>,
}

impl NativeHints {
    fn new(options: &ParseOptions) -> Self {
        Self {
            language: options.language_hint().map(c_prefix),
            country: options.country_hint().map(c_prefix),
        }
    }

    /// Overlay the supplied hints on `defaults`. The result borrows from `self`.
    fn overlay(
        &self,
        mut defaults: libpostal_address_parser_options_t,
    ) -> libpostal_address_parser_options_t {
        if let Some(language) = &self.language {
            defaults.language = language.as_ptr() as *mut c_char;
        }
        if let Some(country) = &self.country {
            defaults.country = country.as_ptr() as *mut c_char;
        }
        defaults
    }
}

/// A live native response. Dropping it hands the response back to libpostal.
struct NativeResponse<'a, E: NativeEngine> {
    native: &'a mut E,
    ptr: NonNull<libpostal_address_parser_response_t>,
    stats: &'a StatsRecorder,
}

impl<E: NativeEngine> NativeResponse<'_, E> {
    /// Copy every label/value pair out of native memory, in array order.
    fn components(&self) -> Vec<ParsedComponent> {
        // SAFETY: ptr came from parse_address and is not destroyed until drop
        let response = unsafe { self.ptr.as_ref() };
        let len = response.num_components;
        if len == 0 || response.labels.is_null() || response.components.is_null() {
            return Vec::new();
        }

        // SAFETY: libpostal allocates both arrays with num_components entries
        let labels = unsafe { std::slice::from_raw_parts(response.labels, len) };
        let values = unsafe { std::slice::from_raw_parts(response.components, len) };

        labels
            .iter()
            .zip(values)
            .map(|(&label, &value)| ParsedComponent {
                label: unsafe { owned_string(label) },
                value: unsafe { owned_string(value) },
            })
            .collect()
    }
}

impl<E: NativeEngine> Drop for NativeResponse<'_, E> {
    fn drop(&mut self) {
        // SAFETY: this guard is the only owner of the response
        unsafe { self.native.destroy_response(self.ptr.as_ptr()) };
        self.stats.record_destroy();
    }
}

/// The part of `text` a C string can carry: everything before the first NUL.
fn c_prefix(text: &str) -> CString {
    let end = text.find('\0').unwrap_or(text.len());
    CString::new(&text[..end]).unwrap_or_default()
}

/// Copy a native string. Null reads as empty so indices stay aligned.
unsafe fn owned_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

impl<E: NativeEngine> Engine<E> {
    /// Parse raw bytes, reporting why nothing came back.
    ///
    /// # Errors
    ///
    /// Only fatal engine errors (see [`crate::Error::is_fatal`]).
    pub fn parse_bytes_detailed(
        &self,
        address: &[u8],
        options: &ParseOptions,
    ) -> Result<ParseOutcome> {
        let Ok(text) = std::str::from_utf8(address) else {
            debug!("rejecting malformed address ({} bytes)", address.len());
            self.recorder().record_rejected_input();
            return Ok(ParseOutcome::InvalidInput);
        };
        let c_address = c_prefix(text);
        if c_address.as_bytes().len() < text.len() {
            debug!("address truncated at interior NUL byte");
        }
        let hints = NativeHints::new(options);

        let mut state = self.lock_ready()?;
        // SAFETY: the engine lock is held
        let defaults = unsafe { state.native.default_parser_options() };
        let native_options = hints.overlay(defaults);

        let started = Instant::now();
        // SAFETY: c_address and hints outlive the call; setup has succeeded
        let raw = unsafe {
            state
                .native
                .parse_address(c_address.as_ptr() as *mut c_char, native_options)
        };
        self.recorder().record_native_parse(started.elapsed());

        let Some(ptr) = NonNull::new(raw) else {
            debug!("libpostal returned no response");
            self.recorder().record_null_response();
            return Ok(ParseOutcome::NoResponse);
        };

        let response = NativeResponse {
            native: &mut state.native,
            ptr,
            stats: self.recorder(),
        };
        let components = response.components();
        drop(response);

        trace!("parsed {} components", components.len());
        Ok(ParseOutcome::Parsed(components))
    }

    /// Parse an address, reporting why nothing came back.
    pub fn parse_detailed(&self, address: &str, options: &ParseOptions) -> Result<ParseOutcome> {
        self.parse_bytes_detailed(address.as_bytes(), options)
    }

    /// Parse raw bytes. Malformed input and empty responses give an empty list.
    pub fn parse_bytes(
        &self,
        address: &[u8],
        options: &ParseOptions,
    ) -> Result<Vec<ParsedComponent>> {
        self.parse_bytes_detailed(address, options)
            .map(ParseOutcome::into_components)
    }

    /// Parse an address into labeled components, in libpostal's order.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use libpostal_parser::{Engine, ParseOptions};
    ///
    /// let engine = Engine::global();
    /// let options = ParseOptions::default();
    /// let components = engine.parse("781 Franklin Ave Brooklyn NY 11216", &options)?;
    /// for component in components {
    ///     println!("{}: {}", component.label, component.value);
    /// }
    /// # Ok::<(), libpostal_parser::Error>(())
    /// ```
    pub fn parse(&self, address: &str, options: &ParseOptions) -> Result<Vec<ParsedComponent>> {
        self.parse_bytes(address.as_bytes(), options)
    }
}

/// High-level address parser with builder-style hints.
#[derive(Debug, Clone)]
pub struct AddressParser<'e, E = Libpostal> {
    engine: &'e Engine<E>,
    options: ParseOptions,
}

impl AddressParser<'static, Libpostal> {
    /// Create a parser over the global engine with no hints.
    pub fn new() -> Self {
        Self::with_engine(Engine::global())
    }
}

impl Default for AddressParser<'static, Libpostal> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'e, E: NativeEngine> AddressParser<'e, E> {
    /// Create a parser over a specific engine.
    pub fn with_engine(engine: &'e Engine<E>) -> Self {
        Self {
            engine,
            options: ParseOptions::default(),
        }
    }

    /// Set language hint for parsing.
    pub fn with_language(mut self, language: Language) -> Self {
        self.options.language = Some(language.into());
        self
    }

    /// Set country hint for parsing.
    pub fn with_country(mut self, country: Country) -> Self {
        self.options.country = Some(country.into());
        self
    }

    /// Set multiple hints for parsing. Unset hints keep their current value.
    pub fn with_hints(mut self, hints: &AddressHint) -> Self {
        let options = ParseOptions::from(hints);
        if options.language.is_some() {
            self.options.language = options.language;
        }
        if options.country.is_some() {
            self.options.country = options.country;
        }
        self
    }

    /// Replace all hints.
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// The hints this parser sends.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse an address string into ordered components.
    pub fn parse(&self, address: &str) -> Result<Vec<ParsedComponent>> {
        self.engine.parse(address, &self.options)
    }

    /// Parse an address into a per-label view.
    pub fn parse_fields(&self, address: &str) -> Result<ParsedAddress> {
        self.parse(address)
            .map(|components| ParsedAddress::from_components(&components))
    }

    /// Parse multiple addresses in order, stopping at the first fatal error.
    pub fn parse_batch(&self, addresses: &[&str]) -> Result<Vec<Vec<ParsedComponent>>> {
        addresses.iter().map(|addr| self.parse(addr)).collect()
    }

    /// Parse multiple addresses from the rayon pool.
    ///
    /// The native calls are still serialized by the engine lock; the pool only
    /// overlaps validation and result copying. Results keep input order.
    #[cfg(feature = "parallel")]
    pub fn parse_batch_parallel(&self, addresses: &[&str]) -> Vec<Result<Vec<ParsedComponent>>> {
        use rayon::prelude::*;

        addresses.par_iter().map(|addr| self.parse(addr)).collect()
    }
}

macro_rules! address_fields {
    ($( $(#[$doc:meta])* $field:ident, )*) => {
        /// Per-label view of a parse.
        ///
        /// When a label repeats, the last value wins. Labels without a field
        /// land in `other`, in parse order.
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct ParsedAddress {
            $( $(#[$doc])* pub $field: Option<String>, )*
            /// Components with labels not listed above
            pub other: Vec<ParsedComponent>,
        }

        impl ParsedAddress {
            /// Build the view from an ordered component list.
            pub fn from_components(components: &[ParsedComponent]) -> Self {
                let mut parsed = ParsedAddress::default();
                for component in components {
                    match component.label.as_str() {
                        $( stringify!($field) => parsed.$field = Some(component.value.clone()), )*
                        _ => parsed.other.push(component.clone()),
                    }
                }
                parsed
            }

            /// Look up a value by libpostal label.
            pub fn get(&self, label: &str) -> Option<&str> {
                match label {
                    $( stringify!($field) => self.$field.as_deref(), )*
                    _ => self
                        .other
                        .iter()
                        .rev()
                        .find(|c| c.label == label)
                        .map(|c| c.value.as_str()),
                }
            }

            /// Check if the parsed address has any components.
            pub fn is_empty(&self) -> bool {
                $( self.$field.is_none() && )* self.other.is_empty()
            }
        }
    };
}

address_fields! {
    /// Venue or building name
    house,
    /// House number (e.g., "123", "123A")
    house_number,
    /// Road/street name (e.g., "franklin ave")
    road,
    /// Unit/apartment number
    unit,
    /// Floor/level
    level,
    /// Staircase
    staircase,
    /// Entrance
    entrance,
    /// Post office box
    po_box,
    /// Postcode (e.g., "11216", "sw1a 1aa")
    postcode,
    /// Suburb/neighborhood
    suburb,
    /// City district
    city_district,
    /// City/locality
    city,
    /// Island
    island,
    /// State district
    state_district,
    /// State/province
    state,
    /// Country region
    country_region,
    /// Country
    country,
    /// World region
    world_region,
    /// Category (e.g., "restaurant")
    category,
    /// Proximity phrase (e.g., "near")
    near,
}
