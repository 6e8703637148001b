//! Common types for libpostal-parser.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Hints passed to the native parser.
///
/// A missing or empty field leaves libpostal's own detection in charge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParseOptions {
    /// Language hint (e.g., "en", "fr")
    pub language: Option<String>,
    /// Country hint (e.g., "us", "gb")
    pub country: Option<String>,
}

impl ParseOptions {
    /// Options with no hints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the language hint.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the country hint.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// The language hint, if it is set and non-empty.
    pub fn language_hint(&self) -> Option<&str> {
        self.language.as_deref().filter(|s| !s.is_empty())
    }

    /// The country hint, if it is set and non-empty.
    pub fn country_hint(&self) -> Option<&str> {
        self.country.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether these options leave libpostal's defaults untouched.
    pub fn is_default(&self) -> bool {
        self.language_hint().is_none() && self.country_hint().is_none()
    }
}

/// One labeled fragment of a parsed address.
///
/// Labels are libpostal's: `house_number`, `road`, `unit`, `city`,
/// `postcode`, `country`, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedComponent {
    /// Semantic category of the fragment
    pub label: String,
    /// The text libpostal assigned to `label`
    pub value: String,
}

impl ParsedComponent {
    /// Create a component.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Detailed result of one parse call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Components in the order libpostal segmented the input
    Parsed(Vec<ParsedComponent>),
    /// The address was not valid UTF-8 or contained a NUL byte; the native
    /// library was not called
    InvalidInput,
    /// The native library returned no response
    NoResponse,
}

impl ParseOutcome {
    /// Collapse to the component list, empty for every failure.
    pub fn into_components(self) -> Vec<ParsedComponent> {
        match self {
            ParseOutcome::Parsed(components) => components,
            ParseOutcome::InvalidInput | ParseOutcome::NoResponse => Vec::new(),
        }
    }

    /// Whether any component was produced.
    pub fn is_empty(&self) -> bool {
        match self {
            ParseOutcome::Parsed(components) => components.is_empty(),
            _ => true,
        }
    }
}

// Closed set of well-known codes plus a `Custom` escape hatch.
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident, normalize = $normalize:path {
            $( $(#[$vmeta:meta])* $variant:ident => $code:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )*
            /// Any other code, passed through verbatim
            Custom(String),
        }

        impl $name {
            /// The code handed to libpostal.
            pub fn code(&self) -> &str {
                match self {
                    $( $name::$variant => $code, )*
                    $name::Custom(code) => code.as_str(),
                }
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(code: &str) -> Result<Self, Self::Err> {
                Ok(match $normalize(code).as_str() {
                    $( $code => $name::$variant, )*
                    _ => $name::Custom(code.to_string()),
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.code().to_string()
            }
        }
    };
}

code_enum! {
    /// ISO 639-1 language hints.
    pub enum Language, normalize = str::to_lowercase {
        /// English
        English => "en",
        /// Spanish
        Spanish => "es",
        /// French
        French => "fr",
        /// German
        German => "de",
        /// Italian
        Italian => "it",
        /// Portuguese
        Portuguese => "pt",
        /// Dutch
        Dutch => "nl",
        /// Russian
        Russian => "ru",
        /// Polish
        Polish => "pl",
        /// Japanese
        Japanese => "ja",
        /// Korean
        Korean => "ko",
        /// Chinese
        Chinese => "zh",
        /// Arabic
        Arabic => "ar",
    }
}

code_enum! {
    /// ISO 3166-1 alpha-2 country hints. libpostal expects lowercase codes.
    pub enum Country, normalize = str::to_lowercase {
        /// United States
        UnitedStates => "us",
        /// Canada
        Canada => "ca",
        /// United Kingdom
        UnitedKingdom => "gb",
        /// Germany
        Germany => "de",
        /// France
        France => "fr",
        /// Spain
        Spain => "es",
        /// Italy
        Italy => "it",
        /// Netherlands
        Netherlands => "nl",
        /// Brazil
        Brazil => "br",
        /// Mexico
        Mexico => "mx",
        /// Japan
        Japan => "jp",
        /// Australia
        Australia => "au",
        /// India
        India => "in",
    }
}

/// Typed hints for [`crate::AddressParser`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddressHint {
    /// Language hint
    pub language: Option<Language>,
    /// Country hint
    pub country: Option<Country>,
}

impl AddressHint {
    /// Create a new address hint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set language hint.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Set country hint.
    pub fn with_country(mut self, country: Country) -> Self {
        self.country = Some(country);
        self
    }
}

impl From<&AddressHint> for ParseOptions {
    fn from(hint: &AddressHint) -> Self {
        ParseOptions {
            language: hint.language.as_ref().map(|l| l.code().to_string()),
            country: hint.country.as_ref().map(|c| c.code().to_string()),
        }
    }
}
