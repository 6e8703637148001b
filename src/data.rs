//! Data directory diagnostics.
//!
//! libpostal loads its models from disk during setup and only reports a bare
//! `false` when something is missing. Checking the expected files first gives
//! the initialization error a usable message.

use std::path::Path;

use crate::error::{Error, Result};

/// Files read by `libpostal_setup_datadir`.
pub const BASE_FILES: &[&str] = &[
    "address_expansions/address_dictionary.dat",
    "numex/numex.dat",
    "transliteration/transliteration.dat",
];

/// Files read by `libpostal_setup_parser_datadir` alongside the model.
pub const PARSER_FILES: &[&str] = &[
    "address_parser/address_parser_phrases.dat",
    "address_parser/address_parser_postal_codes.dat",
    "address_parser/address_parser_vocab.trie",
];

/// Parser model files in the order libpostal tries them: the CRF model,
/// then the averaged perceptron. One of them is enough.
pub const PARSER_MODELS: &[&str] = &[
    "address_parser/address_parser_crf.dat",
    "address_parser/address_parser.dat",
];

fn check_dir(data_dir: &Path) -> Result<()> {
    if data_dir.is_dir() {
        Ok(())
    } else {
        Err(Error::data_error(format!(
            "Data directory not found: {}",
            data_dir.display()
        )))
    }
}

fn check_file(data_dir: &Path, file: &str) -> Result<()> {
    let metadata = std::fs::metadata(data_dir.join(file))
        .map_err(|_| Error::data_error(format!("Missing data file: {file}")))?;

    if metadata.len() == 0 {
        return Err(Error::data_error(format!("Empty data file: {file}")));
    }
    Ok(())
}

/// Check that every file in `files` exists under `data_dir` and is non-empty.
pub fn verify_files(data_dir: &Path, files: &[&str]) -> Result<()> {
    check_dir(data_dir)?;
    files.iter().try_for_each(|file| check_file(data_dir, file))
}

/// Check the files needed by the base setup stage.
pub fn verify_base_files(data_dir: &Path) -> Result<()> {
    verify_files(data_dir, BASE_FILES)
}

/// Check the files needed by the parser setup stage, accepting either model.
pub fn verify_parser_files(data_dir: &Path) -> Result<()> {
    verify_files(data_dir, PARSER_FILES)?;

    if PARSER_MODELS
        .iter()
        .any(|model| check_file(data_dir, model).is_ok())
    {
        return Ok(());
    }
    Err(Error::data_error(format!(
        "Missing data file: {}",
        PARSER_MODELS.join(" or ")
    )))
}

/// Whether `data_dir` holds everything the address parser needs.
pub fn is_parser_data_available(data_dir: &Path) -> bool {
    verify_base_files(data_dir).is_ok() && verify_parser_files(data_dir).is_ok()
}
