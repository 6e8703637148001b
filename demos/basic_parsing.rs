//! Basic address parsing example
//!
//! Run with `RUST_LOG=debug` to see engine setup and per-parse logging.

use libpostal_parser::{AddressParser, Country, Engine, Language, PostalConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("libpostal-parser Basic Parsing Example");
    println!("======================================");

    let engine = Engine::configure_global(PostalConfig::from_env())?;
    if let Err(e) = engine.initialize() {
        println!("Failed to initialize libpostal: {e}");
        println!("Note: This requires libpostal and its data files to be installed.");
        std::process::exit(1);
    }

    let addresses = [
        "781 Franklin Ave Crown Heights Brooklyn NYC NY 11216",
        "221B Baker Street, London, UK",
        "1600 Pennsylvania Avenue NW, Washington, DC 20500",
    ];

    let parser = AddressParser::new()
        .with_language(Language::English)
        .with_country(Country::UnitedStates);

    for address in addresses {
        println!("\nOriginal: {address}");
        let components = parser.parse(address)?;
        if components.is_empty() {
            println!("  (no components)");
        }
        for component in &components {
            println!("  {:<14} {}", component.label, component.value);
        }
    }

    #[cfg(feature = "serde")]
    {
        let components = parser.parse(addresses[0])?;
        println!("\nAs JSON: {}", serde_json::to_string_pretty(&components)?);
    }

    let stats = engine.stats();
    println!(
        "\n{} native parses, average {:?}",
        stats.native_parses,
        stats.average_parse_time()
    );
    Ok(())
}
