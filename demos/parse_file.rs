//! Decodes a JSON file (or stdin when no path is given) and prints it back compactly.
//!
//! `cargo run --example parse_file -- data.json`

use std::io::Read;

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let mut input = String::new();
    match std::env::args().nth(1) {
        Some(path) => {
            input = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
        }
        None => {
            std::io::stdin()
                .read_to_string(&mut input)
                .context("reading stdin")?;
        }
    }

    let value = jsoncomb::parse_json(&input)?;
    println!("{}", value);
    Ok(())
}
