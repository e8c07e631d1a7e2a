//! Command-line interface for the `modref` tool.

use clap::{Parser, Subcommand};
use modref::LocationAccess;
use modref::report::parse_int;
use trunk_modref::CaptureComponents;

#[derive(Parser)]
#[command(name = "modref")]
#[command(about = "Inspect packed memory-effect and capture attributes", long_about = None)]
pub struct Cli {
    /// Print reports as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode a packed memory effects value
    Memory {
        /// Decimal or 0x-prefixed hex value
        #[arg(value_parser = parse_int)]
        value: u32,
    },
    /// Decode a packed capture info value
    Captures {
        /// Decimal or 0x-prefixed hex value
        #[arg(value_parser = parse_int)]
        value: u32,
    },
    /// Encode memory effects from `Location=Kind` pairs, e.g. `ArgMem=Ref`
    EncodeMemory {
        /// Locations not listed get no access
        assignments: Vec<LocationAccess>,
    },
    /// Encode capture info from the components of each path
    EncodeCaptures {
        /// Components captured through paths other than the return value
        #[arg(long, default_value = "none")]
        other: CaptureComponents,
        /// Components captured through the return value
        #[arg(long, default_value = "none")]
        ret: CaptureComponents,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_encode_captures() {
        let cli = Cli::try_parse_from([
            "modref",
            "encode-captures",
            "--ret",
            "address, read_provenance",
        ])
        .unwrap();
        match cli.command {
            Command::EncodeCaptures { other, ret } => {
                assert_eq!(other, CaptureComponents::NONE);
                assert_eq!(
                    ret,
                    CaptureComponents::ADDRESS | CaptureComponents::READ_PROVENANCE
                );
            }
            _ => panic!("expected encode-captures"),
        }
    }

    #[test]
    fn test_parse_hex_value() {
        let cli = Cli::try_parse_from(["modref", "--json", "memory", "0x15"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Memory { value: 0x15 }));
    }
}
