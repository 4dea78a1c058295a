use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use zeroize::Zeroizing;

use packed_signer::digest::solidity_keccak256_with;
use packed_signer::message_signer::{recover_address, sign, LocalSigner, MessageSignature, PrivateKey};
use packed_signer::utils::crypto::{decode_hex_lenient, to_checksum_address, to_hex_prefixed};
use packed_signer::utils::logging;
use packed_signer::{log_debug, log_info, log_warn};
use packed_signer::{DynamicElementPolicy, SignerConfig, SignerError, SignerResult, SolValue};

#[derive(Parser, Debug)]
#[command(name = "packed-signer", version)]
#[command(about = "Hash and sign Solidity abi.encodePacked arguments")]
struct Cli {
    /// Print results and errors as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    verbose: bool,

    /// Refuse string/bytes elements inside arrays
    #[arg(long, global = true)]
    reject_dynamic_array_elements: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the tightly packed bytes
    Pack(PackedArgs),
    /// Print keccak256 of the packed bytes
    Hash(PackedArgs),
    /// Sign the packed digest as an Ethereum personal message
    Sign {
        #[command(flatten)]
        args: PackedArgs,

        #[arg(long, env = "PACKED_SIGNER_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },
    /// Recover the signer of a personal-sign signature over a digest
    Recover {
        #[arg(long)]
        digest: String,

        #[arg(long)]
        signature: String,
    },
    /// Print the address of a private key
    Address {
        #[arg(long, env = "PACKED_SIGNER_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },
}

#[derive(Args, Debug)]
struct PackedArgs {
    /// Comma-separated type descriptors, e.g. `address,uint256,bool`
    #[arg(long, value_delimiter = ',')]
    types: Vec<String>,

    /// JSON array of values, one per type
    #[arg(long)]
    values: Option<String>,

    /// JSON file with `{ "types": [...], "values": [...] }`
    #[arg(long, value_name = "FILE", conflicts_with_all = ["types", "values"])]
    input: Option<PathBuf>,
}

#[derive(Deserialize)]
struct PackedInput {
    types: Vec<String>,
    values: Vec<serde_json::Value>,
}

impl PackedArgs {
    fn load(&self) -> SignerResult<(Vec<String>, Vec<SolValue>)> {
        let (types, raw_values) = match &self.input {
            Some(path) => {
                let input: PackedInput = serde_json::from_str(&fs::read_to_string(path)?)?;
                (input.types, input.values)
            }
            None => {
                let values = self.values.as_deref().ok_or_else(|| {
                    SignerError::invalid_input("Missing --values").with_details("pass a JSON array or use --input")
                })?;
                let raw: Vec<serde_json::Value> = serde_json::from_str(values)?;
                (self.types.clone(), raw)
            }
        };

        let values = raw_values
            .iter()
            .map(SolValue::from_json)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((types, values))
    }
}

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli) {
        log_debug!("main", "Command failed", code = err.code);
        if json {
            eprintln!("{}", err.to_json());
        } else {
            eprintln!("Error: {}", err);
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> SignerResult<()> {
    let mut config = SignerConfig::from_env()?;
    if cli.verbose {
        config.debug_logging = true;
    }
    if cli.reject_dynamic_array_elements {
        config.dynamic_array_elements = DynamicElementPolicy::Reject;
    }

    if config.debug_logging {
        logging::enable_debug();
    }
    logging::set_partial_redaction(config.redact_logs);
    for warning in config.validate() {
        log_warn!("config", warning);
    }

    let encoder = config.encoder();
    let json = cli.json;

    match cli.command {
        Command::Pack(args) => {
            let (types, values) = args.load()?;
            let packed = encoder.pack_all(&types, &values)?;
            log_debug!("pack", "Packed arguments", arguments = types.len(), bytes = packed.len());
            emit(json, &[("packed", to_hex_prefixed(&packed))]);
        }
        Command::Hash(args) => {
            let (types, values) = args.load()?;
            let digest = solidity_keccak256_with(&encoder, &types, &values)?;
            log_debug!("hash", "Hashed packed arguments", arguments = types.len());
            emit(json, &[("digest", to_hex_prefixed(&digest))]);
        }
        Command::Sign { args, private_key } => {
            let private_key = Zeroizing::new(private_key);
            let key: PrivateKey = private_key.parse()?;
            let (types, values) = args.load()?;

            let digest = solidity_keccak256_with(&encoder, &types, &values)?;
            let signer = LocalSigner::new(&key)?;
            let signature = sign(&digest, &signer)?;
            let signer_address = signer.checksum_address();

            log_info!(
                "sign",
                "Signed packed digest",
                digest = to_hex_prefixed(&digest),
                signer = signer_address,
            );
            emit(
                json,
                &[
                    ("digest", to_hex_prefixed(&digest)),
                    ("signature", signature.to_hex()),
                    ("signer", signer_address),
                ],
            );
        }
        Command::Recover { digest, signature } => {
            let payload = decode_hex_lenient(&digest)?;
            let signature: MessageSignature = signature.parse()?;
            let address = to_checksum_address(&recover_address(&payload, &signature)?);
            log_debug!("recover", "Recovered signer", signer = address);
            emit(json, &[("signer", address)]);
        }
        Command::Address { private_key } => {
            let private_key = Zeroizing::new(private_key);
            let key: PrivateKey = private_key.parse()?;
            emit(json, &[("address", LocalSigner::new(&key)?.checksum_address())]);
        }
    }

    Ok(())
}

/// Print a single value bare, several as `name: value` lines, or a JSON object
fn emit(json: bool, fields: &[(&str, String)]) {
    if json {
        let object: serde_json::Map<String, serde_json::Value> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.clone())))
            .collect();
        println!("{}", serde_json::Value::Object(object));
        return;
    }

    match fields {
        [(_, value)] => println!("{}", value),
        _ => {
            for (name, value) in fields {
                println!("{}: {}", name, value);
            }
        }
    }
}
