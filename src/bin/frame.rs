use std::env;

use sirf_serial::nmea::NmeaCommand;
use sirf_serial::osp::OspCommand;

const USAGE: &str = "usage: frame osp <message id> \"<arguments>\" [base]\n       frame nmea <message id> \"<arguments>\"";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();

    let frame = match args.as_slice() {
        [kind, id, arguments, rest @ ..] if kind == "osp" && rest.len() <= 1 => {
            let base = match rest.first() {
                Some(base) => base.parse()?,
                None => 16,
            };
            let message_id = parse_message_id(id)?;
            let command = OspCommand::new(message_id, arguments).with_base(base);
            command.encode()?.to_vec()
        }
        [kind, id, arguments] if kind == "nmea" => {
            let command = NmeaCommand::new(id.parse()?, arguments);
            command.encode()?.to_vec()
        }
        _ => return Err(USAGE.into()),
    };

    println!("{} bytes: {:02x?}", frame.len(), frame);
    Ok(())
}

/// OSP message ids are usually written in hex, `0x` prefixed or not
fn parse_message_id(id: &str) -> Result<u8, std::num::ParseIntError> {
    match id.strip_prefix("0x").or_else(|| id.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => id.parse(),
    }
}
