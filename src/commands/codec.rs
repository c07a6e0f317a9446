//! Encode and decode commands

use cordic_spi_core::frame::{InputFrame, OutputFrame, OUTPUT_FRAME_LEN};

/// Format bytes as space-separated hex
pub fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse hex bytes given separately ("44 32"), concatenated ("4432"),
/// or separated by commas/colons ("44,32" / "44:32")
pub fn parse_hex_bytes<S: AsRef<str>>(args: &[S]) -> Result<Vec<u8>, String> {
    let mut bytes = Vec::new();
    for arg in args {
        for token in arg.as_ref().split([',', ':', ' ']).filter(|t| !t.is_empty()) {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);

            if digits.is_empty() || (digits.len() > 2 && digits.len() % 2 != 0) {
                return Err(format!("Invalid hex bytes: '{}'", token));
            }

            if digits.len() <= 2 {
                let byte = u8::from_str_radix(digits, 16)
                    .map_err(|_| format!("Invalid hex byte: '{}'", token))?;
                bytes.push(byte);
                continue;
            }

            for i in (0..digits.len()).step_by(2) {
                let pair = digits
                    .get(i..i + 2)
                    .ok_or_else(|| format!("Invalid hex bytes: '{}'", token))?;
                let byte = u8::from_str_radix(pair, 16)
                    .map_err(|_| format!("Invalid hex bytes: '{}'", token))?;
                bytes.push(byte);
            }
        }
    }
    Ok(bytes)
}

/// Print the wire form of an input frame
pub fn run_encode(frame: &InputFrame) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Input:  x=0x{:04x} y=0x{:04x} alpha=0x{:04x} atan0=0x{:04x}",
        frame.x, frame.y, frame.alpha, frame.atan0
    );
    println!("Packed: 0x{:016x}", frame.pack());
    println!("TX bytes (LSB first): {}", format_bytes(&frame.encode()));
    Ok(())
}

/// Decode received bytes into an output frame and print it
pub fn run_decode<S: AsRef<str>>(args: &[S]) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = parse_hex_bytes(args)?;
    let out = OutputFrame::decode(&bytes)?;
    if bytes.len() > OUTPUT_FRAME_LEN {
        log::warn!(
            "Ignoring {} bytes past the {}-byte output frame",
            bytes.len() - OUTPUT_FRAME_LEN,
            OUTPUT_FRAME_LEN
        );
    }
    print_output(&out);
    Ok(())
}

/// Print an output frame
pub fn print_output(out: &OutputFrame) {
    println!(
        "Parsed: alpha=0x{:04x} cos=0x{:04x} sin=0x{:04x}",
        out.alpha, out.cos, out.sin
    );
}
