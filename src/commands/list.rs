//! List commands implementation

use crate::backends;

/// List all backends compiled into this build
pub fn list_backends() {
    let backends = backends::available_backends();
    if backends.is_empty() {
        println!("No backends available (recompile with backend features enabled)");
        return;
    }

    println!("Available backends:");
    println!();
    for b in &backends {
        let aliases = if b.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", b.aliases.join(", "))
        };
        println!("  {:12} - {}{}", b.name, b.description, aliases);
    }
}
