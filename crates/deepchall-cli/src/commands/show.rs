//! Show command implementation.
//!
//! Lists what the registry knows about.

use deepchall_ops::{ParamSpec, Registry};

/// List backend kinds.
pub fn backends(registry: &Registry) {
    println!("Backends");
    println!("{:-<40}", "");
    for info in registry.backends() {
        println!("{:<12} {}", info.name, info.shape);
        println!("    {}", info.description);
    }
}

/// List language presets.
pub fn langs(registry: &Registry) {
    println!("Languages");
    println!("{:-<40}", "");
    for lang in registry.langs() {
        println!(
            "{:<12} alphabet={} shape={}",
            lang.name(),
            lang.alphabet_size(),
            lang.shape()
        );
        println!("    {}", lang.description());
        print_params(&lang.params());
    }
}

/// List nets.
pub fn nets(registry: &Registry) {
    println!("Nets");
    println!("{:-<40}", "");
    for net in registry.nets() {
        println!("{}", net.name());
        println!("    {}", net.description());
        print_params(&net.params());
    }
}

fn print_params(params: &[ParamSpec]) {
    for param in params {
        println!(
            "    --set {}=<value>  {} (default: {})",
            param.name, param.description, param.default
        );
    }
}
