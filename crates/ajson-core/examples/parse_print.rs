//! Parse a document, walk it, and print it back in both layouts.
//!
//! Run with: cargo run --example parse_print

use ajson_rs::prelude::*;

const DOCUMENT: &str = r#"
{
    "service": "inventory",
    "replicas": 3,
    "tags": ["fast", "arena"],
    "limits": {"memory": 64.5, "cpu": 2}
}
"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (root, state) = parse(DOCUMENT);
    let root = match root {
        Some(id) => id,
        None => {
            eprintln!(
                "parse failed ({}): {}",
                state.error_kind(),
                state.error_message().unwrap_or("no message")
            );
            std::process::exit(1);
        }
    };

    let value = state.value(root);
    println!("fields at root: {}", value.len());
    if let Some(service) = value.field("service") {
        println!("service = {:?}", service.as_str());
    }
    if let Some(tags) = value.field("tags") {
        for tag in tags.elements() {
            println!("tag: {:?}", tag.as_str());
        }
    }

    println!("\ncompact:\n{}", compact(value));
    println!("\npretty:\n{}", pretty(value));
    println!(
        "\narena footprint: {} bytes (peak {})",
        state.allocated_bytes(),
        state.peak_allocated_bytes()
    );

    state.release();
}
