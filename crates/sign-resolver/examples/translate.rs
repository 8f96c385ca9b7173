use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sign_mapping::{FileSource, MappingCache};
use sign_resolver::{PrefixResolver, SignSequencer, example_sentences};

const USAGE: &str =
    "usage: cargo run -p sign-resolver --example translate -- <mapping.json> [--demo | <text>]";

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let mapping_path = args.next().map(PathBuf::from).context(USAGE)?;
    let input = args.next().context(USAGE)?;

    let texts: Vec<String> = if input == "--demo" {
        example_sentences().iter().map(|s| s.to_string()).collect()
    } else {
        vec![input]
    };

    let cache = Arc::new(MappingCache::new(FileSource::new(&mapping_path)));
    let mapping = cache.load().await;
    println!("Mapping: {} ({} entries)", mapping_path.display(), mapping.len());

    let sequencer = SignSequencer::new(cache, PrefixResolver::default());
    for text in texts {
        println!("\nInput: {text}");
        for item in sequencer.build_sequence(&text).await {
            match item.missing_sign_message() {
                Some(message) => println!("  {:<16} {message}", item.label),
                None => println!("  {:<16} {}", item.label, item.video_url),
            }
        }
    }

    Ok(())
}
