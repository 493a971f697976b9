//! Interactive walkthrough of the consent flow.
//!
//! Run with `cargo run --example consent_cli`; type `help` for the commands.
//! Uses the in-memory store and the no-op injector, so "reload" here just
//! means restarting the demo.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use consent_engine::config::ConsentConfig;
use consent_engine::scripts::{BundleId, NullInjector};
use consent_engine::{ConsentLevel, ConsentManager, InMemoryConsentStore};

fn print_state(manager: &ConsentManager) {
    let snapshot = manager.snapshot();
    let scripts = manager.scripts();

    println!(
        "banner: {} | preferences: {} | level: {} | tag-manager: {} | marketing-pixel: {}",
        snapshot.banner_visible,
        snapshot.preferences_visible,
        snapshot
            .level
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".to_string()),
        scripts.is_loaded(BundleId::TagManager),
        scripts.is_loaded(BundleId::MarketingPixel),
    );
}

fn print_help() {
    println!("commands:");
    println!("  accept            accept all cookies from the banner");
    println!("  necessary         keep only necessary cookies");
    println!("  prefs             open the preferences panel");
    println!("  cancel            close the preferences panel without saving");
    println!("  save a m          save preferences; a/m are 'y' or 'n'");
    println!("  reset             clear stored consent (host would reload)");
    println!("  quit");
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let manager = ConsentManager::builder()
        .config(ConsentConfig::default())
        .store(Arc::new(InMemoryConsentStore::default()))
        .injector(Arc::new(NullInjector::new()))
        .build();

    let mut events = manager.subscribe();

    manager.initialize().await;
    print_help();
    print_state(&manager);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().unwrap();

        let Some(Ok(line)) = stdin.lock().lines().next() else {
            break;
        };

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            ["accept"] => manager.accept_consent(ConsentLevel::All).await,
            ["necessary"] => manager.accept_consent(ConsentLevel::Necessary).await,
            ["prefs"] => manager.open_preferences(),
            ["cancel"] => manager.close_preferences(),
            ["save", a, m] => manager.save_preferences(*a == "y", *m == "y").await,
            ["reset"] => manager.reset(),
            ["help"] => print_help(),
            ["quit"] | ["exit"] => break,
            [] => {}
            other => println!("unknown command: {:?}", other),
        }

        while let Ok(ev) = events.try_recv() {
            println!("event: {:?}", ev);
        }
        print_state(&manager);
    }
}
