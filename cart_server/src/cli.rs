use std::{env, env::VarError};

/// There's no real CLI for the server, so any argument at all prints the help text and the current environment.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Explicit list, so that secrets are never printed
    const DISPLAY_ENVS: [&str; 12] = [
        "RUST_LOG",
        "CART_HOST",
        "CART_PORT",
        "CART_PUBLIC_URL",
        "CART_DATABASE_URL",
        "CART_DB_MAX_CONNECTIONS",
        "CART_BROADCAST_BUFFER",
        "CART_SECURE_COOKIES",
        "CART_SESSION_IDLE_TIMEOUT",
        "CART_STRIPE_API_URL",
        "CART_STRIPE_CURRENCY",
        "CART_STRIPE_TIMEOUT",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    });
    let key_state = match env::var("STRIPE_SECRET_KEY") {
        Ok(s) if !s.trim().is_empty() => "Set",
        _ => "Not set",
    };
    println!("  {:<35} {key_state:<15}", "STRIPE_SECRET_KEY");
}
