//! Prints an access token for a user so the `/ws` endpoint can be tried locally:
//!
//! ```text
//! JWT_SECRET=dev cargo run --bin mint_token -- --user-id 3f1c…
//! ```

use clap::Parser;
use domain::jwt::AccessTokens;
use domain::UserId;
use dotenvy::dotenv;
use service::config::Config;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The user the token is issued for.
    #[arg(long)]
    user_id: UserId,

    /// Server settings; the token is signed with the same secret and lifetime.
    #[command(flatten)]
    config: Config,
}

fn main() {
    dotenv().ok();
    let args = Args::parse();

    let Some(secret) = args.config.jwt_secret() else {
        eprintln!("JWT_SECRET is not set");
        std::process::exit(1);
    };

    let tokens = AccessTokens::new(secret);
    match tokens.issue(
        args.user_id,
        Duration::from_secs(args.config.jwt_access_expiry_secs),
    ) {
        Ok(token) => println!("{token}"),
        Err(e) => {
            eprintln!("Failed to issue token: {e}");
            std::process::exit(1);
        }
    }
}
