//! Secret creation against a running server.

use crate::client::ApiClient;
use clap::Args;
use url::Url;

#[derive(Args)]
pub struct CreateArgs {
    /// Text to protect
    #[arg(short = 's', long)]
    pub text: String,

    /// Number of times the secret can be viewed
    #[arg(short = 'n', long, default_value_t = 1)]
    pub views: i64,
}

pub async fn run(args: CreateArgs, server: &Url, json: bool) -> anyhow::Result<()> {
    let client = ApiClient::new(server.clone());
    let created = client.create(&args.text, args.views).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!("ID: {}", created.id);
        println!("Password: {}", created.password.expose_secret());
    }

    Ok(())
}
