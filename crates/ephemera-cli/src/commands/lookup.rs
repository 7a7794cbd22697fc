//! Secret retrieval against a running server.

use crate::client::ApiClient;
use clap::Args;
use url::Url;

#[derive(Args)]
pub struct LookupArgs {
    /// Secret id
    #[arg(short, long)]
    pub id: String,

    /// Password (prompts for hidden input if omitted)
    #[arg(short, long)]
    pub password: Option<String>,
}

pub async fn run(args: LookupArgs, server: &Url, json: bool) -> anyhow::Result<()> {
    let password = match args.password {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ")
            .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))?,
    };

    let client = ApiClient::new(server.clone());
    let secret = client.lookup(&args.id, &password).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&secret)?);
        return Ok(());
    }

    println!("Text: {}", secret.text);
    println!("Views: {}", secret.views);
    if secret.views == 0 {
        println!("This is the last time you can view this message");
    }

    Ok(())
}
