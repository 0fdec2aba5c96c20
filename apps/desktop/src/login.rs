//! First-run Spotify login on the console.

use anyhow::Context;
use nosilence_player::{code_from_redirect, SpotifyAuth};

/// Print the authorize URL, read the redirect URL the browser landed on and
/// exchange its code for tokens.
pub async fn interactive(auth: &SpotifyAuth) -> anyhow::Result<()> {
    let url = auth.authorize_url()?;

    println!("Open this URL in your browser and approve access:");
    println!();
    println!("    {}", url);
    println!();
    println!("Then paste the full URL you were redirected to and press Enter:");

    let redirect = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|_| line)
    })
    .await
    .context("login prompt aborted")?
    .context("cannot read redirect URL from stdin")?;

    let code = code_from_redirect(&redirect)?;
    auth.exchange_code(&code).await?;
    tracing::info!(cache = %auth.cache_path().display(), "Spotify login complete");
    Ok(())
}
