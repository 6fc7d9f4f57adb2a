use colored::Colorize;
use envsweep_cloud::CloudProvider;
use envsweep_config::Settings;

pub async fn handle(cloud: Option<String>, settings: &Settings) -> anyhow::Result<()> {
    let provider = super::build_provider(settings, cloud);
    println!(
        "{}",
        format!("Checking {} authentication...", provider.display_name()).blue()
    );

    let status = provider.check_auth().await?;
    if status.authenticated {
        println!(
            "  ✓ Authenticated: {}",
            status.account_info.unwrap_or_default().cyan()
        );
        Ok(())
    } else {
        println!("  {} Not authenticated", "✗".red());
        anyhow::bail!(
            "authentication failed: {}",
            status.error.unwrap_or_else(|| "unknown error".to_string())
        )
    }
}
