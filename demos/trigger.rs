use carpenter_client::{BuildOptions, CancelOptions, CarpenterClient};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let carpenter = CarpenterClient::from_env()?;

    let response = carpenter
        .build(BuildOptions::new().data(json!({ "name": "foo-bar", "version": "1.0.0" })))
        .await?;
    println!("build: {} {}", response.status(), response.text().await?);

    let response = carpenter
        .cancel(CancelOptions::new("foo-bar", "1.0.0").env("prod"))
        .await?;
    println!("cancel: {}", response.status());

    Ok(())
}
