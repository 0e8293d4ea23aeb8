//! Queries the tracking API for a single parcel and prints the raw exchange.

use anyhow::{bail, Context, Result};
use parcel_tracker::adapters::http::{parse_parcel_history, ApiSettings, CzechPostClient, DEFAULT_ENDPOINT};
use parcel_tracker::domain::services::{action_for_status, normalize_status_text};
use std::io::{self, BufRead, Write};

fn read_tracking_number() -> Result<String> {
    if let Some(arg) = std::env::args().nth(1) {
        return Ok(arg);
    }

    print!("Enter tracking number to test: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

#[tokio::main]
async fn main() -> Result<()> {
    let tracking_number = read_tracking_number()?.trim().to_string();
    if tracking_number.is_empty() {
        bail!("no tracking number given");
    }

    let settings = ApiSettings {
        endpoint: std::env::var("PARCEL_API_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
        ..ApiSettings::default()
    };
    let client = CzechPostClient::new(settings).context("failed to build HTTP client")?;

    println!("Making request to: {}", client.settings().endpoint);
    println!(
        "With parameters: idParcel={}, language={}",
        tracking_number,
        client.settings().language
    );
    println!("{}", "-".repeat(80));

    let response = client
        .request(&tracking_number)
        .send()
        .await
        .context("request failed")?;

    println!("Status code: {}", response.status());
    println!("Response headers:");
    for (name, value) in response.headers() {
        println!("  {}: {}", name, value.to_str().unwrap_or("<binary>"));
    }
    println!("{}", "-".repeat(80));

    let body = response.text().await.context("failed to read response body")?;
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => {
            println!("JSON Response:");
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Err(_) => {
            println!("Raw response (not valid JSON):");
            println!("{}", body);
        }
    }
    println!("{}", "-".repeat(80));

    match parse_parcel_history(&tracking_number, &body) {
        Ok(status) => {
            let text = normalize_status_text(&status.text);
            println!("Newest state: {}", text);
            println!("Date: {}", status.event_date.as_deref().unwrap_or("-"));
            if let Some(action) = action_for_status(&text) {
                println!("Action required: {}", action);
            }
        }
        Err(e) => println!("Could not determine status: {}", e),
    }

    Ok(())
}
