//! Direct use of `query()` without the `Agent` abstraction.
//!
//! Prints each assistant turn and the closing result summary.

use claude_oauth_check::{query, AgentOptions, Message, MODEL};
use futures::StreamExt;
use tokio::pin;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    claude_oauth_check::logging::init();

    let options = AgentOptions::builder()
        .model(MODEL)
        .system_prompt("You are a helpful assistant. Be concise.")
        .max_turns(1)
        .build();

    println!("Sending query to Claude Code...");
    let stream = query("What is 2 + 2? Just respond with the number.", Some(options)).await?;
    pin!(stream);

    while let Some(message) = stream.next().await {
        match message? {
            Message::Assistant(assistant) => println!("Assistant: {}", assistant.text()),
            Message::Result(result) => {
                println!("\n--- Query Complete ---");
                println!("Duration: {}ms", result.duration_ms);
                if let Some(cost) = result.total_cost_usd {
                    println!("Cost: ${:.4}", cost);
                }
            }
            Message::System(system) => println!("System: {}", system.subtype),
            Message::User(_) => {}
        }
    }

    Ok(())
}
