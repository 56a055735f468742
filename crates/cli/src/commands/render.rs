//! `render` command implementation.

use anyhow::{Context, Result};
use contracts::{Event, OutputConfig};
use dispatcher::{split_topics, MessageFormatter, TopicResolver};
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::RenderArgs;

/// What the output would publish for one event
#[derive(Debug, Serialize)]
struct RenderPreview {
    topics: Vec<String>,
    message: String,
}

/// Execute the `render` command
pub fn run_render(args: &RenderArgs) -> Result<()> {
    let config = load_config(&args.config, &args.overrides)?;
    let event = Event::from_json_line(&args.event).context("Invalid --event")?;

    info!(channel = %event.channel, event_type = %event.event_type, "Rendering event");

    let preview = render_preview(&config, &event)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
    } else {
        println!("Topics ({}):", preview.topics.len());
        for topic in &preview.topics {
            println!("  - {}", topic);
        }
        println!("\nMessage:\n{}", preview.message);
    }

    Ok(())
}

fn render_preview(config: &OutputConfig, event: &Event) -> Result<RenderPreview> {
    let object = event.json_object()?;

    let topics = if config.pubsub.topic_selector.trim().is_empty() {
        Vec::new()
    } else {
        let selector = TopicResolver::from_template(&config.pubsub.topic_selector, &config.template)?;
        let rendered = selector.render(&object)?;
        split_topics(&rendered).map(str::to_string).collect()
    };

    let formatter = MessageFormatter::from_template(&config.pubsub.message, &config.template)?;
    let message = String::from_utf8_lossy(&formatter.render(&object)?)
        .trim()
        .to_string();

    Ok(RenderPreview { topics, message })
}
