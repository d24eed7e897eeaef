use anyhow::Context;
use anyhow::Result;
use dialoguer::console::Style;
use dialoguer::{Confirm, Select};
use log::debug;
use std::path::Path;

use crate::api::*;
use crate::args::*;
use crate::config::*;
use crate::migrate::{check_blog_count, migrate};
use crate::registration::tumblr_register;
use crate::tumblr::TumblrClient;

pub mod api;
pub mod args;
mod config;
pub mod error;
pub mod migrate;
mod registration;
mod tumblr;

pub async fn run(args: Args) -> Result<()> {
    debug!("running with args {:?}", args);

    // Validate settings before any network call.
    let config = AppConfig::from_args(&args)?;
    let token_file = Path::new(TOKEN_FILE);

    match &args.command {
        Command::Token => {
            tumblr_register(&config, token_file)
                .await
                .context("Failed to get a Tumblr OAuth token")?;
        }
        Command::Reblog(reblog_args) => {
            let credential = resolve_access_credential(reblog_args, token_file).await?;
            let client = TumblrClient::new(config.consumer.clone(), credential);
            reblog(&client).await?;
        }
    }
    Ok(())
}

async fn reblog(client: &TumblrClient) -> Result<()> {
    let green = Style::new().green();

    let user = client
        .user_info()
        .await
        .context("Failed to fetch Tumblr user info")?;
    println!("Hello, {}!", green.apply_to(&user.name));
    println!(
        "Looks like you have {} blog(s)",
        green.apply_to(user.blogs.len())
    );
    println!();
    check_blog_count(&user)?;

    let Some((source, destination)) = select_blogs(&user)? else {
        return Ok(());
    };

    let summary = migrate(client, &source, &destination).await?;
    println!("Reblogged {} post(s)!", green.apply_to(summary.migrated));
    debug!("Migration ended with {:?}", summary.outcome);
    Ok(())
}

// Ask for source and destination blog and a final confirmation. Returns None
// if the user backs out.
fn select_blogs(user: &UserInfo) -> Result<Option<(BlogIdentifier, BlogIdentifier)>> {
    let red = Style::new().red();
    let green = Style::new().green();
    let cyan = Style::new().cyan();

    let source_choices = user.blog_identifiers()?;
    let source_index = Select::new()
        .with_prompt(format!("Which blog to reblog {}?", red.apply_to("FROM")))
        .items(&source_choices)
        .default(0)
        .interact()?;
    let source = source_choices[source_index].clone();

    let destination_choices: Vec<BlogIdentifier> = source_choices
        .into_iter()
        .filter(|blog| *blog != source)
        .collect();
    let destination_index = Select::new()
        .with_prompt(format!("Which blog to post {}?", red.apply_to("TO")))
        .items(&destination_choices)
        .default(0)
        .interact()?;
    let destination = destination_choices[destination_index].clone();

    println!(
        "Preparing to reblog everything from {} to {}",
        cyan.apply_to(&source),
        green.apply_to(&destination)
    );
    println!(
        "!! {} {} {} {} !!",
        red.apply_to("THIS WILL DELETE POSTS FROM"),
        cyan.apply_to(&source),
        red.apply_to("AFTER REBLOGGING TO"),
        cyan.apply_to(&destination)
    );

    let confirmed = Confirm::new()
        .with_prompt("Are you sure you want to continue?")
        .default(false)
        .interact()?;
    if !confirmed {
        return Ok(None);
    }
    println!("Reblogging..");
    Ok(Some((source, destination)))
}
