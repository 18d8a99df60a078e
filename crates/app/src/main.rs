//! Agenda API Client - Main Entry Point
//!
//! Parses the command line, loads configuration and runs one command
//! against the API with the stored session.

use agenda_domain::{RegisterRequest, SlotQuery};
use agenda_infrastructure::load_config;
use clap::Parser;
use serde_json::Value;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod context;
mod render;

use cli::{Cli, Command};
use context::AppContext;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        config.client.api_url = api_url;
        config.client.validate()?;
    }

    let ctx = AppContext::build(&config.client).await?;
    tokio::spawn(render::render_events(ctx.client.events().subscribe()));
    let redirect = ctx.client.events().subscribe();

    let outcome = run(&ctx, cli.command).await;

    if ctx.client.forced_logout().is_pending() {
        render::wait_for_redirect(redirect).await;
    }
    // Let the renderer drain what is left before exiting.
    tokio::task::yield_now().await;

    match outcome {
        Ok(Some(value)) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => Err(e),
    }
}

async fn run(ctx: &AppContext, command: Command) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let value = match command {
        Command::Login { email, password } => {
            let session = ctx.auth.login(&email, &password).await?;
            eprintln!("Signed in as {}", session.user.display_name());
            return Ok(None);
        }
        Command::Register {
            name,
            email,
            password,
            business,
            phone,
        } => {
            let session = ctx
                .auth
                .register(RegisterRequest {
                    name,
                    email,
                    password,
                    business_name: business,
                    phone,
                })
                .await?;
            eprintln!("Registered {}", session.user.display_name());
            return Ok(None);
        }
        Command::Logout => {
            ctx.auth.logout().await?;
            eprintln!("Signed out");
            return Ok(None);
        }
        Command::Me => serde_json::to_value(ctx.auth.me().await?)?,
        Command::List { resource, filters } => {
            let filters: Vec<(&str, &str)> = filters
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            ctx.resources.list(resource, &filters).await?
        }
        Command::Show { resource, id } => ctx.resources.get(resource, &id).await?,
        Command::Create { resource, payload } => {
            let payload: Value = serde_json::from_str(&payload)?;
            ctx.resources.create(resource, payload).await?
        }
        Command::Delete { resource, id } => ctx.resources.delete(resource, &id).await?,
        Command::Slots {
            date,
            professional,
            service,
        } => {
            let mut query = SlotQuery::new(date);
            query.professional_id = professional;
            query.service_id = service;
            ctx.slots.execute(&query).await?
        }
    };
    Ok(Some(value))
}
