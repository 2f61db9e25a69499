//! `mapchat`: a line-oriented map session with a place-aware chat assistant.
//!
//! The map is headless; every view the map would render is printed instead.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mapchat_assistant::{ChatSession, LandmarkAssistant, ViewportContext, WELCOME_MESSAGE};
use mapchat_common::{Config, Coordinates, MapStyle};
use mapchat_links::LinkActivator;
use mapchat_viewport::{
    CoordinateResolver, MapSurface, NameResolver, NominatimResolver, Transition,
    ViewportReconciler,
};

mod repl;
use repl::{render_reply, Command, HELP};

#[derive(Parser)]
#[command(name = "mapchat")]
#[command(about = "Explore a map and chat about what you see")]
#[command(version)]
struct Cli {
    /// Name places by their coordinates instead of querying the geocoder
    #[arg(long)]
    offline: bool,

    /// Start latitude (overrides MAPCHAT_CENTER_LAT)
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Start longitude (overrides MAPCHAT_CENTER_LNG)
    #[arg(long, allow_hyphen_values = true)]
    lng: Option<f64>,

    /// Start zoom (overrides MAPCHAT_ZOOM)
    #[arg(long)]
    zoom: Option<f64>,

    /// Start map style (overrides MAPCHAT_MAP_STYLE)
    #[arg(long)]
    style: Option<MapStyle>,
}

/// Stands in for a rendered map: reports every programmatic view change.
struct ConsoleSurface;

impl MapSurface for ConsoleSurface {
    fn set_view(&self, center: Coordinates, zoom: f64) {
        println!("[map] flying to {center} at zoom {zoom:.1}");
    }

    fn set_style(&self, style: MapStyle) {
        println!("[map] style is now {style}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mapchat=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    config.log_redacted();

    let mut view = config.initial_view();
    if let Some(lat) = cli.lat {
        view.center.lat = lat;
    }
    if let Some(lng) = cli.lng {
        view.center.lng = lng;
    }
    if let Some(zoom) = cli.zoom {
        view.zoom = zoom;
    }
    if let Some(style) = cli.style {
        view.map_style = style;
    }
    if !view.center.is_finite() || !view.center.in_range() {
        anyhow::bail!("start position out of range: {}", view.center);
    }

    let resolver: Arc<dyn NameResolver> = if cli.offline {
        info!("Offline mode, places are named by coordinates");
        Arc::new(CoordinateResolver)
    } else {
        Arc::new(NominatimResolver::new(&config.geocoder)?)
    };

    let map = ViewportReconciler::new(view, config.viewport.clone(), resolver)
        .with_surface(Arc::new(ConsoleSurface));
    let activator = LinkActivator::new(map.navigator(), config.link_activation_delay);
    let mut session = ChatSession::new(Arc::new(LandmarkAssistant::new()));

    // Print every view the map settles on.
    let mut updates = map.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let view = updates.borrow_and_update().clone();
            println!(
                "[view] {} | {} | zoom {:.1} | {}",
                view.location_label(),
                view.center,
                view.zoom,
                view.map_style
            );
        }
    });
    if let Some(lookup) = map.resolve_current() {
        tokio::spawn(async move {
            match lookup.await {
                Ok(transition) => info!(?transition, "Start-up view resolved"),
                Err(e) => warn!(error = %e, "Start-up lookup did not complete"),
            }
        });
    }

    info!(session_id = %session.id(), "Session started");
    println!("{WELCOME_MESSAGE}");
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e:#}");
                continue;
            }
        };

        match command {
            Command::Pan { center, zoom } => {
                let zoom = zoom.unwrap_or_else(|| map.snapshot().zoom);
                if map.viewport_changed(center, zoom).transition == Transition::Suppressed {
                    println!("(moved less than the map cares about)");
                }
            }
            Command::Go { center, zoom } => {
                map.navigate_to(center, zoom);
            }
            Command::Style(style) => {
                if map.set_map_style(style) == Transition::Unchanged {
                    println!("(already {style})");
                }
            }
            Command::Ask(text) => {
                let context = ViewportContext::from(&map.snapshot());
                match session.send(&text, context).await {
                    Ok(reply) => println!("{}", render_reply(&reply.parsed)),
                    Err(e) => println!("{e}"),
                }
            }
            Command::Open(n) => {
                let link = session
                    .last_reply()
                    .and_then(|parsed| parsed.links.into_iter().nth(n - 1));
                match link {
                    Some(link) => {
                        if activator.activate(&link).is_none() {
                            println!("(still on the way to the previous place)");
                        }
                    }
                    None => println!("no link [{n}] in the last reply"),
                }
            }
            Command::State => match serde_json::to_string_pretty(&map.snapshot()) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!(error = %e, "Failed to serialize map state"),
            },
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    info!("Session ended");
    Ok(())
}
