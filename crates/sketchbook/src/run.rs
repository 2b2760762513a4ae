use std::path::Path;

use anyhow::{Context, Result};
use renderer::GpuPowerPreference;
use sketch::RouteResolver;
use sketchconfig::SketchbookConfig;
use tracing_subscriber::EnvFilter;

use crate::catalog::Catalog;
use crate::cli::RunArgs;
use crate::paths::ConfigOrigin;
use crate::window::{self, WindowOptions};

/// Configuration, catalog and route resolver shared by every command.
#[derive(Debug)]
pub struct Session {
    pub config: SketchbookConfig,
    pub catalog: Catalog,
    pub resolver: RouteResolver,
}

impl Session {
    pub fn load(explicit_config: Option<&Path>) -> Result<Self> {
        let origin = ConfigOrigin::discover(explicit_config);
        let config = origin.load()?;
        tracing::debug!(
            config = ?origin.path().map(|path| path.display().to_string()),
            sketches = config.sketches.len(),
            "resolved sketchbook configuration"
        );
        let catalog = Catalog::from_config(&config).context("invalid sketch catalog")?;
        if !catalog.contains(&config.default_sketch) {
            tracing::warn!(
                sketch = %config.default_sketch,
                "default sketch is not registered; `/` will not resolve"
            );
        }
        let resolver = RouteResolver::new(&config.route_prefix, &config.default_sketch);
        Ok(Self {
            config,
            catalog,
            resolver,
        })
    }
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn list(session: &Session, json: bool) -> Result<()> {
    let listing = session.catalog.listing(&session.resolver);
    if json {
        let rendered =
            serde_json::to_string_pretty(&listing).context("failed to serialise sketch list")?;
        println!("{rendered}");
        return Ok(());
    }

    for sketch in listing {
        let marker = if sketch.id == session.resolver.default_id() {
            '*'
        } else {
            ' '
        };
        println!(
            "{marker} {:<20} {:<12} {:<28} {}",
            sketch.id, sketch.label, sketch.route, sketch.source
        );
    }
    Ok(())
}

pub fn route(session: &Session, path: &str) -> Result<()> {
    let id = session
        .resolver
        .resolve(path, |candidate| session.catalog.contains(candidate));
    match session.catalog.get(&id) {
        Some(entry) => println!("{id}\t{}", entry.label),
        None => println!("{id}\t(not registered)"),
    }
    Ok(())
}

pub fn run(session: Session, args: RunArgs) -> Result<()> {
    let Session {
        config,
        catalog,
        resolver,
    } = session;

    let options = window_options(&config, args);
    tracing::info!(
        route = %options.initial_route,
        width = options.size.0,
        height = options.size.1,
        fps = ?options.target_fps,
        sketches = catalog.len(),
        "starting sketchbook"
    );
    window::run(catalog, resolver, options)
}

/// Command line flags win over the config file; `--fps 0` means uncapped.
fn window_options(config: &SketchbookConfig, args: RunArgs) -> WindowOptions {
    let target_fps = match args.fps {
        Some(fps) => Some(fps).filter(|fps| *fps > 0.0),
        None => config.target_fps(),
    };
    WindowOptions {
        size: args
            .size
            .unwrap_or((config.viewport.width, config.viewport.height)),
        max_pixel_ratio: args
            .max_pixel_ratio
            .unwrap_or(config.viewport.max_pixel_ratio),
        target_fps,
        frame_step: args.frame_step,
        clear_color: config.render.clear_color,
        power: if args.high_performance {
            GpuPowerPreference::High
        } else {
            GpuPowerPreference::Low
        },
        initial_route: args.route.unwrap_or_else(|| "/".to_string()),
    }
}
