use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tessera_project::{load_screen, load_settings, SETTINGS_FILE};
use tessera_runtime::memory::SceneGraph;
use tessera_runtime::{DataMessage, MemoryHandles, RuntimeSideEffect, ScreenContext, WorkMode};
use tessera_widgets::{Registry, Screen};
use tracing::info;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "tessera", version, about = "Load widget screens against an in-memory scene")]
struct Cli {
    /// Runtime settings file
    #[arg(long, global = true, default_value = SETTINGS_FILE)]
    settings: PathBuf,
    /// Work mode to run in instead of the one stored in the screen file
    #[arg(long, global = true)]
    mode: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the render tree and the live widgets of a screen
    Inspect { screen: PathBuf },
    /// Print a widget's property dictionary (or its property tree) as JSON
    Dictionary {
        screen: PathBuf,
        code: String,
        #[arg(long)]
        tree: bool,
    },
    /// Acknowledge a widget's subscription, deliver one payload and report the outcome
    Feed {
        screen: PathBuf,
        id: String,
        payload: String,
        /// Apply the resulting action messages to the screen
        #[arg(long)]
        route: bool,
    },
}

fn open_screen(cli: &Cli, path: &Path) -> CliResult<(Screen, MemoryHandles)> {
    let settings = load_settings(&cli.settings)?;
    let mut definition = load_screen(path)?;
    if let Some(name) = &cli.mode {
        definition.work_mode = WorkMode::from_name(name).ok_or_else(|| format!("unknown work mode '{name}'"))?;
    }
    let (ctx, handles) = ScreenContext::in_memory(settings);
    let mut screen = Screen::new(ctx, Registry::with_builtins());
    let loaded = screen.load(&definition);
    info!(screen = %definition.name, loaded, "screen ready");
    Ok((screen, handles))
}

fn report(screen: &mut Screen) {
    for diagnostic in screen.take_diagnostics() {
        println!("! [{}] {}: {}", diagnostic.kind.as_str(), diagnostic.widget_id, diagnostic.message);
    }
    for effect in screen.take_side_effects() {
        match effect {
            RuntimeSideEffect::RunScript { widget_id, name, .. } => println!("> script '{name}' from {widget_id}"),
            RuntimeSideEffect::PanelsChanged { widget_id } => println!("> panels changed on {widget_id}"),
        }
    }
}

fn inspect(cli: &Cli, path: &Path) -> CliResult<()> {
    let (mut screen, handles) = open_screen(cli, path)?;
    println!("mode: {}", screen.work_mode().as_str());
    for widget in screen.widgets() {
        println!(
            "{} [{}] class={} children={}",
            widget.code(),
            widget.id(),
            widget.class_name(),
            widget.children().len()
        );
    }
    println!();
    print!("{}", handles.scene.outline(SceneGraph::ROOT));
    report(&mut screen);
    Ok(())
}

fn dictionary(cli: &Cli, path: &Path, code: &str, tree: bool) -> CliResult<()> {
    let (screen, _handles) = open_screen(cli, path)?;
    let widget = screen
        .find_by_code(code)
        .ok_or_else(|| format!("no widget with code '{code}'"))?;
    let json = if tree {
        serde_json::to_string_pretty(widget.property())?
    } else {
        serde_json::to_string_pretty(widget.store().dictionary())?
    };
    println!("{json}");
    Ok(())
}

fn feed(cli: &Cli, path: &Path, id: &str, payload: &str, route: bool) -> CliResult<()> {
    let (mut screen, handles) = open_screen(cli, path)?;
    if !screen.deliver_data(id, &DataMessage::ack()) {
        return Err(format!("no widget with id '{id}'").into());
    }
    screen.deliver_data(id, &DataMessage::new(payload));
    let messages = handles.actions.take();
    for message in &messages {
        println!("{}", serde_json::to_string(message)?);
    }
    if route {
        for message in &messages {
            let applied = screen.route_actions(message);
            info!(source = %message.target_id, applied, "actions routed");
        }
    }
    report(&mut screen);
    Ok(())
}

fn run(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Inspect { screen } => inspect(cli, screen),
        Commands::Dictionary { screen, code, tree } => dictionary(cli, screen, code, *tree),
        Commands::Feed {
            screen,
            id,
            payload,
            route,
        } => feed(cli, screen, id, payload, *route),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tessera: {err}");
            ExitCode::FAILURE
        }
    }
}
