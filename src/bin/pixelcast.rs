use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use pixelcast::{
    CommandOutcome, CommandRequest, DeviceTarget, DeviceTransport, Frame, FrameSource,
    HttpTransport, JsonFileStore, PlaybackScheduler, Session, SystemClock,
};

#[derive(Parser, Debug)]
#[command(name = "pixelcast", version)]
struct Cli {
    /// Directory holding the persisted catalogs.
    #[arg(long, default_value = ".pixelcast")]
    data_dir: PathBuf,

    /// Print request URLs instead of dispatching them.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one static frame to a device.
    Send(SendArgs),
    /// Send a timeline to a device as an on-device animation.
    Animate(AnimateArgs),
    /// Send a text message to a device.
    Message(MessageArgs),
    /// Play a timeline locally, pushing each frame to the device in turn.
    Play(PlayArgs),
    /// Import frames or timelines from a JSON file.
    Import(ImportArgs),
    /// Export frames or timelines as JSON on stdout.
    Export(ExportArgs),
    /// List a catalog.
    List(ListArgs),
    /// Manage the device catalog.
    #[command(subcommand)]
    Device(DeviceCommand),
}

#[derive(Parser, Debug)]
struct SendArgs {
    /// Device catalog index.
    #[arg(long)]
    device: usize,

    /// Frame as 16 hex characters.
    #[arg(long, conflicts_with = "frame")]
    hex: Option<String>,

    /// Saved-frame catalog index.
    #[arg(long)]
    frame: Option<usize>,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    /// Device catalog index.
    #[arg(long)]
    device: usize,

    /// Timeline catalog index.
    #[arg(long)]
    timeline: usize,
}

#[derive(Parser, Debug)]
struct MessageArgs {
    /// Message text.
    text: String,

    /// Device catalog index (defaults to the last-used device).
    #[arg(long)]
    device: Option<usize>,

    /// Repeat the message on-device.
    #[arg(long, default_value_t = false)]
    repeat: bool,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Timeline catalog index.
    #[arg(long)]
    timeline: usize,

    /// Device catalog index (defaults to the last-used device).
    #[arg(long)]
    device: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Catalog {
    Frames,
    Timelines,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ListCatalog {
    Frames,
    Timelines,
    Devices,
}

#[derive(Parser, Debug)]
struct ImportArgs {
    catalog: Catalog,

    /// JSON file to import.
    path: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    catalog: Catalog,
}

#[derive(Parser, Debug)]
struct ListArgs {
    catalog: ListCatalog,
}

#[derive(Subcommand, Debug)]
enum DeviceCommand {
    /// Add a device to the catalog.
    Add(DeviceAddArgs),
    /// Remove a device from the catalog.
    Remove(DeviceRemoveArgs),
}

#[derive(Parser, Debug)]
struct DeviceAddArgs {
    /// Device IP address.
    ip: String,

    #[arg(long, default_value = "pixel")]
    name: String,

    /// Display intensity, 0-15.
    #[arg(long, default_value_t = 8)]
    intensity: u8,
}

#[derive(Parser, Debug)]
struct DeviceRemoveArgs {
    /// Device catalog index.
    index: usize,
}

/// Dry-run stand-in for the HTTP transport.
struct PrintTransport;

impl DeviceTransport for PrintTransport {
    fn dispatch(&mut self, request: &CommandRequest) -> CommandOutcome {
        println!("GET {}", request.full_url());
        CommandOutcome::Delivered
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = JsonFileStore::new(&cli.data_dir);
    let mut session = Session::load(store).context("failed to load catalogs")?;
    let mut transport: Box<dyn DeviceTransport> = if cli.dry_run {
        Box::new(PrintTransport)
    } else {
        Box::new(HttpTransport::new()?)
    };

    match cli.cmd {
        Command::Send(args) => cmd_send(&mut session, transport.as_mut(), args),
        Command::Animate(args) => cmd_animate(&mut session, transport.as_mut(), args),
        Command::Message(args) => cmd_message(&mut session, transport.as_mut(), args),
        Command::Play(args) => cmd_play(&mut session, transport.as_mut(), args),
        Command::Import(args) => cmd_import(&mut session, args),
        Command::Export(args) => cmd_export(&session, args),
        Command::List(args) => cmd_list(&session, args),
        Command::Device(cmd) => cmd_device(&mut session, transport.as_mut(), cmd),
    }
}

fn report(outcome: CommandOutcome) {
    match outcome {
        CommandOutcome::Delivered => eprintln!("delivered"),
        CommandOutcome::Failed(reason) => eprintln!("dropped: {reason}"),
    }
}

fn cmd_send(
    session: &mut Session<JsonFileStore>,
    transport: &mut dyn DeviceTransport,
    args: SendArgs,
) -> anyhow::Result<()> {
    // Editing happens without instant-update echoes; `send` is explicit.
    session.set_instant_update(false);
    if let Some(hex) = &args.hex {
        session.set_editor(Frame::from_hex(hex)?, transport);
    } else if let Some(index) = args.frame {
        session.select(FrameSource::Saved, index, transport)?;
    } else {
        anyhow::bail!("pass either --hex or --frame");
    }

    report(session.send_frame(args.device, transport)?);
    Ok(())
}

fn cmd_animate(
    session: &mut Session<JsonFileStore>,
    transport: &mut dyn DeviceTransport,
    args: AnimateArgs,
) -> anyhow::Result<()> {
    report(session.send_animation(args.device, args.timeline, transport)?);
    Ok(())
}

fn cmd_message(
    session: &mut Session<JsonFileStore>,
    transport: &mut dyn DeviceTransport,
    args: MessageArgs,
) -> anyhow::Result<()> {
    if let Some(device) = args.device {
        session.set_last_device(device)?;
    }
    report(session.send_message(&args.text, args.repeat, transport)?);
    Ok(())
}

fn cmd_play(
    session: &mut Session<JsonFileStore>,
    transport: &mut dyn DeviceTransport,
    args: PlayArgs,
) -> anyhow::Result<()> {
    if let Some(device) = args.device {
        session.set_last_device(device)?;
    }
    if session.last_device().is_none() {
        eprintln!("no device in the catalog; playing without sending");
    }

    let mut scheduler = PlaybackScheduler::new();
    let mut clock = SystemClock;
    scheduler.play(session, args.timeline, transport)?;
    scheduler.run(session, transport, &mut clock)?;
    Ok(())
}

fn cmd_import(session: &mut Session<JsonFileStore>, args: ImportArgs) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.path)
        .with_context(|| format!("read '{}'", args.path.display()))?;
    let added = match args.catalog {
        Catalog::Frames => session.import_frames_json(&json)?,
        Catalog::Timelines => session.import_timelines_json(&json)?,
    };
    eprintln!("imported {added} entries");
    Ok(())
}

fn cmd_export(session: &Session<JsonFileStore>, args: ExportArgs) -> anyhow::Result<()> {
    let json = match args.catalog {
        Catalog::Frames => session.export_frames_json()?,
        Catalog::Timelines => session.export_timelines_json()?,
    };
    println!("{json}");
    Ok(())
}

fn cmd_list(session: &Session<JsonFileStore>, args: ListArgs) -> anyhow::Result<()> {
    match args.catalog {
        ListCatalog::Frames => {
            for (i, frame) in session.frames().frames().iter().enumerate() {
                println!("{i}: {}", frame.to_hex());
            }
        }
        ListCatalog::Timelines => {
            for (i, timeline) in session.timelines().timelines().iter().enumerate() {
                let active = if session.timelines().active_index() == Some(i) {
                    " (active)"
                } else {
                    ""
                };
                println!(
                    "{i}: {} ({} frames, {}ms, repeat={}){active}",
                    timeline.name,
                    timeline.frames.len(),
                    timeline.speed_ms,
                    timeline.repeat
                );
            }
        }
        ListCatalog::Devices => {
            for (i, device) in session.devices().iter().enumerate() {
                let last = if session.last_device() == Some(i) {
                    " (last used)"
                } else {
                    ""
                };
                println!(
                    "{i}: {} @ {} intensity {}{last}",
                    device.name, device.ip, device.intensity
                );
            }
        }
    }
    Ok(())
}

fn cmd_device(
    session: &mut Session<JsonFileStore>,
    transport: &mut dyn DeviceTransport,
    cmd: DeviceCommand,
) -> anyhow::Result<()> {
    match cmd {
        DeviceCommand::Add(args) => {
            let target = DeviceTarget::new(args.ip, args.name, args.intensity)?;
            session.add_device(target, transport)?;
            eprintln!("added device {}", session.devices().len() - 1);
        }
        DeviceCommand::Remove(args) => {
            session.remove_device(args.index, transport)?;
            eprintln!("removed device {}", args.index);
        }
    }
    Ok(())
}
