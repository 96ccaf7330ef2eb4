use std::{
    error::Error,
    fs::{self, File, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use inkreplay::{
    app::{App, Control},
    app_dirs::AppDirs,
    surface::{MAX_LINE_WIDTH, MAX_PIXEL_DENSITY},
    config::{in_range, Config, ConfigStore, FileConfigStore},
    runtime::{CrosstermEventSource, FixedTicker, PadEvent, Runner},
    verification::VerificationMode,
};
use log::{info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};

/// terminal signature pad with live stroke features and timed replay
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Draw a signature with the mouse, watch its kinematic features update live, replay it at variable speed and run it through a stub verifier."
)]
pub struct Cli {
    /// replay speed multiplier
    #[clap(short = 's', long)]
    speed: Option<f64>,

    /// verification threshold in percent (0-100)
    #[clap(short = 't', long, value_parser = clap::value_parser!(u8).range(0..=100))]
    threshold: Option<u8>,

    /// verification mode
    #[clap(short = 'm', long, value_enum)]
    mode: Option<VerificationMode>,

    /// backing pixels per logical unit
    #[clap(long)]
    pixel_density: Option<f64>,

    /// pen width in logical units
    #[clap(long)]
    line_width: Option<f64>,

    /// show a made-up pressure figure, clearly tagged as synthetic
    #[clap(long)]
    synthetic_pressure: bool,

    /// write the effective settings back to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Flags win over the stored config for this session.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(speed) = self.speed.filter(|s| s.is_finite() && *s > 0.0) {
            config.speed = speed;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(density) = self
            .pixel_density
            .filter(|d| in_range(*d, MAX_PIXEL_DENSITY))
        {
            config.pixel_density = density;
        }
        if let Some(width) = self.line_width.filter(|w| in_range(*w, MAX_LINE_WIDTH)) {
            config.line_width = width;
        }
        if self.synthetic_pressure {
            config.synthetic_pressure = true;
        }
        config
    }
}

fn open_log(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn init_logging() -> io::Result<PathBuf> {
    let path = AppDirs::log_path()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no state directory"))?;
    let file = open_log(&path)
        .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())))?;

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(path)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    // stderr is still a plain terminal here
    match init_logging() {
        Ok(path) => info!("logging to {}", path.display()),
        Err(e) => eprintln!("inkreplay: logging disabled: {e}"),
    }

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save_config {
        if let Err(e) = store.save(&config) {
            warn!("could not save config to {}: {e}", store.path().display());
        }
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let ticker = FixedTicker::new(Duration::from_millis(app.config.frame_interval_ms));
    let runner = Runner::new(CrosstermEventSource::new(), ticker);

    let size = terminal.size()?;
    app.resize(Rect::new(0, 0, size.width, size.height));
    info!("pad ready at {}x{} cells", size.width, size.height);

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            PadEvent::Tick => app.on_tick(),
            PadEvent::Resize => {
                let size = terminal.size()?;
                app.resize(Rect::new(0, 0, size.width, size.height));
            }
            PadEvent::Mouse(mouse) => app.on_mouse(mouse),
            PadEvent::Key(key) => {
                if app.on_key(key) == Control::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}
