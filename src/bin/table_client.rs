use std::io::{self, stdout};
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
	event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
	execute,
	terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use poker_table_client::config::{self, ClientConfig};
use poker_table_client::defaults;
use poker_table_client::logging;
use poker_table_client::net::{TableAddress, TableConnection};
use poker_table_client::storage::{PersistedCalibration, Storage};
use poker_table_client::tui::{TableUI, TableUIAction};

#[derive(Parser)]
#[command(name = "table-client")]
#[command(about = "Sit at a poker table over WebSocket")]
struct Cli {
	/// Server base URL, e.g. ws://localhost:8000
	#[arg(short, long)]
	server: Option<String>,

	#[arg(short, long)]
	game: Option<String>,

	#[arg(short, long)]
	table: Option<String>,

	#[arg(short, long, env = "POKER_NICK")]
	nick: Option<String>,

	/// Enable the layout calibration tools (F2)
	#[arg(long)]
	calibrate: bool,
}

fn load_config() -> ClientConfig {
	match config::load_client_auto() {
		Ok(config) => config,
		Err(e) => {
			eprintln!("{}; using built-in defaults", e);
			defaults::default_client_config().unwrap_or_default()
		}
	}
}

fn main() -> io::Result<()> {
	let cli = Cli::parse();

	defaults::ensure_config();
	let config = load_config();

	let nick = cli
		.nick
		.or_else(|| config.table.nick.clone())
		.unwrap_or_else(|| {
			std::env::var("USER")
				.or_else(|_| std::env::var("USERNAME"))
				.unwrap_or_else(|_| "Player".to_string())
		});
	let server = cli.server.unwrap_or_else(|| config.server.url.clone());
	let game = cli.game.unwrap_or_else(|| config.table.game.clone());
	let table = cli.table.unwrap_or_else(|| config.table.table.clone());

	logging::set_table_id(&table);

	let runtime = tokio::runtime::Builder::new_multi_thread()
		.worker_threads(2)
		.enable_all()
		.build()?;

	let address = TableAddress::new(&server, &game, &table, &nick);
	println!("Connecting to {} as {}...", server, nick);
	let connection = TableConnection::open(&address, runtime.handle())
		.map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

	let storage = Storage::open(config.storage_dir());
	let persisted = PersistedCalibration::load(&storage, defaults::default_overrides());
	let mut ui = TableUI::new(
		&nick,
		persisted,
		storage,
		config.table.capacity,
		&config.table.host_label,
		config.surface,
	);
	ui.allow_calibration(cli.calibrate);

	enable_raw_mode()?;
	let mut stdout = stdout();
	execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_app(&mut terminal, &mut ui, &connection);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;

	result
}

fn dispatch(connection: &TableConnection, action: TableUIAction) -> bool {
	match action {
		TableUIAction::Send(frame) => {
			if let Err(e) = connection.send(&frame) {
				logging::net::error(&format!("dropped command: {}", e));
			}
			false
		}
		TableUIAction::Quit => true,
		TableUIAction::None => false,
	}
}

fn run_app(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	ui: &mut TableUI,
	connection: &TableConnection,
) -> io::Result<()> {
	loop {
		let now = Instant::now();
		ui.connection = connection.status();
		while let Some(frame) = connection.try_recv() {
			ui.apply_frame(frame, now);
		}
		ui.tick(now);

		terminal.draw(|f| ui.render(f))?;

		if event::poll(Duration::from_millis(50))? {
			match event::read()? {
				Event::Key(key) => {
					if key.kind != KeyEventKind::Press {
						continue;
					}
					if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
						return Ok(());
					}
					if dispatch(connection, ui.handle_key(key.code)) {
						return Ok(());
					}
				}
				Event::Mouse(mouse) => {
					if dispatch(connection, ui.handle_mouse(mouse)) {
						return Ok(());
					}
				}
				_ => {}
			}
		}
	}
}
