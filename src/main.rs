use std::fs;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use storekeep::app::{App, InputMode};
use storekeep::config;
use storekeep::controller::{Controller, StatusLevel};
use storekeep::domain::format::short_address;
use storekeep::infrastructure::explorer::EtherscanClient;
use storekeep::infrastructure::runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
use storekeep::infrastructure::wallet::create_wallet;
use storekeep::ui;

#[derive(Debug, Parser)]
#[command(
    name = "storekeep",
    version,
    about = "Storekeep: a terminal front-end for a simple storage contract"
)]
struct Args {
    /// Wallet JSON-RPC endpoint (e.g. http://127.0.0.1:1248)
    #[arg(long)]
    rpc: Option<String>,

    /// Storage contract address
    #[arg(long)]
    contract: Option<String>,

    /// Etherscan API key used for history
    #[arg(long, env = "ETHERSCAN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let mut config = config::load()?;
    if let Some(rpc) = args.rpc.filter(|s| !s.trim().is_empty()) {
        config.wallet.rpc = rpc;
    }
    if let Some(contract) = args.contract.filter(|s| !s.trim().is_empty()) {
        config.contract_address = contract;
    }
    if let Some(key) = args.api_key.filter(|s| !s.trim().is_empty()) {
        config.explorer.api_key = key;
    }

    let controller_config = config.controller_config()?;
    let wallet_config = config.wallet_config();
    let wallet = create_wallet(&wallet_config)?;
    let explorer = Arc::new(
        EtherscanClient::new(config.explorer_config()).context("building explorer client")?,
    );
    let contract = controller_config.contract.to_string();
    log::info!(
        "starting: wallet {} contract {contract}",
        wallet_config.rpc
    );

    let controller = Controller::new(wallet, explorer, controller_config);
    let app = App::new(
        controller.display().clone(),
        wallet_config.rpc.clone(),
        short_address(&contract),
    );
    let runtime = RuntimeBridge::new(controller)?;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

/// Log to a file; the terminal belongs to the TUI
fn init_logging() {
    let Some(path) = config::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = fs::OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &mut app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        pump_background(&mut app, &runtime);
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        match event {
            RuntimeEvent::Display(display) => app.apply_display(*display),
            RuntimeEvent::Error { message } => app.apply_worker_error(message),
        }
    }

    for cmd in app.take_requests() {
        if let Err(err) = runtime.send(cmd) {
            app.apply_worker_error(err.to_string());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.help_open = false;
        }
        return;
    }

    if app.network_picker.is_some() {
        match key.code {
            KeyCode::Esc => app.network_picker = None,
            KeyCode::Up | KeyCode::Char('k') => app.move_picker(-1),
            KeyCode::Down | KeyCode::Char('j') => app.move_picker(1),
            KeyCode::Enter => app.confirm_network(),
            _ => {}
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_edit_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.should_quit = true
        }
        (KeyCode::Char('?'), _) => app.help_open = true,
        (KeyCode::Char(':'), _) => app.enter_command(),
        (KeyCode::Char('c'), _) => app.request(RuntimeCommand::Connect),
        (KeyCode::Char('x'), _) => app.request(RuntimeCommand::Disconnect),
        (KeyCode::Char('i'), _) | (KeyCode::Enter, _) => app.enter_edit(),
        (KeyCode::Char('r'), _) => app.request(RuntimeCommand::Retrieve),
        (KeyCode::Char('h'), _) => app.request(RuntimeCommand::LoadHistory),
        (KeyCode::Char('n'), _) => app.open_network_picker(),
        (KeyCode::Char('y'), _) => handle_copy_to_clipboard(app),
        (KeyCode::Tab, _) => app.cycle_filter(),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.select_next(),
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.select_prev(),
        (KeyCode::Right, _) | (KeyCode::Char(']'), _) => app.next_page(),
        (KeyCode::Left, _) | (KeyCode::Char('['), _) => app.prev_page(),
        _ => {}
    }
}

fn handle_edit_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_edit(),
        KeyCode::Enter => app.submit_value(),
        KeyCode::Backspace => {
            app.value_input.pop();
        }
        KeyCode::Char(c) if !c.is_control() => app.value_input.push(c),
        _ => {}
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command(),
        KeyCode::Enter => app.apply_command(),
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Up => {
            if let Some(last) = app.command.last.clone() {
                app.command.input = last;
            }
        }
        KeyCode::Char(c) => app.command.input.push(c),
        _ => {}
    }
}

fn handle_copy_to_clipboard(app: &mut App) {
    use arboard::Clipboard;

    let Some(link) = app.selected_tx().map(|tx| tx.explorer_link.clone()) else {
        app.set_status("Nothing to copy", StatusLevel::Error);
        return;
    };

    match Clipboard::new() {
        Ok(mut clipboard) => {
            if clipboard.set_text(&link).is_ok() {
                app.set_status(format!("Copied: {link}"), StatusLevel::Success);
            } else {
                app.set_status("Failed to copy to clipboard", StatusLevel::Error);
            }
        }
        Err(_) => {
            app.set_status("Clipboard not available", StatusLevel::Error);
        }
    }
}
