use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use rust_i18n::t;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shouyou_practice::app::{App, AppScreen, DrillMode};
use shouyou_practice::config::Config;
use shouyou_practice::dictionary::chaifen::format_radicals;
use shouyou_practice::event::{AppEvent, EventHandler};
use shouyou_practice::practice::kind::DrillKind;
use shouyou_practice::session::controller::{DrillController, DrillStatus, Feedback};
use shouyou_practice::store::kv::FileStore;
use shouyou_practice::ui::components::progress_bar::ProgressBar;
use shouyou_practice::ui::components::prompt_area::PromptArea;
use shouyou_practice::ui::components::root_chart::RootChart;
use shouyou_practice::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use shouyou_practice::ui::theme::Theme;

rust_i18n::i18n!("locales", fallback = "en");

#[derive(Parser)]
#[command(
    name = "shouyou-practice",
    version,
    about = "Root-key and character-split drills for the Shouyou input scheme"
)]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Interface language (zh-CN, en)")]
    locale: Option<String>,

    #[arg(short, long, help = "Open a drill directly (root, split)")]
    drill: Option<String>,

    #[arg(long, help = "Directory holding the split dictionaries")]
    dictionary_dir: Option<PathBuf>,

    #[arg(long, help = "Write logs to this file (filter with RUST_LOG)")]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, path = %Config::config_path().display(), "config unreadable, using defaults");
        Config::default()
    });
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }
    if let Some(drill) = &cli.drill {
        config.default_drill = drill.clone();
    }
    if let Some(dir) = cli.dictionary_dir {
        config.dictionary_dir = dir.to_string_lossy().to_string();
    }
    config.validate(&Theme::available_themes());
    rust_i18n::set_locale(&config.locale);
    info!(locale = %config.locale, theme = %config.theme, "configuration loaded");

    let mut app = App::new(config)?;
    if cli.drill.is_some() {
        app.start_drill(app.drill_mode);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(80));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Drill => handle_drill_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('1') => app.start_drill(DrillMode::Root),
        KeyCode::Char('2') => app.start_drill(DrillMode::Split),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => match app.menu.selected {
            0 => app.start_drill(DrillMode::Root),
            1 => app.start_drill(DrillMode::Split),
            _ => app.quit(),
        },
        _ => {}
    }
}

fn handle_drill_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('r') => app.reset_round(),
            KeyCode::Char('t') => app.toggle_aid(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.go_to_menu(),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_scheme(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Enter if app.status() == DrillStatus::RoundComplete => app.reset_round(),
        KeyCode::Char(ch) => app.type_char(ch),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => {
            let menu_area = centered_rect(50, 60, area);
            frame.render_widget(&app.menu, menu_area);
        }
        AppScreen::Drill => match app.drill_mode {
            DrillMode::Root => {
                let controller = &app.root.controller;
                let highlight = match controller.feedback() {
                    Feedback::Incorrect { expected } => expected.chars().next(),
                    _ => None,
                };
                let chart = app.show_root_chart.then(|| {
                    RootChart::new(controller.active_scheme(), app.theme).highlight(highlight)
                });
                render_drill(frame, app, controller, None, chart);
            }
            DrillMode::Split => {
                let controller = &app.split.controller;
                let hint = if app.show_hint {
                    controller
                        .current_question()
                        .and_then(|q| q.radicals.as_deref())
                        .map(format_radicals)
                } else {
                    None
                };
                render_drill(frame, app, controller, hint.as_deref(), None);
            }
        },
    }
}

fn render_drill<K: DrillKind>(
    frame: &mut ratatui::Frame,
    app: &App,
    controller: &DrillController<K, FileStore>,
    hint: Option<&str>,
    chart: Option<RootChart<'_>>,
) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let app_layout = AppLayout::new(area);
    let tier = app_layout.tier;

    let drill_label = match app.drill_mode {
        DrillMode::Root => t!("menu.root"),
        DrillMode::Split => t!("menu.split"),
    };
    let info = controller.summary();
    let header_text = format!(
        " {drill_label} · {} | {} {} | {} {} | {} {}",
        t!(controller.active_scheme().label_key()),
        t!("stats.progress"),
        info.progress,
        t!("stats.accuracy"),
        info.accuracy,
        t!("stats.retry"),
        info.retry,
    );
    let header = Paragraph::new(Line::from(Span::styled(
        header_text,
        Style::default()
            .fg(colors.header_fg())
            .bg(colors.header_bg())
            .add_modifier(Modifier::BOLD),
    )))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, app_layout.header);

    let show_progress = tier.show_progress_bar(area.height);
    let chart = chart.filter(|_| tier.show_chart(area.height));

    let mut constraints: Vec<Constraint> = vec![Constraint::Min(7)];
    if show_progress {
        constraints.push(Constraint::Length(3));
    }
    if chart.is_some() {
        constraints.push(Constraint::Length(5));
    }

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(app_layout.main);

    let prompt = PromptArea::new(
        controller.status(),
        controller.current_payload(),
        controller.input(),
        K::ANSWER_LEN,
        controller.feedback(),
        app.theme,
    )
    .hint(hint)
    .shake(app.shake_ticks % 2 == 1);
    frame.render_widget(prompt, main_layout[0]);

    let mut idx = 1;
    if show_progress {
        let label = t!("stats.progress");
        let progress = ProgressBar::new(&label, controller.progress(), &info.progress, app.theme);
        frame.render_widget(progress, main_layout[idx]);
        idx += 1;
    }

    if let Some(chart) = chart {
        frame.render_widget(chart, main_layout[idx]);
    }

    let aid_hint = match app.drill_mode {
        DrillMode::Root => t!("hint.chart"),
        DrillMode::Split => t!("hint.radicals"),
    };
    let hints = [
        t!("hint.scheme"),
        t!("hint.reset"),
        aid_hint,
        t!("hint.back"),
    ];
    let hint_refs: Vec<&str> = hints.iter().map(|h| h.as_ref()).collect();
    let lines: Vec<Line> = pack_hint_lines(&hint_refs, app_layout.footer.width as usize)
        .into_iter()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(colors.text_pending()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), app_layout.footer);
}
