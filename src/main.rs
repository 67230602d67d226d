use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Alignment;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mindmaze::app::{App, NoticeKind, category_name};
use mindmaze::config::Config;
use mindmaze::event::{AppEvent, EventHandler};
use mindmaze::generator::QuestionSource;
use mindmaze::generator::gemini::GeminiFetcher;
use mindmaze::session::flow::{FlowEvent, FlowState, QuizPhase, Screen};
use mindmaze::store::export;
use mindmaze::store::history::HistoryStore;
use mindmaze::store::json_store::{JsonStore, MemoryStore, default_data_dir};
use mindmaze::ui;
use mindmaze::ui::components::config_form::ConfigFormView;
use mindmaze::ui::components::history_dashboard::HistoryDashboard;
use mindmaze::ui::components::menu::{MenuAction, WelcomeScreen};
use mindmaze::ui::components::question_card::QuestionCard;
use mindmaze::ui::components::results_dashboard::ResultsDashboard;
use mindmaze::ui::layout::{AppLayout, pack_hint_lines};

#[derive(Parser)]
#[command(name = "mindmaze", version, about = "Timed programming quizzes in the terminal")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Default category (javascript, python, react, ...)")]
    category: Option<String>,

    #[arg(short, long, help = "Default difficulty (easy, medium, hard)")]
    difficulty: Option<String>,

    #[arg(short = 'n', long, help = "Default number of questions")]
    questions: Option<u32>,

    #[arg(short = 'l', long, help = "Default seconds per question")]
    time_limit: Option<u32>,

    #[arg(short, long, help = "Default scoring mode (standard, timed, challenge)")]
    mode: Option<String>,

    #[arg(long, help = "Use only the built-in question bank")]
    offline: bool,

    #[arg(long, help = "Open the history screen on launch")]
    history: bool,

    #[arg(long, value_name = "DIR", help = "Write the quiz history to DIR as JSON and exit")]
    export_history: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("could not read config, using defaults: {e:#}");
        Config::default()
    });
    apply_overrides(&mut config, &cli);

    let history = open_history();

    if let Some(dir) = cli.export_history {
        let path = export::export_history(&dir, &history.list())?;
        println!("{}", path.display());
        return Ok(());
    }

    let source = if config.remote_enabled && !cli.offline {
        QuestionSource::new(Box::new(GeminiFetcher::new(
            &config.api_base_url,
            &config.model,
            &config.api_key_env,
            config.request_timeout_secs,
        )))
    } else {
        QuestionSource::offline()
    };

    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(config, history, source)
        .with_event_sender(events.sender())
        .with_persisted_config();
    if cli.history {
        app.go_to_history();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("mindmaze started");
    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!("{err:#}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Log to a file under the data dir; the terminal belongs to the UI.
/// `MINDMAZE_LOG` takes an env-filter directive and defaults to `info`.
fn init_logging() {
    let dir = default_data_dir();
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("mindmaze.log"))
    else {
        return;
    };
    let filter = EnvFilter::try_from_env("MINDMAZE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(ref theme) = cli.theme {
        config.theme = theme.clone();
    }
    if let Some(ref category) = cli.category {
        config.category = category.to_lowercase();
    }
    if let Some(ref difficulty) = cli.difficulty {
        config.difficulty = difficulty.to_lowercase();
    }
    if let Some(n) = cli.questions {
        config.question_count = n;
    }
    if let Some(secs) = cli.time_limit {
        config.time_limit = secs;
    }
    if let Some(ref mode) = cli.mode {
        config.mode = mode.to_lowercase();
    }
    config.validate();
}

fn open_history() -> HistoryStore {
    match JsonStore::new() {
        Ok(store) => HistoryStore::new(Box::new(store)),
        Err(e) => {
            warn!("history will not be saved this session: {e:#}");
            HistoryStore::new(Box::new(MemoryStore::new()))
        }
    }
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
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::Resize => {}
            AppEvent::QuestionsReady(seq, sourced) => {
                app.questions_ready(seq, sourced, Instant::now())
            }
            AppEvent::Recommendations(seq, tips) => app.recommendations_ready(seq, tips),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen() {
        Screen::Welcome => handle_welcome_key(app, key),
        Screen::Config => handle_config_key(app, key),
        Screen::Quiz => handle_quiz_key(app, key),
        Screen::Results => handle_results_key(app, key),
        Screen::History => handle_history_key(app, key),
    }
}

fn handle_welcome_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('1') => app.go_to_config(),
        KeyCode::Char('h') => app.go_to_history(),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => match app.menu.action() {
            MenuAction::StartQuiz => app.go_to_config(),
            MenuAction::History => app.go_to_history(),
            MenuAction::Quit => app.should_quit = true,
        },
        _ => {}
    }
}

fn handle_config_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.leave_config(),
        KeyCode::Enter => app.start_quiz(),
        KeyCode::Up | KeyCode::Char('k') => app.form.prev_field(),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => app.form.next_field(),
        KeyCode::Right | KeyCode::Char('l') => app.form_cycle(true),
        KeyCode::Left | KeyCode::Char('h') => app.form_cycle(false),
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.dispatch(FlowEvent::Back),
        KeyCode::Enter | KeyCode::Char('n') => app.dispatch(FlowEvent::Advance),
        KeyCode::Char('s') => app.dispatch(FlowEvent::Answer(None)),
        KeyCode::Char(ch @ 'a'..='d') => {
            app.dispatch(FlowEvent::Answer(Some((ch as u8 - b'a') as usize)))
        }
        KeyCode::Char(ch @ '1'..='4') => {
            app.dispatch(FlowEvent::Answer(Some((ch as u8 - b'1') as usize)))
        }
        _ => {}
    }
}

fn handle_results_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.try_again(),
        KeyCode::Char('s') => app.share_results(Instant::now()),
        KeyCode::Char('e') => app.dispatch(FlowEvent::ExportResult),
        KeyCode::Char('t') => app.request_recommendations(),
        KeyCode::Char('j') | KeyCode::Down => app.review_scroll += 1,
        KeyCode::Char('k') | KeyCode::Up => {
            app.review_scroll = app.review_scroll.saturating_sub(1)
        }
        KeyCode::Char('q') | KeyCode::Esc => app.dispatch(FlowEvent::Back),
        _ => {}
    }
}

fn handle_history_key(app: &mut App, key: KeyEvent) {
    // Confirmation dialog takes priority
    if app.history_view.confirm_clear {
        match key.code {
            KeyCode::Char('y') => app.confirm_clear_history(true),
            KeyCode::Char('n') | KeyCode::Esc => app.confirm_clear_history(false),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.dispatch(FlowEvent::Back),
        KeyCode::Left | KeyCode::Char('h') => app.filter_cursor_move(false),
        KeyCode::Right | KeyCode::Char('l') => app.filter_cursor_move(true),
        KeyCode::Char(' ') => app.toggle_filter_at_cursor(),
        KeyCode::Char('0') => app.reset_filters(),
        KeyCode::Down | KeyCode::Char('j') => app.history_select_move(true),
        KeyCode::Up | KeyCode::Char('k') => app.history_select_move(false),
        KeyCode::Char('e') => app.dispatch(FlowEvent::ExportHistory),
        KeyCode::Char('x') | KeyCode::Delete => app.request_clear_history(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);
    render_header(frame, app, &layout);

    match app.screen() {
        Screen::Welcome => render_welcome(frame, app, &layout),
        Screen::Config => render_config(frame, app, &layout),
        Screen::Quiz => render_quiz(frame, app, &layout),
        Screen::Results => render_results(frame, app, &layout),
        Screen::History => render_history(frame, app, &layout),
    }

    render_footer(frame, app, &layout);
}

fn render_header(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;

    let info = match &app.flow {
        FlowState::Welcome => " Programming quizzes against the clock".to_string(),
        FlowState::Config => " New quiz".to_string(),
        FlowState::Quiz { config, mode, .. } => format!(
            " {} | {} | {mode}",
            config.category.display_name(),
            config.difficulty.label()
        ),
        FlowState::Results { score, .. } => format!(" Score {score}"),
        FlowState::History => format!(
            " History | {} of {} shown",
            app.history_view.visible().len(),
            app.history_view.entries.len()
        ),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " Mind Maze ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default().fg(colors.text_muted()).bg(colors.header_bg()),
        ),
    ]))
    .block(Block::bordered().border_style(Style::default().fg(colors.border())))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;

    let line = if let Some(notice) = app.current_notice() {
        let color = match notice.kind {
            NoticeKind::Info => colors.success(),
            NoticeKind::Warning => colors.warning(),
            NoticeKind::Error => colors.error(),
        };
        Line::from(Span::styled(
            format!(" {}", notice.text),
            Style::default().fg(color),
        ))
    } else {
        let width = layout.footer.width.saturating_sub(2) as usize;
        let packed = pack_hint_lines(footer_hints(app), width);
        Line::from(Span::styled(
            packed.into_iter().next().unwrap_or_default(),
            Style::default().fg(colors.text_muted()),
        ))
    };

    let footer = Paragraph::new(line)
        .block(Block::bordered().border_style(Style::default().fg(colors.border())));
    frame.render_widget(footer, layout.footer);
}

fn footer_hints(app: &App) -> &'static [&'static str] {
    match &app.flow {
        FlowState::Welcome => &["[1] Start", "[h] History", "[j/k] Move", "[q] Quit"],
        FlowState::Config => &[
            "[j/k] Field",
            "[h/l] Change",
            "[Enter] Start",
            "[Esc] Back",
        ],
        FlowState::Quiz {
            phase: QuizPhase::Active(session),
            ..
        } if session.answered().is_some() => &["[Enter] Next", "[Esc] Quit quiz"],
        FlowState::Quiz { .. } => &["[a-d] Answer", "[s] Skip", "[Esc] Quit quiz"],
        FlowState::Results { .. } => &[
            "[r] Try again",
            "[s] Share",
            "[e] Export",
            "[t] Study tips",
            "[j/k] Scroll",
            "[Esc] Home",
        ],
        FlowState::History if app.history_view.confirm_clear => &["[y] Clear all", "[n] Cancel"],
        FlowState::History => &[
            "[h/l] Filter",
            "[Space] Toggle",
            "[0] Reset",
            "[j/k] Select",
            "[e] Export",
            "[x] Clear",
            "[Esc] Back",
        ],
    }
}

fn render_welcome(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let area = ui::layout::centered_rect(70, 80, layout.main);
    let welcome = WelcomeScreen {
        menu: &app.menu,
        next_quiz: app.config.quiz_configuration(),
        mode: app.config.scoring_mode(),
        last: app.last_entry.as_ref(),
        theme: app.theme,
    };
    frame.render_widget(welcome, area);
}

fn render_config(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let centered = ui::layout::centered_rect(60, 90, layout.main);
    let form = ConfigFormView::new(&app.form, &app.config.theme, app.theme);
    frame.render_widget(form, centered);
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let FlowState::Quiz {
        config,
        mode,
        phase,
    } = &app.flow
    else {
        return;
    };

    match phase {
        QuizPhase::Active(session) => {
            let card = QuestionCard::new(session, config, *mode, Instant::now(), app.theme);
            frame.render_widget(card, layout.main);
        }
        QuizPhase::Loading | QuizPhase::Empty => {
            let text = if matches!(phase, QuizPhase::Loading) {
                format!(
                    "Preparing {} questions on {}...",
                    config.question_count,
                    category_name(config.category.id())
                )
            } else {
                "No questions are available for this setup. Press Esc to go back.".to_string()
            };
            let area = ui::layout::centered_rect(60, 30, layout.main);
            let message = Paragraph::new(Line::from(Span::styled(
                text,
                Style::default().fg(colors.fg()),
            )))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::bordered()
                    .border_style(Style::default().fg(colors.accent()))
                    .style(Style::default().bg(colors.bg())),
            );
            frame.render_widget(message, area);
        }
    }
}

fn render_results(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let FlowState::Results {
        config,
        mode,
        result,
        score,
    } = &app.flow
    else {
        return;
    };

    let dashboard = ResultsDashboard {
        result,
        config,
        mode: *mode,
        score: *score,
        recommendations: app.recommendations.as_deref(),
        recommendations_pending: app.recommendations_pending,
        review_scroll: app.review_scroll,
        theme: app.theme,
    };
    frame.render_widget(dashboard, layout.main);
}

fn render_history(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let dashboard = HistoryDashboard::new(&app.history_view, app.theme);
    frame.render_widget(dashboard, layout.main);
}
