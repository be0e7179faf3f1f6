use crate::actor::{spawn_board_actor, BoardCommand, BoardHandle};
use crate::game::{lock, Game, SharedGame};
use crate::scene::{Scene, Viewport};
use crate::settings::{config_source, initial_game, load_config, Args};
use crate::surface::{lock_scene, SharedScene};
use crate::theme::Theme;
use crate::widgets::BoardWidget;
use chessboard::{BoardConfig, Point, Throttle};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const HELP: &str = "q quit · f flip · r restart · u undo · c clear · s setup · p play from here";

/// Pointer motion waiting in the throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    Drag(Point),
    Hover(Point),
}

impl Motion {
    fn command(self) -> BoardCommand {
        match self {
            Self::Drag(p) => BoardCommand::PointerMove(p),
            Self::Hover(p) => BoardCommand::PointerHover(p),
        }
    }
}

/// A mouse event in board surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pointer {
    Down(Point),
    Up(Point),
    Motion(Motion),
}

fn pointer(event: &MouseEvent, viewport: &Viewport) -> Option<Pointer> {
    let p = viewport.to_point(event.column, event.row);
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Pointer::Down(p)),
        MouseEventKind::Up(MouseButton::Left) => Some(Pointer::Up(p)),
        MouseEventKind::Drag(MouseButton::Left) => Some(Pointer::Motion(Motion::Drag(p))),
        MouseEventKind::Moved => Some(Pointer::Motion(Motion::Hover(p))),
        _ => None,
    }
}

enum KeyAction {
    Quit,
    Send(BoardCommand),
}

fn key_action(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let cmd = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(KeyAction::Quit)
        }
        KeyCode::Char('q') | KeyCode::Esc => return Some(KeyAction::Quit),
        KeyCode::Char('f') => BoardCommand::Flip,
        KeyCode::Char('r') => BoardCommand::Restart,
        KeyCode::Char('u') => BoardCommand::Undo,
        KeyCode::Char('c') => BoardCommand::Clear,
        KeyCode::Char('s') => BoardCommand::SetupStart,
        KeyCode::Char('p') => BoardCommand::PlayFromHere,
        _ => return None,
    };
    Some(KeyAction::Send(cmd))
}

/// Board block on top, then a status line and a help line.
fn split(area: Rect) -> (Rect, Rect, Rect) {
    let [board, status, help] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);
    (board, status, help)
}

fn board_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .title("♟ Chessboard ♟")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.board_border))
}

struct App {
    handle: BoardHandle,
    scene: SharedScene,
    game: SharedGame,
    theme: Theme,
    spare_pieces: bool,
    throttle: Throttle<Motion>,
}

impl App {
    /// Fit the board to `area`. Returns true when the board must resize.
    fn fit(&self, area: Rect) -> bool {
        let (board, _, _) = split(area);
        let inner = board_block(&self.theme).inner(board);
        let viewport = Viewport::for_area(inner, self.spare_pieces);

        let mut scene = lock_scene(&self.scene);
        let resized = scene.viewport.square_size != viewport.square_size;
        scene.viewport = viewport;
        resized
    }

    fn draw(&self, f: &mut Frame) {
        let (board, status, help) = split(f.area());
        let block = board_block(&self.theme);
        let inner = block.inner(board);
        f.render_widget(block, board);

        {
            let scene = lock_scene(&self.scene);
            f.render_widget(BoardWidget::new(&scene, &self.theme), inner);
        }

        let status_line = {
            let game = lock(&self.game);
            let mut spans = vec![Span::styled(
                game.status_line(),
                Style::default().fg(self.theme.text_primary),
            )];
            if let Some(notice) = game.notice() {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    notice.to_string(),
                    Style::default().fg(self.theme.negative),
                ));
            } else if let Some(hover) = game.hover() {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    hover.to_string(),
                    Style::default().fg(self.theme.positive),
                ));
            }
            Line::from(spans)
        };
        f.render_widget(Paragraph::new(status_line), status);
        f.render_widget(
            Paragraph::new(HELP).style(Style::default().fg(self.theme.muted)),
            help,
        );
    }

    async fn send(&self, cmd: BoardCommand) -> anyhow::Result<()> {
        self.handle.send(cmd).await?;
        Ok(())
    }

    async fn on_mouse(&mut self, event: &MouseEvent) -> anyhow::Result<()> {
        let viewport = lock_scene(&self.scene).viewport;
        let Some(input) = pointer(event, &viewport) else {
            return Ok(());
        };
        match input {
            Pointer::Motion(motion) => {
                if let Some(motion) = self.throttle.call(motion, Instant::now()) {
                    self.send(motion.command()).await?;
                }
            }
            Pointer::Down(p) => {
                self.flush_motion().await?;
                self.send(BoardCommand::PointerDown(p)).await?;
            }
            Pointer::Up(p) => {
                // The drop must see where the piece last was
                self.flush_motion().await?;
                self.send(BoardCommand::PointerUp(p)).await?;
            }
        }
        Ok(())
    }

    async fn flush_motion(&mut self) -> anyhow::Result<()> {
        if let Some(motion) = self.throttle.flush() {
            self.send(motion.command()).await?;
        }
        Ok(())
    }
}

/// Set up the terminal, run the board until the user quits, restore the
/// terminal.
pub async fn run(args: Args) -> anyhow::Result<()> {
    let source = config_source(args.config.as_deref());
    tracing::info!(?source, "Board config source");
    let mut config = args.apply(load_config(&source)?)?;
    let game = initial_game(&mut config, args.seed);
    let theme = match args.theme.as_deref() {
        Some(pref) => Theme::from_preference(Some(pref)),
        None => Theme::detect(),
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_board(&mut terminal, config, game, theme).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_board<B: Backend>(
    terminal: &mut Terminal<B>,
    config: BoardConfig,
    game: Game,
    theme: Theme,
) -> anyhow::Result<()> {
    let scene: SharedScene = Arc::new(Mutex::new(Scene::default()));
    let game: SharedGame = Arc::new(Mutex::new(game));
    let spare_pieces = config.spare_pieces;
    let throttle = Throttle::new(config.drag_throttle_interval());

    // The board sizes itself from the viewport when it is created
    let area = terminal.get_frame().area();
    let (board, _, _) = split(area);
    lock_scene(&scene).viewport = Viewport::for_area(board_block(&theme).inner(board), spare_pieces);

    let (handle, actor) = spawn_board_actor(
        scene.clone(),
        config,
        game.clone(),
        crate::hooks::OPPONENT_DELAY,
    );
    let mut app = App {
        handle,
        scene,
        game,
        theme,
        spare_pieces,
        throttle,
    };

    let mut term_events = EventStream::new();
    // ~30fps; animations run in the board actor and are picked up each frame
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));

    loop {
        let mut resized = false;
        terminal.draw(|f| {
            resized = app.fit(f.area());
            app.draw(f);
        })?;
        if resized {
            app.send(BoardCommand::Resize).await?;
        }

        tokio::select! {
            biased;

            maybe_event = term_events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => match key_action(&key) {
                        Some(KeyAction::Quit) => break,
                        Some(KeyAction::Send(cmd)) => app.send(cmd).await?,
                        None => {}
                    },
                    Some(Ok(Event::Mouse(mouse))) => app.on_mouse(&mouse).await?,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => tracing::warn!("Terminal event error: {}", e),
                    None => break,
                }
            }

            _ = render_tick.tick() => {
                if let Some(motion) = app.throttle.poll(Instant::now()) {
                    app.send(motion.command()).await?;
                }
            }
        }
    }

    app.handle.shutdown().await;
    if let Err(e) = actor.await {
        tracing::warn!("Board actor ended abnormally: {}", e);
    }
    Ok(())
}
