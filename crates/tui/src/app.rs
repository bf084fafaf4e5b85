use std::{cmp, io, sync::Arc, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use cinelink_core::{
    game::{GameController, GameState, TurnOutcome, CONNECTION_LIMIT, EXTRA_TIME_BONUS},
    AppConfig, ConnectionIndex, ForfeitReason, GenreWinCondition, LoadReport, Movie,
    MovieIndex, Player, PlayerSnapshot,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::block_font;

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_INPUT_LEN: usize = 80;
const MAX_SUGGESTIONS: usize = 5;
const HISTORY_LEN: usize = 5;
const EXTRA_TIME_CODE: &str = "++";
const PLAYER_NAMES: [&str; 2] = ["Player 1", "Player 2"];

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    accent_alt: Color,
    muted: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            accent_alt: Color::Blue,
            muted: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Loading,
    GenreSelect { player: usize },
    Play,
    GameOver,
}

/// Single-line text field with a byte cursor kept on char boundaries.
#[derive(Debug, Clone, Default)]
struct InputLine {
    value: String,
    cursor: usize,
}

impl InputLine {
    fn insert(&mut self, ch: char) {
        if self.value.chars().count() >= MAX_INPUT_LEN || ch.is_control() {
            return;
        }
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn backspace(&mut self) {
        if let Some((index, _)) = self.value[..self.cursor].char_indices().next_back() {
            self.value.remove(index);
            self.cursor = index;
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    fn move_left(&mut self) {
        if let Some((index, _)) = self.value[..self.cursor].char_indices().next_back() {
            self.cursor = index;
        }
    }

    fn move_right(&mut self) {
        if let Some(ch) = self.value[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.value.len();
    }

    fn set(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.value.len();
    }

    fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn trimmed(&self) -> &str {
        self.value.trim()
    }

    /// Display column of the cursor.
    fn column(&self) -> u16 {
        self.value[..self.cursor].chars().count() as u16
    }
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal front end driving one game.
pub struct CinelinkApp {
    index: MovieIndex,
    report: LoadReport,
    config: AppConfig,
    genres: Vec<String>,
    game: GameController,
    screen: Screen,
    input: InputLine,
    suggestions: Vec<String>,
    chosen_genres: Vec<String>,
    status: String,
    theme: Theme,
    should_quit: bool,
}

impl CinelinkApp {
    pub fn new(index: MovieIndex, report: LoadReport, config: AppConfig) -> Self {
        let genres = index.genres();
        let game = GameController::new(Arc::new(index.clone()));
        game.set_turn_time_limit(config.turn_time_limit);
        Self {
            index,
            report,
            config,
            genres,
            game,
            screen: Screen::Loading,
            input: InputLine::default(),
            suggestions: Vec::new(),
            chosen_genres: Vec::new(),
            status: "Ready".to_string(),
            theme: Theme::default(),
            should_quit: false,
        }
    }

    /// Fix the starting movie before play begins.
    pub fn set_initial_movie(&mut self, movie: Arc<Movie>) {
        if self.game.set_initial_movie(movie.clone()) {
            self.status = format!("Initial movie set: {}", movie.title());
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let result = loop {
            if let Err(err) = terminal.draw(|frame| self.draw(frame)) {
                break Err(err.into());
            }
            if self.should_quit {
                break Ok(());
            }
            match event_rx.recv().await {
                Some(AppEvent::Input(event)) => {
                    if let Err(err) = self.handle_input(event) {
                        error!(?err, "Input handling failed");
                        self.status = format!("Error: {err}");
                    }
                }
                Some(AppEvent::Tick) => self.handle_tick(),
                None => break Ok(()),
            }
        };

        self.game.dispose();
        restore_terminal(&mut terminal)?;
        result
    }

    fn handle_tick(&mut self) {
        if self.screen == Screen::Play && self.game.state() == GameState::Completed {
            self.status = match self.game.winner() {
                Some(winner) => format!("Time is up! {} wins.", winner.name),
                None => "Time is up!".to_string(),
            };
            self.finish();
        }
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if self.handle_global_shortcut(&key) {
            return Ok(());
        }
        match self.screen {
            Screen::Loading => self.begin_genre_selection(),
            Screen::GenreSelect { player } => self.handle_genre_key(player, key),
            Screen::Play => self.handle_play_key(key),
            Screen::GameOver => self.should_quit = true,
        }
        Ok(())
    }

    fn handle_global_shortcut(&mut self, key: &KeyEvent) -> bool {
        let quit = key.code == KeyCode::Esc
            || (key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c'));
        if !quit {
            return false;
        }
        if self.game.state() == GameState::InProgress {
            self.game.end();
            info!("Game abandoned from the keyboard");
        }
        self.should_quit = true;
        true
    }

    fn begin_genre_selection(&mut self) {
        if self.game.initial_movie().is_none() {
            self.status = "No movie with connections found; nothing to play.".to_string();
            self.should_quit = true;
            return;
        }
        self.input.clear();
        self.suggestions.clear();
        self.screen = Screen::GenreSelect { player: 0 };
    }

    /// Shared editing keys; returns whether the key was consumed.
    fn edit_input(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.insert(ch)
            }
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            KeyCode::Tab => {
                if let Some(first) = self.suggestions.first().cloned() {
                    self.input.set(&first);
                }
            }
            _ => return false,
        }
        true
    }

    fn handle_genre_key(&mut self, player: usize, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            self.submit_genre(player);
        } else if self.edit_input(&key) {
            self.suggestions = genre_suggestions(&self.genres, self.input.trimmed());
        }
    }

    fn submit_genre(&mut self, player: usize) {
        let attempt = self.input.trimmed().to_string();
        let Some(genre) = self
            .genres
            .iter()
            .find(|genre| genre.eq_ignore_ascii_case(&attempt))
            .cloned()
        else {
            self.input.clear();
            self.suggestions.clear();
            self.status = "Invalid genre, try again!".to_string();
            return;
        };

        info!(player = PLAYER_NAMES[player], %genre, "Genre selected");
        self.chosen_genres.push(genre);
        self.input.clear();
        self.suggestions.clear();

        if player + 1 < PLAYER_NAMES.len() {
            self.screen = Screen::GenreSelect { player: player + 1 };
            self.status = format!("{} chose {}", PLAYER_NAMES[player], self.chosen_genres[player]);
            return;
        }
        self.start_game();
    }

    fn start_game(&mut self) {
        for (name, genre) in PLAYER_NAMES.iter().zip(&self.chosen_genres) {
            self.game.add_player(Player::new(
                *name,
                GenreWinCondition::new(genre, self.config.genre_target),
            ));
        }
        if self.game.start() {
            self.screen = Screen::Play;
            self.status = format!("{} goes first", PLAYER_NAMES[0]);
        } else {
            error!("Game failed to start");
            self.status = "Game could not be started".to_string();
            self.screen = Screen::GameOver;
        }
    }

    fn handle_play_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            self.submit_move();
            return;
        }
        if !self.edit_input(&key) {
            return;
        }
        if self.input.trimmed() == EXTRA_TIME_CODE {
            self.input.clear();
            self.suggestions.clear();
            self.status = if self.game.request_extra_time() {
                format!("+{EXTRA_TIME_BONUS}s added to this turn")
            } else {
                "Extra time already used".to_string()
            };
            return;
        }
        self.suggestions = self
            .index
            .suggest_titles(self.input.trimmed())
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .collect();
    }

    fn submit_move(&mut self) {
        let title = self.input.trimmed().to_string();
        self.input.clear();
        self.suggestions.clear();

        self.status = match self.game.play_turn(&title) {
            TurnOutcome::Accepted {
                movie, connection, ..
            } => format!("{} accepted ({})", movie.title(), connection.describe()),
            TurnOutcome::Won { movie, winner, .. } => {
                format!("{} wins with {}!", winner.name, movie.title())
            }
            TurnOutcome::Rejected(reason) => format!("Rejected: {reason}"),
            TurnOutcome::Forfeited { reason, winner } => match reason {
                ForfeitReason::ConnectionExhausted(key) => format!(
                    "{} was already used {CONNECTION_LIMIT} times. {} wins.",
                    key.describe(),
                    winner.name
                ),
                other => format!("{other}. {} wins.", winner.name),
            },
        };
        if self.game.state() == GameState::Completed {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.screen = Screen::GameOver;
        self.input.clear();
        self.suggestions.clear();
        self.game.dispose();
        match serde_json::to_string(&self.game.players()) {
            Ok(players) => info!(%players, summary = %self.game.summary(), "Game over"),
            Err(err) => error!(?err, "Failed to serialise final standings"),
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        match self.screen {
            Screen::Loading => self.draw_loading(frame),
            Screen::GenreSelect { player } => self.draw_genre_select(frame, player),
            Screen::Play => self.draw_play(frame),
            Screen::GameOver => self.draw_game_over(frame),
        }
    }

    fn draw_loading(&self, frame: &mut Frame) {
        let area = frame.size();
        let banner = block_font::render("CINELINK");
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length((block_font::height() as u16 + 2).min(area.height)),
                Constraint::Min(3),
            ])
            .split(area);
        self.render_banner(frame, layout[0], &banner, "Cinelink");

        let mut lines = vec![
            Line::from(format!(
                "Loaded {} movies ({} rows skipped).",
                self.report.movies, self.report.skipped_movie_rows
            )),
            Line::from(format!(
                "Credits attached to {} movies ({} rows skipped).",
                self.report.credited_movies, self.report.skipped_credit_rows
            )),
            Line::from(format!("Found {} unique genres.", self.genres.len())),
        ];
        match self.game.initial_movie() {
            Some(movie) => lines.push(Line::from(format!("Initial movie set: {movie}"))),
            None => lines.push(Line::from(Span::styled(
                "Error: no connected movie to start from!",
                Style::default().fg(self.theme.danger),
            ))),
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Setup complete! Press any key to continue...",
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        )));

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Loading"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, layout[1]);
    }

    fn draw_genre_select(&self, frame: &mut Frame, player: usize) {
        let area = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7),
                Constraint::Min(4),
                Constraint::Length(3 + MAX_SUGGESTIONS as u16),
                Constraint::Length(3),
            ])
            .split(area);

        let intro = vec![
            Line::from(Span::styled(
                "Welcome to Cinelink!",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "{}, choose the genre you will collect. First to name {} wins.",
                PLAYER_NAMES[player], self.config.genre_target
            )),
            Line::from(format!(
                "You have one chance to add {EXTRA_TIME_BONUS} seconds to any of your turns: type '{EXTRA_TIME_CODE}'."
            )),
        ];
        frame.render_widget(
            Paragraph::new(intro)
                .block(Block::default().borders(Borders::ALL).title("Genre Selection"))
                .wrap(Wrap { trim: true }),
            layout[0],
        );

        let options = Paragraph::new(self.genres.join(", "))
            .style(Style::default().fg(self.theme.muted))
            .block(Block::default().borders(Borders::ALL).title("Genres"))
            .wrap(Wrap { trim: true });
        frame.render_widget(options, layout[1]);

        self.render_input(frame, layout[2], "Genre");
        self.render_status(frame, layout[3]);
    }

    fn draw_play(&self, frame: &mut Frame) {
        let area = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(block_font::height() as u16 + 2),
                Constraint::Min(6),
                Constraint::Length(3 + MAX_SUGGESTIONS as u16),
                Constraint::Length(3),
            ])
            .split(area);

        let header = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(40),
                Constraint::Percentage(30),
            ])
            .split(layout[0]);

        let current = self.game.current_player();
        let opponent = current
            .as_ref()
            .and_then(|player| self.game.opponent_of(&player.name));
        if let Some(player) = &current {
            self.render_player(frame, header[0], player, true);
        }
        if let Some(player) = &opponent {
            self.render_player(frame, header[2], player, false);
        }
        self.render_countdown(frame, header[1]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(layout[1]);
        self.render_history(frame, body[0]);
        self.render_rules(frame, body[1]);

        self.render_input(frame, layout[2], "Name a movie connected to the last one");
        self.render_status(frame, layout[3]);
    }

    fn draw_game_over(&self, frame: &mut Frame) {
        let area = frame.size();
        let mut lines = vec![Line::from(Span::styled(
            "Game Over!",
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        ))];
        lines.push(Line::from(""));
        match self.game.winner() {
            Some(winner) => {
                lines.push(Line::from(Span::styled(
                    format!("Winner: {}!", winner.name),
                    Style::default()
                        .fg(self.theme.success)
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(format!(
                    "Score: {}/{}",
                    winner.score, winner.target
                )));
                lines.push(Line::from(format!("Goal: {}", winner.win_condition)));
            }
            None => lines.push(Line::from("No winner.")),
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Game Summary:",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.extend(self.game.summary().lines().map(|line| Line::from(line.to_string())));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press any key to exit...",
            Style::default().fg(self.theme.muted),
        )));

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Results"))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_player(&self, frame: &mut Frame, area: Rect, player: &PlayerSnapshot, active: bool) {
        let (title, colour) = if active {
            (format!("{} (You)", player.name), self.theme.accent)
        } else {
            (player.name.clone(), self.theme.muted)
        };
        let extra = if player.extra_time_available {
            Span::styled("Extra time: available", Style::default().fg(self.theme.success))
        } else {
            Span::styled("Extra time: used", Style::default().fg(self.theme.muted))
        };
        let lines = vec![
            Line::from(player.win_condition.clone()),
            Line::from(format!(
                "Score: {}  Progress: {}/{}",
                player.score, player.progress, player.target
            )),
            Line::from(extra),
        ];
        let alignment = if active {
            Alignment::Left
        } else {
            Alignment::Right
        };
        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(title, Style::default().fg(colour))),
            )
            .alignment(alignment)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_countdown(&self, frame: &mut Frame, area: Rect) {
        let seconds = self.game.seconds_remaining();
        let colour = match seconds {
            s if s <= 5 => self.theme.danger,
            s if s <= 10 => self.theme.warning,
            _ => self.theme.accent,
        };
        let inner_width = area.width.saturating_sub(2) as usize;
        let digits = block_font::render(&seconds.to_string());
        let widest = digits.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let content: Vec<Line> = if widest <= inner_width {
            digits
                .into_iter()
                .map(|row| {
                    Line::from(Span::styled(
                        row,
                        Style::default().fg(colour).add_modifier(Modifier::BOLD),
                    ))
                })
                .collect()
        } else {
            vec![Line::from(Span::styled(
                format!("Time Remaining: {seconds}"),
                Style::default().fg(colour),
            ))]
        };
        let title = format!("Round {}", self.game.turn_count() + 1);
        let paragraph = Paragraph::new(content)
            .block(Block::default().borders(Borders::ALL).title(title))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn render_history(&self, frame: &mut Frame, area: Rect) {
        let mut entries: Vec<(Arc<Movie>, Option<String>)> = Vec::new();
        if let Some(initial) = self.game.initial_movie() {
            entries.push((initial, None));
        }
        entries.extend(
            self.game
                .move_log()
                .into_iter()
                .map(|record| (record.movie, Some(record.connection.describe()))),
        );

        let start = entries.len().saturating_sub(HISTORY_LEN);
        let width = area.width.saturating_sub(2) as usize;
        let mut lines = Vec::new();
        for (position, (movie, connection)) in entries.iter().enumerate().skip(start) {
            if position > start {
                if let Some(connection) = connection {
                    lines.push(Line::from(Span::styled(
                        truncate(&format!("   ↑ {connection}"), width),
                        Style::default().fg(self.theme.accent_alt),
                    )));
                }
            }
            lines.push(Line::from(Span::styled(
                truncate(&format!("{}. {movie}", position + 1), width),
                Style::default().fg(self.theme.primary_fg),
            )));
        }

        let title = format!("Movie History (last {HISTORY_LEN})");
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
            area,
        );
    }

    fn render_rules(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from("Each movie must connect to the previous one."),
            Line::from("Connections: shared actor, director, writer, cinematographer or composer."),
            Line::from(format!(
                "Each connection can only be used {CONNECTION_LIMIT} times."
            )),
            Line::from(format!(
                "First to name {} movies in their genre wins.",
                self.config.genre_target
            )),
            Line::from(format!(
                "Type '{EXTRA_TIME_CODE}' to add {EXTRA_TIME_BONUS} seconds (once per player)."
            )),
            Line::from(Span::styled(
                format!("Game status: {}", self.game.state()),
                Style::default().fg(self.theme.muted),
            )),
        ];
        frame.render_widget(
            Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title("Game Rules"))
                .wrap(Wrap { trim: true }),
            area,
        );
    }

    fn render_input(&self, frame: &mut Frame, area: Rect, title: &str) {
        let mut lines = vec![Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(self.input.value.clone()),
        ])];
        if !self.suggestions.is_empty() {
            lines.push(Line::from(Span::styled(
                "Suggestions (Tab to complete):",
                Style::default().fg(self.theme.muted),
            )));
            lines.extend(
                self.suggestions
                    .iter()
                    .map(|suggestion| Line::from(format!("  {suggestion}"))),
            );
        }
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title.to_string()),
            ),
            area,
        );

        let cursor_x = cmp::min(
            area.x + 3 + self.input.column(),
            area.x + area.width.saturating_sub(2),
        );
        frame.set_cursor(cursor_x, area.y + 1);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let clock = Local::now().format("%H:%M:%S");
        let line = Line::from(vec![
            Span::raw(self.status.clone()),
            Span::styled(format!("  [{clock}]"), Style::default().fg(self.theme.muted)),
        ]);
        frame.render_widget(
            Paragraph::new(line)
                .block(Block::default().borders(Borders::ALL).title("Status"))
                .wrap(Wrap { trim: true }),
            area,
        );
    }

    fn render_banner(&self, frame: &mut Frame, area: Rect, lines: &[String], title: &str) {
        let content: Vec<Line> = lines
            .iter()
            .map(|line| {
                Line::from(Span::styled(
                    line.clone(),
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD),
                ))
            })
            .collect();
        let paragraph = Paragraph::new(content)
            .block(Block::default().borders(Borders::ALL).title(title.to_string()))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }
}

fn genre_suggestions(genres: &[String], prefix: &str) -> Vec<String> {
    if prefix.is_empty() {
        return Vec::new();
    }
    let prefix = prefix.to_lowercase();
    genres
        .iter()
        .filter(|genre| genre.to_lowercase().starts_with(&prefix))
        .take(MAX_SUGGESTIONS)
        .cloned()
        .collect()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width || width < 4 {
        return text.to_string();
    }
    let kept: String = text.chars().take(width - 3).collect();
    format!("{kept}...")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_line_edits_on_char_boundaries() {
        let mut input = InputLine::default();
        for ch in "Amélie".chars() {
            input.insert(ch);
        }
        input.move_left();
        input.move_left();
        input.move_left();
        input.backspace();
        assert_eq!(input.value, "Amlie");
        assert_eq!(input.column(), 2);
        input.move_end();
        input.insert('\n');
        assert_eq!(input.trimmed(), "Amlie");
    }

    #[test]
    fn genre_suggestions_match_prefix() {
        let genres = vec![
            "Action".to_string(),
            "Adventure".to_string(),
            "Drama".to_string(),
        ];
        assert_eq!(genre_suggestions(&genres, "a"), vec!["Action", "Adventure"]);
        assert_eq!(genre_suggestions(&genres, "DR"), vec!["Drama"]);
        assert!(genre_suggestions(&genres, "").is_empty());
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Short", 10), "Short");
        assert_eq!(truncate("A rather long title", 10), "A rathe...");
    }
}
