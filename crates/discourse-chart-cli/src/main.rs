use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use discourse_chart_config::Config;
use discourse_chart_engine::{
    ChartError, ChartEvent, ChartLocation, ChartLogic, ClauseType, RowId, Text, io,
    logic::MissingState, snapshot,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use std::{
    cell::Cell as SharedCell,
    env,
    fs::File,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
    rc::Rc,
};

enum Mode {
    Chart,
    EditingNote(String),
}

struct App {
    text_path: PathBuf,
    config: Config,
    logic: ChartLogic,
    cursor_row: usize,
    /// Display column; differs from the logical column for right-to-left charts.
    cursor_column: usize,
    mode: Mode,
    status: String,
    last_modified: Rc<SharedCell<Option<RowId>>>,
}

impl App {
    fn new(text_path: PathBuf, config: Config) -> Result<Self> {
        let source = io::read_text_file(&text_path)?;
        let logic = ChartLogic::new(
            Text::parse(&source),
            &config.template(),
            config.chart_settings(),
        );
        let mut app = Self {
            text_path,
            config,
            logic,
            cursor_row: 0,
            cursor_column: 0,
            mode: Mode::Chart,
            status: String::new(),
            last_modified: Rc::new(SharedCell::new(None)),
        };
        app.subscribe();
        Ok(app)
    }

    fn subscribe(&mut self) {
        let sink = Rc::clone(&self.last_modified);
        self.logic.subscribe(move |event| match event {
            ChartEvent::RowModified(row) => sink.set(Some(*row)),
            ChartEvent::RibbonChanged => log::debug!("Ribbon changed"),
        });
    }

    /// Re-reads the text from disk and drops chart entries that no longer match it.
    fn reload_text(&mut self) -> Result<()> {
        let source = io::read_text_file(&self.text_path)?;
        self.logic.set_text(Text::parse(&source));
        let notes_path = self.config.notes_recovery_path_for(&self.text_path);
        let mut save_result = Ok(());
        let report = self.logic.cleanup_invalid_chart_cells(|notes| {
            save_result = io::append_recovered_notes(&notes_path, notes);
        });
        save_result.with_context(|| format!("saving notes to {}", notes_path.display()))?;
        self.status = if report.cleared_chart && !report.archived_notes.is_empty() {
            format!(
                "Text changed; chart cleared. Notes saved to {}",
                notes_path.display()
            )
        } else if report.is_clean() {
            "Text reloaded".to_string()
        } else {
            format!(
                "Text changed; removed {} chart entries",
                report.removed_parts
            )
        };
        self.clamp_cursor();
        Ok(())
    }

    fn current_row(&self) -> Option<RowId> {
        self.logic.chart().row_at(self.cursor_row)
    }

    fn current_cell(&self) -> Option<ChartLocation> {
        self.current_row().map(|row| {
            ChartLocation::new(row, self.logic.logical_column_index(self.cursor_column))
        })
    }

    fn logical_column(&self) -> usize {
        self.logic.logical_column_index(self.cursor_column)
    }

    fn clamp_cursor(&mut self) {
        let rows = self.logic.chart().row_count();
        self.cursor_row = self.cursor_row.min(rows.saturating_sub(1));
        self.cursor_column = self
            .cursor_column
            .min(self.logic.column_count().saturating_sub(1));
    }

    fn move_cursor(&mut self, rows: isize, columns: isize) {
        self.cursor_row = self.cursor_row.saturating_add_signed(rows);
        self.cursor_column = self.cursor_column.saturating_add_signed(columns);
        self.clamp_cursor();
    }

    fn change_selection(&mut self, delta: isize) {
        let count = self
            .logic
            .ribbon()
            .selected()
            .len()
            .saturating_add_signed(delta)
            .max(1);
        self.logic.ribbon_mut().select(count);
    }

    /// Runs a command against the cell under the cursor and reports how it went.
    fn on_cell(
        &mut self,
        done: &str,
        command: impl FnOnce(&mut ChartLogic, ChartLocation) -> Result<(), ChartError>,
    ) {
        match self.current_cell() {
            Some(cell) => {
                let result = command(&mut self.logic, cell);
                self.finish(done, result);
            }
            None => self.status = "The chart has no rows yet".to_string(),
        }
    }

    fn finish(&mut self, done: &str, result: Result<(), ChartError>) {
        match result {
            Ok(()) => self.status = done.to_string(),
            Err(err) if err.is_user_actionable() => self.status = err.to_string(),
            Err(err) => {
                log::warn!("Command failed: {err}");
                self.status = format!("Error: {err}");
            }
        }
        if let Some(row) = self.last_modified.take()
            && let Some(index) = self.logic.chart().row_index(row)
        {
            self.cursor_row = index;
        }
        self.clamp_cursor();
    }

    fn chart_selected_words(&mut self, new_clause: bool) {
        let column = self.logical_column();
        let result = if new_clause {
            self.logic.move_to_here_in_new_clause(column)
        } else {
            self.logic.move_to_column(column)
        };
        self.finish("", result.map(|_| ()));
    }

    fn toggle_sentence(&mut self, paragraph: bool) {
        let Some(row) = self.current_row() else {
            return;
        };
        let result = if paragraph {
            self.logic.toggle_row_ends_paragraph(row)
        } else {
            self.logic.toggle_row_ends_sentence(row)
        };
        self.finish("", result);
    }

    fn insert_row(&mut self, above: bool) {
        let Some(row) = self.current_row() else {
            return;
        };
        let result = self.logic.insert_row(row, above);
        if let Ok(new_row) = &result
            && let Some(index) = self.logic.chart().row_index(*new_row)
        {
            self.cursor_row = index;
        }
        self.finish("Row inserted", result.map(|_| ()));
    }

    /// Makes the row below the cursor a dependent clause of the current cell.
    fn mark_next_row_dependent(&mut self) {
        let Some(cell) = self.current_cell() else {
            return;
        };
        let Some(next) = self.logic.chart().next_row(cell.row) else {
            self.status = "There is no following row to make dependent".to_string();
            return;
        };
        let result = self
            .logic
            .make_dependent_clause_marker(cell, &[next], ClauseType::Dependent);
        self.finish("Dependent clause marked", result.map(|_| ()));
    }

    /// Marks the cell's words as moved out of the neighbouring column.
    fn toggle_moved(&mut self, from_later_column: bool) {
        let column = self.logical_column();
        let marker_column = if from_later_column {
            column + 1
        } else {
            match column.checked_sub(1) {
                Some(c) => c,
                None => {
                    self.status = "There is no earlier column".to_string();
                    return;
                }
            }
        };
        self.on_cell("", |logic, cell| logic.toggle_moved_from(cell, marker_column));
    }

    fn toggle_missing(&mut self) {
        let Some(cell) = self.current_cell() else {
            return;
        };
        if self.logic.missing_state(&cell) == MissingState::DoesNotApply {
            self.status = "A missing marker does not apply to that cell".to_string();
            return;
        }
        let result = self.logic.toggle_missing_marker(cell);
        self.finish("", result);
    }

    fn start_note(&mut self) {
        let Some(row) = self.current_row() else {
            return;
        };
        let existing = self
            .logic
            .chart()
            .row(row)
            .and_then(|r| r.notes.clone())
            .unwrap_or_default();
        self.mode = Mode::EditingNote(existing);
    }

    fn commit_note(&mut self, note: String) {
        if let Some(row) = self.current_row()
            && let Some(props) = self.logic.chart_mut().row_mut(row)
        {
            props.notes = (!note.trim().is_empty()).then_some(note);
        }
        self.mode = Mode::Chart;
    }

    /// Handles one key. Returns false when the app should quit.
    fn on_key(&mut self, code: KeyCode) -> bool {
        if let Mode::EditingNote(note) = &mut self.mode {
            match code {
                KeyCode::Enter => {
                    let note = std::mem::take(note);
                    self.commit_note(note);
                }
                KeyCode::Esc => self.mode = Mode::Chart,
                KeyCode::Backspace => {
                    note.pop();
                }
                KeyCode::Char(c) => note.push(c),
                _ => {}
            }
            return true;
        }

        match code {
            KeyCode::Char('q') => return false,
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1, 0),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(0, 1),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(0, -1),
            KeyCode::Char('+') | KeyCode::Char('=') => self.change_selection(1),
            KeyCode::Char('-') => self.change_selection(-1),
            KeyCode::Enter => self.chart_selected_words(false),
            KeyCode::Char('n') => self.chart_selected_words(true),
            KeyCode::Char('m') => self.toggle_missing(),
            KeyCode::Char('f') => self.on_cell("", |logic, cell| logic.move_cell_forward(cell)),
            KeyCode::Char('b') => self.on_cell("", |logic, cell| logic.move_cell_back(cell)),
            KeyCode::Char('F') => self.on_cell("", |logic, cell| logic.move_word_forward(cell)),
            KeyCode::Char('B') => self.on_cell("", |logic, cell| logic.move_word_back(cell)),
            KeyCode::Char('r') if self.logic.can_repeat_last_move() => {
                let result = self.logic.repeat_last_move_forward();
                self.finish("", result);
            }
            KeyCode::Char('R') if self.logic.can_repeat_last_move() => {
                let result = self.logic.repeat_last_move_back();
                self.finish("", result);
            }
            KeyCode::Char('s') => self.toggle_sentence(false),
            KeyCode::Char('p') => self.toggle_sentence(true),
            KeyCode::Char('i') => self.insert_row(false),
            KeyCode::Char('I') => self.insert_row(true),
            KeyCode::Char('<') => self.on_cell("", |logic, cell| {
                logic.toggle_merged_cell_flag(cell, false)
            }),
            KeyCode::Char('>') => self.on_cell("", |logic, cell| {
                logic.toggle_merged_cell_flag(cell, true)
            }),
            KeyCode::Char('d') => self.mark_next_row_dependent(),
            KeyCode::Char('D') => self.on_cell("", |logic, cell| {
                logic.remove_dependent_clause(cell);
                Ok(())
            }),
            KeyCode::Char('o') => self.toggle_moved(true),
            KeyCode::Char('O') => self.toggle_moved(false),
            KeyCode::Char('X') => self.on_cell("Cleared from here on", |logic, cell| {
                logic.clear_chart_from_here_on(cell)
            }),
            KeyCode::Char('N') => self.start_note(),
            KeyCode::Char('L') => {
                if let Err(err) = self.reload_text() {
                    self.status = format!("Error: {err:#}");
                }
            }
            _ => {}
        }
        true
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <text-file>", args[0]);
        process::exit(1);
    }
    let text_path = PathBuf::from(&args[1]);

    let config = match Config::load_or_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Fix or remove {}", Config::config_path().display());
            process::exit(1);
        }
    };

    // Log to a file so output does not corrupt the terminal UI
    let log_path = env::temp_dir().join("discourse-chart.log");
    let log_file = File::create(&log_path)
        .with_context(|| format!("creating log file {}", log_path.display()))?;
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let mut app = match App::new(text_path, config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };
    log::info!("Charting {}", app.text_path.display());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !app.on_key(key.code)
        {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.area());

    let snap = snapshot::normalize(&app.logic);

    // Ribbon panel
    let ribbon: Vec<Span> = snap
        .ribbon
        .iter()
        .enumerate()
        .map(|(i, form)| {
            let style = if i < snap.selected {
                Style::default().bg(Color::Yellow).fg(Color::Black)
            } else {
                Style::default()
            };
            Span::styled(format!("{form} "), style)
        })
        .collect();
    let ribbon_title = if app.logic.is_chart_complete() {
        "Ribbon (chart complete)"
    } else {
        "Ribbon"
    };
    let ribbon = Paragraph::new(Line::from(ribbon))
        .block(Block::default().borders(Borders::ALL).title(ribbon_title));
    f.render_widget(ribbon, chunks[0]);

    // Chart grid, columns in display order
    let column_count = app.logic.column_count();
    let display_order: Vec<usize> = (0..column_count)
        .map(|d| app.logic.logical_column_index(d))
        .collect();
    let header = Row::new(
        std::iter::once(Cell::from("#")).chain(
            display_order
                .iter()
                .map(|c| Cell::from(snap.columns[*c].clone())),
        ),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = snap
        .rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| {
            let mut label = row.label.clone();
            if row.notes.is_some() {
                label.push('*');
            }
            let cells = display_order.iter().enumerate().map(|(display, column)| {
                let mut style = Style::default();
                if app.logic.is_highlighted_cell(row_index, *column) {
                    style = style.bg(Color::Blue);
                }
                if row_index == app.cursor_row && display == app.cursor_column {
                    style = style.bg(Color::Yellow).fg(Color::Black);
                }
                Cell::from(row.cells[*column].clone()).style(style)
            });
            let row_style = if row.flags.iter().any(|f| f == "EndSentence") {
                Style::default().add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default()
            };
            Row::new(std::iter::once(Cell::from(label)).chain(cells)).style(row_style)
        })
        .collect();
    let widths = std::iter::once(Constraint::Length(6)).chain(
        (0..column_count).map(|_| Constraint::Ratio(1, column_count.max(1) as u32)),
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Chart"));
    f.render_widget(table, chunks[1]);

    // Status and instructions
    let status = match &app.mode {
        Mode::EditingNote(note) => Line::from(vec![
            Span::raw("Note (Enter: save | Esc: cancel): "),
            Span::styled(note.clone(), Style::default().fg(Color::Yellow)),
        ]),
        Mode::Chart if !app.status.is_empty() => Line::from(app.status.clone()),
        Mode::Chart => Line::from(vec![
            Span::raw("q: Quit | +/-: Select | Enter: Chart | n: New clause | "),
            Span::raw("f/b: Move cell | F/B: Move word | m: Missing | s/p: End sentence/para | "),
            Span::raw("o/O: Moved text | d/D: Dependent | i/I: Insert row | N: Note | L: Reload"),
        ]),
    };
    let help = Paragraph::new(vec![status])
        .block(Block::default().borders(Borders::ALL))
        .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(help, chunks[2]);
}
