/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::dashboard::app::App;
use crate::dashboard::form::{FormField, TaskForm};
use crate::dashboard::state::{DashboardState, Theme};
use crate::database::definitions::task::{Priority, Task};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use ratatui::Frame;
use strum::IntoEnumIterator;

const TITLE: &str = "Task Management Dashboard";

struct Palette {
    base: Style,
    accent: Color,
    muted: Color,
}

impl From<Theme> for Palette {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                base: Style::default().bg(Color::White).fg(Color::Black),
                accent: Color::Blue,
                muted: Color::DarkGray,
            },
            Theme::Dark => Self {
                base: Style::default().bg(Color::Black).fg(Color::White),
                accent: Color::Cyan,
                muted: Color::Gray,
            },
        }
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

pub fn draw(frame: &mut Frame, app: &mut App) {
    let state = app.dashboard.state();
    let palette = Palette::from(*state.theme());

    frame.render_widget(Block::default().style(palette.base), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(frame.area());

    frame.render_widget(header(state, &palette), chunks[0]);

    let page = state.table_page();
    let rows = page.rows.iter().map(|task| row(task)).collect::<Vec<_>>();
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Percentage(35),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(9),
        ],
    )
    .header(
        Row::new(vec!["Title", "Description", "Due Date", "Priority", "Status"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .title(format!("Tasks ({})", page.total)),
    )
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("> ");
    frame.render_stateful_widget(table, chunks[1], &mut app.table);

    let footer = match app.searching.as_ref() {
        Some(input) => Paragraph::new(Line::from(vec![
            Span::styled("Search by title: ", Style::default().fg(palette.accent)),
            Span::raw(input.as_str()),
        ])),
        None => Paragraph::new(Line::from(vec![
            Span::styled(
                format!("Page {}/{}  ", page.page + 1, page.pages),
                Style::default().fg(palette.accent),
            ),
            Span::styled(
                "a add  e edit  d delete  c complete  f filter  / search  1-3 sort  n/p page  t theme  r reload  q quit",
                Style::default().fg(palette.muted),
            ),
        ])),
    };
    frame.render_widget(
        footer.block(Block::default().borders(Borders::ALL)),
        chunks[2],
    );

    if let Some(form) = state.form() {
        draw_form(frame, form, app.focus, &palette);
    }
}

fn header<'a>(state: &'a DashboardState, palette: &Palette) -> Paragraph<'a> {
    let sort = match state.sort() {
        Some(sort) => format!("{} {}", sort.column, sort.direction),
        None => "none".to_owned(),
    };

    Paragraph::new(vec![
        Line::from(Span::styled(
            TITLE,
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "Filter: {}   Search: {}   Sort: {}   Theme: {}",
            state.filter(),
            if state.search().is_empty() {
                "-"
            } else {
                state.search().as_str()
            },
            sort,
            state.theme(),
        )),
    ])
    .block(Block::default().borders(Borders::BOTTOM))
}

fn row(task: &Task) -> Row<'_> {
    let status = if *task.completed() {
        Span::styled("Done", Style::default().fg(Color::Green))
    } else {
        Span::styled("Pending", Style::default().fg(Color::Blue))
    };

    Row::new(vec![
        Cell::from(task.title().as_str()),
        Cell::from(task.description().as_str()),
        Cell::from(task.due_date().format("%Y-%m-%d").to_string()),
        Cell::from(Span::styled(
            task.priority().to_string(),
            Style::default().fg(priority_color(*task.priority())),
        )),
        Cell::from(status),
    ])
}

fn draw_form(frame: &mut Frame, form: &TaskForm, focus: FormField, palette: &Palette) {
    let area = centered(frame.area(), 60, 14);
    let title = if form.editing.is_some() {
        "Edit Task"
    } else {
        "Add Task"
    };

    let mut lines = Vec::new();
    for field in FormField::iter() {
        let marker = if field == focus { "> " } else { "  " };
        let value = match field {
            FormField::Priority => match form.priority {
                Some(priority) => Span::styled(
                    format!("< {priority} >"),
                    Style::default().fg(priority_color(priority)),
                ),
                None => Span::styled("< choose >", Style::default().fg(palette.muted)),
            },
            _ => Span::raw(form.value(field)),
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("{marker}{field}: "),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            value,
        ]));
    }

    lines.push(Line::from(""));
    for error in &form.errors {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Enter save  Esc cancel  Tab next field",
        Style::default().fg(palette.muted),
    )));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .style(palette.base)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.accent))
                    .title(title),
            ),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
