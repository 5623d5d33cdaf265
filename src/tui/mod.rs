// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! A ratatui + crossterm front-end around a [`NetworkScene`]: the canvas shows the items,
//! the mouse drives the scene's pointer contract, and a small inline editor handles
//! [`SceneEvent::EditRequested`] for text-bearing nodes.

use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Points, Rectangle},
        Block, Borders, Clear, Paragraph,
    },
};

use crate::gateway::DiagramGateway;
use crate::model::{ConnectorId, ConnectorStyle, NodeId, NodeKind, PenStyle, Point};
use crate::scene::{
    ItemRef, Modifiers, NetworkScene, PointerButton, PointerEvent, Route, SceneEvent,
    SceneKey,
};

mod demo;
mod theme;
mod viewport;

pub use demo::demo_gateway;
use theme::TuiTheme;
use viewport::Viewport;

const FOOTER_BRAND: &str = "plotnet";
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
const ROUTE_SEGMENTS: usize = 24;
const PAN_COLUMNS: i32 = 4;
const PAN_ROWS: i32 = 2;
const ZOOM_IN: f64 = 0.8;
const ZOOM_OUT: f64 = 1.25;

/// Runs the interactive editor until the user quits.
///
/// The scene is expected to hold a diagram already; every mutation is persisted through
/// its gateway as it happens.
pub fn run<G: DiagramGateway>(scene: NetworkScene<G>) -> Result<NetworkScene<G>, Box<dyn Error>> {
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(scene, TuiTheme::from_env());

    while !app.should_quit {
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key);
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse, Instant::now()),
                _ => {}
            }
        }
    }

    Ok(app.scene)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Editor {
    node_id: NodeId,
    kind: NodeKind,
    buffer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Status {
    text: String,
    error: bool,
}

#[derive(Debug, Clone, Copy)]
struct Click {
    at: Instant,
    column: u16,
    row: u16,
}

struct App<G: DiagramGateway> {
    scene: NetworkScene<G>,
    theme: TuiTheme,
    viewport: Viewport,
    fit_pending: bool,
    editor: Option<Editor>,
    status: Option<Status>,
    last_click: Option<Click>,
    should_quit: bool,
}

impl<G: DiagramGateway> App<G> {
    fn new(scene: NetworkScene<G>, theme: TuiTheme) -> Self {
        Self {
            scene,
            theme,
            viewport: Viewport::default(),
            fit_pending: true,
            editor: None,
            status: None,
            last_click: None,
            should_quit: false,
        }
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(Status { text: text.into(), error: false });
    }

    fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(Status { text: text.into(), error: true });
    }

    // ---- Keyboard ----

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.editor.is_some() {
            return self.handle_editor_key(key);
        }

        if let Some(scene_key) = scene_key(&key) {
            self.scene.key_press(scene_key);
            self.after_scene_input();
            return true;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('+') | KeyCode::Char('=') => self.viewport.zoom(ZOOM_IN),
            KeyCode::Char('-') => self.viewport.zoom(ZOOM_OUT),
            KeyCode::Char('0') => self.fit_pending = true,
            KeyCode::Char('p') => self.cycle_selected_pen(),
            KeyCode::Left => self.viewport.pan(-PAN_COLUMNS, 0),
            KeyCode::Right => self.viewport.pan(PAN_COLUMNS, 0),
            KeyCode::Up => self.viewport.pan(0, -PAN_ROWS),
            KeyCode::Down => self.viewport.pan(0, PAN_ROWS),
            KeyCode::Enter => match self.scene.selected_items().as_slice() {
                [item] => {
                    let item = item.clone();
                    self.request_edit(&item);
                }
                _ => return false,
            },
            KeyCode::Char(c) => {
                let Some(kind) = addition_kind(c) else {
                    return false;
                };
                match self.scene.start_addition_mode(kind, "") {
                    Ok(()) => self.set_status(format!("Click to place {kind}")),
                    Err(err) => self.set_error(err.to_string()),
                }
            }
            _ => return false,
        }
        true
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> bool {
        let Some(editor) = self.editor.as_mut() else {
            return false;
        };
        match key.code {
            KeyCode::Esc => {
                self.editor = None;
                self.set_status("Edit cancelled");
            }
            KeyCode::Enter => self.commit_editor(),
            KeyCode::Backspace => {
                editor.buffer.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                editor.buffer.push(c);
            }
            _ => return false,
        }
        true
    }

    fn commit_editor(&mut self) {
        let Some(editor) = self.editor.take() else {
            return;
        };
        let result = if editor.kind == NodeKind::Note {
            let height = self
                .scene
                .document()
                .and_then(|document| document.node(&editor.node_id))
                .map(|node| node.height())
                .unwrap_or_default();
            self.scene.set_note_text(&editor.node_id, editor.buffer, height)
        } else {
            self.scene.set_node_text(&editor.node_id, editor.buffer)
        };
        match result {
            Ok(()) => self.set_status("Text updated"),
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn request_edit(&mut self, item: &ItemRef) {
        match item {
            ItemRef::Node(node_id) => self.open_editor(node_id),
            ItemRef::Connector(_) => self.set_status("Press p to change the line style"),
        }
    }

    fn open_editor(&mut self, node_id: &NodeId) {
        let Some(node) = self.scene.document().and_then(|document| document.node(node_id)) else {
            return;
        };
        let kind = node.kind();
        if !kind.is_text_item() && kind != NodeKind::Note {
            self.set_status(format!("{kind} items have no text to edit"));
            return;
        }
        debug!(node_id = node_id.as_str(); "Editor opened");
        self.editor = Some(Editor { node_id: node_id.clone(), kind, buffer: node.text().to_owned() });
    }

    fn cycle_selected_pen(&mut self) {
        let selected: Vec<ConnectorId> = self
            .scene
            .selected_items()
            .iter()
            .filter_map(|item| item.connector_id().cloned())
            .collect();
        if selected.is_empty() {
            self.set_status("Select a connector first");
            return;
        }
        for connector_id in selected {
            let Some(style) = self
                .scene
                .document()
                .and_then(|document| document.connector(&connector_id))
                .map(|connector| connector.style())
            else {
                continue;
            };
            let style = ConnectorStyle { pen: next_pen(style.pen), ..style };
            if let Err(err) = self.scene.set_connector_style(&connector_id, style) {
                self.set_error(err.to_string());
                return;
            }
        }
    }

    // ---- Mouse ----

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let Some(pos) = self.viewport.to_scene(mouse.column, mouse.row) else {
            self.release_outside_canvas(mouse);
            return;
        };
        if self.editor.is_some() && matches!(mouse.kind, MouseEventKind::Down(_)) {
            self.commit_editor();
        }
        let modifiers = Modifiers {
            ctrl: mouse.modifiers.contains(KeyModifiers::CONTROL),
            shift: mouse.modifiers.contains(KeyModifiers::SHIFT),
            alt: mouse.modifiers.contains(KeyModifiers::ALT),
        };
        let pointer = |button| PointerEvent { pos, button, modifiers };

        match mouse.kind {
            MouseEventKind::Down(button) => {
                let event = pointer(pointer_button(button));
                if event.button == PointerButton::Left && self.is_double_click(&mouse, now) {
                    self.last_click = None;
                    self.scene.mouse_double_click(event);
                } else {
                    if event.button == PointerButton::Left {
                        self.last_click = Some(Click { at: now, column: mouse.column, row: mouse.row });
                    }
                    self.scene.mouse_press(event);
                }
            }
            MouseEventKind::Up(button) => self.scene.mouse_release(pointer(pointer_button(button))),
            MouseEventKind::Drag(button) => self.scene.mouse_move(pointer(pointer_button(button))),
            MouseEventKind::Moved => self.scene.mouse_move(pointer(PointerButton::Left)),
            MouseEventKind::ScrollUp => self.viewport.zoom(ZOOM_IN),
            MouseEventKind::ScrollDown => self.viewport.zoom(ZOOM_OUT),
            _ => {}
        }
        self.after_scene_input();
    }

    /// A drag released off the canvas still ends at the nearest edge cell.
    fn release_outside_canvas(&mut self, mouse: MouseEvent) {
        if let MouseEventKind::Up(button) = mouse.kind {
            let edge = self.viewport.to_scene_clamped(mouse.column, mouse.row);
            if let (true, Some(pos)) = (self.scene.is_dragging(), edge) {
                self.scene.mouse_release(PointerEvent {
                    pos,
                    button: pointer_button(button),
                    modifiers: Modifiers::NONE,
                });
                self.after_scene_input();
            }
        }
        self.scene.pointer_left();
    }

    fn is_double_click(&self, mouse: &MouseEvent, now: Instant) -> bool {
        self.last_click.is_some_and(|click| {
            click.column == mouse.column
                && click.row == mouse.row
                && now.saturating_duration_since(click.at) <= DOUBLE_CLICK_WINDOW
        })
    }

    // ---- Scene notifications ----

    fn after_scene_input(&mut self) {
        for event in self.scene.drain_events() {
            match event {
                SceneEvent::ItemAdded { kind, .. } => self.set_status(format!("Added {kind}")),
                SceneEvent::ItemsMoved(ids) => {
                    let noun = if ids.len() == 1 { "item" } else { "items" };
                    self.set_status(format!("Moved {} {noun}", ids.len()));
                }
                SceneEvent::EditRequested(item) => self.request_edit(&item),
                SceneEvent::HideEditorRequested => self.editor = None,
                SceneEvent::CancelAddition => self.set_status("Addition cancelled"),
            }
        }
    }

    fn mode_label(&self) -> Option<String> {
        if self.scene.link_mode() {
            return Some("LINK".to_owned());
        }
        self.scene.addition_descriptor().map(|(kind, _)| format!("ADD {kind}"))
    }

    /// Union of all item bounds, `None` for an empty scene.
    fn scene_bounds(&self) -> Option<crate::model::Rect> {
        let mut items = self.scene.node_items().map(|item| item.bounds());
        let first = items.next()?;
        let (mut left, mut top, mut right, mut bottom) =
            (first.left(), first.top(), first.right(), first.bottom());
        for bounds in items {
            left = left.min(bounds.left());
            top = top.min(bounds.top());
            right = right.max(bounds.right());
            bottom = bottom.max(bounds.bottom());
        }
        Some(crate::model::Rect::new(
            Point::finite_or_origin(left, top),
            crate::model::Size::new(right - left, bottom - top),
        ))
    }
}

fn scene_key(key: &KeyEvent) -> Option<SceneKey> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => Some(SceneKey::Escape),
        KeyCode::Delete => Some(SceneKey::Delete),
        KeyCode::Backspace => Some(SceneKey::Backspace),
        KeyCode::Char('c') if ctrl => Some(SceneKey::Copy),
        KeyCode::Char('v') if ctrl => Some(SceneKey::Paste),
        KeyCode::Char('z') if ctrl => Some(SceneKey::Undo),
        KeyCode::Char('y') if ctrl => Some(SceneKey::Redo),
        KeyCode::Char('u') if !ctrl => Some(SceneKey::Undo),
        KeyCode::Char('r') if !ctrl => Some(SceneKey::Redo),
        _ => None,
    }
}

fn addition_kind(c: char) -> Option<NodeKind> {
    match c {
        'e' => Some(NodeKind::Event),
        'c' => Some(NodeKind::Character),
        'n' => Some(NodeKind::Note),
        'i' => Some(NodeKind::Icon),
        'm' => Some(NodeKind::Image),
        't' => Some(NodeKind::Text),
        _ => None,
    }
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Left,
        MouseButton::Right => PointerButton::Right,
        MouseButton::Middle => PointerButton::Middle,
    }
}

fn next_pen(pen: PenStyle) -> PenStyle {
    match pen {
        PenStyle::Solid => PenStyle::Dash,
        PenStyle::Dash => PenStyle::Dot,
        PenStyle::Dot => PenStyle::DashDot,
        PenStyle::DashDot => PenStyle::Solid,
    }
}

// ---- Rendering ----

fn draw<G: DiagramGateway>(frame: &mut Frame<'_>, app: &mut App<G>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1), Constraint::Length(1)])
        .split(frame.size());

    let mode = app.mode_label();
    let title = match app.scene.document() {
        Some(document) => format!(" {} · {} ", document.name(), document.kind()),
        None => " no diagram ".to_owned(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(app.theme.border_style(mode.is_some()));
    app.viewport.set_area(block.inner(chunks[0]));
    if app.fit_pending {
        if let Some(bounds) = app.scene_bounds() {
            app.viewport.fit(bounds);
        }
        app.fit_pending = false;
    }

    let scene = &app.scene;
    let theme = &app.theme;
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(app.viewport.x_bounds())
        .y_bounds(app.viewport.y_bounds())
        .paint(|ctx| paint_scene(ctx, scene, theme));
    frame.render_widget(canvas, chunks[0]);

    frame.render_widget(Paragraph::new(status_line(app, mode)), chunks[1]);
    frame.render_widget(Paragraph::new(footer_line(&app.theme)), chunks[2]);

    if let Some(editor) = &app.editor {
        let area = editor_area(chunks[0]);
        let text = format!("{}▏", editor.buffer);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(text).style(app.theme.editor_style()).block(
                Block::default().borders(Borders::ALL).title(format!(" Edit {} ", editor.kind)),
            ),
            area,
        );
    }
}

fn paint_scene<G: DiagramGateway>(ctx: &mut Context<'_>, scene: &NetworkScene<G>, theme: &TuiTheme) {
    for item in scene.connector_items() {
        let pen = scene
            .document()
            .and_then(|document| document.connector(item.connector_id()))
            .map(|connector| connector.pen())
            .unwrap_or_default();
        paint_route(ctx, item.route(), pen, theme.connector_color(item.is_selected()));
    }
    if let Some(route) = scene.link_placeholder() {
        paint_route(ctx, &route, PenStyle::Dash, theme.placeholder_color());
    }

    let mut sockets = Vec::new();
    for item in scene.node_items() {
        let color = theme.node_color(item.kind(), item.is_selected());
        let body = item.body();
        if item.shape().is_radial() {
            let center = body.center();
            ctx.draw(&Circle { x: center.x(), y: -center.y(), radius: body.size().width / 2.0, color });
        } else {
            ctx.draw(&Rectangle {
                x: body.left(),
                y: -body.bottom(),
                width: body.size().width,
                height: body.size().height,
                color,
            });
        }
        sockets.extend(item.sockets().iter().map(|socket| {
            let pos = item.socket_position(socket.angle());
            (pos.x(), -pos.y())
        }));
    }
    ctx.draw(&Points { coords: &sockets, color: theme.socket_color() });

    ctx.layer();
    for item in scene.node_items() {
        let body = item.body();
        let label = Line::styled(
            item.label().to_owned(),
            Style::default().fg(theme.node_color(item.kind(), item.is_selected())),
        );
        ctx.print(body.left(), -body.center().y(), label);
    }
}

fn paint_route(ctx: &mut Context<'_>, route: &Route, pen: PenStyle, color: Color) {
    let points: Vec<Point> = (0..=ROUTE_SEGMENTS)
        .map(|i| route.point_at(i as f64 / ROUTE_SEGMENTS as f64))
        .collect();
    for (i, pair) in points.windows(2).enumerate() {
        let visible = match pen {
            PenStyle::Solid => true,
            PenStyle::Dash => i % 2 == 0,
            PenStyle::Dot => i % 3 == 0,
            PenStyle::DashDot => i % 4 != 3,
        };
        if visible {
            ctx.draw(&CanvasLine {
                x1: pair[0].x(),
                y1: -pair[0].y(),
                x2: pair[1].x(),
                y2: -pair[1].y(),
                color,
            });
        }
    }
}

fn status_line<G: DiagramGateway>(app: &App<G>, mode: Option<String>) -> Line<'static> {
    let mut spans = Vec::new();
    if let Some(mode) = mode {
        spans.push(Span::styled(format!("[{mode}] "), app.theme.footer_key_style()));
    }
    let selected = app.scene.selected_items().len();
    if selected > 0 {
        spans.push(Span::styled(format!("{selected} selected  "), app.theme.footer_label_style()));
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(status.text.clone(), app.theme.status_style(status.error)));
    }
    Line::from(spans)
}

fn footer_line(theme: &TuiTheme) -> Line<'static> {
    const HINTS: [(&str, &str); 10] = [
        ("e/c/n/i/m/t", "add"),
        ("Del", "remove"),
        ("^C/^V", "copy/paste"),
        ("u/r", "undo/redo"),
        ("p", "pen"),
        ("Enter", "edit"),
        ("arrows", "pan"),
        ("+/-/0", "zoom"),
        ("Esc", "cancel"),
        ("q", "quit"),
    ];
    let mut spans = vec![Span::styled(format!("{FOOTER_BRAND} "), theme.footer_key_style())];
    for (key, label) in HINTS {
        spans.push(Span::styled(key, theme.footer_key_style()));
        spans.push(Span::styled(format!(" {label}  "), theme.footer_label_style()));
    }
    Line::from(spans)
}

fn editor_area(canvas: ratatui::layout::Rect) -> ratatui::layout::Rect {
    let width = canvas.width.saturating_sub(4).min(60);
    let height = 3.min(canvas.height);
    ratatui::layout::Rect {
        x: canvas.x + (canvas.width.saturating_sub(width)) / 2,
        y: canvas.y + canvas.height.saturating_sub(height + 1),
        width,
        height,
    }
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
}


#[cfg(test)]
mod tests;
