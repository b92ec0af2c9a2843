use std::collections::HashMap;

use crossterm::event::{Event, KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::constants::{CELL_HEIGHT_PX, CELL_WIDTH_PX};
use crate::input::InputEvent;
use crate::types::{Vector2D, Viewport};

pub fn cell_to_pixels(column: u16, row: u16) -> Vector2D {
    Vector2D::new(
        (column as f64 + 0.5) * CELL_WIDTH_PX,
        (row as f64 + 0.5) * CELL_HEIGHT_PX,
    )
}

pub fn viewport_for(columns: u16, rows: u16) -> Viewport {
    Viewport::new(columns as f64 * CELL_WIDTH_PX, rows as f64 * CELL_HEIGHT_PX)
}

pub fn translate_mouse(mouse: &MouseEvent) -> Option<InputEvent> {
    let point = cell_to_pixels(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left) => Some(InputEvent::PointerMove(point)),
        MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::Fire(point)),
        MouseEventKind::Down(MouseButton::Right) => Some(InputEvent::TouchStart(vec![point])),
        MouseEventKind::Drag(MouseButton::Right) => Some(InputEvent::TouchMove(vec![point])),
        MouseEventKind::Up(MouseButton::Right) => Some(InputEvent::TouchEnd),
        _ => None,
    }
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

// --- SimulatedInput for debugging ---
pub struct SimulatedInput {
    events: HashMap<u64, Vec<Event>>,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Vec<Event>>) -> Self {
        SimulatedInput { events }
    }

    pub fn demo(columns: u16, rows: u16, quit_at: u64) -> Self {
        let mut timeline: HashMap<u64, Vec<Event>> = HashMap::new();
        let (cx, cy) = (columns / 2, rows / 2);

        for step in 0..20u16 {
            let column = cx.saturating_sub(10) + step;
            timeline
                .entry(1 + step as u64)
                .or_default()
                .push(mouse(MouseEventKind::Moved, column, cy));
        }
        for (frame, (column, row)) in [
            (25, (0, 0)),
            (30, (columns.saturating_sub(1), 0)),
            (35, (0, rows.saturating_sub(1))),
            (40, (columns.saturating_sub(1), rows.saturating_sub(1))),
        ] {
            timeline
                .entry(frame)
                .or_default()
                .push(mouse(MouseEventKind::Down(MouseButton::Left), column, row));
        }
        timeline
            .entry(50)
            .or_default()
            .push(mouse(MouseEventKind::Down(MouseButton::Right), cx, cy));
        for step in 1..10u16 {
            timeline
                .entry(50 + step as u64)
                .or_default()
                .push(mouse(MouseEventKind::Drag(MouseButton::Right), cx, cy.saturating_sub(step)));
        }
        timeline
            .entry(60)
            .or_default()
            .push(mouse(MouseEventKind::Up(MouseButton::Right), cx, cy.saturating_sub(9)));
        timeline
            .entry(quit_at)
            .or_default()
            .push(Event::Key(KeyCode::Char('q').into()));

        SimulatedInput::new(timeline)
    }

    pub fn take(&mut self, frame: u64) -> Vec<Event> {
        self.events.remove(&frame).unwrap_or_default()
    }
}
