use crate::constants::HEADING_OFFSET_DEGREES;
use crate::entities::Rocket;
use crate::input::InputEvent;
use crate::types::Vector2D;

#[derive(Debug, Default)]
pub struct RocketController {
    last_position: Option<Vector2D>,
    angle: f64,
    dragging: bool,
}

impl RocketController {
    pub fn new() -> Self {
        RocketController::default()
    }

    pub fn update_position(&mut self, event: &InputEvent, current: &Rocket) -> Rocket {
        let Some(point) = event.point() else {
            return *current;
        };

        if let Some(last) = self.last_position {
            let delta = point.sub(last);
            // A stationary input keeps the previous heading.
            if delta.x != 0.0 || delta.y != 0.0 {
                self.angle = delta.y.atan2(delta.x).to_degrees() + HEADING_OFFSET_DEGREES;
            }
        }
        self.last_position = Some(point);

        Rocket {
            position: point,
            angle: self.angle,
            ..*current
        }
    }

    pub fn start_dragging(&mut self) {
        self.dragging = true;
    }

    pub fn stop_dragging(&mut self) {
        self.dragging = false;
        self.last_position = None;
    }

    pub fn is_dragging_active(&self) -> bool {
        self.dragging
    }
}
