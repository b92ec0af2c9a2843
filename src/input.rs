use crate::types::Vector2D;

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerMove(Vector2D),
    Fire(Vector2D),
    TouchStart(Vec<Vector2D>),
    TouchMove(Vec<Vector2D>),
    TouchEnd,
}

impl InputEvent {
    pub fn point(&self) -> Option<Vector2D> {
        match self {
            InputEvent::PointerMove(p) | InputEvent::Fire(p) => Some(*p),
            InputEvent::TouchStart(touches) | InputEvent::TouchMove(touches) => touches.first().copied(),
            InputEvent::TouchEnd => None,
        }
    }
}
