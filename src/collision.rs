use crate::types::GameObject;

/// Circle-circle overlap. Touching circles do not collide, and a radius sum
/// of zero or less never collides.
pub fn collides(a: &impl GameObject, b: &impl GameObject) -> bool {
    let reach = a.radius() + b.radius();
    if reach <= 0.0 {
        return false;
    }
    a.position().distance_to(b.position()) < reach
}
