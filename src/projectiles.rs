use crate::entities::Projectile;
use crate::types::{Vector2D, Viewport};

pub fn fire(origin: Vector2D, target: Vector2D, multi_shot: bool, speed: f64, spread: f64) -> Vec<Projectile> {
    let heading = (target.y - origin.y).atan2(target.x - origin.x);
    let offsets: &[f64] = if multi_shot { &[0.0, -spread, spread] } else { &[0.0] };
    offsets
        .iter()
        .map(|offset| Projectile::new(origin, Vector2D::from_angle(heading + offset).scale(speed)))
        .collect()
}

pub fn advance_and_cull(projectiles: &[Projectile], viewport: Viewport) -> Vec<Projectile> {
    projectiles
        .iter()
        .filter_map(|projectile| {
            let mut next = *projectile;
            next.update();
            viewport.contains(next.position).then_some(next)
        })
        .collect()
}
