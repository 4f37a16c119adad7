use arcade_physics::{ Body, BodyHandle, Shape, World };
use macroquad::prelude::*;

use crate::{ draw_polygon::*, scenes::TriggerCount };

fn body_color(body: &Body, selected: bool) -> Color {
    let color = if body.is_ghost() {
        GREEN.with_alpha(0.25)
    } else if body.is_anchored() {
        GRAY
    } else {
        WHITE
    };
    if selected { YELLOW } else { color }
}

pub fn render_world(world: &World, selected: Option<BodyHandle>) {
    clear_background(BLACK);

    for (handle, body) in world.bodies() {
        let color = body_color(body, selected == Some(handle));

        match body.shape() {
            Shape::Circle(circle) => {
                draw_polygon_circle(body.position, circle.radius(), 30, color);
                // show the rotation
                let tip = body.position + Vec2::from_angle(body.angle) * circle.radius();
                draw_line(body.position.x, body.position.y, tip.x, tip.y, 0.08, BLACK);
            },
            Shape::Polygon(_) => {
                let vertices = body.world_vertices();
                draw_polygon(&vertices, color);
                draw_polygon_outline(&vertices, 0.05, color.with_alpha(1.));
            },
        }

        if body.touching().is_some() && !body.is_anchored() {
            let normal = body.touch_normal();
            draw_line(
                body.position.x, body.position.y,
                body.position.x + normal.x, body.position.y + normal.y,
                0.05, RED,
            );
        }

        if let Some(count) = body.parent::<TriggerCount>() {
            let text = &format!("{}", count.get());
            let size = 32;
            let scale: f32 = 0.05;
            let text_size = measure_text(text, None, size, scale);
            draw_text_ex(text, body.position.x - text_size.width / 2., body.position.y - text_size.height / 2., TextParams {
                font_size: size,
                font_scale: -scale,
                font_scale_aspect: -1.,
                color: WHITE,
                ..Default::default()
            });
        }
    }
}
