use macroquad::prelude::*;
use i_triangle::float::triangulatable::Triangulatable;

/// Fills any simple polygon, concave ones included
pub fn draw_polygon(points: &[Vec2], color: Color) {
    let triangulation = points.triangulate().to_triangulation();

    let mesh = Mesh {
        vertices: triangulation.points.iter().map(|point| {
            Vertex {
                position: Vec3::new(point.x, point.y, 0.0),
                uv: Vec2::default(),
                color: color.into(),
                normal: Vec4::ZERO
            }
        }).collect(),
        indices: triangulation.indices,
        texture: None,
    };

    draw_mesh(&mesh);
}

pub fn draw_polygon_outline(points: &[Vec2], thickness: f32, color: Color) {
    for (i, start) in points.iter().enumerate() {
        let end = points[(i + 1) % points.len()];
        draw_line(start.x, start.y, end.x, end.y, thickness, color);
    }
}

pub fn circle_points(center: Vec2, radius: f32, segments: u32) -> Vec<Vec2> {
    (0..segments)
        .map(|i| center + Vec2::from_angle(i as f32 * std::f32::consts::TAU / segments as f32) * radius)
        .collect()
}

pub fn draw_polygon_circle(center: Vec2, radius: f32, segments: u32, color: Color) {
    draw_polygon(&circle_points(center, radius, segments), color);
}
