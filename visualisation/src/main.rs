mod draw_polygon;
mod scenes;
mod step_controls;
mod world_renderer;

use arcade_physics::{ BodyHandle, World };
use macroquad::{ prelude::*, ui::{ self, root_ui } };
use scenes::Scene;
use step_controls::StepControls;

const CAMERA_ZOOM_SPEED: f32 = 1.25;
const MAX_FRAME_TIME: f32 = 1. / 30.;
const KICK_STRENGTH: f32 = 3.;

fn window_conf() -> Conf {
    Conf {
        window_title: "Arcade physics".to_owned(),
        ..Default::default()
    }
}

fn load_scene(scene: &dyn Scene) -> World {
    let mut world = World::new();
    world.set_gravity(scene.gravity());
    scene.build(&mut world);
    world
}

#[macroquad::main(window_conf)]
async fn main() {
    let scenes = scenes::get_all_scenes();
    let mut scene_index = 0;
    let mut world = load_scene(scenes[scene_index].as_ref());

    let mut controls = StepControls::new();
    let mut cam_offset = Vec2::ZERO;
    let mut zoom = 1.;
    let mut paused = true;
    let mut speed = 1.;
    let mut grabbed: Option<BodyHandle> = None;

    let mouse_pos = |camera: &Camera2D| {
        camera.screen_to_world(Vec2::new(mouse_position().0, mouse_position().1))
    };

    // Setup ui skin
    {
        let label_style = root_ui().style_builder()
            .font_size(32)
            .text_color(WHITE)
            .build();
        let skin = ui::Skin {
            label_style,
            ..root_ui().default_skin()
        };
        root_ui().push_skin(&skin);
    }

    loop {
        // Setup camera
        let view = scenes[scene_index].view();
        let (cw, ch) = if screen_width() / screen_height() > view.w / view.h {
            ((screen_width() / screen_height()) * view.h, view.h)
        } else {
            (view.w, (screen_height() / screen_width()) * view.w)
        };
        let mut camera = Camera2D::from_display_rect(Rect {
            x: view.x + (view.w - cw) / 2.,
            y: view.y + (view.h - ch) / 2.,
            w: cw,
            h: ch,
        });
        let cam_centering_zoom = camera.zoom;
        let cam_centering_offset = camera.target;

        // Handle inputs
        let switch_to = if is_key_pressed(KeyCode::N) {
            Some((scene_index + 1) % scenes.len())
        } else if is_key_pressed(KeyCode::P) {
            Some((scene_index + scenes.len() - 1) % scenes.len())
        } else if is_key_pressed(KeyCode::R) {
            Some(scene_index)
        } else {
            None
        };
        if let Some(index) = switch_to {
            scene_index = index;
            world = load_scene(scenes[scene_index].as_ref());
            grabbed = None;
            cam_offset = Vec2::ZERO;
            zoom = 1.;
        }

        if is_key_pressed(KeyCode::Space) {
            paused = !paused;
        }

        let ui_has_mouse = controls.handle_input(&mut paused, &mut speed);

        camera.target = cam_offset + cam_centering_offset;
        camera.zoom = cam_centering_zoom * zoom;

        if !ui_has_mouse && is_mouse_button_down(MouseButton::Left) {
            cam_offset += mouse_delta_position() / camera.zoom;
        }

        camera.target = cam_offset + cam_centering_offset;

        let scroll = mouse_wheel().1;
        if scroll != 0. {
            let mouse_world_before = mouse_pos(&camera);

            zoom *= CAMERA_ZOOM_SPEED.powf(scroll.signum());

            camera.zoom = cam_centering_zoom * zoom;

            let mouse_world_after = mouse_pos(&camera);
            cam_offset += mouse_world_before - mouse_world_after;
            camera.target = cam_offset + cam_centering_offset;
        }

        camera.zoom = cam_centering_zoom * zoom;

        let scene = scenes[scene_index].as_ref();

        // Right drag flings a body
        let mouse_world = mouse_pos(&camera);
        if is_mouse_button_pressed(MouseButton::Right) {
            grabbed = world.bodies_at_point(mouse_world).last();
        }
        if is_mouse_button_released(MouseButton::Right)
            && let Some(body) = grabbed.take().and_then(|handle| world.body_mut(handle))
        {
            body.velocity += (mouse_world - body.position) * KICK_STRENGTH;
        }

        // Stepping
        if !paused {
            scene.before_update(&mut world);
            world.update(get_frame_time().min(MAX_FRAME_TIME) * speed);
        }

        // Drawing
        set_camera(&camera);
        world_renderer::render_world(&world, grabbed);

        if let Some(body) = grabbed.and_then(|handle| world.body(handle)) {
            draw_line(body.position.x, body.position.y, mouse_world.x, mouse_world.y, 0.05, ORANGE);
        }

        set_default_camera();
        controls.draw(paused, speed);

        root_ui().label(None, &format!("fps: {}", get_fps()));
        root_ui().label(None, &format!("scene {}/{}: {}", scene_index + 1, scenes.len(), scene.name()));
        root_ui().label(None, &format!("bodies: {}", world.len()));
        if paused {
            root_ui().label(None, "PAUSED");
        }

        next_frame().await;
    }
}
