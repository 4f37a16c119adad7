use macroquad::prelude::*;

const PRESET_SPEEDS: [f32; 4] = [0.25, 0.5, 1.0, 2.0];
const SNAP_THRESHOLD: f32 = 0.03;

/// Bottom bar with a play/pause button and a simulation speed slider
pub struct StepControls {
    speed_dragging: bool,

    height: f32,
    margin: f32,
    play_button_size: f32,
    bar_height: f32,
    speed_slider_width: f32,
    speed_handle_size: f32,

    min_speed: f32,
    max_speed: f32,
}

struct Layout {
    top: f32,
    bar_y: f32,
    play_button: Vec2,
    slider_x: f32,
    handle_x: f32,
}

impl StepControls {
    pub fn new() -> Self {
        Self {
            speed_dragging: false,

            height: 60.0,
            margin: 40.0,
            play_button_size: 32.0,
            bar_height: 6.0,
            speed_slider_width: 200.0,
            speed_handle_size: 12.0,

            min_speed: 0.1,
            max_speed: 3.0,
        }
    }

    fn normalized(&self, speed: f32) -> f32 {
        ((speed - self.min_speed) / (self.max_speed - self.min_speed)).clamp(0.0, 1.0)
    }

    fn layout(&self, speed: f32) -> Layout {
        let top = screen_height() - self.height;
        let bar_y = top + 25.0;
        let slider_x = screen_width() - self.margin - self.speed_slider_width;
        Layout {
            top,
            bar_y,
            play_button: Vec2::new(self.margin, bar_y),
            slider_x,
            handle_x: slider_x + self.normalized(speed) * self.speed_slider_width,
        }
    }

    fn on_play_button(&self, layout: &Layout, mouse: Vec2) -> bool {
        (mouse - layout.play_button).abs().max_element() <= self.play_button_size / 2.0
    }

    fn on_speed_handle(&self, layout: &Layout, mouse: Vec2) -> bool {
        (mouse.x - layout.handle_x).abs() <= self.speed_handle_size / 2.0
            && (mouse.y - layout.bar_y).abs() <= self.speed_handle_size / 2.0
    }

    fn on_speed_slider(&self, layout: &Layout, mouse: Vec2) -> bool {
        mouse.x >= layout.slider_x && mouse.x <= layout.slider_x + self.speed_slider_width
            && (mouse.y - layout.bar_y).abs() <= self.speed_handle_size / 2.0
    }

    /// Returns true when the mouse is over the bar, the world should then ignore it
    pub fn handle_input(&mut self, paused: &mut bool, speed: &mut f32) -> bool {
        let layout = self.layout(*speed);
        let mouse = Vec2::from(mouse_position());
        let mouse_in_bar = mouse.y >= layout.top;

        if mouse_in_bar && is_mouse_button_pressed(MouseButton::Left) {
            if self.on_play_button(&layout, mouse) {
                *paused = !*paused;
            } else if self.on_speed_handle(&layout, mouse) || self.on_speed_slider(&layout, mouse) {
                self.speed_dragging = true;
            }
        }

        if self.speed_dragging && is_mouse_button_down(MouseButton::Left) {
            let normalized_x = ((mouse.x - layout.slider_x) / self.speed_slider_width).clamp(0.0, 1.0);
            let raw_speed = self.min_speed + normalized_x * (self.max_speed - self.min_speed);

            *speed = PRESET_SPEEDS.iter()
                .copied()
                .find(|&preset| (normalized_x - self.normalized(preset)).abs() < SNAP_THRESHOLD)
                .unwrap_or(raw_speed);
        }

        if is_mouse_button_released(MouseButton::Left) {
            self.speed_dragging = false;
        }

        mouse_in_bar || self.speed_dragging
    }

    pub fn draw(&self, paused: bool, speed: f32) {
        let layout = self.layout(speed);
        let mouse = Vec2::from(mouse_position());
        let Vec2 { x: play_x, y: play_y } = layout.play_button;

        draw_rectangle(0.0, layout.top, screen_width(), self.height, Color::new(0.1, 0.1, 0.1, 0.9));

        let button_color = if self.on_play_button(&layout, mouse) {
            Color::new(0.8, 0.8, 0.8, 1.0)
        } else {
            Color::new(0.6, 0.6, 0.6, 1.0)
        };
        draw_circle(play_x, play_y, self.play_button_size / 2.0, button_color);

        if paused {
            let triangle_size = 8.0;
            let v1 = Vec2::new(play_x - triangle_size / 2.0, play_y - triangle_size / 2.0);
            let v2 = Vec2::new(play_x - triangle_size / 2.0, play_y + triangle_size / 2.0);
            let v3 = Vec2::new(play_x + triangle_size / 2.0, play_y);
            draw_triangle(v1, v2, v3, BLACK);
        } else {
            let (bar_width, bar_height, bar_spacing) = (3.0, 10.0, 2.0);
            draw_rectangle(play_x - bar_spacing - bar_width, play_y - bar_height / 2.0, bar_width, bar_height, BLACK);
            draw_rectangle(play_x + bar_spacing, play_y - bar_height / 2.0, bar_width, bar_height, BLACK);
        }

        draw_text("Speed:", layout.slider_x - 50.0, layout.top + 15.0, 14.0, LIGHTGRAY);
        draw_rectangle(layout.slider_x, layout.bar_y - self.bar_height / 2.0,
            self.speed_slider_width, self.bar_height, Color::new(0.4, 0.4, 0.4, 1.0));

        let handle_color = if self.on_speed_handle(&layout, mouse) || self.speed_dragging {
            Color::new(0.9, 0.6, 0.2, 1.0)
        } else {
            Color::new(0.7, 0.5, 0.2, 1.0)
        };
        draw_circle(layout.handle_x, layout.bar_y, self.speed_handle_size / 2.0, handle_color);
        draw_circle(layout.handle_x, layout.bar_y, self.speed_handle_size / 2.0 - 2.0, WHITE);

        draw_text(&format!("{speed:.2}x"), layout.slider_x + self.speed_slider_width + 10.0, layout.top + 15.0, 14.0, WHITE);

        for preset in PRESET_SPEEDS {
            let preset_x = layout.slider_x + self.normalized(preset) * self.speed_slider_width;
            let snapped = (speed - preset).abs() < 0.01;
            let (marker_color, line_width, line_height) = if snapped {
                (Color::new(1.0, 0.7, 0.3, 1.0), 2.0, 12.0)
            } else {
                (Color::new(0.6, 0.6, 0.6, 0.8), 1.0, 8.0)
            };
            draw_line(preset_x, layout.bar_y - line_height, preset_x, layout.bar_y + line_height, line_width, marker_color);

            if preset == 1.0 {
                draw_text("1x", preset_x - 8.0, layout.bar_y - 18.0, 12.0, marker_color);
            }
        }
    }
}
