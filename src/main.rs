// src/main.rs

//! Demo world: a red drop falls through a blue sky. Click to move it, press
//! `x` to end the world.

use draw_world::{Canvas, Color, Posn, World};
use log::{error, info};

const WIDTH: i32 = 500;
const HEIGHT: i32 = 500;
const TICK_SECONDS: f64 = 0.1;
const DROP_RADIUS: i32 = 5;
const FALL_PER_TICK: i32 = 5;

struct ClickWorld {
    drop: Posn,
}

impl World for ClickWorld {
    fn on_tick(self: Box<Self>) -> Box<dyn World> {
        Box::new(ClickWorld {
            drop: Posn::new(self.drop.x, self.drop.y + FALL_PER_TICK),
        })
    }

    fn on_key_event(self: Box<Self>, key: &str) -> Box<dyn World> {
        if key == "x" {
            return self.end_of_world("bye");
        }
        self
    }

    fn on_click(self: Box<Self>, location: Posn) -> Box<dyn World> {
        Box::new(ClickWorld { drop: location })
    }

    fn draw(&self, canvas: &Canvas) -> bool {
        canvas.draw_rect(Posn::new(0, 0), WIDTH, HEIGHT, Color::Blue)
            && canvas.draw_disk(self.drop, DROP_RADIUS, Color::Red)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting draw-world demo...");
    let world = ClickWorld {
        drop: Posn::new(WIDTH / 2, 0),
    };
    match world.big_bang(WIDTH, HEIGHT, TICK_SECONDS) {
        Ok(_) => info!("draw-world demo finished."),
        Err(e) => {
            error!("draw-world demo failed: {}", e);
            std::process::exit(1);
        }
    }
}
