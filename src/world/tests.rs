// src/world/tests.rs

use super::*;
use crate::color::Color;
use crate::display::{DisplayEvent, MockHandle, MouseClick};
use crate::handoff::hand_off;
use crate::keys::{KeySymbol, Modifiers};
use crate::test_support::wait_until;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Ends with "done" after `ticks_left` ticks.
struct Countdown {
    ticks_left: u32,
    draws: Arc<AtomicUsize>,
}

impl World for Countdown {
    fn on_tick(self: Box<Self>) -> Box<dyn World> {
        if self.ticks_left == 0 {
            return self.end_of_world("done");
        }
        Box::new(Countdown {
            ticks_left: self.ticks_left - 1,
            draws: self.draws,
        })
    }

    fn on_key_event(self: Box<Self>, _key: &str) -> Box<dyn World> {
        self
    }

    fn draw(&self, canvas: &Canvas) -> bool {
        self.draws.fetch_add(1, Ordering::SeqCst);
        canvas.draw_rect(Posn::new(0, 0), 10, 10, Color::Blue)
    }
}

/// Runs forever; "x" ends it with "bye", clicks are recorded.
struct Clicky {
    clicks: Arc<Mutex<Vec<Posn>>>,
}

impl World for Clicky {
    fn on_tick(self: Box<Self>) -> Box<dyn World> {
        self
    }

    fn on_key_event(self: Box<Self>, key: &str) -> Box<dyn World> {
        if key == "x" {
            return self.end_of_world("bye");
        }
        self
    }

    fn on_click(self: Box<Self>, location: Posn) -> Box<dyn World> {
        self.clicks.lock().unwrap().push(location);
        self
    }

    fn draw(&self, canvas: &Canvas) -> bool {
        canvas.draw_disk(Posn::new(5, 5), 3, Color::Red)
    }
}

struct Panicky;

impl World for Panicky {
    fn on_tick(self: Box<Self>) -> Box<dyn World> {
        panic!("tick failed");
    }

    fn on_key_event(self: Box<Self>, _key: &str) -> Box<dyn World> {
        self
    }

    fn draw(&self, _canvas: &Canvas) -> bool {
        true
    }
}

fn clicky() -> (Clicky, Arc<Mutex<Vec<Posn>>>) {
    let clicks = Arc::new(Mutex::new(Vec::new()));
    (
        Clicky {
            clicks: clicks.clone(),
        },
        clicks,
    )
}

/// Runs `world` with the mock driver on a background thread.
fn run_with_mock(
    mock: &MockHandle,
    width: i32,
    height: i32,
    world: Box<dyn World>,
) -> mpsc::Receiver<Result<Ending, WorldError>> {
    let (tx, rx) = mpsc::channel();
    let factory = mock.factory();
    thread::spawn(move || {
        let result = BigBang::new(width, height, 0.01).and_then(|b| b.with_driver(factory).run(world));
        let _ = tx.send(result);
    });
    // Shown only after every listener is registered.
    assert!(wait_until(|| mock.is_visible()));
    rx
}

fn click(button: u8, x: i32, y: i32) -> DisplayEvent {
    DisplayEvent::MouseButtonPress {
        button,
        x,
        y,
        modifiers: Modifiers::empty(),
    }
}

// --- Argument validation ---

#[test_log::test]
fn it_should_reject_each_non_positive_argument_by_name() {
    let cases: [(i32, i32, f64, &str, usize); 6] = [
        (0, 10, 1.0, "width", 1),
        (-3, 10, 1.0, "width", 1),
        (10, 0, 1.0, "height", 2),
        (10, -1, 1.0, "height", 2),
        (10, 10, 0.0, "tick_seconds", 3),
        (10, 10, -0.5, "tick_seconds", 3),
    ];
    for (width, height, tick, name, index) in cases {
        match BigBang::new(width, height, tick) {
            Err(WorldError::InvalidArgument {
                parameter, position, ..
            }) => {
                assert_eq!(parameter, name);
                assert_eq!(position, index);
            }
            other => panic!("expected InvalidArgument for {:?}, got {:?}", (width, height, tick), other),
        }
    }
}

#[test_log::test]
fn it_should_reject_nan_and_infinite_ticks() {
    assert!(matches!(
        BigBang::new(10, 10, f64::NAN),
        Err(WorldError::InvalidArgument { parameter: "tick_seconds", .. })
    ));
    assert!(matches!(
        BigBang::new(10, 10, f64::INFINITY),
        Err(WorldError::InvalidArgument { parameter: "tick_seconds", .. })
    ));
}

#[test_log::test]
fn it_should_accept_positive_arguments() {
    let big_bang = BigBang::new(1, 1, 0.25).unwrap();
    assert_eq!(big_bang.tick(), Duration::from_millis(250));
    assert!(BigBang::new(500, 500, 1e-9).is_ok());
}

#[test_log::test]
fn it_should_fail_big_bang_before_creating_anything() {
    let (world, _) = clicky();
    let err = world.big_bang(500, 0, 0.1).unwrap_err();
    assert!(err.to_string().contains("height"));
}

// --- StableWorld ---

#[test_log::test]
fn it_should_keep_a_stable_world_unchanged() {
    let stable = Box::new(StableWorld::new("over"));
    let original = &*stable as *const StableWorld as *const ();

    let next = stable.on_tick();
    assert_eq!(&*next as *const dyn World as *const (), original);
    let next = next.on_key_event("ENTER");
    assert_eq!(&*next as *const dyn World as *const (), original);
    let next = next.on_click(Posn::new(1, 2));
    assert_eq!(&*next as *const dyn World as *const (), original);

    assert!(!next.in_progress());
    assert_eq!(next.ending_message(), "over");
    assert!(next.draw(&Canvas::headless(1, 1)));
}

#[test_log::test]
fn it_should_use_defaults_for_optional_operations() {
    let (world, clicks) = clicky();
    assert!(world.in_progress());
    assert_eq!(world.ending_message(), DEFAULT_ENDING_MESSAGE);
    assert_eq!(world.title(), "Clicky");

    let ended = world.end_of_world("fin");
    assert!(!ended.in_progress());
    assert_eq!(ended.ending_message(), "fin");
    assert!(clicks.lock().unwrap().is_empty());

    let countdown = Box::new(Countdown {
        ticks_left: 0,
        draws: Arc::default(),
    });
    let same = countdown.on_click(Posn::new(3, 3));
    assert!(same.in_progress());
}

#[test_log::test]
fn it_should_strip_paths_and_generics_from_type_names() {
    assert_eq!(short_type_name("draw_world::world::tests::Clicky"), "Clicky");
    assert_eq!(short_type_name("my::Wrapper<other::Inner>"), "Wrapper");
    assert_eq!(short_type_name("Plain"), "Plain");
}

// --- Click mapping ---

#[test_log::test]
fn it_should_map_clicks_one_to_one_at_native_size() {
    let at = MouseClick {
        button: 0,
        x: 123,
        y: 456,
        window_width: 500,
        window_height: 500,
    };
    assert_eq!(scale_click(&at, 500, 500), Posn::new(123, 456));
}

#[test_log::test]
fn it_should_scale_clicks_from_a_shrunken_window() {
    let at = MouseClick {
        button: 0,
        x: 100,
        y: 50,
        window_width: 250,
        window_height: 250,
    };
    assert_eq!(scale_click(&at, 500, 500), Posn::new(200, 100));
}

#[test_log::test]
fn it_should_truncate_scaled_clicks() {
    let at = MouseClick {
        button: 0,
        x: 2,
        y: 1,
        window_width: 3,
        window_height: 3,
    };
    // 10*2/3 = 6.67, 10*1/3 = 3.33
    assert_eq!(scale_click(&at, 10, 10), Posn::new(6, 3));
}

// --- Dispatcher ---

fn dispatcher(world: Box<dyn World>) -> (Dispatcher, crate::handoff::HandOffReceiver<Box<dyn World>>) {
    let (done_tx, done_rx) = hand_off();
    let canvas = Canvas::headless(100, 100);
    (
        Dispatcher::new(world, canvas, Arc::new(AtomicBool::new(false)), done_tx),
        done_rx,
    )
}

#[test_log::test]
fn it_should_only_end_the_loop_after_a_tick() {
    let (world, _) = clicky();
    let (mut dispatcher, done) = dispatcher(Box::new(world));

    assert!(dispatcher.handle(LoopEvent::Key("x".to_string())));
    assert!(!dispatcher.world().unwrap().in_progress());
    assert!(done.try_take().unwrap().is_none());

    assert!(!dispatcher.handle(LoopEvent::Tick));
    assert_eq!(done.take().unwrap().ending_message(), "bye");
    assert!(!dispatcher.handle(LoopEvent::Tick));
}

#[test_log::test]
fn it_should_terminate_at_once_when_the_window_closes() {
    let (world, _) = clicky();
    let (mut dispatcher, done) = dispatcher(Box::new(world));
    assert!(dispatcher.handle(LoopEvent::Tick));
    assert!(!dispatcher.handle(LoopEvent::WindowClosed));
    assert_eq!(done.take().unwrap().ending_message(), EXTERNAL_TERMINATION_MESSAGE);
}

#[test_log::test]
fn it_should_scale_clicks_before_handing_them_to_the_world() {
    let (world, clicks) = clicky();
    let (mut dispatcher, _done) = dispatcher(Box::new(world));
    assert!(dispatcher.handle(LoopEvent::Click(MouseClick {
        button: 0,
        x: 25,
        y: 10,
        window_width: 50,
        window_height: 50,
    })));
    assert_eq!(*clicks.lock().unwrap(), vec![Posn::new(50, 20)]);
}

#[test_log::test]
fn it_should_keep_the_first_ending_when_endings_race() {
    let (done_tx, done_rx) = hand_off::<Box<dyn World>>();
    let second = done_tx.clone();
    assert!(done_tx.offer(Box::new(StableWorld::new("first"))));
    assert!(!second.offer(Box::new(StableWorld::new(EXTERNAL_TERMINATION_MESSAGE))));
    assert_eq!(done_rx.take().unwrap().ending_message(), "first");
}

// --- Full loop ---

#[test_log::test]
fn it_should_run_a_headless_world_until_it_ends() {
    let draws = Arc::new(AtomicUsize::new(0));
    let world = Countdown {
        ticks_left: 3,
        draws: draws.clone(),
    };
    let ending = BigBang::new(20, 20, 0.001)
        .unwrap()
        .headless()
        .run(Box::new(world))
        .unwrap();
    assert_eq!(
        ending,
        Ending {
            message: "done".to_string(),
            acknowledged: true,
        }
    );
    // The initial world and the three countdown steps; the final
    // StableWorld draws nothing.
    assert_eq!(draws.load(Ordering::SeqCst), 4);
}

#[test_log::test]
fn it_should_end_with_bye_when_x_is_pressed() {
    let mock = MockHandle::new();
    let (world, _) = clicky();
    let result = run_with_mock(&mock, 200, 200, Box::new(world));

    mock.press_key(KeySymbol::Char('x'));
    let ending = result.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
    assert_eq!(ending.message, "bye");
    assert!(ending.acknowledged);
    assert_eq!(mock.dialogs(), vec!["bye".to_string()]);
    assert_eq!(mock.init_config().unwrap().title, "Clicky");
}

#[test_log::test]
fn it_should_keep_running_a_world_that_never_ends_until_the_window_closes() {
    let mock = MockHandle::new();
    let (world, _) = clicky();
    let result = run_with_mock(&mock, 100, 100, Box::new(world));

    mock.press_key(KeySymbol::Enter);
    assert!(result.recv_timeout(Duration::from_millis(200)).is_err());

    mock.close_window();
    let ending = result.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
    assert_eq!(ending.message, EXTERNAL_TERMINATION_MESSAGE);
}

#[test_log::test]
fn it_should_deliver_scaled_clicks_and_ignore_wheel_buttons() {
    let mock = MockHandle::new();
    mock.set_window_size(250, 250);
    let (world, clicks) = clicky();
    let result = run_with_mock(&mock, 500, 500, Box::new(world));

    mock.push_event(click(3, 10, 10));
    mock.push_event(click(0, 100, 50));
    mock.push_event(click(2, 250, 0));
    assert!(wait_until(|| clicks.lock().unwrap().len() == 2));
    assert_eq!(*clicks.lock().unwrap(), vec![Posn::new(200, 100), Posn::new(500, 0)]);

    mock.close_window();
    assert!(result.recv_timeout(Duration::from_secs(5)).unwrap().is_ok());
}

#[test_log::test]
fn it_should_report_a_dismissed_closing_dialog() {
    let mock = MockHandle::new();
    mock.set_dialog_policy(crate::display::DialogPolicy::Dismiss);
    let (world, _) = clicky();
    let result = run_with_mock(&mock, 100, 100, Box::new(world));
    mock.press_key(KeySymbol::Char('x'));
    let ending = result.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
    assert_eq!(ending.message, "bye");
    assert!(!ending.acknowledged);
}

#[test_log::test]
fn it_should_fail_when_the_window_cannot_be_opened() {
    let (world, _) = clicky();
    let result = BigBang::new(10, 10, 0.1)
        .unwrap()
        .with_driver(Box::new(|| Err(anyhow::anyhow!("no display"))))
        .run(Box::new(world));
    assert!(matches!(result, Err(WorldError::Display(_))));
}

#[test_log::test]
fn it_should_end_gracefully_when_a_transition_panics() {
    let ending = BigBang::new(10, 10, 0.001)
        .unwrap()
        .headless()
        .run(Box::new(Panicky))
        .unwrap();
    assert_eq!(ending.message, INTERRUPTED_MESSAGE);
}
