// src/display/tests.rs

use super::manager::render_dialog;
use super::*;
use crate::config::DialogConfig;
use crate::handoff::hand_off;
use crate::keys::KeySymbol;
use crate::raster::SharedRaster;
use crate::test_support::wait_until;
use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const WHITE: u32 = 0x00ff_ffff;
const RED: u32 = 0x00ff_0000;

fn config(width_px: u32, height_px: u32) -> DriverConfig {
    DriverConfig {
        title: "Test".to_string(),
        width_px,
        height_px,
        x: 30,
        y: 40,
    }
}

fn spawn_mock(mock: &MockHandle, width: u32, height: u32) -> Result<(DisplayHandle, SharedRaster)> {
    let raster = SharedRaster::new(width, height, WHITE);
    let handle = DisplayHandle::spawn(config(width, height), raster.clone(), mock.factory())?;
    Ok((handle, raster))
}

fn open_dialog(handle: &DisplayHandle, message: &str) -> crate::handoff::HandOffReceiver<DialogOutcome> {
    let (reply, outcome) = hand_off();
    assert!(handle.send(DisplayCommand::OpenDialog {
        message: message.to_string(),
        reply,
    }));
    outcome
}

#[test_log::test]
fn it_should_create_the_window_with_the_requested_geometry() -> Result<()> {
    let mock = MockHandle::new();
    let (handle, _raster) = spawn_mock(&mock, 120, 80)?;

    assert_eq!(mock.init_config(), Some(config(120, 80)));
    assert_eq!(handle.window_size(), Some((120, 80)));
    assert!(!mock.is_visible());
    Ok(())
}

#[test_log::test]
fn it_should_fail_to_spawn_when_the_driver_cannot_start() {
    let raster = SharedRaster::new(10, 10, WHITE);
    let factory: DriverFactory = Box::new(|| Err(anyhow!("no display here")));
    let err = DisplayHandle::spawn(config(10, 10), raster, factory)
        .err()
        .map(|e| format!("{:#}", e));
    assert!(err.is_some_and(|msg| msg.contains("no display here")));
}

#[test_log::test]
fn it_should_present_the_raster_scaled_to_the_window_once_shown() -> Result<()> {
    let mock = MockHandle::new();
    mock.set_window_size(2, 2);
    let (handle, raster) = spawn_mock(&mock, 4, 4)?;
    raster.with(|r| r.fill_rect(0, 0, 2, 2, RED));

    handle.send(DisplayCommand::Redraw);
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(mock.present_count(), 0, "hidden windows are not presented");

    handle.send(DisplayCommand::Show);
    assert!(wait_until(|| mock.present_count() > 0));
    let frame = mock.last_frame().ok_or_else(|| anyhow!("no frame"))?;
    assert_eq!((frame.width_px, frame.height_px), (2, 2));
    assert_eq!(&*frame.pixels, &[RED, WHITE, WHITE, WHITE]);
    assert!(mock.is_visible());
    Ok(())
}

#[test_log::test]
fn it_should_present_again_after_a_redraw() -> Result<()> {
    let mock = MockHandle::new();
    let (handle, raster) = spawn_mock(&mock, 3, 3)?;
    handle.send(DisplayCommand::Show);
    assert!(wait_until(|| mock.present_count() == 1));

    raster.with(|r| r.put(1, 1, RED));
    handle.send(DisplayCommand::Redraw);
    assert!(wait_until(|| mock.present_count() == 2));
    let frame = mock.last_frame().ok_or_else(|| anyhow!("no frame"))?;
    assert_eq!(frame.pixels[4], RED);
    Ok(())
}

#[test_log::test]
fn it_should_deliver_keys_and_clicks_to_listeners() -> Result<()> {
    let mock = MockHandle::new();
    mock.set_window_size(250, 250);
    let (handle, _raster) = spawn_mock(&mock, 500, 500)?;

    let keys = Arc::new(Mutex::new(Vec::new()));
    let clicks = Arc::new(Mutex::new(Vec::new()));
    let seen_keys = keys.clone();
    let seen_clicks = clicks.clone();
    handle.send(DisplayCommand::AddKeyListener(Box::new(move |press| {
        seen_keys.lock().unwrap().push(press.name());
    })));
    handle.send(DisplayCommand::AddMouseListener(Box::new(move |click| {
        seen_clicks.lock().unwrap().push(*click);
    })));
    // Round-trip so both listeners are registered before input arrives.
    assert_eq!(handle.window_size(), Some((250, 250)));

    mock.press_key(KeySymbol::Char('x'));
    mock.press_key(KeySymbol::Enter);
    mock.click(100, 50);
    assert!(wait_until(|| clicks.lock().unwrap().len() == 1));

    assert_eq!(*keys.lock().unwrap(), vec!["x".to_string(), "ENTER".to_string()]);
    assert_eq!(
        clicks.lock().unwrap()[0],
        MouseClick {
            button: 0,
            x: 100,
            y: 50,
            window_width: 250,
            window_height: 250,
        }
    );
    Ok(())
}

#[test_log::test]
fn it_should_track_resizes_for_size_queries() -> Result<()> {
    let mock = MockHandle::new();
    let (handle, _raster) = spawn_mock(&mock, 100, 100)?;
    mock.set_window_size(300, 200);
    assert!(wait_until(|| handle.window_size() == Some((300, 200))));
    Ok(())
}

#[test_log::test]
fn it_should_resolve_dialogs_according_to_the_user() -> Result<()> {
    let mock = MockHandle::new();
    let (handle, _raster) = spawn_mock(&mock, 100, 100)?;

    assert_eq!(open_dialog(&handle, "Continue?").take()?, DialogOutcome::Acknowledged);

    mock.set_dialog_policy(DialogPolicy::Dismiss);
    assert_eq!(open_dialog(&handle, "Again?").take()?, DialogOutcome::Cancelled);
    assert_eq!(mock.dialogs(), vec!["Continue?".to_string(), "Again?".to_string()]);
    assert!(wait_until(|| !mock.dialog_open()));
    Ok(())
}

#[test_log::test]
fn it_should_queue_dialogs_and_open_them_one_at_a_time() -> Result<()> {
    let mock = MockHandle::new();
    mock.set_dialog_policy(DialogPolicy::Hold);
    let (handle, _raster) = spawn_mock(&mock, 100, 100)?;

    let first = open_dialog(&handle, "first");
    let second = open_dialog(&handle, "second");
    assert!(wait_until(|| mock.dialogs().len() == 1));
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(mock.dialogs(), vec!["first".to_string()]);

    mock.acknowledge_dialog();
    assert_eq!(first.take()?, DialogOutcome::Acknowledged);
    assert!(wait_until(|| mock.dialogs().len() == 2));
    mock.dismiss_dialog();
    assert_eq!(second.take()?, DialogOutcome::Cancelled);
    Ok(())
}

#[test_log::test]
fn it_should_ignore_main_window_input_while_a_dialog_is_open() -> Result<()> {
    let mock = MockHandle::new();
    mock.set_dialog_policy(DialogPolicy::Hold);
    let (handle, _raster) = spawn_mock(&mock, 100, 100)?;
    let keys = Arc::new(Mutex::new(Vec::new()));
    let seen = keys.clone();
    handle.send(DisplayCommand::AddKeyListener(Box::new(move |press| {
        seen.lock().unwrap().push(press.name());
    })));

    let outcome = open_dialog(&handle, "modal");
    assert!(wait_until(|| mock.dialog_open()));
    mock.press_key(KeySymbol::Char('a'));
    mock.acknowledge_dialog();
    assert_eq!(outcome.take()?, DialogOutcome::Acknowledged);
    mock.press_key(KeySymbol::Char('b'));
    assert!(wait_until(|| keys.lock().unwrap().len() == 1));
    assert_eq!(*keys.lock().unwrap(), vec!["b".to_string()]);
    Ok(())
}

#[test_log::test]
fn it_should_cancel_dialogs_hide_and_notify_when_the_window_closes() -> Result<()> {
    let mock = MockHandle::new();
    mock.set_dialog_policy(DialogPolicy::Hold);
    let (handle, _raster) = spawn_mock(&mock, 100, 100)?;
    let closed = Arc::new(Mutex::new(Vec::new()));
    let seen = closed.clone();
    handle.send(DisplayCommand::AddWindowListener(Box::new(move |event| {
        seen.lock().unwrap().push(event);
    })));
    handle.send(DisplayCommand::Show);

    let first = open_dialog(&handle, "first");
    let second = open_dialog(&handle, "second");
    assert!(wait_until(|| mock.dialog_open()));
    mock.close_window();

    assert_eq!(first.take()?, DialogOutcome::Cancelled);
    assert_eq!(second.take()?, DialogOutcome::Cancelled);
    assert!(wait_until(|| closed.lock().unwrap().len() == 1));
    assert_eq!(closed.lock().unwrap()[0], WindowEvent::Closing);
    assert!(!mock.is_visible());
    assert!(!mock.dialog_open());
    Ok(())
}

#[test_log::test]
fn it_should_cancel_open_dialogs_on_shutdown() -> Result<()> {
    let mock = MockHandle::new();
    mock.set_dialog_policy(DialogPolicy::Hold);
    let (handle, _raster) = spawn_mock(&mock, 100, 100)?;
    let outcome = open_dialog(&handle, "pending");
    assert!(wait_until(|| mock.dialog_open()));
    drop(handle);
    assert_eq!(outcome.take()?, DialogOutcome::Cancelled);
    Ok(())
}

#[test_log::test]
fn it_should_lay_out_the_dialog_button_inside_the_frame() {
    let dialog = DialogConfig::default();
    let spec = render_dialog(&dialog, "Continue?");
    let frame = &spec.frame;
    assert_eq!(spec.title, "Pausing...");
    assert_eq!(frame.pixels.len(), (frame.width_px * frame.height_px) as usize);
    assert!(spec.button.x >= 0 && spec.button.y >= 0);
    assert!(spec.button.x + spec.button.width <= frame.width_px as i32);
    assert!(spec.button.y + spec.button.height <= frame.height_px as i32);
    let black = crate::color::Color::Black.to_pixel();
    assert!(frame.pixels.iter().any(|&p| p == black));
}
