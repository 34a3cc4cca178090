//! LED zone access against a simulated device

mod common;

use chroma_device::{DeviceError, LedMode, LedType, Rgb};
use chroma_transport::{Command, TransportError};
use common::{keyboard, LedRegs, Sim};

#[test]
fn get_reads_every_field_once() {
    let sim = Sim::new();
    sim.set_led(
        LedType::Logo,
        LedRegs {
            enabled: 1,
            color: [0x44, 0xd6, 0x2c],
            mode: 0x02,
            brightness: 255,
        },
    );
    let device = sim.device(keyboard(6, 22));

    let state = device.led(LedType::Logo).unwrap().get().unwrap();
    assert!(state.enabled);
    assert_eq!(state.color, Rgb::new(0x44, 0xd6, 0x2c));
    assert_eq!(state.mode, LedMode::Pulse);
    assert_eq!(state.brightness, 100.0);
    assert_eq!(sim.mock.write_count(), 4);

    // Cached for the device's lifetime
    device.led(LedType::Logo).unwrap().get().unwrap();
    assert_eq!(sim.mock.write_count(), 4);
}

#[test]
fn setters_send_one_transaction_each() {
    let sim = Sim::new();
    let device = sim.device(keyboard(6, 22));
    let led = device.led(LedType::Backlight).unwrap();

    led.set_color(Rgb::new(1, 2, 3)).unwrap();
    led.set_brightness(50.0).unwrap();
    led.set_mode(LedMode::Spectrum).unwrap();
    led.set_enabled(true).unwrap();

    assert_eq!(sim.mock.write_count(), 4);
    assert_eq!(sim.sent_args(Command::SetLedColor), vec![vec![0x01, 0x05, 1, 2, 3]]);
    assert_eq!(sim.sent_args(Command::SetLedBrightness), vec![vec![0x01, 0x05, 128]]);
    assert_eq!(sim.sent_args(Command::SetLedMode), vec![vec![0x01, 0x05, 0x04]]);
    assert_eq!(sim.sent_args(Command::SetLedState), vec![vec![0x01, 0x05, 0x01]]);

    assert_eq!(
        sim.led(LedType::Backlight),
        LedRegs {
            enabled: 1,
            color: [1, 2, 3],
            mode: 0x04,
            brightness: 128,
        }
    );

    // Confirmed values served from cache
    let state = led.get().unwrap();
    assert_eq!(state.color, Rgb::new(1, 2, 3));
    assert_eq!(state.brightness, 50.2);
    assert_eq!(sim.mock.write_count(), 4);
}

#[test]
fn failed_write_keeps_last_confirmed_state() {
    let sim = Sim::new();
    let device = sim.device(keyboard(6, 22));
    let led = device.led(LedType::Backlight).unwrap();

    led.set_color(Rgb::RED).unwrap();
    sim.state.lock().failing.insert(Command::SetLedColor);

    let err = led.set_color(Rgb::BLUE).unwrap_err();
    assert!(matches!(
        err,
        DeviceError::Transport(TransportError::TransactionFailed { .. })
    ));
    assert_eq!(led.color().unwrap(), Rgb::RED);
}

#[test]
fn failed_write_on_fresh_led_reads_device_value() {
    let sim = Sim::new();
    sim.set_led(
        LedType::Backlight,
        LedRegs {
            color: [9, 9, 9],
            ..LedRegs::default()
        },
    );
    sim.state.lock().failing.insert(Command::SetLedColor);
    let device = sim.device(keyboard(6, 22));
    let led = device.led(LedType::Backlight).unwrap();

    assert!(led.set_color(Rgb::BLUE).is_err());
    assert_eq!(led.color().unwrap(), Rgb::new(9, 9, 9));
}

#[test]
fn unsupported_led_command_is_not_retried() {
    let sim = Sim::new();
    sim.state.lock().unsupported.insert(Command::SetLedMode);
    let device = sim.device(keyboard(6, 22));

    let err = device
        .led(LedType::Backlight)
        .unwrap()
        .set_mode(LedMode::Blink)
        .unwrap_err();
    assert!(err.is_unsupported());
    assert_eq!(sim.mock.write_count(), 1);
}

#[test]
fn led_missing_from_model_is_rejected() {
    let sim = Sim::new();
    let device = sim.device(keyboard(6, 22));
    assert!(matches!(
        device.led(LedType::ScrollWheel),
        Err(DeviceError::NotSupported(_))
    ));
    assert_eq!(sim.mock.write_count(), 0);
}

#[test]
fn each_led_type_has_its_own_state() {
    let sim = Sim::new();
    let device = sim.device(keyboard(6, 22));
    device.led(LedType::Logo).unwrap().set_color(Rgb::RED).unwrap();
    device.led(LedType::Backlight).unwrap().set_color(Rgb::GREEN).unwrap();

    assert_eq!(device.led(LedType::Logo).unwrap().color().unwrap(), Rgb::RED);
    assert_eq!(device.led(LedType::Backlight).unwrap().color().unwrap(), Rgb::GREEN);
}

#[test]
fn led_handles_can_be_kept_while_using_the_device() {
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    let sim = Sim::new();
    let device = Arc::new(sim.device(keyboard(2, 4)));

    let (done, finished) = mpsc::channel();
    let worker = {
        let device = device.clone();
        thread::spawn(move || {
            let logo = device.led(LedType::Logo).unwrap();
            let backlight = device.led(LedType::Backlight).unwrap();

            logo.set_color(Rgb::RED).unwrap();
            device.set_brightness(50.0).unwrap();
            device.suspend().unwrap();
            device.resume().unwrap();
            device.reset().unwrap();

            assert_eq!(logo.color().unwrap(), Rgb::RED);
            assert_eq!(backlight.brightness().unwrap(), 50.2);
            done.send(()).unwrap();
        })
    };

    finished
        .recv_timeout(Duration::from_secs(5))
        .expect("device calls blocked behind a held LED handle");
    worker.join().unwrap();
    assert_eq!(sim.led(LedType::Backlight).brightness, 128);
    assert_eq!(sim.led(LedType::Logo).color, [255, 0, 0]);
}
