//! Frame buffer behavior against a simulated device

mod common;

use chroma_device::{DeviceError, FrameState, Rgb};
use chroma_transport::Command;
use common::{keyboard, Sim};

#[test]
fn write_then_read_back_from_staged() {
    let sim = Sim::new();
    let device = sim.device(keyboard(6, 22));

    device
        .with_frame(|frame| {
            frame.set(2, 5, Rgb::new(10, 20, 30))?;
            assert_eq!(frame.get(2, 5)?, Rgb::new(10, 20, 30));
            // Not committed yet
            assert_eq!(frame.current(2, 5)?, Rgb::BLACK);
            assert_eq!(frame.dirty_rows(), vec![2]);
            Ok(())
        })
        .unwrap();
    assert_eq!(sim.mock.write_count(), 0);
}

#[test]
fn out_of_bounds_leaves_state_unchanged() {
    let sim = Sim::new();
    let device = sim.device(keyboard(6, 22));

    device
        .with_frame(|frame| {
            frame.set(1, 1, Rgb::RED)?;

            let err = frame.set(6, 0, Rgb::BLUE).unwrap_err();
            assert!(matches!(
                err,
                DeviceError::OutOfBounds { row: 6, col: 0, height: 6, width: 22 }
            ));
            assert!(frame.set(0, 22, Rgb::BLUE).is_err());
            assert!(frame.put_row(3, 20, &[Rgb::BLUE; 3]).is_err());
            assert!(frame.put_row(3, usize::MAX, &[Rgb::BLUE; 2]).is_err());
            assert!(frame.get(0, 22).is_err());

            assert_eq!(frame.dirty_rows(), vec![1]);
            assert_eq!(frame.get(3, 20)?, Rgb::BLACK);
            Ok(())
        })
        .unwrap();
}

#[test]
fn commit_sends_one_transaction_per_dirty_row_in_order() {
    let sim = Sim::new();
    let device = sim.device(keyboard(6, 22));

    let sent = device
        .with_frame(|frame| {
            // Written out of order, several pixels per row
            frame.set(4, 0, Rgb::RED)?;
            frame.set(1, 3, Rgb::GREEN)?;
            frame.set(4, 21, Rgb::BLUE)?;
            frame.set(1, 4, Rgb::GREEN)?;
            frame.commit()
        })
        .unwrap();
    assert_eq!(sent, 2);
    assert_eq!(sim.state.lock().rows_applied, vec![1, 4]);
    assert_eq!(sim.mock.write_count(), 2);

    device
        .with_frame(|frame| {
            assert!(frame.dirty_rows().is_empty());
            assert_eq!(frame.state(), FrameState::Clean);
            for row in 0..6 {
                for col in 0..22 {
                    assert_eq!(frame.current(row, col)?, frame.get(row, col)?);
                }
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn commit_row_payload_covers_full_width() {
    let sim = Sim::new();
    let device = sim.device(keyboard(2, 3));
    device
        .with_frame(|frame| {
            frame.set(1, 1, Rgb::new(1, 2, 3))?;
            frame.commit()
        })
        .unwrap();

    let sent = sim.sent_args(Command::SetFrameRow);
    assert_eq!(sent, vec![vec![0xFF, 1, 0, 2, 0, 0, 0, 1, 2, 3, 0, 0, 0]]);
}

#[test]
fn commit_with_nothing_dirty_sends_nothing() {
    let sim = Sim::new();
    let device = sim.device(keyboard(6, 22));
    assert_eq!(device.with_frame(|frame| frame.commit()).unwrap(), 0);
    assert_eq!(sim.mock.write_count(), 0);
}

#[test]
fn failed_row_aborts_and_keeps_remaining_rows_dirty() {
    let sim = Sim::new();
    sim.state.lock().fail_rows.insert(3);
    let device = sim.device(keyboard(6, 22));

    let result = device.with_frame(|frame| {
        frame.fill(Rgb::WHITE);
        frame.commit()
    });
    assert!(result.is_err());

    // Rows before the failure stay applied
    assert_eq!(sim.state.lock().rows_applied, vec![0, 1, 2]);
    device
        .with_frame(|frame| {
            assert_eq!(frame.dirty_rows(), vec![3, 4, 5]);
            assert_eq!(frame.state(), FrameState::Staged);
            assert_eq!(frame.current(2, 0)?, Rgb::WHITE);
            assert_eq!(frame.current(3, 0)?, Rgb::BLACK);
            Ok(())
        })
        .unwrap();

    // Retry resumes at the failed row
    sim.state.lock().fail_rows.clear();
    assert_eq!(device.with_frame(|frame| frame.commit()).unwrap(), 3);
    assert_eq!(sim.state.lock().rows_applied, vec![0, 1, 2, 3, 4, 5]);
    assert!(device
        .with_frame(|frame| Ok(frame.dirty_rows()))
        .unwrap()
        .is_empty());
}

#[test]
fn reset_stages_base_color_on_every_row() {
    let sim = Sim::new();
    let device = sim.device(keyboard(3, 4));

    device
        .with_frame(|frame| {
            frame.set_base_color(Some(Rgb::BLUE)).reset();
            assert_eq!(frame.dirty_rows(), vec![0, 1, 2]);
            assert_eq!(frame.get(2, 3)?, Rgb::BLUE);

            frame.set_base_color(None).reset();
            assert_eq!(frame.get(2, 3)?, Rgb::BLACK);
            Ok(())
        })
        .unwrap();
}

#[test]
fn put_row_updates_a_span() {
    let sim = Sim::new();
    let device = sim.device(keyboard(2, 6));

    device
        .with_frame(|frame| {
            frame.put_row(1, 2, &[Rgb::RED, Rgb::GREEN])?;
            assert_eq!(frame.get(1, 1)?, Rgb::BLACK);
            assert_eq!(frame.get(1, 2)?, Rgb::RED);
            assert_eq!(frame.get(1, 3)?, Rgb::GREEN);
            assert_eq!(frame.dirty_rows(), vec![1]);
            Ok(())
        })
        .unwrap();
}

#[test]
fn frame_is_created_once_per_device() {
    let sim = Sim::new();
    let device = sim.device(keyboard(2, 2));
    device.with_frame(|frame| frame.set(0, 0, Rgb::RED)).unwrap();
    assert_eq!(device.with_frame(|frame| frame.get(0, 0)).unwrap(), Rgb::RED);
}

#[test]
fn show_frame_commits_then_selects_custom_frame() {
    let sim = Sim::new();
    let device = sim.device(keyboard(2, 2));
    device
        .with_frame(|frame| {
            frame.fill(Rgb::GREEN);
            Ok(())
        })
        .unwrap();

    assert_eq!(device.show_frame().unwrap(), 2);
    let commands: Vec<_> = sim.mock.requests().iter().map(|r| r.command()).collect();
    assert_eq!(
        commands,
        vec![
            Some(Command::SetFrameRow),
            Some(Command::SetFrameRow),
            Some(Command::SetEffect)
        ]
    );
    assert_eq!(sim.sent_args(Command::SetEffect), vec![vec![0x05, 0x01]]);
}

#[test]
fn device_without_matrix_has_no_frame() {
    let sim = Sim::new();
    let device = sim.device(chroma_device::DeviceModel::new(
        0x0043,
        "Mouse",
        chroma_device::DeviceKind::Mouse,
    ));
    assert!(!device.has_matrix());
    assert!(matches!(
        device.with_frame(|frame| Ok(frame.dims())),
        Err(DeviceError::NotSupported(_))
    ));
    assert!(matches!(device.show_frame(), Err(DeviceError::NotSupported(_))));
}
