//! State access micro-benchmarks.
//!
//! Measures the per-read cost of typed controls on a gamepad-sized layout:
//! - packed bit read
//! - normalized axis read (SHRT -> f32)
//! - packed bit write (read-modify-write)
//! - layout compilation for the whole device

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use input::device::DeviceId;
use input::fourcc::FourCC;
use input_state::{ControlDecl, DeviceDecl, InputDevice, StateFormat, compute_layout};

fn gamepad() -> DeviceDecl {
    let stick = |name: &str| {
        ControlDecl::group(
            name,
            StateFormat::new(FourCC::from_bytes(*b"STCK")),
            vec![
                ControlDecl::new("x", StateFormat::SHORT),
                ControlDecl::new("y", StateFormat::SHORT),
            ],
        )
    };
    let mut controls: Vec<ControlDecl> = (0..16)
        .map(|i| ControlDecl::new(format!("button{i}"), StateFormat::BIT))
        .collect();
    controls.push(stick("leftStick"));
    controls.push(stick("rightStick"));
    controls.push(ControlDecl::new("leftTrigger", StateFormat::BYTE));
    controls.push(ControlDecl::new("rightTrigger", StateFormat::BYTE));
    DeviceDecl::new("gamepad", FourCC::from_bytes(*b"GPAD"), controls)
}

fn bench_bit_read(c: &mut Criterion) {
    let device = InputDevice::build(DeviceId(1), &gamepad()).unwrap();
    let button = device.control::<bool>("button13").unwrap();
    let state = vec![0x55u8; device.state_size()];
    let view = device.view(&state).unwrap();

    c.bench_function("control_read_bit", |b| {
        b.iter(|| button.read(black_box(&view)));
    });
}

fn bench_axis_read(c: &mut Criterion) {
    let device = InputDevice::build(DeviceId(1), &gamepad()).unwrap();
    let axis = device.control::<f32>("leftStick/x").unwrap();
    let state = vec![0x7Fu8; device.state_size()];
    let view = device.view(&state).unwrap();

    c.bench_function("control_read_axis", |b| {
        b.iter(|| axis.read(black_box(&view)));
    });
}

fn bench_bit_write(c: &mut Criterion) {
    let device = InputDevice::build(DeviceId(1), &gamepad()).unwrap();
    let button = device.control::<bool>("button5").unwrap();
    let mut state = vec![0u8; device.state_size()];
    let mut view = device.view_mut(&mut state).unwrap();
    let mut pressed = false;

    c.bench_function("control_write_bit", |b| {
        b.iter(|| {
            pressed = !pressed;
            button.write(&mut view, black_box(pressed));
        });
    });
}

fn bench_compute_layout(c: &mut Criterion) {
    let decl = gamepad();
    c.bench_function("compute_layout_gamepad", |b| {
        b.iter(|| compute_layout(black_box(&decl)));
    });
}

criterion_group!(
    benches,
    bench_bit_read,
    bench_axis_read,
    bench_bit_write,
    bench_compute_layout,
);
criterion_main!(benches);
